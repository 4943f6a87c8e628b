//! Font discovery for label rendering.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

/// Which fonts a canvas may use for labels.
#[derive(Clone, Debug)]
pub struct FontConfig {
    /// Font files registered in addition to anything discovered on disk.
    pub custom_fonts: Vec<CustomFont>,
    /// Concrete families standing in for the generic CSS names.
    pub generic_families: GenericFamilyMap,
    /// Scan the platform font directories (default: true).
    pub load_system_fonts: bool,
    /// Extra directories to scan for font files.
    pub font_dirs: Vec<PathBuf>,
    /// Apply hinting when building glyph outlines (default: false).
    pub hinting_enabled: bool,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            custom_fonts: Vec::new(),
            generic_families: GenericFamilyMap::defaults(),
            load_system_fonts: true,
            font_dirs: Vec::new(),
            hinting_enabled: false,
        }
    }
}

/// Raw font file bytes registered with a canvas.
#[derive(Clone, Debug)]
pub struct CustomFont {
    /// TTF/OTF data. Arc-wrapped so configs clone without copying fonts.
    pub data: Arc<Vec<u8>>,
}

/// Concrete family names, in preference order, for each generic family.
#[derive(Clone, Debug, Default)]
pub struct GenericFamilyMap {
    pub sans_serif: Vec<String>,
    pub serif: Vec<String>,
    pub monospace: Vec<String>,
}

impl GenericFamilyMap {
    /// Preference lists mirroring what desktop browsers pick.
    pub fn defaults() -> Self {
        Self {
            sans_serif: vec![
                "Arial".into(),
                "Helvetica".into(),
                "Liberation Sans".into(),
                "DejaVu Sans".into(),
            ],
            serif: vec![
                "Times New Roman".into(),
                "Times".into(),
                "Liberation Serif".into(),
                "DejaVu Serif".into(),
            ],
            monospace: vec![
                "Courier New".into(),
                "Liberation Mono".into(),
                "DejaVu Sans Mono".into(),
            ],
        }
    }
}

impl FontConfig {
    /// Scan fonts once so many canvases can share the result.
    pub fn resolve(&self) -> ResolvedFontConfig {
        ResolvedFontConfig::new(self)
    }
}

/// A [`FontConfig`] with its font database already populated.
///
/// Pass it to [`Canvas2dContext::with_resolved`](crate::Canvas2dContext::with_resolved).
/// Cloning copies the in-memory database without rescanning the filesystem.
#[derive(Clone)]
pub struct ResolvedFontConfig {
    pub(crate) fontdb: fontdb::Database,
    pub(crate) hinting_enabled: bool,
}

impl ResolvedFontConfig {
    pub fn new(config: &FontConfig) -> Self {
        let mut db = fontdb::Database::new();
        if config.load_system_fonts {
            db.load_system_fonts();
        }
        for dir in &config.font_dirs {
            db.load_fonts_dir(dir);
        }
        for font in &config.custom_fonts {
            db.load_font_data(font.data.as_ref().clone());
        }
        apply_generic_families(&mut db, &config.generic_families);
        log::debug!(target: "canvas", "resolved font database with {} faces", db.len());

        Self {
            fontdb: db,
            hinting_enabled: config.hinting_enabled,
        }
    }

    /// Number of font faces available to text rendering.
    pub fn face_count(&self) -> usize {
        self.fontdb.len()
    }
}

fn apply_generic_families(db: &mut fontdb::Database, families: &GenericFamilyMap) {
    let available: HashSet<String> = db
        .faces()
        .flat_map(|face| face.families.iter().map(|(fam, _)| fam.clone()))
        .collect();
    let first_available =
        |list: &[String]| list.iter().find(|f| available.contains(*f)).cloned();

    if let Some(family) = first_available(&families.sans_serif) {
        db.set_sans_serif_family(family);
    }
    if let Some(family) = first_available(&families.serif) {
        db.set_serif_family(family);
    }
    if let Some(family) = first_available(&families.monospace) {
        db.set_monospace_family(family);
    }
}
