//! Canvas 2D rendering context implementation.

mod drawing;
mod image_ops;
mod text_rendering;

use crate::drawing_state::DrawingState;
use crate::error::{Canvas2dError, Canvas2dResult};
use crate::font_config::{FontConfig, ResolvedFontConfig};
use crate::style::{CompositeOperation, FillStyle};
use cosmic_text::{FontSystem, SwashCache};
use tiny_skia::Pixmap;

/// Maximum canvas dimension (same as Chrome).
pub const MAX_DIMENSION: u32 = 32767;

/// Font machinery owned by a canvas that can draw text.
pub(crate) struct TextEngine {
    pub(crate) font_system: FontSystem,
    pub(crate) swash_cache: SwashCache,
    pub(crate) hinting_enabled: bool,
}

/// Canvas 2D rendering context.
pub struct Canvas2dContext {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) pixmap: Pixmap,
    /// `None` for offscreen canvases created without fonts.
    pub(crate) text: Option<TextEngine>,
    pub(crate) state: DrawingState,
    pub(crate) path_builder: tiny_skia::PathBuilder,
    pub(crate) subpath_start: Option<(f32, f32)>,
}

impl Canvas2dContext {
    /// Create a canvas that loads system fonts with the default family mappings.
    pub fn new(width: u32, height: u32) -> Canvas2dResult<Self> {
        Self::with_resolved(width, height, &FontConfig::default().resolve())
    }

    /// Create a canvas sharing an already scanned font database.
    pub fn with_resolved(
        width: u32,
        height: u32,
        resolved: &ResolvedFontConfig,
    ) -> Canvas2dResult<Self> {
        let font_system =
            FontSystem::new_with_locale_and_db("en".to_string(), resolved.fontdb.clone());
        let text = TextEngine {
            font_system,
            swash_cache: SwashCache::new(),
            hinting_enabled: resolved.hinting_enabled,
        };
        Self::new_internal(width, height, Some(text))
    }

    /// Create a scratch canvas for pixel work. It has no fonts, so text calls are ignored.
    pub fn offscreen(width: u32, height: u32) -> Canvas2dResult<Self> {
        Self::new_internal(width, height, None)
    }

    fn new_internal(width: u32, height: u32, text: Option<TextEngine>) -> Canvas2dResult<Self> {
        let pixmap = new_pixmap(width, height)?;
        Ok(Self {
            width,
            height,
            pixmap,
            text,
            state: DrawingState::default(),
            path_builder: tiny_skia::PathBuilder::new(),
            subpath_start: None,
        })
    }

    /// Get canvas width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get canvas height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether this canvas can render text.
    pub fn has_fonts(&self) -> bool {
        self.text.is_some()
    }

    /// Change the canvas size. Like assigning `canvas.width`, this clears the
    /// pixels and resets all drawing state.
    pub fn resize(&mut self, width: u32, height: u32) -> Canvas2dResult<()> {
        log::debug!(target: "canvas", "resize {}x{}", width, height);
        self.pixmap = new_pixmap(width, height)?;
        self.width = width;
        self.height = height;
        self.state = DrawingState::default();
        self.path_builder = tiny_skia::PathBuilder::new();
        self.subpath_start = None;
        Ok(())
    }

    // --- Style setters ---

    /// Set the fill style from a CSS color string.
    pub fn set_fill_style(&mut self, style: &str) -> Canvas2dResult<()> {
        self.state.fill_style = FillStyle::Color(parse_color(style)?);
        Ok(())
    }

    /// Set the stroke style from a CSS color string.
    pub fn set_stroke_style(&mut self, style: &str) -> Canvas2dResult<()> {
        self.state.stroke_style = FillStyle::Color(parse_color(style)?);
        Ok(())
    }

    /// Set the line width. Non-finite or non-positive values are ignored.
    pub fn set_line_width(&mut self, width: f32) {
        if width.is_finite() && width > 0.0 {
            self.state.line_width = width;
        }
    }

    /// Set the composite operation used by subsequent draws.
    pub fn set_global_composite_operation(&mut self, op: CompositeOperation) {
        self.state.composite = op;
    }

    pub fn global_composite_operation(&self) -> CompositeOperation {
        self.state.composite
    }

    /// Set the line dash pattern. Patterns with a negative or non-finite
    /// entry are ignored; odd-length patterns are repeated once.
    pub fn set_line_dash(&mut self, mut segments: Vec<f32>) {
        if segments.iter().any(|&v| !v.is_finite() || v < 0.0) {
            return;
        }
        if segments.len() % 2 == 1 {
            segments.extend_from_within(..);
        }
        self.state.line_dash = segments;
    }

    pub fn line_dash(&self) -> &[f32] {
        &self.state.line_dash
    }
}

fn new_pixmap(width: u32, height: u32) -> Canvas2dResult<Pixmap> {
    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(Canvas2dError::InvalidDimensions { width, height });
    }
    Pixmap::new(width, height).ok_or(Canvas2dError::InvalidDimensions { width, height })
}

/// Parse a CSS color string into a tiny_skia::Color.
pub(crate) fn parse_color(s: &str) -> Canvas2dResult<tiny_skia::Color> {
    let parsed = csscolorparser::parse(s)
        .map_err(|e| Canvas2dError::ColorParseError(format!("{}: {}", s, e)))?;

    let [r, g, b, a] = parsed.to_array();
    Ok(tiny_skia::Color::from_rgba(r, g, b, a).unwrap_or(tiny_skia::Color::BLACK))
}
