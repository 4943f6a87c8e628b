//! Text shaping and measurement using cosmic-text.

use crate::font_parser::ParsedFont;
use crate::style::{TextAlign, TextBaseline};
use cosmic_text::{Attrs, Buffer, CacheKeyFlags, Family, FontSystem, Metrics, Shaping};

/// Text metrics returned by `measure_text`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextMetrics {
    /// Advance width of the text in pixels.
    pub width: f32,
    /// Distance from the alphabetic baseline to the top of the line box.
    pub ascent: f32,
    /// Distance from the alphabetic baseline to the bottom of the line box.
    pub descent: f32,
}

/// Pick the first family from a CSS family list that the font database can satisfy.
pub(crate) fn resolve_family<'a>(db: &fontdb::Database, families: &'a [String]) -> Family<'a> {
    for name in families {
        match name.to_ascii_lowercase().as_str() {
            "sans-serif" | "system-ui" => return Family::SansSerif,
            "serif" => return Family::Serif,
            "monospace" => return Family::Monospace,
            "cursive" => return Family::Cursive,
            "fantasy" => return Family::Fantasy,
            _ => {}
        }
        let known = db.faces().any(|face| {
            face.families
                .iter()
                .any(|(family, _)| family.eq_ignore_ascii_case(name))
        });
        if known {
            return Family::Name(name);
        }
    }
    Family::SansSerif
}

/// Shape a single line of text.
pub(crate) fn shape_line(
    font_system: &mut FontSystem,
    text: &str,
    font: &ParsedFont,
    hinting_enabled: bool,
) -> Buffer {
    let metrics = Metrics::new(font.size_px, font.size_px * 1.2);
    let mut buffer = Buffer::new(font_system, metrics);

    let family = resolve_family(font_system.db(), &font.families);
    let flags = if hinting_enabled {
        CacheKeyFlags::empty()
    } else {
        CacheKeyFlags::DISABLE_HINTING
    };
    let attrs = Attrs::new()
        .family(family)
        .weight(font.weight)
        .style(font.style)
        .cache_key_flags(flags);

    buffer.set_text(font_system, text, &attrs, Shaping::Advanced, None);
    buffer.shape_until_scroll(font_system, false);
    buffer
}

/// Width, ascent and descent of shaped text.
pub(crate) fn buffer_metrics(buffer: &Buffer, font: &ParsedFont) -> TextMetrics {
    let mut m = TextMetrics::default();
    for run in buffer.layout_runs() {
        m.width = m.width.max(run.line_w);
        m.ascent = m.ascent.max(run.line_y - run.line_top);
        m.descent = m.descent.max(run.line_top + run.line_height - run.line_y);
    }
    if m.ascent == 0.0 && m.descent == 0.0 {
        m.ascent = font.size_px * 0.8;
        m.descent = font.size_px * 0.2;
    }
    m
}

/// Horizontal offset from the anchor to the start of the text.
pub(crate) fn text_x_offset(width: f32, align: TextAlign) -> f32 {
    match align {
        TextAlign::Left => 0.0,
        TextAlign::Right => -width,
        TextAlign::Center => -width / 2.0,
    }
}

/// Vertical offset from the anchor to the alphabetic baseline.
pub(crate) fn text_y_offset(ascent: f32, descent: f32, baseline: TextBaseline) -> f32 {
    match baseline {
        TextBaseline::Top => ascent,
        TextBaseline::Middle => (ascent - descent) / 2.0,
        TextBaseline::Alphabetic => 0.0,
        TextBaseline::Bottom => -descent,
    }
}
