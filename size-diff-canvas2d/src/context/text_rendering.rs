//! Text rendering operations for Canvas2dContext.

use super::Canvas2dContext;
use crate::error::{Canvas2dError, Canvas2dResult};
use crate::font_parser::parse_font;
use crate::style::{TextAlign, TextBaseline};
use crate::text::{buffer_metrics, shape_line, text_x_offset, text_y_offset, TextMetrics};
use cosmic_text::Command;
use tiny_skia::Transform;

impl Canvas2dContext {
    /// Set the font from a CSS font string.
    pub fn set_font(&mut self, font: &str) -> Canvas2dResult<()> {
        self.state.font = parse_font(font)?;
        Ok(())
    }

    pub fn set_text_align(&mut self, align: TextAlign) {
        self.state.text_align = align;
    }

    pub fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.state.text_baseline = baseline;
    }

    /// Measure text with the current font.
    pub fn measure_text(&mut self, text: &str) -> Canvas2dResult<TextMetrics> {
        let engine = self
            .text
            .as_mut()
            .ok_or_else(|| Canvas2dError::TextError("canvas has no fonts".to_string()))?;
        let buffer = shape_line(
            &mut engine.font_system,
            text,
            &self.state.font,
            engine.hinting_enabled,
        );
        Ok(buffer_metrics(&buffer, &self.state.font))
    }

    /// Fill text with its anchor at (x, y), drawing glyphs as vector paths.
    pub fn fill_text(&mut self, text: &str, x: f32, y: f32) {
        log::debug!(target: "canvas", "fillText \"{}\" {} {}", text, x, y);
        let Some(mut engine) = self.text.take() else {
            log::warn!("fillText ignored on a canvas without fonts");
            return;
        };

        let font = self.state.font.clone();
        let buffer = shape_line(&mut engine.font_system, text, &font, engine.hinting_enabled);
        let metrics = buffer_metrics(&buffer, &font);
        let base_x = x + text_x_offset(metrics.width, self.state.text_align);
        let base_y = y + text_y_offset(metrics.ascent, metrics.descent, self.state.text_baseline);

        let style = self.state.fill_style;
        self.with_paint_from_style(style, |ctx, paint| {
            for run in buffer.layout_runs() {
                for glyph in run.glyphs.iter() {
                    let physical = glyph.physical((base_x, base_y), 1.0);
                    let glyph_x = base_x + glyph.x + glyph.font_size * glyph.x_offset;
                    let glyph_y = base_y + glyph.y - glyph.font_size * glyph.y_offset;

                    let Some(commands) = engine
                        .swash_cache
                        .get_outline_commands(&mut engine.font_system, physical.cache_key)
                    else {
                        continue;
                    };

                    // Font outlines are y-up
                    let mut pb = tiny_skia::PathBuilder::new();
                    for cmd in commands {
                        match cmd {
                            Command::MoveTo(p) => pb.move_to(p.x, -p.y),
                            Command::LineTo(p) => pb.line_to(p.x, -p.y),
                            Command::QuadTo(c, p) => pb.quad_to(c.x, -c.y, p.x, -p.y),
                            Command::CurveTo(c1, c2, p) => {
                                pb.cubic_to(c1.x, -c1.y, c2.x, -c2.y, p.x, -p.y)
                            }
                            Command::Close => pb.close(),
                        }
                    }
                    if let Some(path) = pb.finish() {
                        ctx.pixmap.fill_path(
                            &path,
                            paint,
                            tiny_skia::FillRule::Winding,
                            Transform::from_translate(glyph_x, glyph_y),
                            None,
                        );
                    }
                }
            }
        });

        self.text = Some(engine);
    }
}
