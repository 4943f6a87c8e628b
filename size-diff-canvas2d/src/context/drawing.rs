//! Path building, fill, stroke and paint helpers for Canvas2dContext.

use super::Canvas2dContext;
use crate::geometry::{LineSegment, RectParams};
use crate::style::FillStyle;
use tiny_skia::Transform;

impl Canvas2dContext {
    // --- Path building ---

    /// Discard the current path.
    pub fn begin_path(&mut self) {
        self.path_builder = tiny_skia::PathBuilder::new();
        self.subpath_start = None;
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.path_builder.move_to(x, y);
        self.subpath_start = Some((x, y));
    }

    /// Add a line to the current subpath, or start one if there is none.
    pub fn line_to(&mut self, x: f32, y: f32) {
        if self.subpath_start.is_none() {
            self.move_to(x, y);
        } else {
            self.path_builder.line_to(x, y);
        }
    }

    /// Add a closed rectangle subpath.
    pub fn rect(&mut self, params: &RectParams) {
        let RectParams {
            x,
            y,
            width,
            height,
        } = *params;
        self.path_builder.move_to(x, y);
        self.path_builder.line_to(x + width, y);
        self.path_builder.line_to(x + width, y + height);
        self.path_builder.line_to(x, y + height);
        self.path_builder.close();
        self.subpath_start = Some((x, y));
    }

    pub fn close_path(&mut self) {
        if self.subpath_start.is_some() {
            self.path_builder.close();
        }
    }

    // --- Drawing operations ---

    /// Fill the current path using the non-zero winding rule.
    pub fn fill(&mut self) {
        log::debug!(target: "canvas", "fill");
        // Clone so a following stroke() still sees the path
        let Some(path) = self.path_builder.clone().finish() else {
            return;
        };
        let style = self.state.fill_style;
        self.with_paint_from_style(style, |ctx, paint| {
            ctx.pixmap.fill_path(
                &path,
                paint,
                tiny_skia::FillRule::Winding,
                Transform::identity(),
                None,
            );
        });
    }

    /// Stroke the current path with the current line settings.
    pub fn stroke(&mut self) {
        log::debug!(target: "canvas", "stroke");
        let Some(path) = self.path_builder.clone().finish() else {
            return;
        };
        let stroke = self.current_stroke();
        let style = self.state.stroke_style;
        self.with_paint_from_style(style, |ctx, paint| {
            ctx.pixmap
                .stroke_path(&path, paint, &stroke, Transform::identity(), None);
        });
    }

    /// Fill a rectangle.
    pub fn fill_rect(&mut self, params: &RectParams) {
        log::debug!(target: "canvas", "fillRect {} {} {} {}", params.x, params.y, params.width, params.height);
        self.begin_path();
        self.rect(params);
        self.fill();
    }

    /// Stroke a single straight line segment.
    pub fn stroke_line(&mut self, line: &LineSegment) {
        log::debug!(target: "canvas", "strokeLine {} {} -> {} {}", line.x0, line.y0, line.x1, line.y1);
        self.begin_path();
        self.move_to(line.x0, line.y0);
        self.line_to(line.x1, line.y1);
        self.stroke();
    }

    /// Set the pixels of a rectangle to transparent black.
    pub fn clear_rect(&mut self, params: &RectParams) {
        log::debug!(target: "canvas", "clearRect {} {} {} {}", params.x, params.y, params.width, params.height);
        let Some(rect) =
            tiny_skia::Rect::from_xywh(params.x, params.y, params.width, params.height)
        else {
            return;
        };
        let paint = tiny_skia::Paint {
            blend_mode: tiny_skia::BlendMode::Clear,
            ..Default::default()
        };
        self.pixmap
            .fill_rect(rect, &paint, Transform::identity(), None);
    }

    // --- Private paint helpers ---

    fn current_stroke(&self) -> tiny_skia::Stroke {
        tiny_skia::Stroke {
            width: self.state.line_width,
            dash: if self.state.line_dash.is_empty() {
                None
            } else {
                tiny_skia::StrokeDash::new(self.state.line_dash.clone(), 0.0)
            },
            ..Default::default()
        }
    }

    pub(crate) fn with_paint_from_style<R>(
        &mut self,
        style: FillStyle,
        draw: impl for<'a> FnOnce(&mut Self, &tiny_skia::Paint<'a>) -> R,
    ) -> R {
        let mut paint = tiny_skia::Paint {
            anti_alias: true,
            blend_mode: self.state.composite.into(),
            ..Default::default()
        };

        match style {
            FillStyle::Color(color) => {
                paint.set_color(color);
                draw(self, &paint)
            }
        }
    }
}
