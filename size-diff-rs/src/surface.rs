//! The drawing surface a renderer paints onto.

use crate::error::SizeDiffResult;
use crate::geometry::{DashStyle, HorizontalLine};
use size_diff_canvas2d::{Canvas2dContext, CanvasImage, CompositeOperation, LineSegment, RectParams};

/// 2D raster operations used by the renderer.
///
/// `Canvas2dContext` is the production surface. Offscreen surfaces created
/// through [`CanvasSurface::offscreen`] are used for tinting and color sampling.
pub trait CanvasSurface: Sized {
    /// A transparent scratch surface without fonts.
    fn offscreen(width: u32, height: u32) -> SizeDiffResult<Self>;

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Resize, clearing all pixels and drawing state.
    fn set_size(&mut self, width: u32, height: u32) -> SizeDiffResult<()>;

    fn set_fill_color(&mut self, css: &str) -> SizeDiffResult<()>;

    fn set_composite(&mut self, op: CompositeOperation);

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32);

    /// Draw `image` stretched to the destination rectangle.
    fn draw_image(&mut self, image: &CanvasImage, dx: f32, dy: f32, dw: f32, dh: f32);

    /// Draw another surface of the same kind stretched to the destination rectangle.
    fn draw_surface(&mut self, source: &Self, dx: f32, dy: f32, dw: f32, dh: f32);

    /// Stroke a horizontal line, solid unless `dash` is given.
    fn stroke_line(
        &mut self,
        line: &HorizontalLine,
        css: &str,
        line_width: f32,
        dash: Option<DashStyle>,
    ) -> SizeDiffResult<()>;

    fn set_font(&mut self, css_font: &str) -> SizeDiffResult<()>;

    /// Fill text with its alphabetic baseline at `y`.
    fn fill_text(&mut self, text: &str, x: f32, y: f32);

    /// Straight-alpha RGBA of one pixel; transparent outside the surface.
    fn read_pixel(&self, x: u32, y: u32) -> [u8; 4];

    fn snapshot(&self) -> CanvasImage;

    fn to_png(&self) -> SizeDiffResult<Vec<u8>>;
}

impl CanvasSurface for Canvas2dContext {
    fn offscreen(width: u32, height: u32) -> SizeDiffResult<Self> {
        Ok(Canvas2dContext::offscreen(width, height)?)
    }

    fn width(&self) -> u32 {
        Canvas2dContext::width(self)
    }

    fn height(&self) -> u32 {
        Canvas2dContext::height(self)
    }

    fn set_size(&mut self, width: u32, height: u32) -> SizeDiffResult<()> {
        Ok(self.resize(width, height)?)
    }

    fn set_fill_color(&mut self, css: &str) -> SizeDiffResult<()> {
        Ok(self.set_fill_style(css)?)
    }

    fn set_composite(&mut self, op: CompositeOperation) {
        self.set_global_composite_operation(op);
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        Canvas2dContext::fill_rect(
            self,
            &RectParams {
                x,
                y,
                width,
                height,
            },
        );
    }

    fn draw_image(&mut self, image: &CanvasImage, dx: f32, dy: f32, dw: f32, dh: f32) {
        self.draw_image_scaled(image, dx, dy, dw, dh);
    }

    fn draw_surface(&mut self, source: &Self, dx: f32, dy: f32, dw: f32, dh: f32) {
        self.draw_canvas_scaled(source, dx, dy, dw, dh);
    }

    fn stroke_line(
        &mut self,
        line: &HorizontalLine,
        css: &str,
        line_width: f32,
        dash: Option<DashStyle>,
    ) -> SizeDiffResult<()> {
        self.set_stroke_style(css)?;
        self.set_line_width(line_width);
        if let Some(dash) = dash {
            self.set_line_dash(vec![dash.dash as f32, dash.gap as f32]);
        }
        Canvas2dContext::stroke_line(
            self,
            &LineSegment::horizontal(line.x0 as f32, line.x1 as f32, line.y as f32),
        );
        if dash.is_some() {
            self.set_line_dash(Vec::new());
        }
        Ok(())
    }

    fn set_font(&mut self, css_font: &str) -> SizeDiffResult<()> {
        Ok(Canvas2dContext::set_font(self, css_font)?)
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32) {
        Canvas2dContext::fill_text(self, text, x, y);
    }

    fn read_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let data = self.get_image_data(x as i32, y as i32, 1, 1);
        [data[0], data[1], data[2], data[3]]
    }

    fn snapshot(&self) -> CanvasImage {
        self.to_image()
    }

    fn to_png(&self) -> SizeDiffResult<Vec<u8>> {
        Ok(Canvas2dContext::to_png(self, None)?)
    }
}
