//! Image drawing, pixel read-back, and PNG output for Canvas2dContext.

use super::Canvas2dContext;
use crate::error::Canvas2dResult;
use crate::image::{unpremultiply_in_place, CanvasImage};
use tiny_skia::Transform;

impl Canvas2dContext {
    fn blit(&mut self, pixmap: tiny_skia::PixmapRef<'_>, transform: Transform) {
        let paint = tiny_skia::PixmapPaint {
            opacity: 1.0,
            blend_mode: self.state.composite.into(),
            quality: tiny_skia::FilterQuality::Bilinear,
        };
        self.pixmap
            .draw_pixmap(0, 0, pixmap, &paint, transform, None);
    }

    /// Draw an image at its natural size with its top-left corner at (dx, dy).
    pub fn draw_image(&mut self, image: &CanvasImage, dx: f32, dy: f32) {
        log::debug!(target: "canvas", "drawImage {}x{} at {} {}", image.width(), image.height(), dx, dy);
        if let Some(pixmap) = image.as_pixmap_ref() {
            self.blit(pixmap, Transform::from_translate(dx, dy));
        }
    }

    /// Draw an image stretched to the destination rectangle.
    pub fn draw_image_scaled(&mut self, image: &CanvasImage, dx: f32, dy: f32, dw: f32, dh: f32) {
        log::debug!(target: "canvas", "drawImage {}x{} -> {} {} {} {}", image.width(), image.height(), dx, dy, dw, dh);
        if dw <= 0.0 || dh <= 0.0 {
            return;
        }
        if let Some(pixmap) = image.as_pixmap_ref() {
            let transform = Transform::from_translate(dx, dy)
                .pre_scale(dw / image.width() as f32, dh / image.height() as f32);
            self.blit(pixmap, transform);
        }
    }

    /// Draw another canvas stretched to the destination rectangle.
    pub fn draw_canvas_scaled(
        &mut self,
        source: &Canvas2dContext,
        dx: f32,
        dy: f32,
        dw: f32,
        dh: f32,
    ) {
        if dw <= 0.0 || dh <= 0.0 {
            return;
        }
        let transform = Transform::from_translate(dx, dy).pre_scale(
            dw / source.width as f32,
            dh / source.height as f32,
        );
        self.blit(source.pixmap.as_ref(), transform);
    }

    // --- Image data ---

    /// Straight-alpha RGBA pixels for a region. Pixels outside the canvas read as transparent.
    pub fn get_image_data(&self, x: i32, y: i32, width: u32, height: u32) -> Vec<u8> {
        let mut data = vec![0u8; width as usize * height as usize * 4];
        let src = self.pixmap.data();

        for dy in 0..height {
            let src_y = y + dy as i32;
            if src_y < 0 || src_y >= self.height as i32 {
                continue;
            }
            for dx in 0..width {
                let src_x = x + dx as i32;
                if src_x < 0 || src_x >= self.width as i32 {
                    continue;
                }
                let src_idx = (src_y as usize * self.width as usize + src_x as usize) * 4;
                let dst_idx = (dy as usize * width as usize + dx as usize) * 4;
                data[dst_idx..dst_idx + 4].copy_from_slice(&src[src_idx..src_idx + 4]);
            }
        }

        unpremultiply_in_place(&mut data);
        data
    }

    /// Snapshot the canvas as a drawable image.
    pub fn to_image(&self) -> CanvasImage {
        CanvasImage::from_pixmap(self.pixmap.clone())
    }

    /// Export the canvas as PNG data.
    ///
    /// `ppi` is written to the pHYs chunk and defaults to 72.
    pub fn to_png(&self, ppi: Option<f32>) -> Canvas2dResult<Vec<u8>> {
        let ppi = ppi.unwrap_or(72.0);

        let mut buf = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buf, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);

            let ppm = (ppi.max(0.0) / 0.0254).round() as u32;
            encoder.set_pixel_dims(Some(png::PixelDimensions {
                xppu: ppm,
                yppu: ppm,
                unit: png::Unit::Meter,
            }));

            let mut writer = encoder.write_header()?;
            let data = self.get_image_data(0, 0, self.width, self.height);
            writer.write_image_data(&data)?;
        }
        Ok(buf)
    }
}
