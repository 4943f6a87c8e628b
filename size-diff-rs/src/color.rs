//! Image tinting and dominant color sampling.

use crate::error::SizeDiffResult;
use crate::surface::CanvasSurface;
use serde::Serialize;
use size_diff_canvas2d::{CanvasImage, CompositeOperation};
use std::fmt;

/// Opaque color sampled from an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DominantColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl DominantColor {
    /// CSS form, e.g. `rgb(12, 34, 56)`.
    pub fn to_css(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DominantColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Multiply `image` by `css_color`, keeping the image's alpha.
///
/// Transparent pixels stay transparent. Opaque white becomes the tint color.
pub fn apply_tint<S: CanvasSurface>(image: &CanvasImage, css_color: &str) -> SizeDiffResult<CanvasImage> {
    let (width, height) = (image.width(), image.height());
    let (w, h) = (width as f32, height as f32);
    let mut scratch = S::offscreen(width, height)?;

    scratch.draw_image(image, 0.0, 0.0, w, h);
    scratch.set_composite(CompositeOperation::Multiply);
    scratch.set_fill_color(css_color)?;
    scratch.fill_rect(0.0, 0.0, w, h);
    scratch.set_composite(CompositeOperation::DestinationIn);
    scratch.draw_image(image, 0.0, 0.0, w, h);

    log::debug!("tinted {}x{} image with {}", width, height, css_color);
    Ok(scratch.snapshot())
}

/// Average color of `image`, found by repeatedly halving it down to one pixel.
///
/// Each step averages neighbouring pixels, so every source pixel contributes.
pub fn dominant_color<S: CanvasSurface>(image: &CanvasImage) -> SizeDiffResult<DominantColor> {
    let (mut width, mut height) = (image.width(), image.height());
    let mut current = S::offscreen(width, height)?;
    current.draw_image(image, 0.0, 0.0, width as f32, height as f32);

    while width > 1 || height > 1 {
        let next_width = width.div_ceil(2).max(1);
        let next_height = height.div_ceil(2).max(1);
        let mut next = S::offscreen(next_width, next_height)?;
        next.draw_surface(&current, 0.0, 0.0, next_width as f32, next_height as f32);
        current = next;
        width = next_width;
        height = next_height;
    }

    let [r, g, b, _] = current.read_pixel(0, 0);
    Ok(DominantColor { r, g, b })
}
