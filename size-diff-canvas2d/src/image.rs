//! Decoded raster images that can be drawn onto a canvas.

use crate::error::{Canvas2dError, Canvas2dResult};

/// An owned RGBA image stored with premultiplied alpha, ready for blitting.
#[derive(Clone, PartialEq, Eq)]
pub struct CanvasImage {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl std::fmt::Debug for CanvasImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl CanvasImage {
    /// Build an image from straight (non-premultiplied) RGBA bytes.
    pub fn from_rgba8(width: u32, height: u32, mut rgba: Vec<u8>) -> Canvas2dResult<Self> {
        if width == 0 || height == 0 {
            return Err(Canvas2dError::InvalidDimensions { width, height });
        }
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(Canvas2dError::InvalidImageData {
                expected,
                actual: rgba.len(),
            });
        }

        for px in rgba.chunks_exact_mut(4) {
            let a = px[3] as u16;
            match a {
                255 => {}
                0 => px[..3].fill(0),
                _ => {
                    for c in &mut px[..3] {
                        *c = ((*c as u16 * a + 127) / 255) as u8;
                    }
                }
            }
        }

        Ok(Self {
            data: rgba,
            width,
            height,
        })
    }

    pub(crate) fn from_pixmap(pixmap: tiny_skia::Pixmap) -> Self {
        let (width, height) = (pixmap.width(), pixmap.height());
        Self {
            data: pixmap.take(),
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Size of the pixel buffer in bytes.
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    /// Straight-alpha RGBA copy of the pixels.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        unpremultiply_in_place(&mut out);
        out
    }

    pub(crate) fn as_pixmap_ref(&self) -> Option<tiny_skia::PixmapRef<'_>> {
        tiny_skia::PixmapRef::from_bytes(&self.data, self.width, self.height)
    }
}

pub(crate) fn unpremultiply_in_place(data: &mut [u8]) {
    for px in data.chunks_exact_mut(4) {
        let a = px[3];
        if a == 0 {
            px.fill(0);
        } else if a < 255 {
            let alpha = a as f32 / 255.0;
            for c in &mut px[..3] {
                *c = (*c as f32 / alpha).round().min(255.0) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_mismatched_length() {
        let err = CanvasImage::from_rgba8(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(
            err,
            Canvas2dError::InvalidImageData {
                expected: 16,
                actual: 15
            }
        ));
    }

    #[test]
    fn test_rejects_zero_dimensions() {
        assert!(CanvasImage::from_rgba8(0, 3, Vec::new()).is_err());
    }

    #[test]
    fn test_transparent_pixels_lose_color() {
        let img = CanvasImage::from_rgba8(1, 1, vec![200, 100, 50, 0]).unwrap();
        assert_eq!(img.to_rgba8(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_opaque_pixels_are_untouched() {
        let img = CanvasImage::from_rgba8(1, 1, vec![200, 100, 50, 255]).unwrap();
        assert_eq!(img.to_rgba8(), vec![200, 100, 50, 255]);
        assert_eq!(img.byte_len(), 4);
    }
}
