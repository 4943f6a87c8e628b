//! Pixel layout: canvas size and where each character lands.

use crate::character::{Character, RenderOptions};
use crate::error::{SizeDiffError, SizeDiffResult};
use crate::metrics::SceneMetrics;
use serde::Serialize;

/// Intrinsic size of a character image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// Why an image size lookup failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLookupError {
    pub path: String,
    pub reason: String,
}

/// Pixel geometry of one character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterPlacement {
    pub x: u32,
    /// Top edge; the bottom edge always sits on the ground line.
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Left edge of the label block.
    pub text_x: u32,
    /// Baseline of the first label line below the name.
    pub text_y: u32,
}

impl CharacterPlacement {
    /// Whether the point lies inside the image bounds, edges included.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x as f64
            && x <= self.x as f64 + self.width as f64
            && y >= self.y as f64
            && y <= self.y as f64 + self.height as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResult {
    pub width: u32,
    pub height: u32,
    /// Ground line, in pixels from the top.
    pub size: u32,
    pub font_size: u32,
    pub char_padding: u32,
    pub bottom_padding: u32,
    pub metrics: SceneMetrics,
    pub placements: Vec<CharacterPlacement>,
}

impl LayoutResult {
    pub fn render_height(&self) -> f64 {
        self.metrics.render_height
    }

    pub fn draw_line_at_foot(&self) -> bool {
        self.metrics.draw_line_at_foot
    }

    /// Index of the character whose image contains the point.
    pub fn character_at(&self, x: f64, y: f64) -> Option<usize> {
        self.placements.iter().position(|p| p.contains(x, y))
    }
}

/// Lay out characters left to right, foot-aligned at `options.size`.
///
/// `lookup` supplies each character's intrinsic image size, in input order.
pub fn compute_layout<F>(
    characters: &[Character],
    options: &RenderOptions,
    metrics: SceneMetrics,
    mut lookup: F,
) -> SizeDiffResult<LayoutResult>
where
    F: FnMut(usize, &Character) -> Result<ImageSize, AssetLookupError>,
{
    if characters.is_empty() {
        return Err(SizeDiffError::EmptyInput);
    }

    let size = options.size;
    let font_size = options.font_size();
    let char_padding = options.char_padding();
    let too_large = || {
        SizeDiffError::InvalidOption(format!(
            "layout at size {} does not fit in {} pixels",
            size,
            u32::MAX
        ))
    };

    let mut placements = Vec::with_capacity(characters.len());
    let mut x: u32 = 0;
    for (index, (character, char_metrics)) in
        characters.iter().zip(&metrics.characters).enumerate()
    {
        let image = lookup(index, character).map_err(|e| SizeDiffError::AssetResolution {
            index,
            path: e.path,
            reason: e.reason,
        })?;
        if image.width == 0 || image.height == 0 {
            return Err(SizeDiffError::AssetResolution {
                index,
                path: character.image.clone(),
                reason: format!("image has no pixels ({}x{})", image.width, image.height),
            });
        }

        let height = (size as f64 * char_metrics.scale_factor).floor() as u32;
        let width = (image.width as f64 * (height as f64 / image.height as f64)).floor() as u32;
        let y = size.saturating_sub(height);

        let text_x = x
            .checked_add((1.1 * width as f64).floor() as u32)
            .ok_or_else(too_large)?;
        placements.push(CharacterPlacement {
            x,
            y,
            width,
            height,
            text_x,
            text_y: y + (0.1 * height as f64).floor() as u32,
        });
        x = x
            .checked_add(width)
            .and_then(|x| x.checked_add(char_padding))
            .ok_or_else(too_large)?;
    }

    // No padding after the last character
    let width = x - char_padding;
    let bottom_padding = options.bottom_padding();

    Ok(LayoutResult {
        width,
        height: size.checked_add(bottom_padding).ok_or_else(too_large)?,
        size,
        font_size,
        char_padding,
        bottom_padding,
        metrics,
        placements,
    })
}
