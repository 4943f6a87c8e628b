//! Height metrics: adjusted and visual heights, the shared render height,
//! and per-character scale factors.

use crate::adjustment::HeightAdjustment;
use crate::character::{Character, RenderOptions};
use crate::error::{SizeDiffError, SizeDiffResult};
use serde::Serialize;

/// Headroom added above the tallest character.
pub const RENDER_HEADROOM: f64 = 1.05;

/// Render heights above this many inches get one grid line per foot.
pub const FOOT_GRID_THRESHOLD: f64 = 22.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterMetrics {
    /// Feral height after the species adjustment.
    pub adjusted_height: f64,
    /// Adjusted height including ears.
    pub visual_height: f64,
    /// `visual_height / render_height`.
    pub scale_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneMetrics {
    pub characters: Vec<CharacterMetrics>,
    pub render_height: f64,
    pub draw_line_at_foot: bool,
}

/// Compute scaling metrics for a scene.
pub fn compute_metrics(
    characters: &[Character],
    options: &RenderOptions,
    adjustment: &dyn HeightAdjustment,
) -> SizeDiffResult<SceneMetrics> {
    if characters.is_empty() {
        return Err(SizeDiffError::EmptyInput);
    }

    let mut heights = Vec::with_capacity(characters.len());
    for (index, character) in characters.iter().enumerate() {
        let invalid = |reason: String| SizeDiffError::InvalidCharacter { index, reason };

        if !character.feral_height.is_finite() || character.feral_height <= 0.0 {
            return Err(invalid(format!(
                "feral_height must be a positive number, got {}",
                character.feral_height
            )));
        }
        if !character.ears_offset.is_finite() || character.ears_offset < 0.0 {
            return Err(invalid(format!(
                "ears_offset must be a non-negative number, got {}",
                character.ears_offset
            )));
        }

        let adjusted_height = if options.use_species_scaling {
            adjustment.adjust(character, character.feral_height)
        } else {
            character.feral_height
        };
        if !adjusted_height.is_finite() || adjusted_height <= 0.0 {
            return Err(invalid(format!(
                "height adjustment produced {adjusted_height}"
            )));
        }

        let visual_height = if options.measure_to_ears && character.ears_offset > 0.0 {
            adjusted_height * (1.0 + character.ears_offset / 100.0)
        } else {
            adjusted_height
        };
        heights.push((adjusted_height, visual_height));
    }

    let tallest = heights
        .iter()
        .map(|&(_, visual)| visual)
        .fold(f64::MIN, f64::max);
    let render_height = tallest * RENDER_HEADROOM;

    let characters = heights
        .into_iter()
        .map(|(adjusted_height, visual_height)| CharacterMetrics {
            adjusted_height,
            visual_height,
            scale_factor: visual_height / render_height,
        })
        .collect();

    Ok(SceneMetrics {
        characters,
        render_height,
        draw_line_at_foot: uses_foot_grid(render_height),
    })
}

/// Whether a scene of this render height is ruled per foot rather than per inch.
pub fn uses_foot_grid(render_height: f64) -> bool {
    render_height > FOOT_GRID_THRESHOLD
}
