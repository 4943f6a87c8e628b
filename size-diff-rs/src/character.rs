//! Scene inputs: characters and render options.

use crate::error::{SizeDiffError, SizeDiffResult};
use serde::{Deserialize, Serialize};
use size_diff_canvas2d::MAX_DIMENSION;

/// One creature in a size comparison. Heights are in inches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub species: String,
    pub gender: String,
    pub name: String,
    /// Height shown to the reader.
    pub height: f64,
    /// Height used as the scaling basis.
    pub feral_height: f64,
    /// Percentage added to the visual height for ears. Zero disables it.
    #[serde(default)]
    pub ears_offset: f64,
    /// Tint as a hex string without the leading `#`.
    #[serde(default)]
    pub color: Option<String>,
    /// Image file name relative to the species data root.
    pub image: String,
}

impl Character {
    /// Tint as a CSS color, if any.
    pub fn tint_css(&self) -> Option<String> {
        let color = self.color.as_deref()?.trim();
        if color.is_empty() {
            return None;
        }
        Some(format!("#{}", color.trim_start_matches('#')))
    }

    /// Species as displayed in labels.
    pub fn species_label(&self) -> String {
        self.species.replace('_', " ")
    }
}

/// Options controlling scaling and appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderOptions {
    /// Pixel height given to the full render height.
    pub size: u32,
    pub measure_to_ears: bool,
    /// Apply the renderer's height adjustment policy.
    pub use_species_scaling: bool,
    pub font_family: String,
    pub background_color: String,
    pub grid_color: String,
    pub grid_line_width: f32,
    /// Overrides `floor(size / 20)`.
    pub font_size: Option<u32>,
    /// Overrides `font_size * 6`.
    pub char_padding: Option<u32>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            size: 400,
            measure_to_ears: true,
            use_species_scaling: false,
            font_family: "Arial, sans-serif".to_string(),
            background_color: "white".to_string(),
            grid_color: "grey".to_string(),
            grid_line_width: 1.0,
            font_size: None,
            char_padding: None,
        }
    }
}

impl RenderOptions {
    pub fn validate(&self) -> SizeDiffResult<()> {
        if self.size == 0 {
            return Err(SizeDiffError::InvalidOption(
                "size must be greater than zero".to_string(),
            ));
        }
        let canvas_height = self.size as u64 + self.bottom_padding() as u64;
        if canvas_height > MAX_DIMENSION as u64 {
            return Err(SizeDiffError::InvalidOption(format!(
                "size {} needs a canvas {} pixels tall, more than the limit of {}",
                self.size, canvas_height, MAX_DIMENSION
            )));
        }
        if !self.grid_line_width.is_finite() || self.grid_line_width < 0.0 {
            return Err(SizeDiffError::InvalidOption(format!(
                "gridLineWidth must be a non-negative number, got {}",
                self.grid_line_width
            )));
        }
        Ok(())
    }

    /// Label font size in pixels.
    pub fn font_size(&self) -> u32 {
        self.font_size.unwrap_or(self.size / 20)
    }

    /// Horizontal gap between characters in pixels.
    pub fn char_padding(&self) -> u32 {
        self.char_padding.unwrap_or(self.font_size() * 6)
    }

    /// Blank strip below the ground line in pixels.
    pub fn bottom_padding(&self) -> u32 {
        self.size / 10
    }
}
