//! Ruler grid and height indicator geometry.

use crate::character::{Character, RenderOptions};
use crate::layout::LayoutResult;
use serde::Serialize;

/// A horizontal line from `x0` to `x1` at row `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HorizontalLine {
    pub x0: u32,
    pub x1: u32,
    pub y: u32,
}

/// Dash pattern for height indicators, scaled with the image size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashStyle {
    pub dash: u32,
    pub gap: u32,
    pub line_width: u32,
}

impl DashStyle {
    /// Proportions tuned for a 1024 pixel image.
    pub fn for_size(size: u32) -> Self {
        Self {
            dash: 40 * size / 1024,
            gap: 20 * size / 1024,
            line_width: 6 * size / 1024,
        }
    }
}

/// Dashed line marking a character's height without ears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeightIndicator {
    pub index: usize,
    pub line: HorizontalLine,
    pub style: DashStyle,
}

fn row_for(height: f64, layout: &LayoutResult) -> u32 {
    let size = layout.size as f64;
    (size - (height / layout.render_height() * size).floor()).max(0.0) as u32
}

/// Grid lines across the full canvas width, one per foot or one per inch.
///
/// The first line is always the ground line at `y = size`.
pub fn grid_lines(layout: &LayoutResult) -> Vec<HorizontalLine> {
    let render_height = layout.render_height();
    let size = layout.size as f64;
    let span = |y: f64| HorizontalLine {
        x0: 0,
        x1: layout.width,
        y: y.max(0.0) as u32,
    };

    if layout.draw_line_at_foot() {
        let feet = (render_height / 12.0).floor() as u32;
        (0..=feet)
            .map(|foot| span(size - ((foot * 12) as f64 / render_height * size).floor()))
            .collect()
    } else {
        let inches = render_height.floor() as u32;
        (0..=inches)
            .map(|inch| span(size - (inch as f64 / render_height * size).floor()))
            .collect()
    }
}

/// Indicator for a character, when ears are measured and it has an ears offset.
pub fn height_indicator(
    index: usize,
    character: &Character,
    layout: &LayoutResult,
    options: &RenderOptions,
) -> Option<HeightIndicator> {
    if !options.measure_to_ears || character.ears_offset <= 0.0 {
        return None;
    }
    let placement = layout.placements.get(index)?;
    let metrics = layout.metrics.characters.get(index)?;

    Some(HeightIndicator {
        index,
        line: HorizontalLine {
            x0: placement.x,
            x1: placement.x + placement.width,
            y: row_for(metrics.adjusted_height, layout),
        },
        style: DashStyle::for_size(layout.size),
    })
}
