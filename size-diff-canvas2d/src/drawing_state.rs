//! Per-canvas drawing state.

use crate::font_parser::ParsedFont;
use crate::style::{CompositeOperation, FillStyle, TextAlign, TextBaseline};

/// Styles applied by subsequent drawing calls. Reset by `resize`.
#[derive(Debug, Clone)]
pub struct DrawingState {
    /// Current fill style.
    pub fill_style: FillStyle,
    /// Current stroke style.
    pub stroke_style: FillStyle,
    /// Current line width.
    pub line_width: f32,
    /// Current line dash pattern.
    pub line_dash: Vec<f32>,
    /// Current font specification.
    pub font: ParsedFont,
    /// Current text alignment.
    pub text_align: TextAlign,
    /// Current text baseline.
    pub text_baseline: TextBaseline,
    /// Current global composite operation.
    pub composite: CompositeOperation,
}

impl Default for DrawingState {
    fn default() -> Self {
        Self {
            fill_style: FillStyle::default(),
            stroke_style: FillStyle::default(),
            line_width: 1.0,
            line_dash: Vec::new(),
            font: ParsedFont::default(),
            text_align: TextAlign::default(),
            text_baseline: TextBaseline::default(),
            composite: CompositeOperation::SourceOver,
        }
    }
}
