//! Style types and enums for Canvas 2D operations.

use crate::error::Canvas2dError;
use std::str::FromStr;

/// Fill or stroke style. Scenes only ever paint with solid colors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FillStyle {
    /// Solid color fill.
    Color(tiny_skia::Color),
}

impl Default for FillStyle {
    fn default() -> Self {
        // Default is opaque black
        FillStyle::Color(tiny_skia::Color::BLACK)
    }
}

/// Text alignment for text rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    /// Align text to the left of the anchor point.
    #[default]
    Left,
    /// Align text to the right of the anchor point.
    Right,
    /// Center text on the anchor point.
    Center,
}

/// Text baseline for text rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextBaseline {
    /// Top of the em square.
    Top,
    /// Middle of the em square.
    Middle,
    /// Alphabetic baseline.
    #[default]
    Alphabetic,
    /// Bottom of the em square.
    Bottom,
}

/// `globalCompositeOperation` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositeOperation {
    #[default]
    SourceOver,
    SourceIn,
    SourceAtop,
    DestinationOver,
    DestinationIn,
    DestinationOut,
    Copy,
    Multiply,
    Screen,
    Darken,
    Lighten,
}

impl FromStr for CompositeOperation {
    type Err = Canvas2dError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "source-over" => CompositeOperation::SourceOver,
            "source-in" => CompositeOperation::SourceIn,
            "source-atop" => CompositeOperation::SourceAtop,
            "destination-over" => CompositeOperation::DestinationOver,
            "destination-in" => CompositeOperation::DestinationIn,
            "destination-out" => CompositeOperation::DestinationOut,
            "copy" => CompositeOperation::Copy,
            "multiply" => CompositeOperation::Multiply,
            "screen" => CompositeOperation::Screen,
            "darken" => CompositeOperation::Darken,
            "lighten" => CompositeOperation::Lighten,
            other => return Err(Canvas2dError::CompositeOperation(other.to_string())),
        })
    }
}

impl From<CompositeOperation> for tiny_skia::BlendMode {
    fn from(op: CompositeOperation) -> Self {
        match op {
            CompositeOperation::SourceOver => tiny_skia::BlendMode::SourceOver,
            CompositeOperation::SourceIn => tiny_skia::BlendMode::SourceIn,
            CompositeOperation::SourceAtop => tiny_skia::BlendMode::SourceAtop,
            CompositeOperation::DestinationOver => tiny_skia::BlendMode::DestinationOver,
            CompositeOperation::DestinationIn => tiny_skia::BlendMode::DestinationIn,
            CompositeOperation::DestinationOut => tiny_skia::BlendMode::DestinationOut,
            CompositeOperation::Copy => tiny_skia::BlendMode::Source,
            CompositeOperation::Multiply => tiny_skia::BlendMode::Multiply,
            CompositeOperation::Screen => tiny_skia::BlendMode::Screen,
            CompositeOperation::Darken => tiny_skia::BlendMode::Darken,
            CompositeOperation::Lighten => tiny_skia::BlendMode::Lighten,
        }
    }
}
