//! Canvas 2D drawing surface used by the size-diff renderer.
//!
//! This crate implements the subset of the Canvas 2D API that a size
//! comparison scene needs, without a browser or JavaScript runtime:
//! - `tiny-skia` for rasterization (rectangles, dashed lines, image blits,
//!   composite operations)
//! - `cosmic-text` for label shaping, measurement and glyph outlines
//! - `fontdb` for font discovery
//!
//! # Example
//!
//! ```rust,ignore
//! use size_diff_canvas2d::{Canvas2dContext, RectParams};
//!
//! let mut ctx = Canvas2dContext::new(400, 440)?;
//! ctx.set_fill_style("white")?;
//! ctx.fill_rect(&RectParams { x: 0.0, y: 0.0, width: 400.0, height: 440.0 });
//! let png_data = ctx.to_png(None)?;
//! ```

mod context;
mod drawing_state;
mod error;
mod font_config;
mod font_parser;
mod geometry;
mod image;
mod style;
mod text;

// Re-export public API
pub use context::{Canvas2dContext, MAX_DIMENSION};
pub use drawing_state::DrawingState;
pub use error::{Canvas2dError, Canvas2dResult};
pub use font_config::{CustomFont, FontConfig, GenericFamilyMap, ResolvedFontConfig};
pub use font_parser::{parse_font, ParsedFont};
pub use geometry::{LineSegment, RectParams};
pub use image::CanvasImage;
pub use style::{CompositeOperation, FillStyle, TextAlign, TextBaseline};
pub use text::TextMetrics;
