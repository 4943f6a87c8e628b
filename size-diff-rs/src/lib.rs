//! Size comparison rendering.
//!
//! Characters of different heights are scaled against a shared render
//! height, laid out left to right on a common ground line, and painted with
//! a feet-or-inches ruler grid and per-character labels.
//!
//! ```rust,ignore
//! use size_diff_rs::{ImageProvider, ImageProviderConfig, RenderOptions, SizeDiffRenderer};
//! use std::sync::Arc;
//!
//! let provider = Arc::new(ImageProvider::new(ImageProviderConfig::default()));
//! let mut renderer = SizeDiffRenderer::with_default_canvas(RenderOptions::default(), provider)?;
//! let png = renderer.render(&characters).await?.to_png()?;
//! ```

#![allow(clippy::uninlined_format_args)]

pub mod adjustment;
pub mod character;
pub mod color;
pub mod error;
pub mod geometry;
pub mod image_loading;
pub mod layout;
pub mod metrics;
pub mod query;
pub mod renderer;
pub mod species;
pub mod surface;
pub mod taur;
pub mod units;

#[macro_use]
extern crate lazy_static;

pub use adjustment::{HeightAdjustment, IdentityAdjustment};
pub use character::{Character, RenderOptions};
pub use color::DominantColor;
pub use error::{SizeDiffError, SizeDiffResult};
pub use geometry::{grid_lines, height_indicator, DashStyle, HeightIndicator, HorizontalLine};
pub use image_loading::{
    FsImageSource, ImageLoadError, ImageProvider, ImageProviderConfig, ImageSource, ResolvedImage,
};
pub use layout::{compute_layout, CharacterPlacement, ImageSize, LayoutResult};
pub use metrics::{compute_metrics, CharacterMetrics, SceneMetrics};
pub use query::{
    format_characters, parse_characters, remove_character, CharacterEntry, ShareState,
};
pub use renderer::{default_canvas, label_lines, Rendered, SizeDiffRenderer};
pub use species::SpeciesLibrary;
pub use surface::CanvasSurface;
pub use taur::{calculate_taur, TaurDimensions, TaurInput, TaurMeasurement};
pub use units::{inches_to_feet_inches, parse_height};

pub use size_diff_canvas2d;
