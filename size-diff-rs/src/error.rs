//! Error types for size-diff-rs.

use size_diff_canvas2d::Canvas2dError;
use thiserror::Error;

/// Result type alias using SizeDiffError.
pub type SizeDiffResult<T> = Result<T, SizeDiffError>;

/// Errors that end a render call. No partial image is produced.
#[derive(Debug, Error)]
pub enum SizeDiffError {
    /// No characters were supplied, so there is no render height.
    #[error("cannot render an empty character list")]
    EmptyInput,

    /// A character image and its placeholder could both not be loaded.
    #[error("failed to resolve image for character {index} ({path}): {reason}")]
    AssetResolution {
        index: usize,
        path: String,
        reason: String,
    },

    /// `render` was called before a drawing surface was attached.
    #[error("renderer has no drawing surface attached")]
    UninitializedSurface,

    /// A character carries values that would produce degenerate geometry.
    #[error("invalid character {index}: {reason}")]
    InvalidCharacter { index: usize, reason: String },

    /// A render option is out of range.
    #[error("invalid render option: {0}")]
    InvalidOption(String),

    /// The drawing surface reported an error.
    #[error(transparent)]
    Surface(#[from] Canvas2dError),

    /// Species data could not be read or does not cover the request.
    #[error("species data error: {0}")]
    SpeciesData(String),

    /// Body measurements for a calculation are out of range.
    #[error("invalid measurement: {0}")]
    Measurement(String),

    /// A share-state query string could not be parsed.
    #[error("invalid query: {0}")]
    Query(String),
}
