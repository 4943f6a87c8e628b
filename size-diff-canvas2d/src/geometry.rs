//! Parameter structs for Canvas 2D drawing operations.

/// Parameters for a rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectParams {
    /// X coordinate of the top-left corner.
    pub x: f32,
    /// Y coordinate of the top-left corner.
    pub y: f32,
    /// Width of the rectangle.
    pub width: f32,
    /// Height of the rectangle.
    pub height: f32,
}

/// A straight line between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl LineSegment {
    /// A horizontal line at `y` spanning `[x0, x1]`.
    pub fn horizontal(x0: f32, x1: f32, y: f32) -> Self {
        Self { x0, y0: y, x1, y1: y }
    }
}
