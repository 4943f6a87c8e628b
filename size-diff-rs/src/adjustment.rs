//! Species height adjustment applied before scaling.

use crate::character::Character;

/// Maps a character's feral height to the height used for scaling.
///
/// Only consulted when `RenderOptions::use_species_scaling` is set.
pub trait HeightAdjustment: Send + Sync {
    fn adjust(&self, character: &Character, feral_height: f64) -> f64;
}

/// Leaves heights unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityAdjustment;

impl HeightAdjustment for IdentityAdjustment {
    fn adjust(&self, _character: &Character, feral_height: f64) -> f64 {
        feral_height
    }
}

impl<F> HeightAdjustment for F
where
    F: Fn(&Character, f64) -> f64 + Send + Sync,
{
    fn adjust(&self, character: &Character, feral_height: f64) -> f64 {
        self(character, feral_height)
    }
}
