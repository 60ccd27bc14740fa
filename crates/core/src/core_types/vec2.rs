//! Vector type alias for 2D model positions and velocities.

use nalgebra::Vector2;

/// 2D vector type for positions and velocities in model space.
///
/// `x` is the horizontal offset from the center of the sunlight span and `y` is the
/// altitude above the ground, both in meters.
pub type Vec2 = Vector2<f64>;
