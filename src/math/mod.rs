//! Math utilities module
//!
//! Provides re-exports from glam, the node transform, and the rotation
//! helpers the solver and constraints are built on.

mod rotation;
mod transform;

pub use rotation::{from_to_rotation, rotation_angle, signed_angle};
pub use transform::Transform;

// Re-export commonly used glam types
pub use glam::{Quat, Vec3};
