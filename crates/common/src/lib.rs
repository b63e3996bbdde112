//! Shared types for the meshview viewer.

mod transform;

pub use transform::ModelTransform;
