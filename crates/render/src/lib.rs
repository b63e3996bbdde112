//! wgpu render backend for the viewer.
//!
//! Renders one textured mesh with a model-view-projection uniform. The
//! camera is a look-at camera driven by the debug panel.
//!
//! # Invariants
//! - The renderer owns all GPU resources for the mesh; callers hand it a
//!   CPU-side `MeshData`/`TextureImage` once, at construction.
//! - The renderer never mutates viewer state; the MVP comes in per frame.

mod camera;
mod gpu;
mod shaders;

pub use camera::OrbitCamera;
pub use gpu::{ClearColor, MeshRenderer};
