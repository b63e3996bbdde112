//! Asset loading for the viewer: OBJ meshes and diffuse textures.
//!
//! Meshes are ingested into a deduplicated vertex buffer + u32 index buffer,
//! ready to cast into GPU buffers. Textures decode to RGBA8.
//!
//! # Invariants
//! - Every index in `MeshData::indices` is a valid `vertices` offset.
//! - Loading never panics on malformed input; it returns `AssetError`.

mod obj;
mod texture;

pub use obj::{MeshData, MeshVertex, load_obj, load_obj_from_reader};
pub use texture::TextureImage;

/// Errors from asset loading.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("OBJ parse error: {0}")]
    ObjParse(#[from] tobj::LoadError),
    #[error("image decode error: {0}")]
    ImageDecode(#[from] image::ImageError),
    #[error("OBJ contains no geometry: {0}")]
    EmptyMesh(String),
}
