use crate::AssetError;
use bytemuck::{Pod, Zeroable};
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

/// A single mesh vertex: position + texture coordinate.
///
/// Layout matches the GPU vertex buffer, so a `&[MeshVertex]` casts straight
/// to bytes with bytemuck.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub tex_coord: [f32; 2],
}

/// CPU-side mesh: deduplicated vertices and a u32 index buffer.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }
}

/// Hash key for vertex deduplication.
///
/// Raw f32 bit patterns: two vertices collapse only when position and
/// texcoord are bitwise identical.
#[derive(PartialEq, Eq, Hash)]
struct VertexKey([u32; 5]);

impl VertexKey {
    fn of(v: &MeshVertex) -> Self {
        Self([
            v.position[0].to_bits(),
            v.position[1].to_bits(),
            v.position[2].to_bits(),
            v.tex_coord[0].to_bits(),
            v.tex_coord[1].to_bits(),
        ])
    }
}

/// Load an OBJ file into a deduplicated `MeshData`.
///
/// Materials referenced by the OBJ are ignored; the viewer binds its own
/// diffuse texture.
pub fn load_obj(path: impl AsRef<Path>) -> Result<MeshData, AssetError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let mesh = load_obj_from_reader(&mut text.as_bytes(), &path.display().to_string())?;
    tracing::debug!(
        path = %path.display(),
        vertices = mesh.vertex_count(),
        indices = mesh.index_count(),
        "loaded OBJ mesh"
    );
    Ok(mesh)
}

/// Load an OBJ from any reader. `name` is used in error messages.
pub fn load_obj_from_reader(
    reader: &mut impl BufRead,
    name: &str,
) -> Result<MeshData, AssetError> {
    let load_opts = tobj::LoadOptions {
        triangulate: true,
        // Keep separate position/texcoord index streams; dedup is ours.
        single_index: false,
        ..Default::default()
    };
    let (models, _materials) = tobj::load_obj_buf(reader, &load_opts, |_| {
        Ok((Vec::new(), Default::default()))
    })?;

    let mut vertices: Vec<MeshVertex> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();
    let mut unique: HashMap<VertexKey, u32> = HashMap::new();

    for model in &models {
        let mesh = &model.mesh;
        for (i, &pos_index) in mesh.indices.iter().enumerate() {
            let p = 3 * pos_index as usize;
            let position = [
                mesh.positions[p],
                mesh.positions[p + 1],
                mesh.positions[p + 2],
            ];
            // Faces without texcoords degrade to (0, 0) instead of failing.
            let tex_coord = match mesh.texcoord_indices.get(i) {
                Some(&t) => {
                    let t = 2 * t as usize;
                    [mesh.texcoords[t], mesh.texcoords[t + 1]]
                }
                None => [0.0, 0.0],
            };

            let vertex = MeshVertex {
                position,
                tex_coord,
            };
            let next = vertices.len() as u32;
            let slot = *unique.entry(VertexKey::of(&vertex)).or_insert_with(|| {
                vertices.push(vertex);
                next
            });
            indices.push(slot);
        }
    }

    if indices.is_empty() {
        return Err(AssetError::EmptyMesh(name.to_string()));
    }

    Ok(MeshData { vertices, indices })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Unit quad, two triangles sharing an edge, fully textured.
    const QUAD_OBJ: &str = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 1.0 0.0
v 0.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
f 1/1 2/2 3/3
f 1/1 3/3 4/4
";

    const UNTEXTURED_TRI_OBJ: &str = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
f 1 2 3
";

    #[test]
    fn shared_corners_are_deduplicated() {
        let mesh = load_obj_from_reader(&mut QUAD_OBJ.as_bytes(), "quad").unwrap();
        // 6 face corners collapse to 4 unique vertices.
        assert_eq!(mesh.index_count(), 6);
        assert_eq!(mesh.vertex_count(), 4);
    }

    #[test]
    fn indices_reference_identical_vertices() {
        let mesh = load_obj_from_reader(&mut QUAD_OBJ.as_bytes(), "quad").unwrap();
        // Corner 1/1 appears in both faces and must resolve to one slot.
        assert_eq!(mesh.indices[0], mesh.indices[3]);
        for &i in &mesh.indices {
            assert!((i as usize) < mesh.vertex_count());
        }
    }

    #[test]
    fn missing_texcoords_default_to_zero() {
        let mesh = load_obj_from_reader(&mut UNTEXTURED_TRI_OBJ.as_bytes(), "tri").unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        for v in &mesh.vertices {
            assert_eq!(v.tex_coord, [0.0, 0.0]);
        }
    }

    #[test]
    fn quads_are_triangulated() {
        let obj = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 1.0 0.0
v 0.0 1.0 0.0
f 1 2 3 4
";
        let mesh = load_obj_from_reader(&mut obj.as_bytes(), "quad").unwrap();
        assert_eq!(mesh.index_count(), 6);
        assert_eq!(mesh.vertex_count(), 4);
    }

    #[test]
    fn signed_zero_vertices_are_distinct_keys() {
        // Dedup keys are raw f32 bit patterns: 0.0 and -0.0 compare equal
        // numerically but must map to separate vertex slots.
        let obj = "\
v 0.0 0.0 0.0
v -0.0 0.0 0.0
v 1.0 0.0 0.0
f 1 2 3
";
        let mesh = load_obj_from_reader(&mut obj.as_bytes(), "signed_zero").unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_ne!(mesh.indices[0], mesh.indices[1]);
        // Numerically the two x coordinates still compare equal.
        assert_eq!(mesh.vertices[0].position[0], mesh.vertices[1].position[0]);
        assert_ne!(
            mesh.vertices[0].position[0].to_bits(),
            mesh.vertices[1].position[0].to_bits()
        );
    }

    #[test]
    fn meshes_larger_than_u16_range_keep_u32_indices() {
        // 65538 unique vertices: the largest index must exceed u16::MAX.
        let tri_count = (u16::MAX as usize + 3) / 3;
        let vertex_count = tri_count * 3;
        let mut obj = String::new();
        for i in 0..vertex_count {
            obj.push_str(&format!("v {i} 1.0 0.0\n"));
        }
        for t in 0..tri_count {
            obj.push_str(&format!("f {} {} {}\n", 3 * t + 1, 3 * t + 2, 3 * t + 3));
        }

        let mesh = load_obj_from_reader(&mut obj.as_bytes(), "large").unwrap();
        assert_eq!(mesh.vertex_count(), vertex_count);
        assert_eq!(mesh.index_count(), vertex_count);
        let max_index = mesh.indices.iter().copied().max().unwrap();
        assert!(max_index > u32::from(u16::MAX));
    }

    #[test]
    fn empty_obj_is_an_error() {
        let err = load_obj_from_reader(&mut "# nothing here\n".as_bytes(), "empty");
        assert!(matches!(err, Err(AssetError::EmptyMesh(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_obj("/nonexistent/model.obj");
        assert!(matches!(err, Err(AssetError::Io(_))));
    }

    #[test]
    fn vertex_casts_to_gpu_bytes() {
        let mesh = load_obj_from_reader(&mut QUAD_OBJ.as_bytes(), "quad").unwrap();
        let bytes: &[u8] = bytemuck::cast_slice(&mesh.vertices);
        assert_eq!(
            bytes.len(),
            mesh.vertex_count() * std::mem::size_of::<MeshVertex>()
        );
        assert_eq!(std::mem::size_of::<MeshVertex>(), 20);
    }
}
