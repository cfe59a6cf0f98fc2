//! The one asset kind that needs `kestrel-impl`'s vertex/index buffers, so
//! it can't live in the generic `kestrel-resource` crate (see that crate's
//! `kinds` module doc).

use crate::buffer::{IndexData, VertexData};
use kestrel_material::DrawPrimitive;

/// Geometry payload: interleaved vertices, an optional index buffer, and
/// the primitive topology they're drawn as.
#[derive(Clone)]
pub struct Mesh {
    pub vertices: VertexData,
    pub indices: Option<IndexData>,
    pub primitive: DrawPrimitive,
}

impl Mesh {
    pub fn new(vertices: VertexData, indices: Option<IndexData>, primitive: DrawPrimitive) -> Self {
        Self {
            vertices,
            indices,
            primitive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::VertexSpecification;

    #[test]
    fn cloning_a_mesh_duplicates_its_vertex_bytes() {
        let mut vertices = VertexData::new(VertexSpecification::position_only());
        vertices.push_vertex(&[1.0f32, 2.0, 3.0]).unwrap();
        let mesh = Mesh::new(vertices, None, DrawPrimitive::Triangles);
        let cloned = mesh.clone();
        assert_eq!(cloned.vertices.as_bytes(), mesh.vertices.as_bytes());
    }
}
