//! Vertex/index buffer storage (spec §3, §4.6).

pub mod index;
pub mod vertex;

pub use index::{IndexData, IndexElementKind};
pub use vertex::{VertexAttribute, VertexData, VertexSpecification};
