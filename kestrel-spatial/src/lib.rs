//! A dynamic loose octree that insert-locate-removes bounded scene
//! entities in amortized constant time, independent of any rendering or
//! scene-graph concern.

pub mod node_data;
pub mod octree;

pub use node_data::{EntityId, EntityKind, NodeData};
pub use octree::{Octree, OctreeNode, MIN_SPLITTABLE_DIAMETER};
