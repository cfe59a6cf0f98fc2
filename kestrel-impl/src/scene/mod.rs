//! Scene graph: parent/child transform tree (spec §4.2).

pub mod graph;
pub mod node;

pub use graph::Graph;
pub use node::{SceneNode, TransformChangedArgs};
