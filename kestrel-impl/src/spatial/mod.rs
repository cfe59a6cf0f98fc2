//! The Partitioner (spec §4.8): frustum-culls a camera against an octree
//! and ranks lights by relevance per visible entity.

pub mod partitioner;

pub use partitioner::{partition, rank_lights, LightInfo, PartitionResult};
