//! Engine-wide configuration (spec §19 **[AMBIENT]**), passed once to
//! [`crate::engine::Engine::new`]. Mirrors the teacher's
//! `EngineInitParams` pattern (`fyrox-impl::engine::mod`) of bundling
//! every subsystem's tunables into one struct handed to the constructor,
//! rather than threading individual parameters through.

use kestrel_spatial::OctreeNode;
use kestrel_core::pool::Handle;
use std::time::Duration;

/// `octree_split_predicate`/`octree_merge_predicate` decide whether a node
/// is allowed to split or a set of siblings is allowed to merge, beyond
/// the octree's own diameter floor (spec §4.1); defaults accept every
/// split and merge the octree itself considers safe.
pub struct EngineConfig {
    pub octree_split_predicate: Box<dyn Fn(&OctreeNode) -> bool>,
    pub octree_merge_predicate: Box<dyn Fn(&[Handle<OctreeNode>]) -> bool>,
    pub asset_eviction_delay: Duration,
    pub max_lights_per_renderable: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            octree_split_predicate: Box::new(|_| true),
            octree_merge_predicate: Box::new(|_| true),
            asset_eviction_delay: Duration::from_secs(30),
            max_lights_per_renderable: crate::render::MAX_LIGHTS_PER_RENDERABLE as u8,
        }
    }
}
