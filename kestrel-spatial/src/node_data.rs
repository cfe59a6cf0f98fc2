//! Per-node payload: the bounded entities currently filed under a single
//! octree node, split out by kind.

use fxhash::FxHashMap;
use kestrel_math::Aabb;

pub type EntityId = u64;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Actor,
    Light,
    ParticleSystem,
}

const KIND_COUNT: usize = 3;

/// `{actors, lights, particle_systems}` — the three maps a node's data is
/// made of. Kept as one array internally to avoid triplicating the
/// insert/erase/each/merge logic, while still exposing the three kinds
/// named by the spec through [`EntityKind`].
#[derive(Clone, Debug)]
pub struct NodeData {
    maps: [FxHashMap<EntityId, Aabb>; KIND_COUNT],
}

impl Default for NodeData {
    fn default() -> Self {
        Self {
            maps: [
                FxHashMap::default(),
                FxHashMap::default(),
                FxHashMap::default(),
            ],
        }
    }
}

impl NodeData {
    pub fn is_empty(&self) -> bool {
        self.maps.iter().all(|m| m.is_empty())
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.maps[kind as usize].len()
    }

    pub fn insert_or_update(&mut self, kind: EntityKind, id: EntityId, aabb: Aabb) {
        self.maps[kind as usize].insert(id, aabb);
    }

    pub fn erase(&mut self, kind: EntityKind, id: EntityId) {
        self.maps[kind as usize].remove(&id);
    }

    pub fn each(&self, kind: EntityKind, mut callback: impl FnMut(EntityId, Aabb)) {
        for (&id, &aabb) in self.maps[kind as usize].iter() {
            callback(id, aabb);
        }
    }

    pub fn each_all(&self, mut callback: impl FnMut(EntityKind, EntityId, Aabb)) {
        for kind in [EntityKind::Actor, EntityKind::Light, EntityKind::ParticleSystem] {
            for (&id, &aabb) in self.maps[kind as usize].iter() {
                callback(kind, id, aabb);
            }
        }
    }

    pub fn erase_all(&mut self) {
        for map in &mut self.maps {
            map.clear();
        }
    }

    pub fn merge(&mut self, other: &NodeData) {
        for (mine, theirs) in self.maps.iter_mut().zip(other.maps.iter()) {
            mine.extend(theirs.iter().map(|(&id, &aabb)| (id, aabb)));
        }
    }
}
