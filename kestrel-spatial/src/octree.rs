//! A dynamic, loose octree over bounded scene entities.
//!
//! Nodes live in a [`Pool`] and reference each other by [`Handle`] rather
//! than by `Rc`/`Weak` pointer, per the design note on arena-allocated
//! nodes: the tree's `levels` table is the sole owner, parent/child edges
//! are plain indices, and there is nothing to leak via a reference cycle.

use crate::node_data::{EntityId, EntityKind, NodeData};
use arrayvec::ArrayVec;
use fxhash::FxHashMap;
use kestrel_core::pool::{Handle, Pool};
use kestrel_core::{EngineError, EngineResult, Log};
use kestrel_math::Aabb;
use nalgebra::Vector3;
use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::collections::VecDeque;

/// Smallest tight diameter a node may be split below. Below this the
/// quantized-center hash (0.01 precision) can no longer tell neighboring
/// centers apart, so splitting is refused rather than risking silent node
/// collisions.
pub const MIN_SPLITTABLE_DIAMETER: f32 = 0.02;

fn quantize(v: f32) -> i64 {
    (v * 100.0).round() as i64
}

/// Hashable key for a node's position within its level, quantized to two
/// decimal places so that floating point drift of a few thousandths does
/// not create a duplicate node next to an existing one.
type NodeKey = (i64, i64, i64);

fn node_key(center: Vector3<f32>) -> NodeKey {
    (quantize(center.x), quantize(center.y), quantize(center.z))
}

fn next_pow2(value: f32) -> f32 {
    let x = value.ceil();
    if x <= 0.0 {
        1.0
    } else {
        2f32.powf(x.log2().ceil())
    }
}

pub struct OctreeNode {
    level: u32,
    center: Vector3<f32>,
    /// The *tight* subdivision diameter; the loose containment bound is
    /// twice this.
    diameter: f32,
    data: NodeData,
    parent: Handle<OctreeNode>,
    children: ArrayVec<Handle<OctreeNode>, 8>,
}

impl OctreeNode {
    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn center(&self) -> Vector3<f32> {
        self.center
    }

    pub fn tight_diameter(&self) -> f32 {
        self.diameter
    }

    pub fn loose_diameter(&self) -> f32 {
        self.diameter * 2.0
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }

    pub fn children(&self) -> &[Handle<OctreeNode>] {
        &self.children
    }

    pub fn parent(&self) -> Handle<OctreeNode> {
        self.parent
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty() && self.children.is_empty()
    }

    /// Loose containment test: is `point` within this node's loose bound
    /// (2x the tight subdivision diameter, centered on the node)? This is
    /// the bound entities are relocated against (spec §4.1).
    pub fn contains_loose(&self, point: Vector3<f32>) -> bool {
        let hw = self.diameter; // half-width of the *loose* box
        (point.x - self.center.x).abs() <= hw
            && (point.y - self.center.y).abs() <= hw
            && (point.z - self.center.z).abs() <= hw
    }

    pub fn loose_aabb(&self) -> Aabb {
        let hw = Vector3::new(self.diameter, self.diameter, self.diameter);
        Aabb::from_center_half_extent(self.center, hw)
    }

    /// The eight candidate child centers one level deeper (diameter/2).
    fn child_centers(&self) -> [Vector3<f32>; 8] {
        let q = self.diameter / 2.0;
        let mut out = [Vector3::zeros(); 8];
        let mut i = 0;
        for x in [-1.0f32, 1.0] {
            for y in [-1.0f32, 1.0] {
                for z in [-1.0f32, 1.0] {
                    out[i] = self.center + Vector3::new(x * q, y * q, z * q);
                    i += 1;
                }
            }
        }
        out
    }
}

struct OctreeLevel {
    level_number: u32,
    nodes: FxHashMap<NodeKey, Handle<OctreeNode>>,
}

type SplitPredicate = dyn Fn(&OctreeNode) -> bool;
type MergePredicate = dyn Fn(&[Handle<OctreeNode>]) -> bool;

/// The spatial index itself: a loose-bound octree over bounded scene
/// entities, supporting insert/remove/relocate, forced splits and merges,
/// and unbounded growth as entities appear outside the current extent.
pub struct Octree {
    nodes: Pool<OctreeNode>,
    levels: VecDeque<OctreeLevel>,
    actor_lookup: FxHashMap<EntityId, Handle<OctreeNode>>,
    light_lookup: FxHashMap<EntityId, Handle<OctreeNode>>,
    particle_system_lookup: FxHashMap<EntityId, Handle<OctreeNode>>,
    split_predicate: Box<SplitPredicate>,
    merge_predicate: Box<MergePredicate>,
    node_count: u32,
    /// A reentrant lock held for the duration of every mutating call. Since
    /// every mutating method here already takes `&mut self`, this adds no
    /// additional safety within one thread, but a caller that hands the
    /// same `Octree` to multiple worker threads via interior mutability
    /// elsewhere can rely on this guard being held for the duration of a
    /// mutating call.
    lock: ReentrantMutex<RefCell<()>>,
}

impl Default for Octree {
    fn default() -> Self {
        Self::new()
    }
}

impl Octree {
    pub fn new() -> Self {
        Self::with_predicates(|_| true, |_| true)
    }

    pub fn with_predicates(
        split_predicate: impl Fn(&OctreeNode) -> bool + 'static,
        merge_predicate: impl Fn(&[Handle<OctreeNode>]) -> bool + 'static,
    ) -> Self {
        Self {
            nodes: Pool::new(),
            levels: VecDeque::new(),
            actor_lookup: FxHashMap::default(),
            light_lookup: FxHashMap::default(),
            particle_system_lookup: FxHashMap::default(),
            split_predicate: Box::new(split_predicate),
            merge_predicate: Box::new(merge_predicate),
            node_count: 0,
            lock: ReentrantMutex::new(RefCell::new(())),
        }
    }

    pub fn node(&self, handle: Handle<OctreeNode>) -> Option<&OctreeNode> {
        self.nodes.try_borrow(handle)
    }

    pub fn node_count(&self) -> u32 {
        self.node_count
    }

    pub fn levels_len(&self) -> usize {
        self.levels.len()
    }

    pub fn has_root(&self) -> bool {
        !self.levels.is_empty() && !self.levels[0].nodes.is_empty()
    }

    pub fn root_handle(&self) -> Option<Handle<OctreeNode>> {
        self.levels.front()?.nodes.values().next().copied()
    }

    pub fn root(&self) -> Option<&OctreeNode> {
        self.root_handle().and_then(|h| self.node(h))
    }

    fn lookup(&self, kind: EntityKind) -> &FxHashMap<EntityId, Handle<OctreeNode>> {
        match kind {
            EntityKind::Actor => &self.actor_lookup,
            EntityKind::Light => &self.light_lookup,
            EntityKind::ParticleSystem => &self.particle_system_lookup,
        }
    }

    fn lookup_mut(&mut self, kind: EntityKind) -> &mut FxHashMap<EntityId, Handle<OctreeNode>> {
        match kind {
            EntityKind::Actor => &mut self.actor_lookup,
            EntityKind::Light => &mut self.light_lookup,
            EntityKind::ParticleSystem => &mut self.particle_system_lookup,
        }
    }

    pub fn locate(&self, kind: EntityKind, id: EntityId) -> Option<Handle<OctreeNode>> {
        self.lookup(kind).get(&id).copied()
    }

    pub fn insert_actor(&mut self, id: EntityId, aabb: Aabb) -> EngineResult<Handle<OctreeNode>> {
        self.insert(EntityKind::Actor, id, aabb)
    }

    pub fn insert_light(&mut self, id: EntityId, aabb: Aabb) -> EngineResult<Handle<OctreeNode>> {
        self.insert(EntityKind::Light, id, aabb)
    }

    pub fn insert_particle_system(
        &mut self,
        id: EntityId,
        aabb: Aabb,
    ) -> EngineResult<Handle<OctreeNode>> {
        self.insert(EntityKind::ParticleSystem, id, aabb)
    }

    pub fn remove_actor(&mut self, id: EntityId) {
        self.remove(EntityKind::Actor, id);
    }

    pub fn remove_light(&mut self, id: EntityId) {
        self.remove(EntityKind::Light, id);
    }

    pub fn remove_particle_system(&mut self, id: EntityId) {
        self.remove(EntityKind::ParticleSystem, id);
    }

    /// Called whenever an inserted entity's transform changes. If `id` has
    /// moved outside the loose bound of the node it currently occupies, it
    /// is removed and reinserted so it migrates to the right node. This is
    /// the primitive a `transform_changed` subscription (wired up at the
    /// scene-graph layer, which owns the entities and their signals) should
    /// call on every change; this is the reinsertion half of that contract.
    pub fn notify_moved(&mut self, kind: EntityKind, id: EntityId, new_aabb: Aabb) {
        let _guard = self.lock.lock();
        let Some(node_handle) = self.lookup(kind).get(&id).copied() else {
            return;
        };
        let still_fits = self
            .node(node_handle)
            .is_some_and(|node| node.contains_loose(new_aabb.center()));
        if still_fits {
            // Still within the same node's loose bound: just refresh the
            // stored AABB, no relocation needed.
            if let Some(node) = self.nodes.try_borrow_mut(node_handle) {
                node.data.insert_or_update(kind, id, new_aabb);
            }
        } else {
            self.remove(kind, id);
            let _ = self.insert(kind, id, new_aabb);
        }
    }

    fn insert(
        &mut self,
        kind: EntityKind,
        id: EntityId,
        aabb: Aabb,
    ) -> EngineResult<Handle<OctreeNode>> {
        let _guard = self.lock.lock();

        if !self.inside_octree(&aabb) {
            self.grow_to_contain(&aabb)?;
        }

        let node_handle = self.find_best_existing_node(&aabb)?;
        if let Some(node) = self.nodes.try_borrow_mut(node_handle) {
            node.data.insert_or_update(kind, id, aabb);
        }
        self.lookup_mut(kind).insert(id, node_handle);

        if self.split_if_necessary(node_handle) {
            // The entity may have migrated to a deeper node during the
            // split's reinsertion pass.
            Ok(self.locate(kind, id).unwrap_or(node_handle))
        } else {
            Ok(node_handle)
        }
    }

    fn remove(&mut self, kind: EntityKind, id: EntityId) {
        let _guard = self.lock.lock();

        let Some(node_handle) = self.lookup_mut(kind).remove(&id) else {
            return;
        };

        if let Some(node) = self.nodes.try_borrow_mut(node_handle) {
            node.data.erase(kind, id);
        }

        let mut siblings = self.siblings(node_handle);
        siblings.push(node_handle);
        self.merge_if_possible(&siblings);
    }

    fn siblings(&self, handle: Handle<OctreeNode>) -> Vec<Handle<OctreeNode>> {
        let Some(node) = self.node(handle) else {
            return Vec::new();
        };
        let Some(parent) = self.node(node.parent) else {
            return Vec::new();
        };
        parent
            .children
            .iter()
            .copied()
            .filter(|&c| c != handle)
            .collect()
    }

    fn inside_octree(&self, aabb: &Aabb) -> bool {
        let Some(root) = self.root() else {
            return false;
        };
        root.contains_loose(aabb.center()) && root.loose_diameter() >= aabb.max_dimension()
    }

    /// Smallest level `L` such that `D / 2^L < 2d`, where `D` is the root's
    /// tight diameter and `d` the entity's largest dimension (the loose
    /// reading; see DESIGN.md Open Question decisions). Clamped so the
    /// resulting tight diameter never drops below 1.
    fn calculate_level(root_diameter: f32, max_dim: f32) -> u32 {
        let mut level = 0u32;
        let mut diameter = root_diameter;
        while diameter >= 2.0 * max_dim {
            if diameter <= 1.0 {
                break;
            }
            diameter /= 2.0;
            level += 1;
        }
        level
    }

    fn node_diameter_at_level(&self, level: u32) -> f32 {
        let root_diameter = self.root().map(|r| r.tight_diameter()).unwrap_or(1.0);
        root_diameter / 2f32.powi(level as i32)
    }

    /// Snaps `p` onto the level-`L` grid anchored at the root's center,
    /// clamped to stay within the root's extent.
    fn find_node_center_for_point(&self, level: u32, p: Vector3<f32>) -> EngineResult<Vector3<f32>> {
        let root = self.root().ok_or(EngineError::OutsideBounds)?;
        if level == 0 {
            return Ok(root.center());
        }
        let step = self.node_diameter_at_level(level);
        let half_step = step / 2.0;
        let range = root.tight_diameter() / 2.0;
        let root_center = root.center();

        let snap_axis = |value: f32| -> f32 {
            let relative = value - half_step;
            let snapped = (relative / step).round() * step + half_step;
            snapped.clamp(-range, range)
        };

        let relative = p - root_center;
        let snapped = Vector3::new(
            snap_axis(relative.x),
            snap_axis(relative.y),
            snap_axis(relative.z),
        );
        Ok(root_center + snapped)
    }

    /// Descends from the target level upward until it finds a node that
    /// already exists at `(level, center)`, defaulting to the root.
    fn find_best_existing_node(&self, aabb: &Aabb) -> EngineResult<Handle<OctreeNode>> {
        if !self.inside_octree(aabb) {
            return Err(EngineError::OutsideBounds);
        }

        let root = self.root().ok_or(EngineError::OutsideBounds)?;
        let mut level = Self::calculate_level(root.tight_diameter(), aabb.max_dimension());

        if level == 0 {
            return Ok(self.root_handle().unwrap());
        }

        while level > 0 {
            if (level as usize) < self.levels.len() {
                let center = self.find_node_center_for_point(level, aabb.center())?;
                if let Some(&handle) = self.levels[level as usize].nodes.get(&node_key(center)) {
                    return Ok(handle);
                }
            }
            level -= 1;
        }

        Ok(self.root_handle().unwrap())
    }

    /// Splits `node` into up to 8 children if the split predicate allows
    /// it and the node is not already at the minimum diameter, then
    /// redistributes its data into the new children. Returns whether a
    /// split actually happened.
    fn split_if_necessary(&mut self, handle: Handle<OctreeNode>) -> bool {
        let Some(node) = self.node(handle) else {
            return false;
        };
        if !(self.split_predicate)(node) {
            return false;
        }
        if node.diameter < MIN_SPLITTABLE_DIAMETER || node.diameter <= 1.0 {
            return false;
        }

        let level = node.level;
        let child_diameter = node.diameter / 2.0;
        let centers = node.child_centers();

        let mut created_any = false;
        let mut created_handles = Vec::new();
        for center in centers {
            let (child_handle, created) = self.get_or_create_node(level + 1, center, child_diameter);
            if created {
                created_any = true;
            }
            created_handles.push(child_handle);
            self.link_child(handle, child_handle);
        }

        if !created_any {
            return false;
        }

        let stashed = {
            let node = self.nodes.borrow_mut(handle);
            let stashed = node.data.clone();
            node.data.erase_all();
            stashed
        };

        // Iterative reinsertion (a work-stack, not recursion) per the
        // spec's note to cap the reinsert-recursion path explicitly.
        let mut work: Vec<(EntityKind, EntityId, Aabb)> = Vec::new();
        stashed.each_all(|kind, id, aabb| work.push((kind, id, aabb)));
        for (kind, id, aabb) in work {
            let _ = self.insert(kind, id, aabb);
        }

        for child in created_handles {
            if self.node(child).is_some_and(|n| n.is_empty()) {
                self.remove_node(child);
            }
        }

        true
    }

    fn link_child(&mut self, parent: Handle<OctreeNode>, child: Handle<OctreeNode>) {
        if let Some(parent_node) = self.nodes.try_borrow_mut(parent) {
            if !parent_node.children.contains(&child) && parent_node.children.len() < 8 {
                parent_node.children.push(child);
            }
        }
    }

    fn merge_if_possible(&mut self, nodes: &[Handle<OctreeNode>]) -> bool {
        if nodes.is_empty() {
            return false;
        }
        if !(self.merge_predicate)(nodes) {
            return false;
        }

        let first = nodes[0];
        let Some(first_node) = self.node(first) else {
            return false;
        };

        if first_node.is_root() {
            if first_node.is_empty() {
                self.remove_node(first);
            }
            return true;
        }

        let parent = first_node.parent;
        let mut collected = Vec::new();
        for &handle in nodes {
            let Some(node) = self.node(handle) else {
                continue;
            };
            if !node.children.is_empty() {
                // Has descendants: not a leaf, leave it alone.
                continue;
            }
            if !node.data.is_empty() {
                collected.push(node.data.clone());
            }
            self.remove_node(handle);
        }

        // `remove_node` above already wiped every collected entity's lookup
        // entry; re-point each one at the parent it's about to land in
        // before merging, otherwise survivors become unlocatable.
        for data in &collected {
            data.each_all(|kind, id, _| {
                self.lookup_mut(kind).insert(id, parent);
            });
        }

        if let Some(parent_node) = self.nodes.try_borrow_mut(parent) {
            for data in collected {
                parent_node.data.merge(&data);
            }
        }

        true
    }

    fn get_or_create_node(
        &mut self,
        level: u32,
        center: Vector3<f32>,
        diameter: f32,
    ) -> (Handle<OctreeNode>, bool) {
        let key = node_key(center);
        if let Some(level_table) = self.levels.get(level as usize) {
            if let Some(&handle) = level_table.nodes.get(&key) {
                return (handle, false);
            }
        }
        (self.create_node(level as i64, center, diameter), true)
    }

    /// `level_number < 0` means "insert a new root level above everything
    /// that exists" (used by [`Octree::grow_to_contain`]).
    fn create_node(&mut self, level_number: i64, center: Vector3<f32>, diameter: f32) -> Handle<OctreeNode> {
        let key = node_key(center);

        let level_index = if level_number < 0 {
            for level in self.levels.iter_mut() {
                level.level_number += 1;
            }
            self.levels.push_front(OctreeLevel {
                level_number: 0,
                nodes: FxHashMap::default(),
            });
            0usize
        } else if level_number as usize == self.levels.len() {
            self.levels.push_back(OctreeLevel {
                level_number: level_number as u32,
                nodes: FxHashMap::default(),
            });
            self.levels.len() - 1
        } else {
            level_number as usize
        };

        let new_handle = self.nodes.spawn(OctreeNode {
            level: self.levels[level_index].level_number,
            center,
            diameter,
            data: NodeData::default(),
            parent: Handle::NONE,
            children: ArrayVec::new(),
        });
        self.levels[level_index].nodes.insert(key, new_handle);
        self.node_count += 1;

        let level_number_actual = self.levels[level_index].level_number;
        if level_number_actual > 0 {
            if let Ok(parent_center) =
                self.find_node_center_for_point(level_number_actual - 1, center)
            {
                let parent_key = node_key(parent_center);
                if let Some(&parent_handle) = self.levels[level_index as usize - 1]
                    .nodes
                    .get(&parent_key)
                {
                    if let Some(node) = self.nodes.try_borrow_mut(new_handle) {
                        node.parent = parent_handle;
                    }
                    self.link_child(parent_handle, new_handle);
                }
            }
        } else if self.levels.len() > 1 {
            // A new root was just inserted above the old one: re-parent
            // everything that used to be level 0.
            let new_root_handle = new_handle;
            if let Some(old_root_level) = self.levels.get(1) {
                let children: Vec<_> = old_root_level.nodes.values().copied().collect();
                for child in children {
                    if let Some(node) = self.nodes.try_borrow_mut(child) {
                        node.parent = new_root_handle;
                    }
                    self.link_child(new_root_handle, child);
                }
            }
        }

        new_handle
    }

    fn remove_node(&mut self, handle: Handle<OctreeNode>) {
        let Some(node) = self.node(handle) else {
            return;
        };
        let level = node.level;
        let center = node.center;
        let parent = node.parent;

        if parent.is_some() {
            if let Some(parent_node) = self.nodes.try_borrow_mut(parent) {
                parent_node.children.retain(|&c| c != handle);
            }
        }

        if let Some(node) = self.nodes.try_borrow(handle) {
            let mut stale = Vec::new();
            node.data.each_all(|kind, id, _| stale.push((kind, id)));
            for (kind, id) in stale {
                self.lookup_mut(kind).remove(&id);
            }
        }

        if let Some(level_table) = self.levels.get_mut(level as usize) {
            level_table.nodes.remove(&node_key(center));
        }
        self.nodes.free(handle);
        self.node_count -= 1;

        let last_index = self.levels.len().saturating_sub(1);
        if level as usize == last_index && self.levels[last_index].nodes.is_empty() {
            self.levels.pop_back();
        } else if level == 0 && self.levels.front().is_some_and(|l| l.nodes.is_empty()) {
            self.levels.pop_front();
        }
    }

    /// Grows the tree until it can contain `aabb`: creates a root if none
    /// exists, otherwise repeatedly wraps a new, doubled-diameter root
    /// around the current one, offsetting the new root toward the side the
    /// AABB's center lies on.
    fn grow_to_contain(&mut self, aabb: &Aabb) -> EngineResult<()> {
        let mut guard = 0;
        while !self.inside_octree(aabb) {
            guard += 1;
            if guard > 256 {
                Log::err("octree: grow_to_contain did not converge, aborting".to_string());
                return Err(EngineError::OutsideBounds);
            }

            let center = aabb.center();
            match self.root() {
                None => {
                    let diameter = next_pow2(aabb.max_dimension());
                    self.create_node(-1, center, diameter);
                }
                Some(root) => {
                    let root_center = root.center();
                    let new_diameter = root.tight_diameter() * 2.0;
                    let quarter = new_diameter / 4.0;
                    let offset = Vector3::new(
                        if center.x < root_center.x { -quarter } else { quarter },
                        if center.y < root_center.y { -quarter } else { quarter },
                        if center.z < root_center.z { -quarter } else { quarter },
                    );
                    self.create_node(-1, root_center + offset, new_diameter);
                }
            }
        }
        Ok(())
    }

    /// Depth-first, root-to-leaf traversal. `callback` returns whether
    /// traversal should continue into that node's children.
    pub fn traverse(&self, mut callback: impl FnMut(&OctreeNode) -> bool) {
        let Some(root) = self.root_handle() else {
            return;
        };
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            let Some(node) = self.node(handle) else {
                continue;
            };
            if callback(node) {
                stack.extend(node.children.iter().copied());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_math::Aabb;
    use nalgebra::Vector3;

    fn aabb_at(center: Vector3<f32>, max_dim: f32) -> Aabb {
        let h = max_dim / 2.0;
        Aabb::from_center_half_extent(center, Vector3::new(h, h, h))
    }

    #[test]
    fn single_insert_creates_root_at_its_center() {
        let mut tree = Octree::new();
        let handle = tree
            .insert_actor(1, aabb_at(Vector3::zeros(), 10.0))
            .unwrap();
        assert_eq!(tree.levels_len(), 1);
        let node = tree.node(handle).unwrap();
        assert_eq!(node.level(), 0);
        assert_eq!(node.center(), Vector3::zeros());
        assert_eq!(tree.locate(EntityKind::Actor, 1), Some(handle));
    }

    #[test]
    fn insert_far_away_grows_the_tree() {
        let mut tree = Octree::new();
        tree.insert_actor(1, aabb_at(Vector3::zeros(), 10.0)).unwrap();
        let before = tree.root().unwrap().tight_diameter();
        tree.insert_actor(2, aabb_at(Vector3::new(100.0, 0.0, 0.0), 1.0))
            .unwrap();
        let after = tree.root().unwrap().tight_diameter();
        assert!(after > before);
        assert!(tree.locate(EntityKind::Actor, 1).is_some());
        assert!(tree.locate(EntityKind::Actor, 2).is_some());
    }

    #[test]
    fn forced_split_redistributes_into_children() {
        let mut tree = Octree::with_predicates(|_| true, |_| true);
        tree.insert_actor(1, aabb_at(Vector3::new(-2.0, -2.0, -2.0), 1.0))
            .unwrap();
        tree.insert_actor(2, aabb_at(Vector3::new(2.0, 2.0, 2.0), 1.0))
            .unwrap();

        let root = tree.root_handle().unwrap();
        assert!(tree.node(root).unwrap().data().is_empty() || !tree.node(root).unwrap().children().is_empty());
    }

    #[test]
    fn remove_then_reinsert_is_structurally_equivalent() {
        let mut tree = Octree::new();
        let aabb = aabb_at(Vector3::zeros(), 4.0);
        tree.insert_actor(1, aabb).unwrap();
        let node_count_before = tree.node_count();
        tree.remove_actor(1);
        tree.insert_actor(1, aabb).unwrap();
        assert_eq!(tree.node_count(), node_count_before);
        assert!(tree.locate(EntityKind::Actor, 1).is_some());
    }

    #[test]
    fn octree_refuses_to_split_below_minimum_diameter() {
        let mut tree = Octree::with_predicates(|_| true, |_| true);
        let handle = tree.insert_actor(1, aabb_at(Vector3::zeros(), 1.0)).unwrap();
        {
            let node = tree.nodes.try_borrow_mut(handle).unwrap();
            node.diameter = 1.0;
        }
        assert!(!tree.split_if_necessary(handle));
    }

    #[test]
    fn entity_matching_tight_diameter_fits_without_growth() {
        // An entity whose max dimension exactly equals the root's tight
        // diameter must still resolve to level 0 without forcing a grow,
        // since the loose bound (2x tight) comfortably contains it.
        let mut tree = Octree::new();
        tree.insert_actor(1, aabb_at(Vector3::zeros(), 8.0)).unwrap();
        let tight = tree.root().unwrap().tight_diameter();
        let level = Octree::calculate_level(tight, tight);
        assert_eq!(level, 0);
    }

    #[test]
    fn locate_returns_none_for_unknown_entity() {
        let tree = Octree::new();
        assert_eq!(tree.locate(EntityKind::Actor, 42), None);
    }

    #[test]
    fn surviving_siblings_stay_locatable_after_a_merge() {
        let mut tree = Octree::with_predicates(|_| true, |_| true);
        // A and C share one leaf, B sits in a sibling leaf under the same
        // parent, forcing the split the teacher's own test above relies on.
        tree.insert_actor(1, aabb_at(Vector3::new(-2.0, -2.0, -2.0), 1.0))
            .unwrap(); // A
        tree.insert_actor(3, aabb_at(Vector3::new(-2.0, -2.0, -2.0), 1.0))
            .unwrap(); // C, same node as A
        tree.insert_actor(2, aabb_at(Vector3::new(2.0, 2.0, 2.0), 1.0))
            .unwrap(); // B, sibling node

        tree.remove_actor(3);

        assert!(
            tree.locate(EntityKind::Actor, 1).is_some(),
            "A must remain locatable after the merge collapses its sibling leaves"
        );
        assert!(
            tree.locate(EntityKind::Actor, 2).is_some(),
            "B must remain locatable after the merge collapses its sibling leaves"
        );

        // The lookup must point at wherever the data actually landed.
        let a_handle = tree.locate(EntityKind::Actor, 1).unwrap();
        let node = tree.node(a_handle).unwrap();
        assert!(node.data().count(EntityKind::Actor) > 0);
    }
}
