//! Parent/child transform tree (spec §4.2). A single implicit root node
//! anchors every other node; destroying a node destroys its descendants,
//! deepest first.

use crate::scene::node::{SceneNode, TransformChangedArgs};
use kestrel_core::pool::{Handle, Pool};
use kestrel_core::{EngineError, EngineResult};
use kestrel_math::{Aabb, Matrix4, Vector3};

pub struct Graph {
    nodes: Pool<SceneNode>,
    root: Handle<SceneNode>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    pub fn new() -> Self {
        let mut nodes = Pool::new();
        let root = nodes.spawn(SceneNode::new("__root__"));
        Self { nodes, root }
    }

    pub fn root(&self) -> Handle<SceneNode> {
        self.root
    }

    pub fn try_get(&self, handle: Handle<SceneNode>) -> Option<&SceneNode> {
        self.nodes.try_borrow(handle)
    }

    pub fn try_get_mut(&mut self, handle: Handle<SceneNode>) -> Option<&mut SceneNode> {
        self.nodes.try_borrow_mut(handle)
    }

    pub fn get(&self, handle: Handle<SceneNode>) -> EngineResult<&SceneNode> {
        self.try_get(handle).ok_or(EngineError::NotFound)
    }

    /// Adds a new, empty node as a child of `parent` (the graph root if
    /// `parent.is_none()`).
    pub fn create_node(&mut self, name: impl Into<String>, parent: Handle<SceneNode>) -> Handle<SceneNode> {
        let parent = if parent.is_none() { self.root } else { parent };
        let handle = self.nodes.spawn(SceneNode::new(name));
        if let Some(parent_node) = self.nodes.try_borrow_mut(parent) {
            parent_node.children.push(handle);
        }
        if let Some(node) = self.nodes.try_borrow_mut(handle) {
            node.parent = parent;
        }
        handle
    }

    /// True if `candidate` is `ancestor` itself or a descendant of it.
    fn is_ancestor_of(&self, ancestor: Handle<SceneNode>, candidate: Handle<SceneNode>) -> bool {
        let mut current = candidate;
        loop {
            if current == ancestor {
                return true;
            }
            let Some(node) = self.try_get(current) else {
                return false;
            };
            if node.parent.is_none() {
                return false;
            }
            current = node.parent;
        }
    }

    /// Detaches `node` from its current parent and attaches it to
    /// `new_parent`. Fails with [`EngineError::InvalidInsertion`] if
    /// `new_parent` is `node` itself or one of its own descendants (spec
    /// §4.2 "fails if p is a descendant").
    pub fn set_parent(
        &mut self,
        node: Handle<SceneNode>,
        new_parent: Handle<SceneNode>,
    ) -> EngineResult<()> {
        if !self.nodes.is_valid_handle(node) {
            return Err(EngineError::NotFound);
        }
        if node == new_parent || self.is_ancestor_of(node, new_parent) {
            return Err(EngineError::InvalidInsertion(
                "cannot reparent a node into its own descendant".into(),
            ));
        }

        self.detach(node);

        let new_parent = if new_parent.is_none() { self.root } else { new_parent };
        if let Some(parent_node) = self.nodes.try_borrow_mut(new_parent) {
            parent_node.children.push(node);
        }
        if let Some(node_ref) = self.nodes.try_borrow_mut(node) {
            node_ref.parent = new_parent;
            node_ref.dirty.set(true);
        }
        Ok(())
    }

    fn detach(&mut self, node: Handle<SceneNode>) {
        let old_parent = self.try_get(node).map(|n| n.parent).unwrap_or(Handle::NONE);
        if let Some(parent_node) = self.nodes.try_borrow_mut(old_parent) {
            parent_node.children.retain(|&c| c != node);
        }
    }

    /// Lazily recomputes and caches `node`'s world matrix if dirty,
    /// recursing up the parent chain first since a stale ancestor makes
    /// every descendant stale too.
    pub fn world_transform(&mut self, node: Handle<SceneNode>) -> Matrix4<f32> {
        if !self.nodes.is_valid_handle(node) {
            return Matrix4::identity();
        }

        let parent = self.nodes.borrow(node).parent;
        let needs_recompute = self.nodes.borrow(node).dirty.get()
            || (parent.is_some() && self.any_ancestor_dirty(parent));

        if !needs_recompute {
            return self.nodes.borrow(node).cached_world_transform();
        }

        let parent_world = if parent.is_some() {
            self.world_transform(parent)
        } else {
            Matrix4::identity()
        };

        let node_ref = self.nodes.borrow(node);
        let new_world = parent_world * node_ref.local_transform.matrix();
        node_ref.world_transform.set(new_world);
        node_ref.dirty.set(false);

        let world_aabb = node_ref.local_aabb.map(|local| transform_aabb(&local, &new_world));
        let translation = Vector3::new(new_world[(0, 3)], new_world[(1, 3)], new_world[(2, 3)]);
        if world_aabb.is_some() {
            let args = TransformChangedArgs {
                handle: node,
                world_translation: translation,
                world_aabb,
            };
            node_ref.transform_changed.emit(args);
        }

        new_world
    }

    /// True if `handle` or any of its ancestors is dirty. A node's cached
    /// world matrix depends on every ancestor's local transform, so a dirty
    /// bit set only on the ancestor that actually changed would otherwise
    /// be invisible to a descendant several levels below it.
    fn any_ancestor_dirty(&self, handle: Handle<SceneNode>) -> bool {
        let mut current = handle;
        loop {
            let Some(node) = self.nodes.try_borrow(current) else {
                return false;
            };
            if node.dirty.get() {
                return true;
            }
            if node.parent.is_none() {
                return false;
            }
            current = node.parent;
        }
    }

    /// World-space AABB of a bounded entity, or `None` if `node` carries no
    /// local AABB.
    pub fn transformed_aabb(&mut self, node: Handle<SceneNode>) -> Option<Aabb> {
        let local = self.try_get(node)?.local_aabb?;
        let world = self.world_transform(node);
        Some(transform_aabb(&local, &world))
    }

    /// Destroys `node` and every descendant, deepest first, firing
    /// `destroyed` on each as it goes (spec §4.2 "destruction is
    /// bottom-up").
    pub fn destroy_node(&mut self, node: Handle<SceneNode>) {
        if !self.nodes.is_valid_handle(node) {
            return;
        }
        self.detach(node);

        // Collect the subtree in pre-order, then free deepest-first by
        // walking that list in reverse.
        let mut order = Vec::new();
        let mut stack = vec![node];
        while let Some(handle) = stack.pop() {
            order.push(handle);
            if let Some(n) = self.try_get(handle) {
                stack.extend(n.children.iter().copied());
            }
        }

        for &handle in order.iter().rev() {
            if let Some(freed) = self.nodes.try_free(handle) {
                freed.destroyed.emit(handle);
            }
        }
    }

    pub fn find_by_name(&self, name: &str) -> Option<Handle<SceneNode>> {
        self.nodes
            .pair_iter()
            .find(|(_, n)| n.name == name)
            .map(|(h, _)| h)
    }

    /// Pre-order traversal starting at `root` (the graph root if `root.is_none()`).
    pub fn traverse(&self, root: Handle<SceneNode>, mut callback: impl FnMut(Handle<SceneNode>, &SceneNode)) {
        let start = if root.is_none() { self.root } else { root };
        let mut stack = vec![start];
        while let Some(handle) = stack.pop() {
            let Some(node) = self.try_get(handle) else {
                continue;
            };
            callback(handle, node);
            stack.extend(node.children.iter().copied());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle<SceneNode>, &SceneNode)> {
        self.nodes.pair_iter()
    }

    pub fn node_count(&self) -> u32 {
        self.nodes.alive_count()
    }
}

fn transform_aabb(local: &Aabb, matrix: &Matrix4<f32>) -> Aabb {
    let mut out = Aabb::default();
    for corner in local.corners() {
        let transformed = matrix.transform_point(&corner.into());
        out.add_point(Vector3::new(transformed.x, transformed.y, transformed.z));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_math::Vector3;

    #[test]
    fn new_node_is_a_child_of_root() {
        let mut graph = Graph::new();
        let n = graph.create_node("a", Handle::NONE);
        assert_eq!(graph.get(n).unwrap().parent(), graph.root());
    }

    #[test]
    fn reparenting_into_a_descendant_fails() {
        let mut graph = Graph::new();
        let a = graph.create_node("a", Handle::NONE);
        let b = graph.create_node("b", a);
        assert!(graph.set_parent(a, b).is_err());
    }

    #[test]
    fn world_transform_composes_parent_and_local() {
        let mut graph = Graph::new();
        let a = graph.create_node("a", Handle::NONE);
        graph
            .try_get_mut(a)
            .unwrap()
            .local_transform_mut()
            .set_translation(Vector3::new(1.0, 0.0, 0.0));
        let b = graph.create_node("b", a);
        graph
            .try_get_mut(b)
            .unwrap()
            .local_transform_mut()
            .set_translation(Vector3::new(0.0, 1.0, 0.0));

        let world = graph.world_transform(b);
        let p = world.transform_point(&nalgebra::Point3::origin());
        assert_eq!(p.coords, Vector3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn destroying_a_node_destroys_its_descendants() {
        let mut graph = Graph::new();
        let a = graph.create_node("a", Handle::NONE);
        let b = graph.create_node("b", a);
        graph.destroy_node(a);
        assert!(graph.try_get(a).is_none());
        assert!(graph.try_get(b).is_none());
    }

    #[test]
    fn ancestor_mutation_is_seen_past_an_already_clean_middle_node() {
        let mut graph = Graph::new();
        let root = graph.create_node("root", Handle::NONE);
        let a = graph.create_node("a", root);
        let b = graph.create_node("b", a);

        // Compute once so every dirty bit in the chain clears.
        let before = graph.world_transform(b);

        graph
            .try_get_mut(root)
            .unwrap()
            .local_transform_mut()
            .set_translation(Vector3::new(1.0, 0.0, 0.0));

        // Only `root.dirty` is set directly; `a` was never touched.
        let after = graph.world_transform(b);
        let p = after.transform_point(&nalgebra::Point3::origin());
        assert_eq!(p.coords, Vector3::new(1.0, 0.0, 0.0));
        assert_ne!(before, after);
    }

    #[test]
    fn reparent_and_back_preserves_world_position() {
        let mut graph = Graph::new();
        let a = graph.create_node("a", Handle::NONE);
        graph
            .try_get_mut(a)
            .unwrap()
            .local_transform_mut()
            .set_translation(Vector3::new(5.0, 0.0, 0.0));
        let b = graph.create_node("b", Handle::NONE);
        let n = graph.create_node("n", a);

        let before = graph.world_transform(n);
        graph.set_parent(n, b).unwrap();
        graph.set_parent(n, a).unwrap();
        let after = graph.world_transform(n);
        assert_eq!(before, after);
    }
}
