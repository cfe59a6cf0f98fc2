//! A single scene graph entry: a transform plus parent/child links. See
//! [`crate::scene::graph::Graph`] for the tree that owns these.

use kestrel_core::pool::Handle;
use kestrel_core::signal::Signal;
use kestrel_math::{Aabb, Matrix4, Transform};
use nalgebra::Vector3;
use std::cell::Cell;

/// Carried by [`SceneNode::transform_changed`] whenever a node's world
/// transform is recomputed. `world_aabb` is `Some` only for bounded
/// entities (spec §3 "Bounded Entity").
#[derive(Clone, Debug)]
pub struct TransformChangedArgs {
    pub handle: Handle<SceneNode>,
    pub world_translation: Vector3<f32>,
    pub world_aabb: Option<Aabb>,
}

pub struct SceneNode {
    pub(crate) name: String,
    pub(crate) local_transform: Transform,
    pub(crate) world_transform: Cell<Matrix4<f32>>,
    pub(crate) dirty: Cell<bool>,
    pub(crate) parent: Handle<SceneNode>,
    pub(crate) children: Vec<Handle<SceneNode>>,

    /// Local-space bounds; `Some` makes this node a "Bounded Entity"
    /// (spec §3) that the spatial index can track.
    pub(crate) local_aabb: Option<Aabb>,

    pub transform_changed: Signal<TransformChangedArgs>,
    pub destroyed: Signal<Handle<SceneNode>>,
}

impl SceneNode {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            local_transform: Transform::identity(),
            world_transform: Cell::new(Matrix4::identity()),
            dirty: Cell::new(true),
            parent: Handle::NONE,
            children: Vec::new(),
            local_aabb: None,
            transform_changed: Signal::new(),
            destroyed: Signal::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn local_transform(&self) -> &Transform {
        &self.local_transform
    }

    pub fn local_transform_mut(&mut self) -> &mut Transform {
        self.dirty.set(true);
        &mut self.local_transform
    }

    pub fn parent(&self) -> Handle<SceneNode> {
        self.parent
    }

    pub fn children(&self) -> &[Handle<SceneNode>] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    pub fn local_aabb(&self) -> Option<Aabb> {
        self.local_aabb
    }

    pub fn set_local_aabb(&mut self, aabb: Option<Aabb>) {
        self.local_aabb = aabb;
    }

    /// Cached world matrix. Callers that need an up-to-date value should go
    /// through [`crate::scene::graph::Graph::world_transform`] instead,
    /// which recomputes lazily if `dirty`; this accessor just reads
    /// whatever is currently cached.
    pub fn cached_world_transform(&self) -> Matrix4<f32> {
        self.world_transform.get()
    }
}
