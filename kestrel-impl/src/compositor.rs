//! Compositor (spec §2's table, not detailed further in §4): an ordered
//! list of render pipelines, each targeting its own camera/viewport/
//! render-target, executed lowest-priority-first every frame. Grounded in
//! `original_source/simulant/pipeline.cpp`'s `Pipeline` (id, priority,
//! is_active, stage, detail-level distances) and `PipelineHelper::
//! set_priority` (re-sorting the owning sequence on change).

use kestrel_core::pool::{Handle, Pool};
use kestrel_math::{Frustum, Matrix4};

/// A sub-rectangle of a render target, in pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Where a stage's output goes. Offscreen targets are named by an opaque
/// handle the windowing/GPU collaborator resolves (spec §6 "Window");
/// this core never inspects the handle itself.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RenderTarget {
    Screen,
    Offscreen(u32),
}

/// One entry in the compositor (spec §2 "Ordered list of (stage, camera,
/// viewport, target, priority) pipelines").
#[derive(Clone)]
pub struct PipelineStage {
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
    pub frustum: Frustum,
    pub viewport: Viewport,
    pub target: RenderTarget,
    pub priority: i32,
    pub is_active: bool,
}

impl PipelineStage {
    pub fn new(view: Matrix4<f32>, projection: Matrix4<f32>, viewport: Viewport, target: RenderTarget) -> Option<Self> {
        let frustum = Frustum::from_view_projection_matrix(projection * view)?;
        Some(Self {
            view,
            projection,
            frustum,
            viewport,
            target,
            priority: 0,
            is_active: true,
        })
    }
}

/// Keeps every [`PipelineStage`] sorted by ascending priority, re-sorting
/// whenever a stage's priority changes (mirrors `Pipeline::set_priority`
/// triggering `sequence_->sort_pipelines(true)`).
#[derive(Default)]
pub struct Compositor {
    stages: Pool<PipelineStage>,
    order: Vec<Handle<PipelineStage>>,
}

impl Compositor {
    pub fn new() -> Self {
        Self {
            stages: Pool::new(),
            order: Vec::new(),
        }
    }

    pub fn add_stage(&mut self, stage: PipelineStage) -> Handle<PipelineStage> {
        let handle = self.stages.spawn(stage);
        self.order.push(handle);
        self.resort();
        handle
    }

    pub fn remove_stage(&mut self, handle: Handle<PipelineStage>) {
        self.stages.try_free(handle);
        self.order.retain(|&h| h != handle);
    }

    pub fn set_priority(&mut self, handle: Handle<PipelineStage>, priority: i32) {
        if let Some(stage) = self.stages.try_borrow_mut(handle) {
            stage.priority = priority;
            self.resort();
        }
    }

    pub fn activate(&mut self, handle: Handle<PipelineStage>) {
        if let Some(stage) = self.stages.try_borrow_mut(handle) {
            stage.is_active = true;
        }
    }

    pub fn deactivate(&mut self, handle: Handle<PipelineStage>) {
        if let Some(stage) = self.stages.try_borrow_mut(handle) {
            stage.is_active = false;
        }
    }

    fn resort(&mut self) {
        let stages = &self.stages;
        self.order.sort_by_key(|&h| stages.try_borrow(h).map(|s| s.priority).unwrap_or(0));
    }

    /// Every active stage, lowest-priority-first - the order a frame's
    /// compositor pass should execute the partitioner/builder/visitor
    /// chain against each target.
    pub fn active_stages(&self) -> impl Iterator<Item = (Handle<PipelineStage>, &PipelineStage)> {
        self.order
            .iter()
            .filter_map(move |&h| self.stages.try_borrow(h).map(|s| (h, s)))
            .filter(|(_, s)| s.is_active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Point3, Vector3};

    fn stage(priority: i32) -> PipelineStage {
        let projection = Matrix4::new_perspective(1.0, std::f32::consts::FRAC_PI_2, 0.1, 100.0);
        let view = Matrix4::look_at_rh(&Point3::new(0.0, 0.0, 10.0), &Point3::origin(), &Vector3::y());
        let mut s = PipelineStage::new(
            view,
            projection,
            Viewport { x: 0, y: 0, width: 800, height: 600 },
            RenderTarget::Screen,
        )
        .unwrap();
        s.priority = priority;
        s
    }

    #[test]
    fn stages_execute_lowest_priority_first() {
        let mut compositor = Compositor::new();
        compositor.add_stage(stage(5));
        compositor.add_stage(stage(-1));
        compositor.add_stage(stage(2));

        let priorities: Vec<i32> = compositor.active_stages().map(|(_, s)| s.priority).collect();
        assert_eq!(priorities, vec![-1, 2, 5]);
    }

    #[test]
    fn changing_priority_reorders_stages() {
        let mut compositor = Compositor::new();
        let a = compositor.add_stage(stage(0));
        let b = compositor.add_stage(stage(1));

        compositor.set_priority(a, 10);
        let order: Vec<Handle<PipelineStage>> = compositor.active_stages().map(|(h, _)| h).collect();
        assert_eq!(order, vec![b, a]);
    }

    #[test]
    fn deactivated_stage_is_skipped() {
        let mut compositor = Compositor::new();
        let a = compositor.add_stage(stage(0));
        compositor.deactivate(a);
        assert_eq!(compositor.active_stages().count(), 0);
    }
}
