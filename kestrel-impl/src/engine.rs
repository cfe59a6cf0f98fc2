//! Ties the scene graph, spatial index, asset manager, compositor, and
//! idle task queue into one owner with the frame-lifecycle signals spec
//! §5 and §9 describe. Grounded in `fyrox-impl/src/engine/mod.rs`'s
//! `Engine` struct (owns every subsystem, exposes `update`/`render`) and
//! `EngineInitParams`-style construction from a config value.

use crate::compositor::Compositor;
use crate::config::EngineConfig;
use crate::idle::IdleTaskQueue;
use crate::resource::AssetManager;
use crate::scene::graph::Graph;
use kestrel_core::signal::Signal;
use kestrel_spatial::Octree;

/// Owns every long-lived subsystem (spec §2's table) and fires the
/// lifecycle signals described in spec §9; the application main loop,
/// window/input handling, and audio driver that call into this are
/// external collaborators out of scope (spec §6).
pub struct Engine {
    pub graph: Graph,
    pub octree: Octree,
    pub assets: AssetManager<'static>,
    pub compositor: Compositor,
    pub idle: IdleTaskQueue,

    /// Fired at the start of a frame, before fixed-updates, with the
    /// frame's delta time.
    pub frame_started: Signal<f32>,
    /// Fired once rendering has finished recording but before the
    /// backend swaps buffers (spec §5 "render emits pre_swap then
    /// swaps").
    pub pre_swap: Signal<()>,
    /// Fired exactly once, when [`Self::shutdown`] runs (spec §5
    /// "Cancellation").
    pub shutdown: Signal<()>,

    config: EngineConfig,
    shutdown_requested: bool,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let octree = Octree::with_predicates(
            |node| (config.octree_split_predicate)(node),
            |siblings| (config.octree_merge_predicate)(siblings),
        );
        Self {
            graph: Graph::new(),
            octree,
            assets: AssetManager::new_base(),
            compositor: Compositor::new(),
            idle: IdleTaskQueue::new(),
            frame_started: Signal::new(),
            pre_swap: Signal::new(),
            shutdown: Signal::new(),
            config,
            shutdown_requested: false,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn request_shutdown(&mut self) {
        self.shutdown_requested = true;
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested
    }

    /// Spec §5's ordering guarantee: within one frame, fixed-updates fire
    /// before the per-frame update; update fires before late-update;
    /// late-update fires before render. This hook marks the start of
    /// that sequence; the caller runs fixed-update/update/late-update in
    /// order, then calls [`Self::drain_idle_tasks`] and
    /// [`Self::before_swap`] once rendering is recorded.
    pub fn begin_frame(&self, dt: f32) {
        self.frame_started.emit(dt);
    }

    /// Runs every asset manager's GC pass (spec §4.3 "periodic GC").
    pub fn collect_assets(&mut self) -> u32 {
        self.assets.update(self.config.asset_eviction_delay)
    }

    /// Drains the idle task queue. Main-thread only, and only safe to call
    /// outside the render phase (spec §5 "Octree mutations within a frame
    /// are serialized... reads during rendering observe a consistent
    /// snapshot because no mutation occurs during the render phase").
    pub fn drain_idle_tasks(&self) {
        self.idle.execute();
    }

    /// Emitted once rendering has been recorded but before the backend
    /// swaps buffers.
    pub fn before_swap(&self) {
        self.pre_swap.emit(());
    }

    /// Sets the shutdown flag, fires [`Self::shutdown`], and forces every
    /// asset manager to release its assets immediately (spec §5
    /// "Cancellation... any outstanding idle tasks are allowed to drain
    /// before teardown").
    pub fn shutdown(&mut self) {
        self.shutdown_requested = true;
        self.idle.execute();
        self.shutdown.emit(());
        self.assets.destroy_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn begin_frame_emits_to_listeners_with_the_delta_time() {
        let engine = Engine::new(EngineConfig::default());
        let seen = Rc::new(Cell::new(0.0f32));
        let seen_clone = seen.clone();
        let _conn = engine.frame_started.connect(move |dt| seen_clone.set(*dt));
        engine.begin_frame(1.0 / 60.0);
        assert!((seen.get() - 1.0 / 60.0).abs() < f32::EPSILON);
    }

    #[test]
    fn shutdown_emits_once_and_drops_assets() {
        let mut engine = Engine::new(EngineConfig::default());
        let fired = Rc::new(Cell::new(0u32));
        let fired_clone = fired.clone();
        let _conn = engine.shutdown.connect(move |_| fired_clone.set(fired_clone.get() + 1));

        assert!(!engine.is_shutdown_requested());
        engine.shutdown();
        assert!(engine.is_shutdown_requested());
        assert_eq!(fired.get(), 1);
    }
}
