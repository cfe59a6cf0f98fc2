//! Scene-render pipeline: partitioner, render-queue builder, visitor, and
//! the backend-facing graphics/mesh types they operate on (spec §4.4-§4.8).

pub mod graphics;
pub mod mesh;
pub mod queue;
pub mod visitor;

pub use graphics::{GraphicsServer, HardwareBuffer, LightState, MemoryHardwareBuffer, NullGraphicsServer, StateChange};
pub use mesh::Mesh;
pub use queue::{build_queue, Iteration, QueueEntry, RenderableWithMaterial, VisibleRenderable, MAX_LIGHTS_PER_RENDERABLE};
pub use visitor::{diff_pass, DrawStats, DrawableWithMaterial, RenderQueueVisitor};
