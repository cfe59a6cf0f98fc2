//! Facade crate flattening the Kestrel workspace's public surface: the
//! octree spatial index, the scene-render pipeline (scene graph, octree,
//! partitioner, render-queue builder, backend-agnostic visitor), and the
//! garbage-collected asset manager, plus the compositor, idle task queue
//! and engine-wide configuration that tie them together. Mirrors the
//! teacher's `fyrox` crate, which re-exports `fyrox-impl` and its sibling
//! crates behind one name so downstream code depends on a single version.

pub use kestrel_core::{
    pool::{Handle, Pool},
    signal::{Connection, Signal},
    EngineError, EngineResult, Log, MessageKind,
};

pub use kestrel_math::{
    Aabb, Frustum, FrustumTest, Matrix4, Plane, Transform, UnitQuaternion, Vector3,
};

pub use kestrel_spatial::{EntityId, EntityKind, NodeData, Octree, OctreeNode, MIN_SPLITTABLE_DIAMETER};

pub use kestrel_resource::{
    AssetMeta, AssetStore, BinaryBlob, Font, GcMethod, LoadOptions, LoaderRegistry, LoaderType,
    ParticleScript, Sound, Texture, TextureFormat, VirtualFileSystem,
};

pub use kestrel_material::{
    AlphaFunc, BlendFunc, Color, ColorMaterial, CullMode, DepthFunc, DrawPrimitive, FogMode,
    Material, Pass, PassBuilder, PassIteration, PolygonMode, ShadeModel, TextureMap, TextureUnits,
};

pub use kestrel_impl::buffer;
pub use kestrel_impl::compositor::{Compositor, PipelineStage, RenderTarget, Viewport};
pub use kestrel_impl::config::EngineConfig;
pub use kestrel_impl::engine::Engine;
pub use kestrel_impl::idle::{IdleTaskQueue, TaskId};
pub use kestrel_impl::render::{
    build_queue, diff_pass, DrawStats, DrawableWithMaterial, GraphicsServer, HardwareBuffer,
    Iteration, LightState, Mesh, MemoryHardwareBuffer, NullGraphicsServer, QueueEntry,
    RenderQueueVisitor, RenderableWithMaterial, StateChange, VisibleRenderable,
    MAX_LIGHTS_PER_RENDERABLE,
};
pub use kestrel_impl::resource::AssetManager;
pub use kestrel_impl::scene::{Graph, SceneNode, TransformChangedArgs};
pub use kestrel_impl::spatial::{partition, rank_lights, LightInfo, PartitionResult};
