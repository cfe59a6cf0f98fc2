//! The backend capability interface the visitor drives (spec §6 "GPU
//! backend", §4.6). `kestrel-impl` only defines the trait shape and a
//! recording test double; concrete GL/Vulkan/fixed-function backends are
//! out of scope (Non-goal: "the concrete GPU instruction streams for each
//! backend").

use crate::buffer::VertexSpecification;
use kestrel_core::{EngineError, EngineResult};
use kestrel_material::{Color, DrawPrimitive};
use kestrel_math::Matrix4;
use kestrel_resource::Texture;
use kestrel_core::pool::Handle;

/// One pipeline-state field's new value, as produced by a pass-to-pass
/// diff (see [`crate::render::visitor::diff_pass`]).
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    DepthTestEnabled(bool),
    DepthWriteEnabled(bool),
    DepthFunc(kestrel_material::DepthFunc),
    AlphaFunc(kestrel_material::AlphaFunc, f32),
    BlendFunc(kestrel_material::BlendFunc),
    CullMode(kestrel_material::CullMode),
    ShadeModel(kestrel_material::ShadeModel),
    PolygonMode(kestrel_material::PolygonMode),
    PointSize(f32),
    ColorMaterial(kestrel_material::ColorMaterial),
    FogMode(kestrel_material::FogMode),
    FogColor(Color),
    FogStart(f32),
    FogEnd(f32),
    FogDensity(f32),
    LightingEnabled(bool),
    Diffuse(Color),
    Ambient(Color),
    Specular(Color),
    Emission(Color),
    Shininess(f32),
    /// The scene's global ambient light, uploaded once per traversal
    /// rather than per pass (spec §4.6 "start_traversal"; grounded in the
    /// original visitor's `glLightModelfv(GL_LIGHT_MODEL_AMBIENT, ...)`
    /// call).
    GlobalAmbient(Color),
}

/// A single light slot's reconciled state, already transformed into view
/// space (spec §4.7).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LightState {
    /// `w = 0` for directional, `w = 1` for point lights.
    pub view_position: [f32; 4],
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub attenuation_const: f32,
    pub attenuation_linear: f32,
    pub attenuation_quadratic: f32,
}

/// Capability interface the render-queue visitor drives. Every call is
/// main-thread only (spec §5).
pub trait GraphicsServer {
    fn set_state(&mut self, change: StateChange);

    fn bind_vertex_buffer(&mut self, spec: &VertexSpecification, stride: u16);

    fn bind_texture(&mut self, unit: u8, texture: Option<Handle<Texture>>, matrix: Matrix4<f32>);

    fn enable_light(&mut self, slot: u8, state: LightState);

    fn disable_light(&mut self, slot: u8);

    /// Uploads the combined modelview and projection matrices for the
    /// renderable about to be drawn (spec §4.6 "Upload modelview and
    /// projection").
    fn upload_transform(&mut self, modelview: Matrix4<f32>, projection: Matrix4<f32>);

    /// Whether this backend can draw `TRIANGLE_FAN` natively. Backends
    /// that can't (spec §4.6 draw-primitive mapping) get the fan
    /// re-expressed as a `TRIANGLE_STRIP` by the visitor instead.
    fn supports_triangle_fan(&self) -> bool {
        true
    }

    /// Returns nothing - polygon-count accounting is the visitor's job
    /// (spec §4.6 "report polygon count"), not the backend's.
    fn draw_elements(&mut self, primitive: DrawPrimitive, count: u32, offset: u32);

    fn draw_arrays(&mut self, primitive: DrawPrimitive, start: u32, count: u32);
}

/// A backend-agnostic GPU buffer handle (spec §3, §6). Allocated, resized,
/// bound, and released only from the main thread; background threads that
/// need to mutate one enqueue an idle task and block on completion (spec
/// §5).
pub trait HardwareBuffer {
    fn upload(&mut self, bytes: &[u8]) -> EngineResult<()>;
    fn resize(&mut self, capacity_bytes: usize) -> EngineResult<()>;
    fn bind(&self) -> EngineResult<()>;
    fn release(&mut self);
    fn is_released(&self) -> bool;
}

/// An in-memory [`HardwareBuffer`] with a fixed capacity, used by tests
/// that need something other than a no-op.
pub struct MemoryHardwareBuffer {
    capacity: usize,
    bytes: Vec<u8>,
    released: bool,
}

impl MemoryHardwareBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            bytes: Vec::new(),
            released: false,
        }
    }
}

impl HardwareBuffer for MemoryHardwareBuffer {
    fn upload(&mut self, bytes: &[u8]) -> EngineResult<()> {
        if self.released {
            return Err(EngineError::DeadResource);
        }
        if bytes.len() > self.capacity {
            return Err(EngineError::BufferOverflow);
        }
        self.bytes.clear();
        self.bytes.extend_from_slice(bytes);
        Ok(())
    }

    fn resize(&mut self, capacity_bytes: usize) -> EngineResult<()> {
        if self.released {
            return Err(EngineError::DeadResource);
        }
        self.capacity = capacity_bytes;
        Ok(())
    }

    fn bind(&self) -> EngineResult<()> {
        if self.released {
            return Err(EngineError::DeadResource);
        }
        Ok(())
    }

    fn release(&mut self) {
        self.released = true;
        self.bytes.clear();
    }

    fn is_released(&self) -> bool {
        self.released
    }
}

/// A [`GraphicsServer`] that records every call instead of talking to a
/// real backend, used by the visitor's unit tests to assert exactly which
/// state transitions and draws happened.
#[derive(Default)]
pub struct NullGraphicsServer {
    pub state_changes: Vec<StateChange>,
    pub vertex_binds: u32,
    pub texture_binds: Vec<(u8, Option<Handle<Texture>>)>,
    pub lights_enabled: Vec<(u8, LightState)>,
    pub lights_disabled: Vec<u8>,
    pub transforms_uploaded: u32,
    pub draw_calls: u32,
    pub elements_drawn: u32,
    pub arrays_drawn: u32,
}

impl NullGraphicsServer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GraphicsServer for NullGraphicsServer {
    fn set_state(&mut self, change: StateChange) {
        self.state_changes.push(change);
    }

    fn bind_vertex_buffer(&mut self, _spec: &VertexSpecification, _stride: u16) {
        self.vertex_binds += 1;
    }

    fn bind_texture(&mut self, unit: u8, texture: Option<Handle<Texture>>, _matrix: Matrix4<f32>) {
        self.texture_binds.push((unit, texture));
    }

    fn enable_light(&mut self, slot: u8, state: LightState) {
        self.lights_enabled.push((slot, state));
    }

    fn disable_light(&mut self, slot: u8) {
        self.lights_disabled.push(slot);
    }

    fn upload_transform(&mut self, _modelview: Matrix4<f32>, _projection: Matrix4<f32>) {
        self.transforms_uploaded += 1;
    }

    fn draw_elements(&mut self, _primitive: DrawPrimitive, count: u32, _offset: u32) {
        self.draw_calls += 1;
        self.elements_drawn += count;
    }

    fn draw_arrays(&mut self, _primitive: DrawPrimitive, _start: u32, count: u32) {
        self.draw_calls += 1;
        self.arrays_drawn += count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_buffer_rejects_oversized_upload() {
        let mut buffer = MemoryHardwareBuffer::with_capacity(4);
        assert!(matches!(
            buffer.upload(&[0u8; 8]),
            Err(EngineError::BufferOverflow)
        ));
    }

    #[test]
    fn released_buffer_rejects_further_use() {
        let mut buffer = MemoryHardwareBuffer::with_capacity(16);
        buffer.release();
        assert!(matches!(buffer.bind(), Err(EngineError::DeadResource)));
    }

    #[test]
    fn null_server_records_draw_calls() {
        let mut server = NullGraphicsServer::new();
        server.draw_arrays(DrawPrimitive::Triangles, 0, 3);
        assert_eq!(server.draw_calls, 1);
        assert_eq!(server.arrays_drawn, 3);
    }
}
