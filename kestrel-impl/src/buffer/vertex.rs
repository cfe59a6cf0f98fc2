//! Typed, interleaved vertex storage (spec §3 "Vertex Specification/Data").

use kestrel_core::{EngineError, EngineResult};
use std::time::{SystemTime, UNIX_EPOCH};

/// Per-attribute data shape. Presence in a [`VertexSpecification`] is
/// `NONE`; everything else occupies bytes in the interleaved layout.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum VertexAttribute {
    None,
    Float2,
    Float3,
    Float4,
    UByte4Rgba,
    UByte4Bgra,
    /// A 4-component value packed into a single `i32` (e.g. compressed
    /// normals).
    PackedVec4_1I,
}

impl VertexAttribute {
    pub fn size_bytes(self) -> u8 {
        match self {
            VertexAttribute::None => 0,
            VertexAttribute::Float2 => 8,
            VertexAttribute::Float3 => 12,
            VertexAttribute::Float4 => 16,
            VertexAttribute::UByte4Rgba | VertexAttribute::UByte4Bgra => 4,
            VertexAttribute::PackedVec4_1I => 4,
        }
    }

    pub fn is_present(self) -> bool {
        !matches!(self, VertexAttribute::None)
    }
}

/// Which attributes a vertex buffer carries, and in what slot order
/// (position, normal, tex0..tex7, diffuse, specular). Stride and
/// per-attribute byte offsets are derived once at construction.
#[derive(Clone, Debug)]
pub struct VertexSpecification {
    position: VertexAttribute,
    normal: VertexAttribute,
    tex_coords: [VertexAttribute; 8],
    diffuse: VertexAttribute,
    specular: VertexAttribute,
    offsets: [u8; 11],
    stride: u16,
}

const SLOT_COUNT: usize = 11;

impl VertexSpecification {
    pub fn new(
        position: VertexAttribute,
        normal: VertexAttribute,
        tex_coords: [VertexAttribute; 8],
        diffuse: VertexAttribute,
        specular: VertexAttribute,
    ) -> Self {
        let slots = [position, normal]
            .into_iter()
            .chain(tex_coords)
            .chain([diffuse, specular]);

        let mut offsets = [0u8; SLOT_COUNT];
        let mut cursor = 0u16;
        for (slot, attribute) in slots.enumerate() {
            offsets[slot] = cursor as u8;
            cursor += attribute.size_bytes() as u16;
        }

        Self {
            position,
            normal,
            tex_coords,
            diffuse,
            specular,
            offsets,
            stride: cursor,
        }
    }

    /// `{position, 3F}` plus nothing else - the minimal useful layout.
    pub fn position_only() -> Self {
        Self::new(
            VertexAttribute::Float3,
            VertexAttribute::None,
            [VertexAttribute::None; 8],
            VertexAttribute::None,
            VertexAttribute::None,
        )
    }

    /// `{position 3F, normal 3F, tex0 2F, diffuse RGBA}` - the common
    /// lit-textured-mesh layout.
    pub fn position_normal_tex0_diffuse() -> Self {
        let mut tex = [VertexAttribute::None; 8];
        tex[0] = VertexAttribute::Float2;
        Self::new(
            VertexAttribute::Float3,
            VertexAttribute::Float3,
            tex,
            VertexAttribute::UByte4Rgba,
            VertexAttribute::None,
        )
    }

    pub fn stride(&self) -> u16 {
        self.stride
    }

    pub fn position(&self) -> VertexAttribute {
        self.position
    }

    pub fn normal(&self) -> VertexAttribute {
        self.normal
    }

    pub fn tex_coord(&self, unit: usize) -> VertexAttribute {
        self.tex_coords[unit]
    }

    pub fn diffuse(&self) -> VertexAttribute {
        self.diffuse
    }

    pub fn specular(&self) -> VertexAttribute {
        self.specular
    }

    fn offset(&self, slot: usize) -> u8 {
        self.offsets[slot]
    }

    pub fn position_offset(&self) -> u8 {
        self.offset(0)
    }

    pub fn normal_offset(&self) -> u8 {
        self.offset(1)
    }

    pub fn tex_coord_offset(&self, unit: usize) -> u8 {
        self.offset(2 + unit)
    }

    pub fn diffuse_offset(&self) -> u8 {
        self.offset(10 - 1)
    }

    pub fn specular_offset(&self) -> u8 {
        self.offset(10)
    }
}

fn now_micros() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros()
        .min(u64::MAX as u128) as u64
}

/// Cursor-based interleaved vertex writer. Every `push_*` call writes one
/// attribute's worth of bytes at the cursor's current vertex slot; callers
/// are expected to push attributes for one vertex in spec order, then move
/// on (there is no per-field random access by design - this mirrors the
/// teacher's streaming `VertexBuffer::push_vertex` idiom rather than letting
/// callers poke arbitrary byte ranges).
#[derive(Clone)]
pub struct VertexData {
    spec: VertexSpecification,
    bytes: Vec<u8>,
    count: u32,
    last_updated_us: u64,
}

impl VertexData {
    pub fn new(spec: VertexSpecification) -> Self {
        Self {
            spec,
            bytes: Vec::new(),
            count: 0,
            last_updated_us: 0,
        }
    }

    pub fn with_capacity(spec: VertexSpecification, vertex_capacity: u32) -> Self {
        let mut data = Self::new(spec);
        data.bytes
            .reserve(vertex_capacity as usize * data.spec.stride() as usize);
        data
    }

    pub fn spec(&self) -> &VertexSpecification {
        &self.spec
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn stride(&self) -> u16 {
        self.spec.stride()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn last_updated_us(&self) -> u64 {
        self.last_updated_us
    }

    /// Appends one fully-interleaved vertex's worth of raw bytes, which must
    /// be exactly [`VertexSpecification::stride`] long.
    pub fn push_raw_vertex(&mut self, raw: &[u8]) -> EngineResult<()> {
        if raw.len() != self.spec.stride() as usize {
            return Err(EngineError::BufferOverflow);
        }
        self.bytes.extend_from_slice(raw);
        self.count += 1;
        Ok(())
    }

    /// Appends a vertex built from `bytemuck::Pod` components, in spec
    /// order, skipping any attribute the spec marks `None`.
    pub fn push_vertex<P: bytemuck::Pod>(&mut self, components: &[P]) -> EngineResult<()> {
        let bytes: &[u8] = bytemuck::cast_slice(components);
        self.push_raw_vertex(bytes)
    }

    /// Marks the buffer as finished being written for this frame's batch,
    /// stamping the wall-clock microsecond timestamp the hardware-buffer
    /// upload path checks to avoid redundant GPU uploads.
    pub fn done(&mut self) {
        self.last_updated_us = now_micros();
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
        self.count = 0;
    }
}
