//! Self-contained asset payload kinds: the ones that need nothing beyond
//! raw bytes plus a little metadata. `Mesh` (needs `kestrel-impl`'s vertex
//! buffers) and `Material` (needs `kestrel-material`'s pass model) are
//! composed as `AssetStore<T>` instances one layer up, in
//! `kestrel-impl::resource`, to avoid a dependency cycle; everything here
//! is usable standalone.

/// Raw RGBA (or whatever `format` says) pixel data plus dimensions.
/// Image decoding is out of scope (spec §1 Non-goals); this holds the
/// already-decoded bytes a loader produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub bytes: Vec<u8>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TextureFormat {
    Rgb8,
    Rgba8,
}

impl Texture {
    /// A `size`x`size` texture filled with a single RGB color - the shape
    /// of the engine's built-in fallback textures (spec §7 "widgets
    /// substitute a fallback texture... where one is defined").
    pub fn solid_color(size: u32, rgb: [u8; 3]) -> Self {
        let mut bytes = Vec::with_capacity((size * size) as usize * 3);
        for _ in 0..(size * size) {
            bytes.extend_from_slice(&rgb);
        }
        Self {
            width: size,
            height: size,
            format: TextureFormat::Rgb8,
            bytes,
        }
    }

    /// A 2-color checkerboard, the conventional "missing texture" stand-in.
    pub fn checkerboard(size: u32, a: [u8; 3], b: [u8; 3]) -> Self {
        let mut bytes = Vec::with_capacity((size * size) as usize * 3);
        for y in 0..size {
            for x in 0..size {
                let color = if (x + y) % 2 == 0 { a } else { b };
                bytes.extend_from_slice(&color);
            }
        }
        Self {
            width: size,
            height: size,
            format: TextureFormat::Rgb8,
            bytes,
        }
    }
}

/// Glyph-atlas-backing bytes plus the metrics a UI layer needs; glyph
/// rasterization itself is out of scope.
#[derive(Clone, Debug, PartialEq)]
pub struct Font {
    pub family: String,
    pub pixel_height: f32,
    pub atlas: Texture,
}

/// Decoded PCM bytes (or a streaming handle placeholder); audio decode
/// formats are out of scope (spec §1 Non-goals).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sound {
    pub channels: u8,
    pub sample_rate: u32,
    pub bytes: Vec<u8>,
}

/// An uninterpreted particle-script source blob; the particle-script
/// language itself is out of scope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParticleScript {
    pub source: String,
}

/// Opaque bytes with no interpreted structure - the catch-all asset kind
/// for data a game ships but the engine core doesn't need to understand.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct BinaryBlob {
    pub bytes: Vec<u8>,
}
