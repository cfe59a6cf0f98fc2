//! Declarative material/pass pipeline state (spec §4.4): colors, depth,
//! alpha, blend, fog, texture binding, and lighting, snapshotted per pass
//! and iterated per object per frame by the render-queue visitor.

pub mod color;
pub mod enums;
pub mod material;
pub mod pass;
pub mod texture_units;

pub use color::Color;
pub use enums::{
    AlphaFunc, BlendFunc, ColorMaterial, CullMode, DepthFunc, DrawPrimitive, FogMode,
    PassIteration, PolygonMode, ShadeModel,
};
pub use material::Material;
pub use pass::{Pass, PassBuilder, TextureMap};
pub use texture_units::TextureUnits;
