//! A pass: the immutable pipeline-state record from spec §4.4, built with
//! a `PassBuilder` in the spirit of the teacher's material builder idiom
//! but adapted to the fixed-function field table this spec specifies
//! rather than Fyrox's modern shader-uniform model.

use crate::color::Color;
use crate::enums::{
    AlphaFunc, BlendFunc, ColorMaterial, CullMode, DepthFunc, FogMode, PassIteration, PolygonMode,
    ShadeModel,
};
use crate::texture_units::TextureUnits;
use kestrel_core::pool::Handle;
use kestrel_math::Matrix4;
use kestrel_resource::Texture;

/// One bound texture map plus the matrix applied to its UVs.
#[derive(Copy, Clone, Debug)]
pub struct TextureMap {
    pub texture: Handle<Texture>,
    pub matrix: Matrix4<f32>,
}

impl TextureMap {
    pub fn new(texture: Handle<Texture>) -> Self {
        Self {
            texture,
            matrix: Matrix4::identity(),
        }
    }
}

/// An immutable pipeline-state snapshot, iterated per object per frame.
/// Every field is spec §4.4's table verbatim plus the `iteration` flag
/// §4.5 references but §4.4 doesn't spell out as a field.
#[derive(Clone, Debug)]
pub struct Pass {
    pub diffuse: Color,
    pub ambient: Color,
    pub specular: Color,
    pub emission: Color,
    pub shininess: f32,

    pub depth_test_enabled: bool,
    pub depth_write_enabled: bool,
    pub depth_func: DepthFunc,

    pub alpha_func: AlphaFunc,
    pub alpha_threshold: f32,

    pub blend_func: BlendFunc,
    pub cull_mode: CullMode,
    pub shade_model: ShadeModel,
    pub polygon_mode: PolygonMode,
    pub point_size: f32,
    pub color_material: ColorMaterial,

    pub fog_mode: FogMode,
    pub fog_color: Color,
    pub fog_start: f32,
    pub fog_end: f32,
    pub fog_density: f32,

    pub lighting_enabled: bool,
    pub textures_enabled: TextureUnits,

    pub diffuse_map: Option<TextureMap>,
    pub light_map: Option<TextureMap>,
    pub normal_map: Option<TextureMap>,
    pub specular_map: Option<TextureMap>,

    pub iteration: PassIteration,
}

impl Default for Pass {
    fn default() -> Self {
        Self {
            diffuse: Color::WHITE,
            ambient: Color::rgb(0.2, 0.2, 0.2),
            specular: Color::WHITE,
            emission: Color::TRANSPARENT,
            shininess: 0.0,

            depth_test_enabled: true,
            depth_write_enabled: true,
            depth_func: DepthFunc::Lequal,

            alpha_func: AlphaFunc::Always,
            alpha_threshold: 0.0,

            blend_func: BlendFunc::None,
            cull_mode: CullMode::Back,
            shade_model: ShadeModel::Smooth,
            polygon_mode: PolygonMode::Fill,
            point_size: 1.0,
            color_material: ColorMaterial::None,

            fog_mode: FogMode::None,
            fog_color: Color::BLACK,
            fog_start: 0.0,
            fog_end: 0.0,
            fog_density: 0.0,

            lighting_enabled: true,
            textures_enabled: TextureUnits::empty(),

            diffuse_map: None,
            light_map: None,
            normal_map: None,
            specular_map: None,

            iteration: PassIteration::Once,
        }
    }
}

impl Pass {
    pub fn shininess_clamped(&self) -> f32 {
        self.shininess.clamp(0.0, 128.0)
    }

    /// Spec §4.5 "blend class": opaque (no blend, or ADD with no alpha in
    /// play) vs translucent.
    pub fn is_opaque(&self) -> bool {
        self.blend_func.is_opaque_class()
    }
}

/// Builder mirroring the teacher's fluent-setter pattern for pipeline
/// state, so call sites read as a sequence of deltas from the default
/// pass rather than a giant struct literal.
#[derive(Clone, Debug, Default)]
pub struct PassBuilder(Pass);

impl PassBuilder {
    pub fn new() -> Self {
        Self(Pass::default())
    }

    pub fn diffuse(mut self, color: Color) -> Self {
        self.0.diffuse = color;
        self
    }

    pub fn blend_func(mut self, blend: BlendFunc) -> Self {
        self.0.blend_func = blend;
        self
    }

    pub fn cull_mode(mut self, cull: CullMode) -> Self {
        self.0.cull_mode = cull;
        self
    }

    pub fn polygon_mode(mut self, mode: PolygonMode) -> Self {
        self.0.polygon_mode = mode;
        self
    }

    pub fn depth_test_enabled(mut self, enabled: bool) -> Self {
        self.0.depth_test_enabled = enabled;
        self
    }

    pub fn depth_write_enabled(mut self, enabled: bool) -> Self {
        self.0.depth_write_enabled = enabled;
        self
    }

    pub fn lighting_enabled(mut self, enabled: bool) -> Self {
        self.0.lighting_enabled = enabled;
        self
    }

    pub fn diffuse_map(mut self, map: TextureMap) -> Self {
        self.0.textures_enabled |= TextureUnits::DIFFUSE;
        self.0.diffuse_map = Some(map);
        self
    }

    pub fn iterate_once_per_light(mut self) -> Self {
        self.0.iteration = PassIteration::OncePerLight;
        self
    }

    pub fn build(self) -> Pass {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pass_is_opaque_and_depth_tested() {
        let pass = Pass::default();
        assert!(pass.is_opaque());
        assert!(pass.depth_test_enabled);
    }

    #[test]
    fn builder_sets_translucent_blend() {
        let pass = PassBuilder::new().blend_func(BlendFunc::Alpha).build();
        assert!(!pass.is_opaque());
    }

    #[test]
    fn shininess_clamps_to_spec_range() {
        let mut pass = Pass::default();
        pass.shininess = 500.0;
        assert_eq!(pass.shininess_clamped(), 128.0);
    }

    #[test]
    fn diffuse_map_enables_its_texture_unit() {
        let pass = PassBuilder::new()
            .diffuse_map(TextureMap::new(Handle::NONE))
            .build();
        assert!(pass.textures_enabled.contains(TextureUnits::DIFFUSE));
    }
}
