//! Render-queue visitor (spec §4.6, §4.7): walks a built queue and drives a
//! [`GraphicsServer`] through the minimal set of state changes, reconciling
//! per-renderable lights and issuing draw calls. Grounded in
//! `original_source/simulant/renderers/gl1x/gl1x_render_queue_visitor.cpp`'s
//! `start_traversal`/`change_material_pass`/`visit` shape, translated from
//! fixed-function GL calls into [`StateChange`] values and trait calls.

use crate::render::graphics::{GraphicsServer, LightState, StateChange};
use crate::render::mesh::Mesh;
use crate::render::queue::{Iteration, QueueEntry, RenderableWithMaterial, MAX_LIGHTS_PER_RENDERABLE};
use kestrel_material::{Color, DrawPrimitive, Material, Pass, TextureUnits};
use kestrel_math::Matrix4;

/// A render-queue entry's resolved geometry, paired with the renderable it
/// belongs to. The builder only deals in materials; the visitor is the
/// layer that also needs the actual vertex/index data to draw.
pub struct DrawableWithMaterial<'a> {
    pub entry: RenderableWithMaterial<'a>,
    pub mesh: &'a Mesh,
}

#[derive(Copy, Clone, Debug, Default)]
pub struct DrawStats {
    pub draw_calls: u32,
    pub polygons: u64,
    pub material_pass_transitions: u32,
}

/// Produces the minimal set of [`StateChange`]s that take a pass from
/// `prev` (or the implicit default state, if this is the first pass of the
/// traversal) to `next` - every field the two passes share unchanged is
/// skipped (spec §4.6 "For each pipeline-state field that differs, issue
/// the minimal backend call").
pub fn diff_pass(prev: Option<&Pass>, next: &Pass) -> Vec<StateChange> {
    let mut changes = Vec::new();
    macro_rules! diff {
        ($field:ident, $variant:ident) => {
            if prev.map_or(true, |p| p.$field != next.$field) {
                changes.push(StateChange::$variant(next.$field));
            }
        };
    }

    diff!(depth_test_enabled, DepthTestEnabled);
    diff!(depth_write_enabled, DepthWriteEnabled);
    diff!(depth_func, DepthFunc);
    if prev.map_or(true, |p| {
        p.alpha_func != next.alpha_func || p.alpha_threshold != next.alpha_threshold
    }) {
        changes.push(StateChange::AlphaFunc(next.alpha_func, next.alpha_threshold));
    }
    diff!(blend_func, BlendFunc);
    diff!(cull_mode, CullMode);
    diff!(shade_model, ShadeModel);
    diff!(polygon_mode, PolygonMode);
    diff!(point_size, PointSize);
    diff!(color_material, ColorMaterial);
    diff!(fog_mode, FogMode);
    diff!(fog_color, FogColor);
    diff!(fog_start, FogStart);
    diff!(fog_end, FogEnd);
    diff!(fog_density, FogDensity);
    diff!(lighting_enabled, LightingEnabled);
    diff!(diffuse, Diffuse);
    diff!(ambient, Ambient);
    diff!(specular, Specular);
    diff!(emission, Emission);
    if prev.map_or(true, |p| p.shininess_clamped() != next.shininess_clamped()) {
        changes.push(StateChange::Shininess(next.shininess_clamped()));
    }

    changes
}

/// Walks a built queue against one [`GraphicsServer`], tracking light-slot
/// state across draws so unchanged lights are never re-uploaded (spec
/// §4.7 "skip-if-unchanged").
pub struct RenderQueueVisitor {
    light_slots: [Option<LightState>; MAX_LIGHTS_PER_RENDERABLE],
}

impl Default for RenderQueueVisitor {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderQueueVisitor {
    pub fn new() -> Self {
        Self {
            light_slots: [None; MAX_LIGHTS_PER_RENDERABLE],
        }
    }

    /// Uploads the scene's ambient term once for the whole traversal
    /// (spec §4.6 "start_traversal").
    pub fn start_traversal(&mut self, server: &mut dyn GraphicsServer, scene_ambient: Color) {
        server.set_state(StateChange::GlobalAmbient(scene_ambient));
    }

    /// Disables every light slot left enabled from the last renderable, so
    /// the next traversal starts from a known-clean state.
    pub fn end_traversal(&mut self, server: &mut dyn GraphicsServer) {
        for slot in 0..MAX_LIGHTS_PER_RENDERABLE as u8 {
            if self.light_slots[slot as usize].take().is_some() {
                server.disable_light(slot);
            }
        }
    }

    /// Drives `server` through `queue`, returning accumulated draw/polygon
    /// stats (spec §4.6 "report polygon count").
    pub fn visit(
        &mut self,
        server: &mut dyn GraphicsServer,
        view: Matrix4<f32>,
        projection: Matrix4<f32>,
        drawables: &[DrawableWithMaterial],
        queue: &[QueueEntry],
    ) -> DrawStats {
        let mut stats = DrawStats::default();
        let mut current_key: Option<(usize, usize)> = None;
        let mut current_pass: Option<&Pass> = None;

        for entry in queue {
            let drawable = &drawables[entry.renderable_index as usize];
            let pass = &drawable.entry.material.passes()[entry.pass_index as usize];
            let key = (
                drawable.entry.material as *const Material as usize,
                entry.pass_index as usize,
            );

            if current_key != Some(key) {
                for change in diff_pass(current_pass, pass) {
                    server.set_state(change);
                }
                self.bind_textures(server, pass);
                current_key = Some(key);
                current_pass = Some(pass);
                stats.material_pass_transitions += 1;
            }

            let modelview = view * drawable.entry.renderable.world_transform;
            server.upload_transform(modelview, projection);
            server.bind_vertex_buffer(drawable.mesh.vertices.spec(), drawable.mesh.vertices.stride());

            match entry.iteration {
                Iteration::Once => {
                    for slot in 0..MAX_LIGHTS_PER_RENDERABLE {
                        let light = drawable.entry.renderable.lights.get(slot).copied();
                        self.reconcile_light(server, slot as u8, light);
                    }
                    stats.draw_calls += 1;
                    stats.polygons += self.issue_draw(server, drawable);
                }
                Iteration::PerLight { count } => {
                    for i in 0..count as usize {
                        let light = drawable.entry.renderable.lights.get(i).copied();
                        self.reconcile_light(server, 0, light);
                        for slot in 1..MAX_LIGHTS_PER_RENDERABLE {
                            self.reconcile_light(server, slot as u8, None);
                        }
                        stats.draw_calls += 1;
                        stats.polygons += self.issue_draw(server, drawable);
                    }
                }
            }
        }

        stats
    }

    fn issue_draw(&self, server: &mut dyn GraphicsServer, drawable: &DrawableWithMaterial) -> u64 {
        let primitive = if drawable.mesh.primitive == DrawPrimitive::TriangleFan
            && !server.supports_triangle_fan()
        {
            DrawPrimitive::TriangleStrip
        } else {
            drawable.mesh.primitive
        };

        if let Some(indices) = &drawable.mesh.indices {
            server.draw_elements(primitive, indices.count(), 0);
            indices.count() as u64
        } else {
            let count = drawable.mesh.vertices.count();
            server.draw_arrays(primitive, 0, count);
            count as u64
        }
    }

    fn reconcile_light(&mut self, server: &mut dyn GraphicsServer, slot: u8, light: Option<LightState>) {
        let index = slot as usize;
        if self.light_slots[index] == light {
            return;
        }
        match light {
            Some(state) => server.enable_light(slot, state),
            None => server.disable_light(slot),
        }
        self.light_slots[index] = light;
    }

    fn bind_textures(&self, server: &mut dyn GraphicsServer, pass: &Pass) {
        let units = [
            (TextureUnits::DIFFUSE, pass.diffuse_map),
            (TextureUnits::LIGHT, pass.light_map),
            (TextureUnits::NORMAL, pass.normal_map),
            (TextureUnits::SPECULAR, pass.specular_map),
        ];
        for (unit, (flag, map)) in units.into_iter().enumerate() {
            if pass.textures_enabled.contains(flag) {
                if let Some(map) = map {
                    server.bind_texture(unit as u8, Some(map.texture), map.matrix);
                    continue;
                }
            }
            server.bind_texture(unit as u8, None, Matrix4::identity());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{VertexData, VertexSpecification};
    use crate::render::graphics::NullGraphicsServer;
    use arrayvec::ArrayVec;
    use kestrel_material::{BlendFunc, Material, Pass, PassBuilder};
    use kestrel_resource::Texture;
    use kestrel_core::pool::Handle;
    use crate::render::queue::{build_queue, VisibleRenderable};

    fn triangle_mesh() -> Mesh {
        let mut vertices = VertexData::new(VertexSpecification::position_only());
        vertices.push_vertex(&[0.0f32, 0.0, 0.0]).unwrap();
        vertices.push_vertex(&[1.0f32, 0.0, 0.0]).unwrap();
        vertices.push_vertex(&[0.0f32, 1.0, 0.0]).unwrap();
        Mesh::new(vertices, None, DrawPrimitive::Triangles)
    }

    fn plain_renderable() -> VisibleRenderable {
        VisibleRenderable {
            world_transform: Matrix4::identity(),
            render_priority: 0,
            view_depth: 0.0,
            lights: ArrayVec::new(),
        }
    }

    #[test]
    fn unchanged_field_between_two_passes_produces_no_state_change() {
        let prev = Pass::default();
        let mut next = prev.clone();
        next.point_size = prev.point_size;
        assert!(diff_pass(Some(&prev), &next).is_empty());
    }

    #[test]
    fn changed_depth_func_emits_exactly_one_state_change() {
        let prev = Pass::default();
        let mut next = prev.clone();
        next.depth_func = kestrel_material::DepthFunc::Always;
        let changes = diff_pass(Some(&prev), &next);
        assert_eq!(changes, vec![StateChange::DepthFunc(kestrel_material::DepthFunc::Always)]);
    }

    #[test]
    fn two_pass_material_drives_two_transitions_and_two_draws() {
        let material = Material::new(vec![
            Pass::default(),
            PassBuilder::new().blend_func(BlendFunc::Add).build(),
        ])
        .unwrap();
        let renderable = plain_renderable();
        let mesh = triangle_mesh();
        let inputs = vec![RenderableWithMaterial {
            renderable: &renderable,
            material: &material,
        }];
        let queue = build_queue(&inputs);
        let drawables = vec![DrawableWithMaterial {
            entry: RenderableWithMaterial {
                renderable: &renderable,
                material: &material,
            },
            mesh: &mesh,
        }];

        let mut server = NullGraphicsServer::new();
        let mut visitor = RenderQueueVisitor::new();
        let stats = visitor.visit(&mut server, Matrix4::identity(), Matrix4::identity(), &drawables, &queue);

        assert_eq!(stats.draw_calls, 2);
        assert_eq!(stats.material_pass_transitions, 2);
        assert_eq!(server.draw_calls, 2);
    }

    #[test]
    fn per_light_iteration_reconciles_one_light_per_draw() {
        let material = Material::single(PassBuilder::new().iterate_once_per_light().build());
        let mut lights = ArrayVec::new();
        let light_a = LightState {
            view_position: [1.0, 0.0, 0.0, 1.0],
            ambient: Color::BLACK,
            diffuse: Color::WHITE,
            specular: Color::WHITE,
            attenuation_const: 1.0,
            attenuation_linear: 0.0,
            attenuation_quadratic: 0.0,
        };
        let light_b = LightState {
            view_position: [0.0, 1.0, 0.0, 0.0],
            ..light_a
        };
        lights.push(light_a);
        lights.push(light_b);
        let renderable = VisibleRenderable {
            world_transform: Matrix4::identity(),
            render_priority: 0,
            view_depth: 0.0,
            lights,
        };
        let mesh = triangle_mesh();
        let inputs = vec![RenderableWithMaterial {
            renderable: &renderable,
            material: &material,
        }];
        let queue = build_queue(&inputs);
        let drawables = vec![DrawableWithMaterial {
            entry: RenderableWithMaterial {
                renderable: &renderable,
                material: &material,
            },
            mesh: &mesh,
        }];

        let mut server = NullGraphicsServer::new();
        let mut visitor = RenderQueueVisitor::new();
        let stats = visitor.visit(&mut server, Matrix4::identity(), Matrix4::identity(), &drawables, &queue);

        assert_eq!(stats.draw_calls, 2);
        assert_eq!(server.lights_enabled.len(), 2);
        assert_eq!(server.lights_enabled[0].1, light_a);
        assert_eq!(server.lights_enabled[1].1, light_b);
    }

    #[test]
    fn fan_falls_back_to_strip_when_unsupported() {
        struct NoFanServer(NullGraphicsServer);
        impl GraphicsServer for NoFanServer {
            fn set_state(&mut self, change: StateChange) {
                self.0.set_state(change)
            }
            fn bind_vertex_buffer(&mut self, spec: &VertexSpecification, stride: u16) {
                self.0.bind_vertex_buffer(spec, stride)
            }
            fn bind_texture(&mut self, unit: u8, texture: Option<Handle<Texture>>, matrix: Matrix4<f32>) {
                self.0.bind_texture(unit, texture, matrix)
            }
            fn enable_light(&mut self, slot: u8, state: LightState) {
                self.0.enable_light(slot, state)
            }
            fn disable_light(&mut self, slot: u8) {
                self.0.disable_light(slot)
            }
            fn upload_transform(&mut self, modelview: Matrix4<f32>, projection: Matrix4<f32>) {
                self.0.upload_transform(modelview, projection)
            }
            fn supports_triangle_fan(&self) -> bool {
                false
            }
            fn draw_elements(&mut self, primitive: DrawPrimitive, count: u32, offset: u32) {
                self.0.draw_elements(primitive, count, offset)
            }
            fn draw_arrays(&mut self, primitive: DrawPrimitive, start: u32, count: u32) {
                assert_eq!(primitive, DrawPrimitive::TriangleStrip);
                self.0.draw_arrays(primitive, start, count)
            }
        }

        let material = Material::single(Pass::default());
        let renderable = plain_renderable();
        let mut vertices = VertexData::new(VertexSpecification::position_only());
        vertices.push_vertex(&[0.0f32, 0.0, 0.0]).unwrap();
        let mesh = Mesh::new(vertices, None, DrawPrimitive::TriangleFan);
        let inputs = vec![RenderableWithMaterial {
            renderable: &renderable,
            material: &material,
        }];
        let queue = build_queue(&inputs);
        let drawables = vec![DrawableWithMaterial {
            entry: RenderableWithMaterial {
                renderable: &renderable,
                material: &material,
            },
            mesh: &mesh,
        }];

        let mut server = NoFanServer(NullGraphicsServer::new());
        let mut visitor = RenderQueueVisitor::new();
        visitor.visit(&mut server, Matrix4::identity(), Matrix4::identity(), &drawables, &queue);
        assert_eq!(server.0.arrays_drawn, 1);
    }
}
