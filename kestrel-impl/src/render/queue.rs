//! Render-queue builder (spec §4.5): turns a camera's culled, partitioned
//! renderables into a stable, index-addressable sequence of
//! `(renderable, pass, iteration)` records the visitor walks exactly once.

use crate::render::graphics::LightState;
use kestrel_material::{Material, Pass, PassIteration};
use kestrel_math::Matrix4;
use std::cmp::Ordering;

use arrayvec::ArrayVec;

pub const MAX_LIGHTS_PER_RENDERABLE: usize = 4;

/// One culled, camera-visible entity with everything the builder and
/// visitor need, gathered by the partitioner (spec §4.8) before the queue
/// is built. `lights` holds the renderable's top-`k` relevant lights,
/// already resolved into view space, nearest/most-relevant first.
#[derive(Clone)]
pub struct VisibleRenderable {
    pub world_transform: Matrix4<f32>,
    pub render_priority: i32,
    /// View-space distance of the renderable's center from the camera,
    /// used for the opaque front-to-back / translucent back-to-front
    /// ordering (spec §4.5, step 4).
    pub view_depth: f32,
    pub lights: ArrayVec<LightState, MAX_LIGHTS_PER_RENDERABLE>,
}

/// A renderable paired with its resolved material - the builder's actual
/// input unit. Kept separate from [`VisibleRenderable`] so the partitioner
/// doesn't need to know about materials at all.
pub struct RenderableWithMaterial<'a> {
    pub renderable: &'a VisibleRenderable,
    pub material: &'a Material,
}

/// How many times a `(renderable, pass)` pair draws.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Iteration {
    Once,
    /// Draw the pass once per light, binding exactly one light per
    /// iteration (spec §4.5 "Iteration tag" / §4.4
    /// `PassIteration::OncePerLight`).
    PerLight { count: u8 },
}

/// One builder output record.
#[derive(Clone, Debug)]
pub struct QueueEntry {
    pub renderable_index: u32,
    pub pass_index: u32,
    pub iteration: Iteration,
}

fn blend_rank(pass: &Pass) -> u8 {
    if pass.is_opaque() {
        0
    } else {
        1
    }
}

/// Builds the per-camera render queue (spec §4.5). Ordering, primary to
/// least: render priority, blend class (opaque before translucent),
/// material pointer identity (clusters passes sharing a material), then
/// depth (front-to-back for opaque, back-to-front for translucent). The
/// sort is stable, so equal-key entries keep their input order.
pub fn build_queue(inputs: &[RenderableWithMaterial]) -> Vec<QueueEntry> {
    let mut entries = Vec::new();

    for (index, input) in inputs.iter().enumerate() {
        for (pass_index, pass) in input.material.passes().iter().enumerate() {
            let iteration = match pass.iteration {
                PassIteration::Once => Iteration::Once,
                PassIteration::OncePerLight => {
                    let count = input.renderable.lights.len().min(MAX_LIGHTS_PER_RENDERABLE) as u8;
                    // No relevant lights: nothing for an additive per-light
                    // pass to contribute, so it is dropped rather than
                    // emitted with a zero-iteration count.
                    if count == 0 {
                        continue;
                    }
                    Iteration::PerLight { count }
                }
            };
            entries.push(QueueEntry {
                renderable_index: index as u32,
                pass_index: pass_index as u32,
                iteration,
            });
        }
    }

    entries.sort_by(|a, b| compare_entries(inputs, a, b));
    entries
}

fn compare_entries(inputs: &[RenderableWithMaterial], a: &QueueEntry, b: &QueueEntry) -> Ordering {
    let ra = &inputs[a.renderable_index as usize];
    let rb = &inputs[b.renderable_index as usize];
    let pa = &ra.material.passes()[a.pass_index as usize];
    let pb = &rb.material.passes()[b.pass_index as usize];

    ra.renderable
        .render_priority
        .cmp(&rb.renderable.render_priority)
        .then_with(|| blend_rank(pa).cmp(&blend_rank(pb)))
        .then_with(|| {
            let ptr_a = ra.material as *const Material as usize;
            let ptr_b = rb.material as *const Material as usize;
            ptr_a.cmp(&ptr_b)
        })
        .then_with(|| {
            if pa.is_opaque() {
                ra.renderable
                    .view_depth
                    .partial_cmp(&rb.renderable.view_depth)
                    .unwrap_or(Ordering::Equal)
            } else {
                rb.renderable
                    .view_depth
                    .partial_cmp(&ra.renderable.view_depth)
                    .unwrap_or(Ordering::Equal)
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_material::{BlendFunc, PassBuilder};

    fn renderable(priority: i32, depth: f32) -> VisibleRenderable {
        VisibleRenderable {
            world_transform: Matrix4::identity(),
            render_priority: priority,
            view_depth: depth,
            lights: ArrayVec::new(),
        }
    }

    #[test]
    fn opaque_sorts_before_translucent_regardless_of_depth() {
        let opaque_material = Material::single(Pass::default());
        let translucent_material =
            Material::single(PassBuilder::new().blend_func(BlendFunc::Alpha).build());
        let opaque = renderable(0, 100.0);
        let translucent = renderable(0, 1.0);
        let inputs = vec![
            RenderableWithMaterial {
                renderable: &translucent,
                material: &translucent_material,
            },
            RenderableWithMaterial {
                renderable: &opaque,
                material: &opaque_material,
            },
        ];

        let queue = build_queue(&inputs);
        assert_eq!(queue[0].renderable_index, 1);
        assert_eq!(queue[1].renderable_index, 0);
    }

    #[test]
    fn opaque_entries_sort_front_to_back() {
        let material = Material::single(Pass::default());
        let near = renderable(0, 1.0);
        let far = renderable(0, 10.0);
        let inputs = vec![
            RenderableWithMaterial {
                renderable: &far,
                material: &material,
            },
            RenderableWithMaterial {
                renderable: &near,
                material: &material,
            },
        ];

        let queue = build_queue(&inputs);
        assert_eq!(queue[0].renderable_index, 1);
        assert_eq!(queue[1].renderable_index, 0);
    }

    #[test]
    fn translucent_entries_sort_back_to_front() {
        let material = Material::single(PassBuilder::new().blend_func(BlendFunc::Alpha).build());
        let near = renderable(0, 1.0);
        let far = renderable(0, 10.0);
        let inputs = vec![
            RenderableWithMaterial {
                renderable: &near,
                material: &material,
            },
            RenderableWithMaterial {
                renderable: &far,
                material: &material,
            },
        ];

        let queue = build_queue(&inputs);
        assert_eq!(queue[0].renderable_index, 1);
        assert_eq!(queue[1].renderable_index, 0);
    }

    #[test]
    fn multi_pass_material_emits_one_entry_per_pass() {
        let material = Material::new(vec![Pass::default(), Pass::default()]).unwrap();
        let r = renderable(0, 0.0);
        let inputs = vec![RenderableWithMaterial {
            renderable: &r,
            material: &material,
        }];

        let queue = build_queue(&inputs);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue[0].pass_index, 0);
        assert_eq!(queue[1].pass_index, 1);
    }

    #[test]
    fn per_light_pass_with_no_lights_is_dropped() {
        let material = Material::single(PassBuilder::new().iterate_once_per_light().build());
        let r = renderable(0, 0.0);
        let inputs = vec![RenderableWithMaterial {
            renderable: &r,
            material: &material,
        }];

        assert!(build_queue(&inputs).is_empty());
    }

    #[test]
    fn per_light_pass_iterates_once_per_relevant_light() {
        let material = Material::single(PassBuilder::new().iterate_once_per_light().build());
        let mut lights = ArrayVec::new();
        let state = LightState {
            view_position: [0.0, 0.0, 0.0, 1.0],
            ambient: kestrel_material::Color::BLACK,
            diffuse: kestrel_material::Color::WHITE,
            specular: kestrel_material::Color::WHITE,
            attenuation_const: 1.0,
            attenuation_linear: 0.0,
            attenuation_quadratic: 0.0,
        };
        lights.push(state);
        lights.push(state);
        let r = VisibleRenderable {
            world_transform: Matrix4::identity(),
            render_priority: 0,
            view_depth: 0.0,
            lights,
        };
        let inputs = vec![RenderableWithMaterial {
            renderable: &r,
            material: &material,
        }];

        let queue = build_queue(&inputs);
        assert_eq!(queue.len(), 1);
        assert!(matches!(queue[0].iteration, Iteration::PerLight { count: 2 }));
    }
}
