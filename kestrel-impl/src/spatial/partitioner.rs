//! Frustum-vs-octree descent and light relevance ranking (spec §4.8).
//! Grounded in [`kestrel_spatial::Octree::traverse`] for the tree walk and
//! `original_source/simulant/partitioners/impl/grid.h` for the
//! outside/inside/straddle descent shape this generalizes from a
//! uniform grid onto the loose octree.

use kestrel_math::{Frustum, FrustumTest, Vector3};
use kestrel_spatial::{EntityId, EntityKind, Octree};

/// Every bounded entity a camera can see this frame, grouped by kind
/// (spec §4.8's "actors, lights, particle systems" partition).
#[derive(Default, Clone)]
pub struct PartitionResult {
    pub actors: Vec<EntityId>,
    pub lights: Vec<EntityId>,
    pub particle_systems: Vec<EntityId>,
}

impl PartitionResult {
    fn push(&mut self, kind: EntityKind, id: EntityId) {
        match kind {
            EntityKind::Actor => self.actors.push(id),
            EntityKind::Light => self.lights.push(id),
            EntityKind::ParticleSystem => self.particle_systems.push(id),
        }
    }
}

/// Depth-first descent of `octree` against `frustum` (spec §4.8): a node
/// entirely outside any plane is skipped along with its whole subtree; a
/// node entirely inside every plane contributes every entity it (and its
/// descendants) holds without further per-entity tests; a straddling node
/// tests each of its own entities individually and still descends into
/// its children.
pub fn partition(octree: &Octree, frustum: &Frustum) -> PartitionResult {
    let mut result = PartitionResult::default();

    octree.traverse(|node| match frustum.classify_aabb(&node.loose_aabb()) {
        FrustumTest::Outside => false,
        FrustumTest::Inside => {
            node.data().each_all(|kind, id, _aabb| result.push(kind, id));
            true
        }
        FrustumTest::Straddle => {
            node.data().each_all(|kind, id, aabb| {
                if frustum.classify_aabb(&aabb) != FrustumTest::Outside {
                    result.push(kind, id);
                }
            });
            true
        }
    });

    result
}

/// One light candidate for relevance ranking: its identity, world-space
/// position, and the parameters needed to score it against a renderable.
#[derive(Copy, Clone, Debug)]
pub struct LightInfo {
    pub id: EntityId,
    pub position: Vector3<f32>,
    pub directional: bool,
    pub attenuation_linear: f32,
    pub attenuation_quadratic: f32,
}

/// Ranks `candidates` by relevance to an entity centered at
/// `entity_center` and keeps the top `k` (spec §4.8 "per-entity light
/// relevance"): directional lights get a large constant priority ahead of
/// every point light; point lights rank by inverse distance scaled by
/// their attenuation, so a bright, nearby point light outranks a distant
/// one even before attenuation is applied.
pub fn rank_lights(entity_center: Vector3<f32>, candidates: &[LightInfo], k: usize) -> Vec<EntityId> {
    const DIRECTIONAL_PRIORITY: f32 = f32::MAX;

    let mut scored: Vec<(f32, EntityId)> = candidates
        .iter()
        .map(|light| {
            let priority = if light.directional {
                DIRECTIONAL_PRIORITY
            } else {
                let distance = (light.position - entity_center).norm().max(1e-4);
                let attenuation = 1.0
                    + light.attenuation_linear * distance
                    + light.attenuation_quadratic * distance * distance;
                1.0 / (distance * attenuation.max(1e-4))
            };
            (priority, light.id)
        })
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(k);
    scored.into_iter().map(|(_, id)| id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_math::Aabb;
    use nalgebra::{Matrix4, Point3};

    fn frustum_looking_down_z() -> Frustum {
        let projection = Matrix4::new_perspective(1.0, std::f32::consts::FRAC_PI_2, 0.1, 100.0);
        let view = Matrix4::look_at_rh(&Point3::new(0.0, 0.0, 10.0), &Point3::origin(), &Vector3::y());
        Frustum::from_view_projection_matrix(projection * view).unwrap()
    }

    #[test]
    fn partition_includes_an_actor_in_view() {
        let mut octree = Octree::new();
        octree
            .insert_actor(1, Aabb::from_center_half_extent(Vector3::zeros(), Vector3::new(0.5, 0.5, 0.5)))
            .unwrap();

        let result = partition(&octree, &frustum_looking_down_z());
        assert_eq!(result.actors, vec![1]);
    }

    #[test]
    fn partition_excludes_an_actor_far_behind_the_camera() {
        let mut octree = Octree::new();
        octree
            .insert_actor(
                1,
                Aabb::from_center_half_extent(Vector3::new(0.0, 0.0, 1000.0), Vector3::new(1.0, 1.0, 1.0)),
            )
            .unwrap();
        octree
            .insert_actor(2, Aabb::from_center_half_extent(Vector3::zeros(), Vector3::new(0.5, 0.5, 0.5)))
            .unwrap();

        let result = partition(&octree, &frustum_looking_down_z());
        assert_eq!(result.actors, vec![2]);
    }

    #[test]
    fn directional_lights_always_outrank_point_lights() {
        let near_point = LightInfo {
            id: 1,
            position: Vector3::new(0.1, 0.0, 0.0),
            directional: false,
            attenuation_linear: 0.0,
            attenuation_quadratic: 0.0,
        };
        let directional = LightInfo {
            id: 2,
            position: Vector3::zeros(),
            directional: true,
            attenuation_linear: 0.0,
            attenuation_quadratic: 0.0,
        };

        let ranked = rank_lights(Vector3::zeros(), &[near_point, directional], 2);
        assert_eq!(ranked, vec![2, 1]);
    }

    #[test]
    fn keeps_only_the_top_k_closest_point_lights() {
        let near = LightInfo {
            id: 1,
            position: Vector3::new(1.0, 0.0, 0.0),
            directional: false,
            attenuation_linear: 0.0,
            attenuation_quadratic: 0.0,
        };
        let far = LightInfo {
            id: 2,
            position: Vector3::new(50.0, 0.0, 0.0),
            directional: false,
            attenuation_linear: 0.0,
            attenuation_quadratic: 0.0,
        };

        let ranked = rank_lights(Vector3::zeros(), &[far, near], 1);
        assert_eq!(ranked, vec![1]);
    }
}
