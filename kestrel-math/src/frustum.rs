//! Camera view frustum, extracted from a combined view-projection matrix,
//! and the three-way AABB classification the partitioner descends the
//! octree with (spec §4.8).

use crate::{Aabb, Plane};
use nalgebra::Matrix4;

/// Result of testing an AABB against a [`Frustum`] (spec §4.8).
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum FrustumTest {
    /// The AABB lies entirely outside at least one plane - skip the
    /// subtree.
    Outside,
    /// The AABB lies entirely inside every plane - every descendant is
    /// visible without further per-entity tests.
    Inside,
    /// The AABB crosses at least one plane without being fully outside any
    /// - descend and test children/entities individually.
    Straddle,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Frustum {
    /// left, right, top, bottom, far, near
    pub planes: [Plane; 6],
}

impl Frustum {
    pub fn from_view_projection_matrix(m: Matrix4<f32>) -> Option<Self> {
        let planes = [
            Plane::from_abcd(m[3] + m[0], m[7] + m[4], m[11] + m[8], m[15] + m[12])?,
            Plane::from_abcd(m[3] - m[0], m[7] - m[4], m[11] - m[8], m[15] - m[12])?,
            Plane::from_abcd(m[3] - m[1], m[7] - m[5], m[11] - m[9], m[15] - m[13])?,
            Plane::from_abcd(m[3] + m[1], m[7] + m[5], m[11] + m[9], m[15] + m[13])?,
            Plane::from_abcd(m[3] - m[2], m[7] - m[6], m[11] - m[10], m[15] - m[14])?,
            Plane::from_abcd(m[3] + m[2], m[7] + m[6], m[11] + m[10], m[15] + m[14])?,
        ];
        Some(Self { planes })
    }

    /// Classifies `aabb` against every plane: outside if any plane has all
    /// eight corners on its negative side, inside if every plane has all
    /// eight corners on its non-negative side, straddle otherwise.
    pub fn classify_aabb(&self, aabb: &Aabb) -> FrustumTest {
        let corners = aabb.corners();
        let mut straddles_any = false;

        for plane in &self.planes {
            let mut inside_count = 0;
            for corner in &corners {
                if plane.signed_distance(*corner) >= 0.0 {
                    inside_count += 1;
                }
            }
            if inside_count == 0 {
                return FrustumTest::Outside;
            }
            if inside_count < corners.len() {
                straddles_any = true;
            }
        }

        if straddles_any {
            FrustumTest::Straddle
        } else {
            FrustumTest::Inside
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn test_frustum() -> Frustum {
        let projection = Matrix4::new_perspective(1.0, std::f32::consts::FRAC_PI_2, 0.1, 100.0);
        let view = Matrix4::look_at_rh(
            &nalgebra::Point3::new(0.0, 0.0, 10.0),
            &nalgebra::Point3::origin(),
            &Vector3::y(),
        );
        Frustum::from_view_projection_matrix(projection * view).unwrap()
    }

    #[test]
    fn aabb_at_origin_is_inside() {
        let frustum = test_frustum();
        let aabb = Aabb::from_center_half_extent(Vector3::zeros(), Vector3::new(0.1, 0.1, 0.1));
        assert_eq!(frustum.classify_aabb(&aabb), FrustumTest::Inside);
    }

    #[test]
    fn aabb_far_behind_camera_is_outside() {
        let frustum = test_frustum();
        let aabb = Aabb::from_center_half_extent(
            Vector3::new(0.0, 0.0, 1000.0),
            Vector3::new(1.0, 1.0, 1.0),
        );
        assert_eq!(frustum.classify_aabb(&aabb), FrustumTest::Outside);
    }

    #[test]
    fn aabb_crossing_the_near_plane_straddles() {
        let frustum = test_frustum();
        let aabb = Aabb::from_center_half_extent(
            Vector3::new(0.0, 0.0, 10.0),
            Vector3::new(50.0, 50.0, 50.0),
        );
        assert_eq!(frustum.classify_aabb(&aabb), FrustumTest::Straddle);
    }
}
