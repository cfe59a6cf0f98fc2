//! Infinite planes, used to build camera frustums.

use nalgebra::Vector3;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Plane {
    pub normal: Vector3<f32>,
    pub d: f32,
}

impl Plane {
    /// Builds a plane from the coefficients of `Ax + By + Cz + D = 0`,
    /// normalizing so that [`Plane::signed_distance`] reports true
    /// world-space distance. Fails if the normal is degenerate.
    pub fn from_abcd(a: f32, b: f32, c: f32, d: f32) -> Option<Self> {
        let normal = Vector3::new(a, b, c);
        let len = normal.norm();
        if len == 0.0 {
            None
        } else {
            let inv_len = 1.0 / len;
            Some(Self {
                normal: normal * inv_len,
                d: d * inv_len,
            })
        }
    }

    /// Positive on the side the normal points toward.
    pub fn signed_distance(&self, point: Vector3<f32>) -> f32 {
        self.normal.dot(&point) + self.d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_distance_is_zero_on_the_plane() {
        let plane = Plane::from_abcd(0.0, 1.0, 0.0, 0.0).unwrap();
        assert_eq!(plane.signed_distance(Vector3::new(5.0, 0.0, -3.0)), 0.0);
        assert!(plane.signed_distance(Vector3::new(0.0, 1.0, 0.0)) > 0.0);
        assert!(plane.signed_distance(Vector3::new(0.0, -1.0, 0.0)) < 0.0);
    }
}
