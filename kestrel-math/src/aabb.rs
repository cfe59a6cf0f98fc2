//! Axis-aligned bounding boxes.

use nalgebra::Vector3;

/// `{min, max}` — an axis-aligned bounding box in whatever space its
/// producer defines (local or world).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Default for Aabb {
    /// An "empty" AABB such that `merge`-ing any real point into it yields
    /// that point's bounds.
    fn default() -> Self {
        Self {
            min: Vector3::new(f32::MAX, f32::MAX, f32::MAX),
            max: Vector3::new(-f32::MAX, -f32::MAX, -f32::MAX),
        }
    }
}

impl Aabb {
    pub const fn from_min_max(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    pub fn from_center_half_extent(center: Vector3<f32>, half_extent: Vector3<f32>) -> Self {
        Self {
            min: center - half_extent,
            max: center + half_extent,
        }
    }

    pub fn from_point(point: Vector3<f32>) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    pub fn add_point(&mut self, point: Vector3<f32>) {
        self.min = self.min.zip_map(&point, |a, b| a.min(b));
        self.max = self.max.zip_map(&point, |a, b| a.max(b));
    }

    pub fn from_points(points: &[Vector3<f32>]) -> Self {
        let mut aabb = Self::default();
        for point in points {
            aabb.add_point(*point);
        }
        aabb
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    pub fn dimensions(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn max_dimension(&self) -> f32 {
        let d = self.dimensions();
        d.x.max(d.y).max(d.z)
    }

    pub fn contains_point(&self, point: Vector3<f32>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    pub fn contains_aabb(&self, other: &Aabb) -> bool {
        self.contains_point(other.min) && self.contains_point(other.max)
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Smallest AABB that contains both `self` and `other`.
    pub fn merge(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.zip_map(&other.min, |a, b| a.min(b)),
            max: self.max.zip_map(&other.max, |a, b| a.max(b)),
        }
    }

    pub fn corners(&self) -> [Vector3<f32>; 8] {
        [
            Vector3::new(self.min.x, self.min.y, self.min.z),
            Vector3::new(self.max.x, self.min.y, self.min.z),
            Vector3::new(self.max.x, self.max.y, self.min.z),
            Vector3::new(self.min.x, self.max.y, self.min.z),
            Vector3::new(self.min.x, self.min.y, self.max.z),
            Vector3::new(self.max.x, self.min.y, self.max.z),
            Vector3::new(self.max.x, self.max.y, self.max.z),
            Vector3::new(self.min.x, self.max.y, self.max.z),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_and_dimensions() {
        let aabb = Aabb::from_min_max(Vector3::new(-1.0, -2.0, -3.0), Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(aabb.center(), Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(aabb.dimensions(), Vector3::new(2.0, 4.0, 6.0));
        assert_eq!(aabb.max_dimension(), 6.0);
    }

    #[test]
    fn contains_point_is_inclusive_on_boundary() {
        let aabb = Aabb::from_center_half_extent(Vector3::zeros(), Vector3::new(5.0, 5.0, 5.0));
        assert!(aabb.contains_point(Vector3::new(5.0, 0.0, 0.0)));
        assert!(!aabb.contains_point(Vector3::new(5.01, 0.0, 0.0)));
    }

    #[test]
    fn corners_count_and_extent() {
        let aabb = Aabb::from_center_half_extent(Vector3::zeros(), Vector3::new(1.0, 1.0, 1.0));
        let corners = aabb.corners();
        assert_eq!(corners.len(), 8);
        for c in corners {
            assert!(c.x.abs() == 1.0 && c.y.abs() == 1.0 && c.z.abs() == 1.0);
        }
    }

    #[test]
    fn merge_grows_to_contain_both() {
        let a = Aabb::from_point(Vector3::new(0.0, 0.0, 0.0));
        let b = Aabb::from_point(Vector3::new(5.0, -2.0, 1.0));
        let merged = a.merge(&b);
        assert!(merged.contains_aabb(&a));
        assert!(merged.contains_aabb(&b));
    }
}
