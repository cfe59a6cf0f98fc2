//! `{translation, rotation, scale}` transforms that compose into a cached
//! 4x4 world matrix.
//!
//! The matrix is recomputed lazily: setting any component marks the
//! transform dirty, and the next call to [`Transform::matrix`] rebuilds and
//! caches it. This mirrors the lazy-evaluation idiom used throughout the
//! engine's scene graph, just without the FBX-style pivot/offset chain -
//! this engine's transform is plain TRS.

use nalgebra::{Matrix4, UnitQuaternion, Vector3};
use std::cell::Cell;

#[derive(Clone, Debug)]
pub struct Transform {
    translation: Vector3<f32>,
    rotation: UnitQuaternion<f32>,
    scale: Vector3<f32>,
    dirty: Cell<bool>,
    cached_matrix: Cell<Matrix4<f32>>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            scale: Vector3::new(1.0, 1.0, 1.0),
            dirty: Cell::new(true),
            cached_matrix: Cell::new(Matrix4::identity()),
        }
    }

    pub fn translation(&self) -> Vector3<f32> {
        self.translation
    }

    pub fn rotation(&self) -> UnitQuaternion<f32> {
        self.rotation
    }

    pub fn scale(&self) -> Vector3<f32> {
        self.scale
    }

    pub fn set_translation(&mut self, translation: Vector3<f32>) -> &mut Self {
        self.translation = translation;
        self.dirty.set(true);
        self
    }

    pub fn set_rotation(&mut self, rotation: UnitQuaternion<f32>) -> &mut Self {
        self.rotation = rotation;
        self.dirty.set(true);
        self
    }

    pub fn set_scale(&mut self, scale: Vector3<f32>) -> &mut Self {
        self.scale = scale;
        self.dirty.set(true);
        self
    }

    /// Returns the 4x4 matrix for this transform, recomputing and caching
    /// it first if any component changed since the last call.
    pub fn matrix(&self) -> Matrix4<f32> {
        if self.dirty.get() {
            let translation = Matrix4::new_translation(&self.translation);
            let rotation = self.rotation.to_homogeneous();
            let scale = Matrix4::new_nonuniform_scaling(&self.scale);
            self.cached_matrix.set(translation * rotation * scale);
            self.dirty.set(false);
        }
        self.cached_matrix.get()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn identity_matrix_is_identity() {
        let t = Transform::identity();
        assert_relative_eq!(t.matrix(), Matrix4::identity());
    }

    #[test]
    fn translation_moves_origin() {
        let mut t = Transform::identity();
        t.set_translation(Vector3::new(1.0, 2.0, 3.0));
        let p = t.matrix().transform_point(&nalgebra::Point3::origin());
        assert_relative_eq!(p.coords, Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn matrix_is_cached_until_dirtied() {
        let mut t = Transform::identity();
        let _ = t.matrix();
        assert!(!t.is_dirty());
        t.set_scale(Vector3::new(2.0, 2.0, 2.0));
        assert!(t.is_dirty());
        let _ = t.matrix();
        assert!(!t.is_dirty());
    }
}
