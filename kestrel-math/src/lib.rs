//! Bounding volumes and transforms shared by the Kestrel engine core.

pub mod aabb;
pub mod frustum;
pub mod plane;
pub mod transform;

pub use aabb::Aabb;
pub use frustum::{Frustum, FrustumTest};
pub use nalgebra::{Matrix4, UnitQuaternion, Vector3};
pub use plane::Plane;
pub use transform::Transform;
