//! Math types for the raggio path tracer.
//!
//! Everything is double precision. Points, free vectors and colors all share
//! the same `DVec3` representation; the aliases only document intent.

pub use glam;
pub use glam::{DMat3, DVec3};

mod aabb;
mod interval;
mod ray;
mod transform;
mod vec;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
pub use transform::{Axis, Rotation};
pub use vec::{reflect, refract, Vec3Ext};

/// 3-component vector used for points and directions alike.
pub type Vec3 = DVec3;

/// A position in world or object space.
pub type Point3 = DVec3;
