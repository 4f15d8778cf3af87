//! Instance wrappers that move or rotate another hittable.
//!
//! Both work by mapping the ray into the wrapped object's space, delegating,
//! and mapping the hit back out. The wrapped object is shared, so one shape
//! can be instanced several times.

use std::sync::Arc;

use crate::hittable::{HitRecord, Hittable};
use crate::{Ray, Vec3};
use raggio_math::{Aabb, Axis, Interval, Rotation};
use rand::RngCore;

/// A hittable shifted by a constant offset.
#[derive(Clone)]
pub struct Translated {
    object: Arc<dyn Hittable>,
    offset: Vec3,
}

impl Translated {
    pub fn new(object: Arc<dyn Hittable>, offset: Vec3) -> Self {
        Self { object, offset }
    }
}

impl Hittable for Translated {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let moved = Ray::new(ray.origin() - self.offset, ray.direction());
        let mut rec = self.object.hit(&moved, ray_t, rng)?;

        // Direction is unchanged, so normal and face flag carry over as-is.
        rec.p += self.offset;
        Some(rec)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.object
            .bounding_box()
            .map(|bbox| bbox.translate(self.offset))
    }
}

/// A hittable rotated about one principal axis through the origin.
///
/// Positive angles turn counter-clockwise when looking down the axis toward
/// the origin, the same right-handed sense for X, Y and Z. Scenes written for
/// a renderer that turns X and Z the other way need those angles negated.
#[derive(Clone)]
pub struct Rotated {
    object: Arc<dyn Hittable>,
    rotation: Rotation,
    /// World-space box of the rotated object's box, computed once.
    bbox: Option<Aabb>,
}

impl Rotated {
    pub fn new(object: Arc<dyn Hittable>, axis: Axis, degrees: f64) -> Self {
        let rotation = Rotation::new(axis, degrees);
        let bbox = object
            .bounding_box()
            .map(|local| rotation.transform_aabb(&local));

        Self {
            object,
            rotation,
            bbox,
        }
    }
}

impl Hittable for Rotated {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let local = Ray::new(
            self.rotation.to_local(ray.origin()),
            self.rotation.to_local(ray.direction()),
        );
        let mut rec = self.object.hit(&local, ray_t, rng)?;

        // Rotation preserves t and the sign of dot(direction, normal).
        rec.p = self.rotation.to_world(rec.p);
        rec.normal = self.rotation.to_world(rec.normal);
        Some(rec)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.bbox
    }
}
