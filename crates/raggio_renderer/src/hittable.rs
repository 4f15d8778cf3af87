//! Hittable trait and HitRecord for ray-object intersection.

use std::sync::Arc;

use crate::{Material, Point3, Ray, Vec3};
use raggio_math::{Aabb, Interval};
use rand::RngCore;

/// Record of a ray-object intersection.
#[derive(Clone, Copy)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Point3,
    /// Surface normal at intersection (always points against the ray)
    pub normal: Vec3,
    /// Material at the intersection point, owned by the scene
    pub material: &'a dyn Material,
    /// Parameter t where the intersection occurs
    pub t: f64,
    /// UV texture coordinates
    pub u: f64,
    pub v: f64,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
}

impl<'a> HitRecord<'a> {
    /// Build a record, orienting `outward_normal` against the ray.
    pub fn new(
        ray: &Ray,
        t: f64,
        outward_normal: Vec3,
        material: &'a dyn Material,
        (u, v): (f64, f64),
    ) -> Self {
        let mut rec = Self {
            p: ray.at(t),
            normal: outward_normal,
            material,
            t,
            u,
            v,
            front_face: true,
        };
        rec.set_face_normal(ray, outward_normal);
        rec
    }

    /// Set the face normal based on ray direction and outward normal.
    ///
    /// The normal is always stored pointing against the ray direction,
    /// so we need to track whether we hit the front or back face.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.front_face = ray.direction().dot(outward_normal) < 0.0;
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

impl std::fmt::Debug for HitRecord<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HitRecord")
            .field("p", &self.p)
            .field("normal", &self.normal)
            .field("t", &self.t)
            .field("uv", &(self.u, self.v))
            .field("front_face", &self.front_face)
            .finish()
    }
}

/// Trait for objects that can be hit by rays.
///
/// Implementations never mutate themselves during a query, so a scene can be
/// shared read-only across render workers.
pub trait Hittable: Send + Sync {
    /// Closest intersection with `t` in `(ray_t.min, ray_t.max]`.
    ///
    /// `rng` is only consumed by stochastic geometry (participating media).
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore)
        -> Option<HitRecord<'a>>;

    /// Axis-aligned bounds, or `None` if the object has none.
    fn bounding_box(&self) -> Option<Aabb>;
}

/// An unordered collection of hittables, searched linearly.
#[derive(Default, Clone)]
pub struct HittableList {
    objects: Vec<Arc<dyn Hittable>>,
}

impl HittableList {
    /// Create a new empty hittable list.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
        }
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: Arc<dyn Hittable>) {
        self.objects.push(object);
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> &[Arc<dyn Hittable>] {
        &self.objects
    }
}

impl From<Vec<Arc<dyn Hittable>>> for HittableList {
    fn from(objects: Vec<Arc<dyn Hittable>>) -> Self {
        Self { objects }
    }
}

impl Hittable for HittableList {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let mut closest: Option<HitRecord<'a>> = None;
        let mut closest_so_far = ray_t.max;

        for object in &self.objects {
            if let Some(rec) = object.hit(ray, ray_t.with_max(closest_so_far), rng) {
                closest_so_far = rec.t;
                closest = Some(rec);
            }
        }

        closest
    }

    fn bounding_box(&self) -> Option<Aabb> {
        let mut boxes = self.objects.iter().map(|o| o.bounding_box());
        let first = boxes.next()??;
        boxes.try_fold(first, |acc, b| Some(Aabb::including(&acc, &b?)))
    }
}
