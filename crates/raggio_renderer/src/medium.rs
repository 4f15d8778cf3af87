//! Homogeneous participating media (smoke, fog).

use std::sync::Arc;

use crate::hittable::{HitRecord, Hittable};
use crate::sampling::random_f64;
use crate::{Color, Isotropic, Ray, Texture, Vec3};
use raggio_math::{Aabb, Interval};
use rand::RngCore;

/// Offset past the entry point when searching for the exit point.
const EXIT_SEARCH_EPSILON: f64 = 0.0001;

/// A medium of constant density filling a convex boundary.
///
/// A ray passing through the boundary scatters at an exponentially
/// distributed depth, or passes through untouched if that depth lies beyond
/// the exit point. Non-convex boundaries give wrong results because only the
/// first entry/exit pair is considered.
pub struct ConstantMedium {
    boundary: Arc<dyn Hittable>,
    density: f64,
    phase_function: Isotropic,
}

impl ConstantMedium {
    pub fn new(boundary: Arc<dyn Hittable>, density: f64, albedo: Color) -> Self {
        Self::with_texture(boundary, density, Arc::new(Texture::Solid(albedo)))
    }

    pub fn with_texture(boundary: Arc<dyn Hittable>, density: f64, albedo: Arc<Texture>) -> Self {
        Self {
            boundary,
            density,
            phase_function: Isotropic::with_texture(albedo),
        }
    }
}

impl Hittable for ConstantMedium {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        // Zero, negative or NaN density: the medium is fully transparent.
        if self.density.is_nan() || self.density <= 0.0 {
            return None;
        }

        let entry = self.boundary.hit(ray, Interval::UNIVERSE, rng)?;
        let exit = self.boundary.hit(
            ray,
            Interval::new(entry.t + EXIT_SEARCH_EPSILON, f64::INFINITY),
            rng,
        )?;

        let mut t_enter = entry.t.max(ray_t.min);
        let t_exit = exit.t.min(ray_t.max);
        if t_enter >= t_exit {
            return None;
        }
        if t_enter < 0.0 {
            t_enter = 0.0;
        }

        let ray_length = ray.direction().length();
        let distance_inside = (t_exit - t_enter) * ray_length;
        let hit_distance = -random_f64(rng).ln() / self.density;
        if hit_distance > distance_inside {
            return None;
        }

        let t = t_enter + hit_distance / ray_length;

        // There is no surface inside a volume: normal and face flag are
        // placeholders that the isotropic phase function ignores.
        Some(HitRecord {
            p: ray.at(t),
            normal: Vec3::X,
            material: &self.phase_function,
            t,
            u: entry.u,
            v: entry.v,
            front_face: true,
        })
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.boundary.bounding_box()
    }
}
