//! Sphere primitive for ray tracing.

use std::f64::consts::PI;
use std::sync::Arc;

use crate::{
    hittable::{HitRecord, Hittable},
    Material, Point3, Ray,
};
use raggio_math::{Aabb, Interval, Vec3};
use rand::RngCore;

/// A sphere primitive.
#[derive(Clone)]
pub struct Sphere {
    center: Point3,
    radius: f64,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new sphere.
    ///
    /// A negative radius keeps the same surface but turns the outward normal
    /// inward, so a small negative-radius glass sphere inside a larger one
    /// makes a hollow shell. A zero or NaN radius is never hit.
    pub fn new(center: Point3, radius: f64, material: Arc<dyn Material>) -> Self {
        let rvec = Vec3::splat(radius.abs());
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Self {
            center,
            radius,
            material,
            bbox,
        }
    }

    /// Get the UV coordinates for a point on the unit sphere.
    pub fn sphere_uv(p: Point3) -> (f64, f64) {
        // theta: angle down from +Y
        // phi: angle around Y axis from -X
        let theta = (-p.y).acos();
        let phi = (-p.z).atan2(p.x) + PI;

        (phi / (2.0 * PI), theta / PI)
    }
}

impl Hittable for Sphere {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        _rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        if self.radius == 0.0 || self.radius.is_nan() {
            return None;
        }

        let oc = self.center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.accepts(root) {
            root = (h + sqrtd) / a;
            if !ray_t.accepts(root) {
                return None;
            }
        }

        let outward_normal = (ray.at(root) - self.center) / self.radius;
        Some(HitRecord::new(
            ray,
            root,
            outward_normal,
            self.material.as_ref(),
            Self::sphere_uv(outward_normal),
        ))
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.bbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Lambertian};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn gray_sphere(center: Point3, radius: f64) -> Sphere {
        Sphere::new(center, radius, Arc::new(Lambertian::new(Color::splat(0.5))))
    }

    #[test]
    fn test_sphere_hit_through_center() {
        let sphere = gray_sphere(Vec3::new(0.0, 0.0, -5.0), 2.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rng = StdRng::seed_from_u64(0);

        let rec = sphere
            .hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rng)
            .expect("ray through center hits");
        assert!((rec.t - 3.0).abs() < 1e-9);
        assert!(rec.front_face);
        assert!((rec.normal - Vec3::Z).length() < 1e-9);

        // Excluding the near root yields the far one at center + radius.
        let rec = sphere
            .hit(&ray, Interval::new(3.5, f64::INFINITY), &mut rng)
            .expect("far side is still in range");
        assert!((rec.t - 7.0).abs() < 1e-9);
        assert!(!rec.front_face);
    }

    #[test]
    fn test_sphere_hit_unnormalized_direction() {
        let sphere = gray_sphere(Vec3::new(0.0, 0.0, -1.0), 0.5);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -4.0));
        let rec = sphere
            .hit(&ray, Interval::new(0.001, f64::INFINITY), &mut StdRng::seed_from_u64(0))
            .expect("hit");
        assert!((rec.t - 0.125).abs() < 1e-12);
        assert!((rec.p - Point3::new(0.0, 0.0, -0.5)).length() < 1e-12);
    }

    #[test]
    fn test_sphere_miss_when_closest_approach_exceeds_radius() {
        let sphere = gray_sphere(Vec3::new(0.0, 0.0, -5.0), 1.0);
        let ray = Ray::new(Vec3::new(1.01, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        let mut rng = StdRng::seed_from_u64(0);

        assert!(sphere.hit(&ray, Interval::UNIVERSE, &mut rng).is_none());
    }

    #[test]
    fn test_sphere_miss_outside_interval() {
        let sphere = gray_sphere(Vec3::new(0.0, 0.0, -5.0), 1.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rng = StdRng::seed_from_u64(0);

        assert!(sphere.hit(&ray, Interval::new(0.001, 3.9), &mut rng).is_none());
        assert!(sphere.hit(&ray, Interval::new(6.0, 100.0), &mut rng).is_none());
        // Pointing away.
        let away = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        assert!(sphere.hit(&away, Interval::new(0.001, 100.0), &mut rng).is_none());
    }

    #[test]
    fn test_sphere_uv() {
        let (u, v) = Sphere::sphere_uv(Vec3::new(1.0, 0.0, 0.0));
        assert!((u - 0.5).abs() < 1e-12);
        assert!((v - 0.5).abs() < 1e-12);

        let (_, v) = Sphere::sphere_uv(Vec3::new(0.0, 1.0, 0.0));
        assert!((v - 1.0).abs() < 1e-12);

        let (_, v) = Sphere::sphere_uv(Vec3::new(0.0, -1.0, 0.0));
        assert!(v.abs() < 1e-12);

        let (u, _) = Sphere::sphere_uv(Vec3::new(0.0, 0.0, 1.0));
        assert!((u - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_negative_radius_flips_normal() {
        let hollow = gray_sphere(Point3::ZERO, -1.0);
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let mut rng = StdRng::seed_from_u64(0);

        let rec = hollow
            .hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rng)
            .expect("same surface as a positive radius");
        assert!((rec.t - 4.0).abs() < 1e-9);
        assert!(!rec.front_face);
        assert!((rec.normal - Vec3::Z).length() < 1e-9);

        let bbox = hollow.bounding_box().expect("bounded");
        assert_eq!(bbox.min(), Point3::splat(-1.0));
        assert_eq!(bbox.max(), Point3::splat(1.0));
    }

    #[test]
    fn test_zero_radius_is_never_hit() {
        let point = gray_sphere(Point3::ZERO, 0.0);
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let mut rng = StdRng::seed_from_u64(0);

        assert!(point.hit(&ray, Interval::UNIVERSE, &mut rng).is_none());
    }

    #[test]
    fn test_sphere_bounding_box() {
        let sphere = gray_sphere(Vec3::new(1.0, 2.0, 3.0), 0.5);
        let bbox = sphere.bounding_box().expect("spheres are bounded");
        assert_eq!(bbox.min(), Vec3::new(0.5, 1.5, 2.5));
        assert_eq!(bbox.max(), Vec3::new(1.5, 2.5, 3.5));
    }
}
