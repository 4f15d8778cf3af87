//! Axis-aligned rectangle primitive.

use std::sync::Arc;

use crate::{
    hittable::{HitRecord, Hittable},
    Material, Point3, Ray,
};
use raggio_math::{Aabb, Axis, Interval, Vec3};
use rand::RngCore;
use thiserror::Error;

/// Errors raised while building geometry from corner points.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("rectangle corners {a:?} and {b:?} do not share an axis-aligned plane")]
    NotAxisAligned { a: Point3, b: Point3 },

    #[error("rectangle corners {a:?} and {b:?} span zero area")]
    Degenerate { a: Point3, b: Point3 },
}

/// A rectangle lying in one of the xy, xz or yz planes.
#[derive(Clone)]
pub struct Rect {
    /// Component-wise minimum corner
    lo: Point3,
    /// Component-wise maximum corner
    hi: Point3,
    /// Axis the rectangle is perpendicular to
    fixed: Axis,
    /// The two in-plane axes, in (u, v) order
    plane: (usize, usize),
    material: Arc<dyn Material>,
}

impl Rect {
    /// Build a rectangle from two opposite corners.
    ///
    /// The corners must agree on exactly the coordinate of the axis the
    /// rectangle is perpendicular to; x is checked first, then y, then z.
    pub fn new(a: Point3, b: Point3, material: Arc<dyn Material>) -> Result<Self, GeometryError> {
        let (fixed, plane) = if a.x == b.x {
            (Axis::X, (1, 2))
        } else if a.y == b.y {
            (Axis::Y, (0, 2))
        } else if a.z == b.z {
            (Axis::Z, (0, 1))
        } else {
            return Err(GeometryError::NotAxisAligned { a, b });
        };

        let lo = a.min(b);
        let hi = a.max(b);
        if hi[plane.0] - lo[plane.0] <= 0.0 || hi[plane.1] - lo[plane.1] <= 0.0 {
            return Err(GeometryError::Degenerate { a, b });
        }

        Ok(Self {
            lo,
            hi,
            fixed,
            plane,
            material,
        })
    }

    /// Axis the rectangle's normal points along.
    pub fn axis(&self) -> Axis {
        self.fixed
    }
}

impl Hittable for Rect {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        _rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let k = self.fixed.index();
        let (a1, a2) = self.plane;

        // Parallel rays never cross the plane.
        if ray.direction[k].abs() < 1e-12 {
            return None;
        }

        let t = (self.lo[k] - ray.origin[k]) / ray.direction[k];
        if !ray_t.accepts(t) {
            return None;
        }

        let p = ray.at(t);
        if p[a1] < self.lo[a1] || p[a1] > self.hi[a1] || p[a2] < self.lo[a2] || p[a2] > self.hi[a2]
        {
            return None;
        }

        let u = (p[a1] - self.lo[a1]) / (self.hi[a1] - self.lo[a1]);
        let v = (p[a2] - self.lo[a2]) / (self.hi[a2] - self.lo[a2]);

        let mut outward_normal = Vec3::ZERO;
        outward_normal[k] = 1.0;

        Some(HitRecord::new(
            ray,
            t,
            outward_normal,
            self.material.as_ref(),
            (u, v),
        ))
    }

    fn bounding_box(&self) -> Option<Aabb> {
        // from_points pads the flat axis so the box keeps a nonzero volume.
        Some(Aabb::from_points(self.lo, self.hi))
    }
}
