//! Random sampling helpers.
//!
//! Every draw goes through an explicit generator so each render worker can
//! own its own stream.

use crate::Vec3;
use rand::{Rng, RngCore};

/// Uniform draw in `[0, 1)`.
#[inline]
pub fn random_f64(rng: &mut dyn RngCore) -> f64 {
    rng.gen::<f64>()
}

/// Uniform draw in `[min, max)`.
#[inline]
pub fn random_range(rng: &mut dyn RngCore, min: f64, max: f64) -> f64 {
    min + (max - min) * random_f64(rng)
}

/// Vector with each component uniform in `[min, max)`.
pub fn random_vec3(rng: &mut dyn RngCore, min: f64, max: f64) -> Vec3 {
    Vec3::new(
        random_range(rng, min, max),
        random_range(rng, min, max),
        random_range(rng, min, max),
    )
}

/// Uniform point strictly inside the unit sphere (rejection sampling).
pub fn random_in_unit_sphere(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = random_vec3(rng, -1.0, 1.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Uniform direction on the unit sphere.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = random_vec3(rng, -1.0, 1.0);
        let len_sq = p.length_squared();
        // Reject points too close to the center; normalizing them is unstable.
        if len_sq > 1e-160 && len_sq < 1.0 {
            return p / len_sq.sqrt();
        }
    }
}

/// Uniform point inside the unit disk on the z = 0 plane.
pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(
            random_range(rng, -1.0, 1.0),
            random_range(rng, -1.0, 1.0),
            0.0,
        );
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}
