//! Lattice gradient noise and turbulence.

use crate::sampling::random_vec3;
use crate::{Point3, Vec3};
use rand::seq::SliceRandom;
use rand::RngCore;

const POINT_COUNT: usize = 256;

/// Octaves summed by [`Perlin::turbulence`].
pub const DEFAULT_TURBULENCE_DEPTH: u32 = 7;

/// Perlin noise over a 256-cell lattice of random unit gradients.
#[derive(Debug, Clone)]
pub struct Perlin {
    gradients: Vec<Vec3>,
    perm_x: Vec<usize>,
    perm_y: Vec<usize>,
    perm_z: Vec<usize>,
}

impl Perlin {
    pub fn new(rng: &mut dyn RngCore) -> Self {
        let gradients = (0..POINT_COUNT)
            .map(|_| random_vec3(rng, -1.0, 1.0).normalize_or_zero())
            .collect();

        Self {
            gradients,
            perm_x: generate_perm(rng),
            perm_y: generate_perm(rng),
            perm_z: generate_perm(rng),
        }
    }

    /// Smoothed noise in roughly `[-1, 1]`.
    pub fn noise(&self, p: Point3) -> f64 {
        let u = p.x - p.x.floor();
        let v = p.y - p.y.floor();
        let w = p.z - p.z.floor();

        let i = p.x.floor() as i64;
        let j = p.y.floor() as i64;
        let k = p.z.floor() as i64;

        let mut c = [[[Vec3::ZERO; 2]; 2]; 2];
        for (di, plane) in c.iter_mut().enumerate() {
            for (dj, row) in plane.iter_mut().enumerate() {
                for (dk, cell) in row.iter_mut().enumerate() {
                    let idx = self.perm_x[wrap(i + di as i64)]
                        ^ self.perm_y[wrap(j + dj as i64)]
                        ^ self.perm_z[wrap(k + dk as i64)];
                    *cell = self.gradients[idx];
                }
            }
        }

        trilinear_interp(&c, u, v, w)
    }

    /// Sum of `depth` octaves of noise, each at double the frequency and
    /// half the weight of the last. Not normalized.
    pub fn turbulence(&self, p: Point3, depth: u32) -> f64 {
        let mut accum = 0.0;
        let mut temp_p = p;
        let mut weight = 1.0;

        for _ in 0..depth {
            accum += weight * self.noise(temp_p);
            weight *= 0.5;
            temp_p *= 2.0;
        }

        accum.abs()
    }
}

#[inline]
fn wrap(n: i64) -> usize {
    (n & (POINT_COUNT as i64 - 1)) as usize
}

fn generate_perm(rng: &mut dyn RngCore) -> Vec<usize> {
    let mut p: Vec<usize> = (0..POINT_COUNT).collect();
    p.shuffle(rng);
    p
}

fn trilinear_interp(c: &[[[Vec3; 2]; 2]; 2], u: f64, v: f64, w: f64) -> f64 {
    // Hermite smoothing removes grid artifacts.
    let uu = u * u * (3.0 - 2.0 * u);
    let vv = v * v * (3.0 - 2.0 * v);
    let ww = w * w * (3.0 - 2.0 * w);

    let mut accum = 0.0;
    for (i, plane) in c.iter().enumerate() {
        for (j, row) in plane.iter().enumerate() {
            for (k, gradient) in row.iter().enumerate() {
                let (fi, fj, fk) = (i as f64, j as f64, k as f64);
                let weight = Vec3::new(u - fi, v - fj, w - fk);
                accum += (fi * uu + (1.0 - fi) * (1.0 - uu))
                    * (fj * vv + (1.0 - fj) * (1.0 - vv))
                    * (fk * ww + (1.0 - fk) * (1.0 - ww))
                    * gradient.dot(weight);
            }
        }
    }
    accum
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_noise_is_zero_on_lattice_points() {
        let perlin = Perlin::new(&mut StdRng::seed_from_u64(1));
        for p in [Point3::ZERO, Point3::new(3.0, -2.0, 7.0), Point3::new(255.0, 256.0, -1.0)] {
            assert!(perlin.noise(p).abs() < 1e-12);
        }
    }

    #[test]
    fn test_noise_is_deterministic_and_bounded() {
        let a = Perlin::new(&mut StdRng::seed_from_u64(5));
        let b = Perlin::new(&mut StdRng::seed_from_u64(5));
        let mut rng = StdRng::seed_from_u64(6);

        for _ in 0..200 {
            let p = random_vec3(&mut rng, -50.0, 50.0);
            let n = a.noise(p);
            assert_eq!(n, b.noise(p));
            assert!(n.abs() <= 2.0);
        }
    }

    #[test]
    fn test_turbulence_non_negative() {
        let perlin = Perlin::new(&mut StdRng::seed_from_u64(2));
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let p = random_vec3(&mut rng, -10.0, 10.0);
            assert!(perlin.turbulence(p, DEFAULT_TURBULENCE_DEPTH) >= 0.0);
        }
    }

    #[test]
    fn test_permutation_is_complete() {
        let mut perm = generate_perm(&mut StdRng::seed_from_u64(4));
        perm.sort_unstable();
        assert_eq!(perm, (0..POINT_COUNT).collect::<Vec<_>>());
    }
}
