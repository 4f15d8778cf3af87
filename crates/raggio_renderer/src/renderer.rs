//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing bounded by a maximum depth
//! - Anti-aliasing via jittered multi-sampling
//! - Banded parallel rendering with one RNG per band
//! - Progressive accumulation across passes

use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bands::{partition_rows, render_band, rows_per_band};
use crate::sampling::random_f64;
use crate::{Camera, Color, Framebuffer, Hittable, HittableList, Ray};
use raggio_math::Interval;

/// Closest accepted hit distance, to avoid self-intersection ("shadow acne").
pub const T_MIN: f64 = 0.001;

/// Errors raised while setting up a render.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Image width in pixels
    pub width: usize,
    /// Image height in pixels
    pub height: usize,
    /// Samples per pixel, per pass
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Worker threads, which is also the number of row bands
    pub threads: usize,
    /// Base seed for every band's generator
    pub seed: u64,
    /// Accumulation passes for progressive rendering
    pub passes: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            samples_per_pixel: 128,
            max_depth: 8,
            threads: 16,
            seed: 0,
            passes: 1,
        }
    }
}

impl RenderConfig {
    /// Width over height, for building a matching camera.
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height.max(1) as f64
    }
}

/// Everything a render reads: a root hittable and a constant background.
#[derive(Clone)]
pub struct Scene {
    pub world: Arc<dyn Hittable>,
    pub background: Color,
}

impl Scene {
    pub fn new(world: Arc<dyn Hittable>, background: Color) -> Self {
        Self { world, background }
    }

    /// A scene with nothing in it.
    pub fn empty(background: Color) -> Self {
        Self::new(Arc::new(HittableList::new()), background)
    }
}

/// Compute the color seen by a ray.
///
/// Returns the background on a miss, and emitted light plus attenuated
/// incoming light on a hit. Paths are cut off (black) once `depth` reaches 0.
pub fn ray_color(ray: &Ray, scene: &Scene, depth: u32, rng: &mut dyn RngCore) -> Color {
    if depth == 0 {
        return Color::ZERO;
    }

    let Some(rec) = scene
        .world
        .hit(ray, Interval::new(T_MIN, f64::INFINITY), rng)
    else {
        return scene.background;
    };

    let emission = rec.material.emitted(rec.u, rec.v, rec.p);

    match rec.material.scatter(ray, &rec, rng) {
        Some(result) => {
            let incoming = ray_color(&result.scattered, scene, depth - 1, rng);
            emission + result.attenuation * incoming
        }
        None => emission,
    }
}

/// Sum of `config.samples_per_pixel` path samples through pixel `(i, j)`.
///
/// Row `j = 0` is the bottom of the image. The sum is divided by the sample
/// count only at tone-mapping time.
pub fn render_pixel(
    camera: &Camera,
    scene: &Scene,
    i: usize,
    j: usize,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    // Single-pixel images map their one column or row to the viewport edge.
    let u_span = config.width.saturating_sub(1).max(1) as f64;
    let v_span = config.height.saturating_sub(1).max(1) as f64;

    let mut pixel_color = Color::ZERO;
    for _ in 0..config.samples_per_pixel {
        let s = (i as f64 + random_f64(rng)) / u_span;
        let t = (j as f64 + random_f64(rng)) / v_span;
        let ray = camera.get_ray(s, t, rng);
        pixel_color += ray_color(&ray, scene, config.max_depth, rng);
    }
    pixel_color
}

/// Render one frame of `config.passes` accumulated passes.
pub fn render(
    camera: &Camera,
    scene: &Scene,
    config: &RenderConfig,
) -> Result<Framebuffer, RenderError> {
    render_progressive(camera, scene, config, |_| true)
}

/// Render pass after pass into one accumulator.
///
/// After every pass `on_pass` sees the frame so far; returning `false` stops
/// before the next pass. A pass in progress always runs to completion.
pub fn render_progressive<F>(
    camera: &Camera,
    scene: &Scene,
    config: &RenderConfig,
    mut on_pass: F,
) -> Result<Framebuffer, RenderError>
where
    F: FnMut(&Framebuffer) -> bool,
{
    let mut frame = Framebuffer::new(config.width, config.height);
    let bands = config.threads.max(1);
    let passes = config.passes.max(1);

    log::info!(
        "Rendering {}x{}, {} spp x {} passes, depth {}, {} bands",
        config.width,
        config.height,
        config.samples_per_pixel,
        passes,
        config.max_depth,
        partition_rows(config.height, bands).len()
    );
    let start = Instant::now();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(bands)
        .build()?;

    for pass in 0..passes {
        pool.install(|| render_pass(camera, scene, config, pass, frame.sums_mut()));
        frame.add_samples(config.samples_per_pixel);

        log::debug!(
            "Pass {} done, {} spp accumulated",
            pass + 1,
            frame.samples_per_pixel()
        );
        if !on_pass(&frame) {
            log::info!("Render stopped after pass {}", pass + 1);
            break;
        }
    }

    log::info!(
        "Render finished in {:.2}s",
        start.elapsed().as_secs_f64()
    );
    Ok(frame)
}

/// Add one pass of samples to `sums`, band by band in parallel.
fn render_pass(
    camera: &Camera,
    scene: &Scene,
    config: &RenderConfig,
    pass: u32,
    sums: &mut [Color],
) {
    if config.width == 0 || config.height == 0 {
        return;
    }
    let bands = partition_rows(config.height, config.threads);
    let chunk = rows_per_band(config.height, config.threads) * config.width;

    sums.par_chunks_mut(chunk)
        .zip(bands.par_iter())
        .for_each(|(band_sums, band)| {
            let band_start = Instant::now();
            let mut rng = StdRng::seed_from_u64(band_seed(config.seed, pass, band.index));

            render_band(band, band_sums, camera, scene, config, &mut rng);

            log::debug!(
                "Band {} (rows {}-{}) finished in {:.3}s",
                band.index,
                band.start_row,
                band.end_row,
                band_start.elapsed().as_secs_f64()
            );
        });
}

/// Derive an independent seed for one band of one pass.
fn band_seed(seed: u64, pass: u32, band: usize) -> u64 {
    // SplitMix64 finalizer over the combined inputs.
    let mut z = seed
        .wrapping_add(u64::from(pass).wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .wrapping_add((band as u64).wrapping_mul(0xD1B5_4A32_D192_ED03));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CameraConfig, DiffuseLight, Lambertian, Point3, Sphere, Vec3};

    fn light_sphere() -> Scene {
        let world = HittableList::from(vec![Arc::new(Sphere::new(
            Point3::ZERO,
            1.0,
            Arc::new(DiffuseLight::new(Color::splat(4.0))),
        )) as Arc<dyn Hittable>]);
        Scene::new(Arc::new(world), Color::new(0.1, 0.2, 0.3))
    }

    fn small_config() -> RenderConfig {
        RenderConfig {
            width: 8,
            height: 6,
            samples_per_pixel: 2,
            max_depth: 4,
            threads: 4,
            seed: 7,
            passes: 1,
        }
    }

    #[test]
    fn test_ray_color_depth_zero_is_black() {
        let scene = light_sphere();
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(ray_color(&ray, &scene, 0, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_ray_color_miss_returns_background() {
        let scene = light_sphere();
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 1.0));
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(ray_color(&ray, &scene, 8, &mut rng), Color::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_ray_color_emitter_stops_recursion() {
        let scene = light_sphere();
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(ray_color(&ray, &scene, 1, &mut rng), Color::splat(4.0));
        assert_eq!(ray_color(&ray, &scene, 8, &mut rng), Color::splat(4.0));
    }

    #[test]
    fn test_ray_color_diffuse_under_white_sky() {
        // A gray diffuse ball under a white sky: one bounce returns
        // albedo * background unless the bounce hits the ball again,
        // which is impossible for a convex shape.
        let world = HittableList::from(vec![Arc::new(Sphere::new(
            Point3::ZERO,
            1.0,
            Arc::new(Lambertian::new(Color::splat(0.5))),
        )) as Arc<dyn Hittable>]);
        let scene = Scene::new(Arc::new(world), Color::ONE);
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..16 {
            let c = ray_color(&ray, &scene, 2, &mut rng);
            assert!((c - Color::splat(0.5)).length() < 1e-12);
        }
    }

    #[test]
    fn test_render_fills_every_row() {
        // 6 rows over 4 bands leaves a remainder band.
        let config = small_config();
        let camera = Camera::new(&CameraConfig::default().with_aspect_ratio(config.aspect_ratio()));
        let scene = Scene::empty(Color::new(0.25, 0.25, 0.25));

        let frame = render(&camera, &scene, &config).unwrap();
        assert_eq!(frame.samples_per_pixel(), 2);
        for sum in frame.sums() {
            assert_eq!(*sum, Color::splat(0.5));
        }
    }

    #[test]
    fn test_render_is_deterministic_for_fixed_seed() {
        let config = small_config();
        let camera = Camera::new(
            &CameraConfig::default()
                .with_position(Point3::new(0.0, 0.0, 4.0), Point3::ZERO, Vec3::Y)
                .with_aspect_ratio(config.aspect_ratio()),
        );
        let world = HittableList::from(vec![Arc::new(Sphere::new(
            Point3::ZERO,
            1.0,
            Arc::new(Lambertian::new(Color::splat(0.5))),
        )) as Arc<dyn Hittable>]);
        let scene = Scene::new(Arc::new(world), Color::ONE);

        let a = render(&camera, &scene, &config).unwrap();
        let b = render(&camera, &scene, &config).unwrap();
        assert_eq!(a.sums(), b.sums());
    }

    #[test]
    fn test_progressive_accumulates_and_stops_on_request() {
        let config = RenderConfig {
            passes: 5,
            ..small_config()
        };
        let camera = Camera::default();
        let scene = Scene::empty(Color::ONE);

        let mut seen = Vec::new();
        let frame = render_progressive(&camera, &scene, &config, |frame| {
            seen.push(frame.samples_per_pixel());
            seen.len() < 3
        })
        .unwrap();

        assert_eq!(seen, vec![2, 4, 6]);
        assert_eq!(frame.samples_per_pixel(), 6);
        assert_eq!(frame.pixel(0, 0), Color::ONE);
    }

    #[test]
    fn test_band_seeds_differ() {
        let seeds = [
            band_seed(1, 0, 0),
            band_seed(1, 0, 1),
            band_seed(1, 1, 0),
            band_seed(2, 0, 0),
        ];
        for (n, a) in seeds.iter().enumerate() {
            for b in &seeds[n + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_render_config_defaults() {
        let config = RenderConfig::default();
        assert_eq!((config.width, config.height), (512, 512));
        assert_eq!(config.samples_per_pixel, 128);
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.threads, 16);

        let parsed: RenderConfig = serde_json::from_str(r#"{ "width": 64 }"#).unwrap();
        assert_eq!(parsed.width, 64);
        assert_eq!(parsed.height, 512);
    }
}
