//! Built-in demo scenes.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::ValueEnum;
use rand::{Rng, RngCore};

use raggio_renderer::{
    random_f64, random_range, Axis, Bvh, CameraConfig, Color, ConstantMedium, Dielectric,
    DiffuseLight, Hittable, HittableList, Lambertian, Material, Metal, Point3, Rect, Rotated,
    Scene, Sphere, Texture, Translated, Vec3,
};

/// Which demo scene to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SceneKind {
    /// Box of colored walls, ceiling light, smoke and a tilted mirror
    Cornell,
    /// Field of small random spheres under an area light
    Random,
    /// Checker, noise and image-textured spheres
    Textures,
}

/// A scene together with the camera it is meant to be viewed from.
pub struct DemoScene {
    pub scene: Scene,
    pub camera: CameraConfig,
}

/// Build the requested scene, wrapped in a BVH.
///
/// `texture` is only used by [`SceneKind::Textures`].
pub fn build(kind: SceneKind, rng: &mut dyn RngCore, texture: Option<&Path>) -> Result<DemoScene> {
    let (world, background, camera) = match kind {
        SceneKind::Cornell => cornell_box()?,
        SceneKind::Random => random_spheres(rng)?,
        SceneKind::Textures => textured_spheres(rng, texture),
    };
    let bvh = Bvh::from_list(&world, rng).context("failed to build scene hierarchy")?;
    log::info!(
        "Built {:?} scene: {} objects, {} BVH nodes",
        kind,
        world.len(),
        bvh.node_count()
    );
    Ok(DemoScene {
        scene: Scene::new(Arc::new(bvh), background),
        camera,
    })
}

type SceneParts = (HittableList, Color, CameraConfig);

fn cornell_box() -> Result<SceneParts> {
    let red: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.65, 0.05, 0.05)));
    let white: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.73, 0.73, 0.73)));
    let green: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.12, 0.45, 0.15)));
    let light: Arc<dyn Material> = Arc::new(DiffuseLight::new(Color::splat(15.0)));
    let mirror: Arc<dyn Material> = Arc::new(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0));

    let s = 2.0;
    let mut world = HittableList::new();

    let walls = [
        (Point3::new(-s, 0.0, -s), Point3::new(s, 0.0, s), &white),
        (Point3::new(-s, 0.0, -s), Point3::new(s, 2.0 * s, -s), &white),
        (Point3::new(-s, 0.0, -s), Point3::new(-s, 2.0 * s, s), &red),
        (Point3::new(s, 0.0, -s), Point3::new(s, 2.0 * s, s), &green),
        (Point3::new(-s, 2.0 * s, -s), Point3::new(s, 2.0 * s, s), &white),
        (
            Point3::new(-0.5 * s, 2.0 * s - 0.1, -0.5 * s),
            Point3::new(0.5 * s, 2.0 * s - 0.1, 0.5 * s),
            &light,
        ),
    ];
    for (a, b, material) in walls {
        world.add(Arc::new(Rect::new(a, b, material.clone())?));
    }

    // Thin haze filling the whole room.
    let haze_boundary = Arc::new(Sphere::new(Point3::new(0.0, 1.0, 0.0), 9.0, white.clone()));
    world.add(Arc::new(ConstantMedium::new(
        haze_boundary,
        0.1,
        Color::splat(0.1),
    )));

    // A small mirror panel tilted about all three axes, turning clockwise
    // about X and Z.
    let mut panel: Arc<dyn Hittable> = Arc::new(Rect::new(
        Point3::new(-1.0, 0.0, 0.0),
        Point3::new(1.0, 2.0, 0.0),
        mirror,
    )?);
    panel = Arc::new(Rotated::new(panel, Axis::Z, -30.0));
    panel = Arc::new(Rotated::new(panel, Axis::X, -60.0));
    panel = Arc::new(Rotated::new(panel, Axis::Y, 30.0));
    world.add(panel);

    let camera = CameraConfig::default()
        .with_position(Point3::new(0.0, 2.0, 10.0), Point3::new(0.0, 2.0, 0.0), Vec3::Y)
        .with_lens(30.0, 0.1, 10.0);

    Ok((world, Color::splat(0.01), camera))
}

fn random_spheres(rng: &mut dyn RngCore) -> Result<SceneParts> {
    let mut world = HittableList::new();

    let checker = Arc::new(Texture::checker_colors(
        Color::new(0.2, 0.3, 0.1),
        Color::new(0.9, 0.9, 0.9),
    ));
    world.add(Arc::new(Sphere::new(
        Point3::new(0.0, -1000.0, 0.0),
        1000.0,
        Arc::new(Lambertian::with_texture(checker)),
    )));

    for a in (-11..11).step_by(4) {
        for b in (-11..11).step_by(4) {
            let choose_mat = random_f64(rng);
            let center = Point3::new(
                a as f64 + 0.9 * random_f64(rng),
                0.2,
                b as f64 + 0.9 * random_f64(rng),
            );
            if (center - Point3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            let material: Arc<dyn Material> = if choose_mat < 0.8 {
                let albedo = random_color(rng, 0.0, 1.0) * random_color(rng, 0.0, 1.0);
                Arc::new(Lambertian::new(albedo))
            } else if choose_mat < 0.95 {
                let albedo = random_color(rng, 0.5, 1.0);
                Arc::new(Metal::new(albedo, random_range(rng, 0.0, 0.5)))
            } else {
                Arc::new(Dielectric::new(1.5))
            };
            world.add(Arc::new(Sphere::new(center, 0.2, material)));
        }
    }

    world.add(Arc::new(Sphere::new(
        Point3::new(0.0, 1.0, 0.0),
        1.0,
        Arc::new(Dielectric::new(1.5)),
    )));
    world.add(Arc::new(Sphere::new(
        Point3::new(-4.0, 1.0, 0.0),
        1.0,
        Arc::new(Lambertian::new(Color::new(0.4, 0.2, 0.1))),
    )));
    world.add(Arc::new(Sphere::new(
        Point3::new(4.0, 1.0, 0.0),
        1.0,
        Arc::new(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0)),
    )));

    world.add(Arc::new(Rect::new(
        Point3::new(-4.0, 4.0, -4.0),
        Point3::new(4.0, 4.0, 4.0),
        Arc::new(DiffuseLight::new(Color::splat(4.0))),
    )?));

    let camera = CameraConfig::default()
        .with_position(Point3::new(13.0, 2.0, 3.0), Point3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.1, 10.0);

    Ok((world, Color::splat(0.01), camera))
}

fn textured_spheres(rng: &mut dyn RngCore, texture: Option<&Path>) -> SceneParts {
    let mut world = HittableList::new();

    let noise = Arc::new(Texture::noise(4.0, rng));
    let checker = Arc::new(Texture::checker(
        noise.clone(),
        Arc::new(Texture::solid(Color::new(0.8, 0.1, 0.1))),
    ));

    world.add(Arc::new(Sphere::new(
        Point3::new(0.0, -1000.0, 0.0),
        1000.0,
        Arc::new(Lambertian::with_texture(noise)),
    )));
    world.add(Arc::new(Sphere::new(
        Point3::new(0.0, 2.0, 0.0),
        2.0,
        Arc::new(Lambertian::with_texture(checker)),
    )));

    // Image sphere placed beside the checker ball; falls back to cyan when
    // the file cannot be read.
    if let Some(path) = texture {
        let image = Arc::new(Texture::image(path));
        let globe: Arc<dyn Hittable> = Arc::new(Sphere::new(
            Point3::ZERO,
            1.0,
            Arc::new(Lambertian::with_texture(image)),
        ));
        world.add(Arc::new(Translated::new(globe, Vec3::new(0.0, 1.0, 3.5))));
    }

    let glow = Color::new(
        rng.gen_range(3.0..5.0),
        rng.gen_range(3.0..5.0),
        rng.gen_range(3.0..5.0),
    );
    world.add(Arc::new(Sphere::new(
        Point3::new(0.0, 7.0, 0.0),
        1.5,
        Arc::new(DiffuseLight::new(glow)),
    )));

    let camera = CameraConfig::default()
        .with_position(Point3::new(13.0, 2.0, 3.0), Point3::new(0.0, 1.5, 0.0), Vec3::Y)
        .with_lens(25.0, 0.0, 10.0);

    (world, Color::new(0.7, 0.8, 1.0), camera)
}

fn random_color(rng: &mut dyn RngCore, min: f64, max: f64) -> Color {
    Color::new(
        random_range(rng, min, max),
        random_range(rng, min, max),
        random_range(rng, min, max),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use raggio_renderer::{Interval, Ray, T_MIN};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_every_scene_builds() {
        for kind in [SceneKind::Cornell, SceneKind::Random, SceneKind::Textures] {
            let mut rng = StdRng::seed_from_u64(0);
            let demo = build(kind, &mut rng, None).unwrap();
            assert!(demo.scene.world.bounding_box().is_some());
        }
    }

    #[test]
    fn test_cornell_view_ray_hits_back_wall() {
        let mut rng = StdRng::seed_from_u64(0);
        let demo = build(SceneKind::Cornell, &mut rng, None).unwrap();

        // Straight down the middle at the back wall, above the mirror panel.
        let ray = Ray::new(Point3::new(0.0, 3.5, 10.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = demo
            .scene
            .world
            .hit(&ray, Interval::new(T_MIN, f64::INFINITY), &mut rng);
        assert!(hit.is_some());
    }

    #[test]
    fn test_missing_texture_still_builds() {
        let mut rng = StdRng::seed_from_u64(0);
        let demo = build(
            SceneKind::Textures,
            &mut rng,
            Some(Path::new("definitely/not/here.png")),
        )
        .unwrap();
        assert!(demo.scene.world.bounding_box().is_some());
    }
}
