//! Simple path tracer example.
//!
//! Renders a smoke-filled, rotated box on a checker floor under an area light
//! and saves the result as `simple_render.png`.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use raggio_renderer::{
    render, Axis, Bvh, Camera, CameraConfig, Color, ConstantMedium, DiffuseLight, GeometryError,
    Hittable, HittableList, Lambertian, Material, Point3, Rect, RenderConfig, Rotated, Scene,
    Sphere, Texture, Translated, Vec3,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut rng = StdRng::seed_from_u64(1);
    let world = build_scene()?;
    log::info!("Created {} objects", world.len());

    let bvh = Bvh::from_list(&world, &mut rng)?;
    let scene = Scene::new(Arc::new(bvh), Color::splat(0.02));

    let config = RenderConfig {
        width: 320,
        height: 240,
        samples_per_pixel: 32,
        max_depth: 8,
        ..RenderConfig::default()
    };
    let camera = Camera::new(
        &CameraConfig::default()
            .with_position(Point3::new(6.0, 3.0, 8.0), Point3::new(0.0, 1.0, 0.0), Vec3::Y)
            .with_lens(35.0, 0.05, 10.0)
            .with_aspect_ratio(config.aspect_ratio()),
    );

    let frame = render(&camera, &scene, &config)?;
    frame.save_png("simple_render.png")?;
    Ok(())
}

/// Six rectangles forming the box `[0, size]^3`.
fn unit_box(size: f64, material: Arc<dyn Material>) -> Result<HittableList, GeometryError> {
    let p = |x: f64, y: f64, z: f64| Point3::new(x, y, z) * size;
    let faces = [
        (p(0.0, 0.0, 0.0), p(1.0, 1.0, 0.0)),
        (p(0.0, 0.0, 1.0), p(1.0, 1.0, 1.0)),
        (p(0.0, 0.0, 0.0), p(0.0, 1.0, 1.0)),
        (p(1.0, 0.0, 0.0), p(1.0, 1.0, 1.0)),
        (p(0.0, 0.0, 0.0), p(1.0, 0.0, 1.0)),
        (p(0.0, 1.0, 0.0), p(1.0, 1.0, 1.0)),
    ];

    let mut list = HittableList::new();
    for (a, b) in faces {
        list.add(Arc::new(Rect::new(a, b, material.clone())?));
    }
    Ok(list)
}

fn build_scene() -> Result<HittableList, GeometryError> {
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

    // Box turned 25 degrees and centered on the origin, filled with smoke.
    let white: Arc<dyn Material> = Arc::new(Lambertian::new(Color::splat(0.73)));
    let shell: Arc<dyn Hittable> = Arc::new(unit_box(2.0, white)?);
    let turned: Arc<dyn Hittable> = Arc::new(Rotated::new(shell, Axis::Y, 25.0));
    let placed: Arc<dyn Hittable> = Arc::new(Translated::new(turned, Vec3::new(-1.0, 0.0, -1.0)));
    world.add(Arc::new(ConstantMedium::new(placed, 0.8, Color::new(0.9, 0.6, 0.3))));

    world.add(Arc::new(Rect::new(
        Point3::new(-3.0, 5.0, -3.0),
        Point3::new(3.0, 5.0, 3.0),
        Arc::new(DiffuseLight::new(Color::splat(5.0))),
    )?));

    Ok(world)
}
