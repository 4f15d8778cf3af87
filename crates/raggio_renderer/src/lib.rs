//! Raggio - CPU Path Tracing
//!
//! A Monte Carlo path tracer for physically-based rendering of emissive,
//! diffuse, metallic, glass and volumetric scenes.
//!
//! A render needs a [`Scene`] (a root [`Hittable`] plus a background color),
//! a [`Camera`] and a [`RenderConfig`]. [`render`] splits the image into row
//! bands that are traced in parallel and returns a [`Framebuffer`] of sample
//! sums, which can be tone-mapped to 8-bit and saved as PNG.

mod bands;
mod bvh;
mod camera;
mod frame;
mod hittable;
mod material;
mod medium;
mod perlin;
mod rect;
mod renderer;
mod sampling;
mod sphere;
mod texture;
mod transform;

pub use bands::{partition_rows, render_band, rows_per_band, Band};
pub use bvh::{Bvh, BvhError};
pub use camera::{Camera, CameraConfig};
pub use frame::{write_color, Framebuffer, OutputError, Rgb8};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{
    Color, Dielectric, DiffuseLight, Isotropic, Lambertian, Material, Metal, ScatterResult,
};
pub use medium::ConstantMedium;
pub use perlin::{Perlin, DEFAULT_TURBULENCE_DEPTH};
pub use rect::{GeometryError, Rect};
pub use renderer::{
    ray_color, render, render_pixel, render_progressive, RenderConfig, RenderError, Scene, T_MIN,
};
pub use sampling::{
    random_f64, random_in_unit_disk, random_in_unit_sphere, random_range, random_unit_vector,
    random_vec3,
};
pub use sphere::Sphere;
pub use texture::{ImageTexture, Texture, TextureError, TextureResult, MISSING_TEXTURE_COLOR};
pub use transform::{Rotated, Translated};

/// Re-export Vec3 and common math types from raggio_math
pub use raggio_math::{Aabb, Axis, Interval, Point3, Ray, Rotation, Vec3};
