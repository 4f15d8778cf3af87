//! Thin-lens camera for ray generation.

use serde::{Deserialize, Serialize};

use crate::sampling::random_in_unit_disk;
use crate::{Point3, Ray, Vec3};
use rand::RngCore;

/// User-facing camera parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub look_from: Point3,
    pub look_at: Point3,
    pub vup: Vec3,
    /// Vertical field of view in degrees
    pub vfov: f64,
    /// Viewport width over height
    pub aspect_ratio: f64,
    /// Lens diameter; zero gives a pinhole camera
    pub aperture: f64,
    /// Distance from the lens to the plane of perfect focus
    pub focus_dist: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            look_from: Point3::ZERO,
            look_at: Point3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            aspect_ratio: 1.0,
            aperture: 0.0,
            focus_dist: 1.0,
        }
    }
}

impl CameraConfig {
    /// Set camera position.
    pub fn with_position(mut self, look_from: Point3, look_at: Point3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f64, aperture: f64, focus_dist: f64) -> Self {
        self.vfov = vfov;
        self.aperture = aperture;
        self.focus_dist = focus_dist;
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: f64) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }
}

/// Camera for generating rays into the scene.
///
/// All derived values are computed once in [`Camera::new`]; the camera is
/// immutable afterwards and shared by every render worker. A view direction
/// parallel to `vup` has no defined basis and yields NaN rays.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    origin: Point3,
    lower_left_corner: Point3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    lens_radius: f64,
}

impl Camera {
    pub fn new(config: &CameraConfig) -> Self {
        let theta = config.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = config.aspect_ratio * viewport_height;

        // Orthonormal basis: w points backwards, u right, v up
        let w = (config.look_from - config.look_at).normalize();
        let u = config.vup.cross(w).normalize();
        let v = w.cross(u);

        let origin = config.look_from;
        let horizontal = config.focus_dist * viewport_width * u;
        let vertical = config.focus_dist * viewport_height * v;
        let lower_left_corner = origin - horizontal / 2.0 - vertical / 2.0 - config.focus_dist * w;

        Self {
            origin,
            lower_left_corner,
            horizontal,
            vertical,
            u,
            v,
            w,
            lens_radius: config.aperture / 2.0,
        }
    }

    /// Ray through normalized viewport coordinates `(s, t)`.
    ///
    /// `(0, 0)` is the lower-left corner and `(1, 1)` the upper-right one.
    /// The origin is jittered over the lens disk when the aperture is open.
    pub fn get_ray(&self, s: f64, t: f64, rng: &mut dyn RngCore) -> Ray {
        let offset = if self.lens_radius > 0.0 {
            let rd = self.lens_radius * random_in_unit_disk(rng);
            self.u * rd.x + self.v * rd.y
        } else {
            Vec3::ZERO
        };

        let target = self.lower_left_corner + s * self.horizontal + t * self.vertical;
        Ray::new(self.origin + offset, target - self.origin - offset)
    }

    pub fn origin(&self) -> Point3 {
        self.origin
    }

    /// Unit vector pointing from the scene back towards the camera.
    pub fn backward(&self) -> Vec3 {
        self.w
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(&CameraConfig::default())
    }
}
