//! Color fields sampled by materials.
//!
//! A texture is a pure function of surface UV and hit point. The set of
//! texture kinds is closed, so they live in one enum and dispatch by match.

use std::path::Path;
use std::sync::Arc;

use crate::perlin::{Perlin, DEFAULT_TURBULENCE_DEPTH};
use crate::{Color, Point3};
use rand::RngCore;
use thiserror::Error;

/// Color returned by an image texture that has no pixels.
pub const MISSING_TEXTURE_COLOR: Color = Color::new(0.0, 1.0, 1.0);

/// Errors that can occur while loading an image texture.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("failed to load texture image '{path}': {source}")]
    Load {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("texture image '{path}' has no pixels")]
    Empty { path: String },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A 2D/3D color field.
#[derive(Debug, Clone)]
pub enum Texture {
    /// Constant color.
    Solid(Color),
    /// 3D checkerboard switching between two child textures.
    Checker { even: Arc<Texture>, odd: Arc<Texture> },
    /// Gray turbulence evaluated at `scale * p`.
    Noise { perlin: Perlin, scale: f64 },
    /// Nearest-pixel image lookup by UV.
    Image(ImageTexture),
}

impl Texture {
    pub fn solid(color: Color) -> Self {
        Texture::Solid(color)
    }

    /// Checkerboard over two child textures.
    pub fn checker(even: Arc<Texture>, odd: Arc<Texture>) -> Self {
        Texture::Checker { even, odd }
    }

    /// Checkerboard over two solid colors.
    pub fn checker_colors(even: Color, odd: Color) -> Self {
        Texture::Checker {
            even: Arc::new(Texture::Solid(even)),
            odd: Arc::new(Texture::Solid(odd)),
        }
    }

    /// Turbulence noise. The lattice is drawn from `rng` once, here.
    pub fn noise(scale: f64, rng: &mut dyn RngCore) -> Self {
        Texture::Noise {
            perlin: Perlin::new(rng),
            scale,
        }
    }

    /// Image texture loaded from disk. Never fails; see [`ImageTexture::open`].
    pub fn image(path: impl AsRef<Path>) -> Self {
        Texture::Image(ImageTexture::open(path))
    }

    /// Color at surface coordinates `(u, v)` and hit point `p`.
    pub fn value(&self, u: f64, v: f64, p: Point3) -> Color {
        match self {
            Texture::Solid(color) => *color,
            Texture::Checker { even, odd } => {
                let sines = (10.0 * p.x).sin() * (10.0 * p.y).sin() * (10.0 * p.z).sin();
                if sines < 0.0 {
                    even.value(u, v, p)
                } else {
                    odd.value(u, v, p)
                }
            }
            Texture::Noise { perlin, scale } => {
                Color::ONE * perlin.turbulence(*scale * p, DEFAULT_TURBULENCE_DEPTH)
            }
            Texture::Image(image) => image.value(u, v),
        }
    }
}

/// Decoded 8-bit RGB pixels, row 0 at the top of the image.
#[derive(Clone, Default)]
pub struct ImageTexture {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl std::fmt::Debug for ImageTexture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageTexture")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl ImageTexture {
    const BYTES_PER_PIXEL: usize = 3;

    /// Load an image, degrading to an empty texture if it cannot be decoded.
    ///
    /// The failure is logged once here; sampling an empty texture returns
    /// [`MISSING_TEXTURE_COLOR`].
    pub fn open(path: impl AsRef<Path>) -> Self {
        match Self::try_open(path) {
            Ok(texture) => texture,
            Err(e) => {
                log::warn!("{e}; using missing-texture color");
                Self::default()
            }
        }
    }

    /// Load an image, reporting why it failed.
    pub fn try_open(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| TextureError::Load {
            path: path.display().to_string(),
            source,
        })?;

        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();
        if width == 0 || height == 0 {
            return Err(TextureError::Empty {
                path: path.display().to_string(),
            });
        }

        log::debug!("Loaded texture {} ({}x{})", path.display(), width, height);
        Ok(Self::from_rgb8(width as usize, height as usize, rgb.into_raw()))
    }

    /// Wrap already-decoded RGB bytes. A buffer whose length does not match
    /// the dimensions yields an empty texture.
    pub fn from_rgb8(width: usize, height: usize, data: Vec<u8>) -> Self {
        if data.len() != width * height * Self::BYTES_PER_PIXEL {
            log::warn!(
                "texture buffer holds {} bytes, expected {}x{}x{}",
                data.len(),
                width,
                height,
                Self::BYTES_PER_PIXEL
            );
            return Self::default();
        }
        Self { width, height, data }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Nearest-pixel lookup. UV is clamped to `[0, 1]` and `v` is flipped so
    /// that `v = 1` samples the top row.
    pub fn value(&self, u: f64, v: f64) -> Color {
        if self.data.is_empty() {
            return MISSING_TEXTURE_COLOR;
        }

        let u = u.clamp(0.0, 1.0);
        let v = 1.0 - v.clamp(0.0, 1.0);

        let i = ((u * self.width as f64) as usize).min(self.width - 1);
        let j = ((v * self.height as f64) as usize).min(self.height - 1);

        let idx = (j * self.width + i) * Self::BYTES_PER_PIXEL;
        let scale = 1.0 / 255.0;
        Color::new(
            scale * self.data[idx] as f64,
            scale * self.data[idx + 1] as f64,
            scale * self.data[idx + 2] as f64,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_solid_ignores_inputs() {
        let tex = Texture::solid(Color::new(1.0, 0.5, 0.0));
        assert_eq!(tex.value(0.0, 0.0, Point3::ZERO), Color::new(1.0, 0.5, 0.0));
        assert_eq!(tex.value(0.7, 0.2, Point3::splat(9.0)), Color::new(1.0, 0.5, 0.0));
    }

    #[test]
    fn test_checker_uses_sign_of_sine_product() {
        let even = Color::new(1.0, 0.0, 0.0);
        let odd = Color::new(0.0, 0.0, 1.0);
        let tex = Texture::checker_colors(even, odd);

        // sin(1)^3 > 0
        assert_eq!(tex.value(0.0, 0.0, Point3::splat(0.1)), odd);
        // sin(-1) * sin(1) * sin(1) < 0
        assert_eq!(tex.value(0.0, 0.0, Point3::new(-0.1, 0.1, 0.1)), even);
    }

    #[test]
    fn test_checker_independent_of_uv() {
        let tex = Texture::checker_colors(Color::ZERO, Color::ONE);
        let p = Point3::new(0.3, -0.2, 0.45);
        assert_eq!(tex.value(0.0, 0.0, p), tex.value(1.0, 1.0, p));
    }

    #[test]
    fn test_noise_is_gray() {
        let tex = Texture::noise(4.0, &mut StdRng::seed_from_u64(11));
        let c = tex.value(0.0, 0.0, Point3::new(0.31, 0.77, -1.3));
        assert_eq!(c.x, c.y);
        assert_eq!(c.y, c.z);
        assert!(c.x >= 0.0);
    }

    fn two_by_two() -> ImageTexture {
        // top row: red, green / bottom row: blue, white
        ImageTexture::from_rgb8(
            2,
            2,
            vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255],
        )
    }

    #[test]
    fn test_image_v_is_flipped() {
        let tex = two_by_two();
        assert_eq!(tex.value(0.0, 1.0), Color::new(1.0, 0.0, 0.0));
        assert_eq!(tex.value(0.0, 0.0), Color::new(0.0, 0.0, 1.0));
        assert_eq!(tex.value(0.99, 0.99), Color::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_image_clamps_uv() {
        let tex = two_by_two();
        assert_eq!(tex.value(-3.0, 5.0), tex.value(0.0, 1.0));
        assert_eq!(tex.value(4.0, -2.0), Color::ONE);
    }

    #[test]
    fn test_png_round_trip_keeps_row_order() {
        let path = std::env::temp_dir().join(format!("raggio_tex_{}.png", std::process::id()));
        let mut img = image::RgbImage::new(2, 2);
        img.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        img.put_pixel(1, 0, image::Rgb([0, 255, 0]));
        img.put_pixel(0, 1, image::Rgb([0, 0, 255]));
        img.put_pixel(1, 1, image::Rgb([255, 255, 255]));
        img.save(&path).unwrap();

        let loaded = ImageTexture::try_open(&path);
        let tex = Texture::image(&path);
        std::fs::remove_file(&path).ok();

        let loaded = loaded.unwrap();
        assert!(!loaded.is_empty());
        // v = 1 is the top row of the file.
        assert_eq!(loaded.value(0.0, 1.0), Color::new(1.0, 0.0, 0.0));
        assert_eq!(loaded.value(0.0, 0.0), Color::new(0.0, 0.0, 1.0));
        assert_eq!(tex.value(0.99, 0.99, Point3::ZERO), Color::new(0.0, 1.0, 0.0));
        assert_eq!(tex.value(0.99, 0.0, Point3::ZERO), Color::ONE);
    }

    #[test]
    fn test_missing_image_returns_cyan() {
        let tex = Texture::image("definitely/not/here.png");
        assert_eq!(tex.value(0.5, 0.5, Point3::ZERO), MISSING_TEXTURE_COLOR);
    }

    #[test]
    fn test_try_open_reports_error() {
        assert!(matches!(
            ImageTexture::try_open("definitely/not/here.png"),
            Err(TextureError::Load { .. })
        ));
    }

    #[test]
    fn test_mismatched_buffer_is_empty() {
        let tex = ImageTexture::from_rgb8(4, 4, vec![0; 5]);
        assert!(tex.is_empty());
        assert_eq!(tex.value(0.5, 0.5), MISSING_TEXTURE_COLOR);
    }
}
