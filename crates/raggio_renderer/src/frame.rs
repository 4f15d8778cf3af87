//! Sample accumulation, tone mapping and image output.
//!
//! The framebuffer stores per-pixel sample *sums* in linear color, bottom
//! scanline first. Conversion to 8-bit divides by the sample count, applies
//! a gamma-2 curve and clamps.

use std::path::Path;

use bytemuck::{Pod, Zeroable};
use image::RgbImage;
use thiserror::Error;

use crate::Color;

/// Errors raised while writing a finished frame.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to create output location: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
}

/// One 8-bit RGB pixel.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Pack as `R | G << 8 | B << 16 | 0xFF << 24`.
    pub fn packed(self) -> u32 {
        u32::from(self.r) | (u32::from(self.g) << 8) | (u32::from(self.b) << 16) | (0xFF << 24)
    }
}

/// Convert a summed pixel color to 8-bit.
///
/// Each channel becomes `256 * clamp(sqrt(sum / samples), 0, 0.999)`,
/// truncated. Zero samples, negative sums and NaN all give black.
pub fn write_color(sum: Color, samples: u32) -> Rgb8 {
    if samples == 0 {
        return Rgb8::default();
    }
    let scale = 1.0 / f64::from(samples);

    let quantize = |c: f64| -> u8 {
        let gamma = (scale * c).sqrt();
        if gamma.is_nan() {
            return 0;
        }
        (256.0 * gamma.clamp(0.0, 0.999)) as u8
    };

    Rgb8::new(quantize(sum.x), quantize(sum.y), quantize(sum.z))
}

/// Floating-point accumulator for a whole frame.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    sums: Vec<Color>,
    samples: u32,
}

impl Framebuffer {
    /// Create a new framebuffer with no samples.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            sums: vec![Color::ZERO; width * height],
            samples: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Samples accumulated into every pixel so far.
    pub fn samples_per_pixel(&self) -> u32 {
        self.samples
    }

    /// Raw sample sums, row-major, bottom row first.
    pub fn sums(&self) -> &[Color] {
        &self.sums
    }

    /// Mean linear color of pixel `(i, j)`, with `j = 0` the bottom row.
    pub fn pixel(&self, i: usize, j: usize) -> Color {
        if self.samples == 0 {
            return Color::ZERO;
        }
        self.sums[j * self.width + i] / f64::from(self.samples)
    }

    pub(crate) fn sums_mut(&mut self) -> &mut [Color] {
        &mut self.sums
    }

    pub(crate) fn add_samples(&mut self, samples: u32) {
        self.samples += samples;
    }

    /// Tone-mapped 8-bit pixels, bottom row first.
    pub fn to_rgb8(&self) -> Vec<Rgb8> {
        self.sums
            .iter()
            .map(|sum| write_color(*sum, self.samples))
            .collect()
    }

    /// Tone-mapped pixels as a flat `R, G, B` byte buffer, bottom row first.
    pub fn to_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.to_rgb8()).to_vec()
    }

    /// Pixels packed into 32 bits each for a display surface.
    pub fn to_packed_rgba(&self) -> Vec<u32> {
        self.to_rgb8().into_iter().map(Rgb8::packed).collect()
    }

    /// Convert to an image with the top scanline first.
    pub fn to_image(&self) -> Result<RgbImage, OutputError> {
        let bytes = self.to_bytes();
        let expected = self.width * self.height * 3;
        let actual = bytes.len();

        let bottom_up = RgbImage::from_raw(self.width as u32, self.height as u32, bytes)
            .ok_or(OutputError::BufferSize { expected, actual })?;
        Ok(image::imageops::flip_vertical(&bottom_up))
    }

    /// Write the frame as a PNG, creating parent directories as needed.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), OutputError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        self.to_image()?
            .save_with_format(path, image::ImageFormat::Png)?;
        log::info!("Wrote {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}
