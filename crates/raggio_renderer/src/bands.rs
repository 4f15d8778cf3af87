//! Horizontal band partitioning for parallel rendering.
//!
//! The image rows are split into contiguous bands of equal height (the last
//! one may be shorter), one per worker. Each band owns a disjoint slice of the
//! framebuffer, so workers never synchronize while writing.

use rand::RngCore;

use crate::renderer::{render_pixel, RenderConfig, Scene};
use crate::{Camera, Color};

/// A contiguous range of image rows, bottom row first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    /// Position of this band in the partition
    pub index: usize,
    /// First row (inclusive)
    pub start_row: usize,
    /// Last row (exclusive)
    pub end_row: usize,
}

impl Band {
    pub fn new(index: usize, start_row: usize, end_row: usize) -> Self {
        Self {
            index,
            start_row,
            end_row,
        }
    }

    pub fn row_count(&self) -> usize {
        self.end_row - self.start_row
    }
}

/// Rows per band when `height` rows are split `bands` ways.
///
/// Uses ceiling division so that every row lands in some band.
pub fn rows_per_band(height: usize, bands: usize) -> usize {
    height.div_ceil(bands.max(1)).max(1)
}

/// Split `height` rows into at most `bands` contiguous bands.
///
/// Fewer bands are returned when there are fewer rows than bands. No band
/// is empty and together they cover `0..height` exactly once.
pub fn partition_rows(height: usize, bands: usize) -> Vec<Band> {
    let step = rows_per_band(height, bands);

    (0..height)
        .step_by(step)
        .enumerate()
        .map(|(index, start)| Band::new(index, start, (start + step).min(height)))
        .collect()
}

/// Render `samples` new samples for every pixel of `band`.
///
/// `sums` holds the band's rows of the accumulator; new sample sums are added
/// to it.
pub fn render_band(
    band: &Band,
    sums: &mut [Color],
    camera: &Camera,
    scene: &Scene,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) {
    let width = config.width;
    debug_assert_eq!(sums.len(), band.row_count() * width);

    for (local_j, row) in sums.chunks_mut(width).enumerate() {
        let j = band.start_row + local_j;
        for (i, sum) in row.iter_mut().enumerate() {
            *sum += render_pixel(camera, scene, i, j, config, rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn covered_rows(bands: &[Band]) -> Vec<usize> {
        bands.iter().flat_map(|b| b.start_row..b.end_row).collect()
    }

    #[test]
    fn test_partition_exact_fit() {
        let bands = partition_rows(512, 16);
        assert_eq!(bands.len(), 16);
        assert!(bands.iter().all(|b| b.row_count() == 32));
        assert_eq!(covered_rows(&bands), (0..512).collect::<Vec<_>>());
    }

    #[test]
    fn test_partition_covers_remainder_rows() {
        // 100 / 16 leaves a remainder that must not be dropped.
        let bands = partition_rows(100, 16);
        assert_eq!(rows_per_band(100, 16), 7);
        assert_eq!(bands.len(), 15);
        assert_eq!(bands.last().map(Band::row_count), Some(2));
        assert_eq!(covered_rows(&bands), (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_partition_fewer_rows_than_bands() {
        let bands = partition_rows(3, 16);
        assert_eq!(bands.len(), 3);
        assert!(bands.iter().all(|b| b.row_count() == 1));
        assert_eq!(bands.iter().map(|b| b.index).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_partition_degenerate_inputs() {
        assert!(partition_rows(0, 4).is_empty());
        assert_eq!(partition_rows(10, 0), vec![Band::new(0, 0, 10)]);
    }
}
