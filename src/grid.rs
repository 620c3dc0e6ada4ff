//! Pixel grids and rectangular regions

use crate::error::{ImatchError, Result};
use ndarray::Array3;

/// Channel indices for three-channel grids (B,G,R sample order).
pub const BLUE: usize = 0;
pub const GREEN: usize = 1;
pub const RED: usize = 2;

/// A 2D grid of 8-bit pixel samples, single-channel (intensity) or
/// three-channel in B,G,R order. Stored as (rows, cols, channels).
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGrid {
    data: Array3<u8>,
}

impl PixelGrid {
    pub(crate) fn from_array(data: Array3<u8>) -> Self {
        Self { data }
    }

    /// Create a grid from a flat row-major, channel-interleaved sample buffer.
    pub fn from_raw(rows: usize, cols: usize, channels: usize, samples: Vec<u8>) -> Result<Self> {
        if channels != 1 && channels != 3 {
            return Err(ImatchError::InvalidInput {
                reason: format!("unsupported channel count: {}", channels),
            });
        }
        if samples.len() != rows * cols * channels {
            return Err(ImatchError::InvalidInput {
                reason: format!(
                    "sample buffer length {} does not match {}x{}x{}",
                    samples.len(),
                    rows,
                    cols,
                    channels
                ),
            });
        }
        let data = Array3::from_shape_vec((rows, cols, channels), samples)
            .map_err(|e| ImatchError::InvalidInput {
                reason: e.to_string(),
            })?;
        Ok(Self { data })
    }

    /// Create a grid filled with a single value.
    pub fn filled(rows: usize, cols: usize, channels: usize, value: u8) -> Result<Self> {
        Self::from_raw(rows, cols, channels, vec![value; rows * cols * channels])
    }

    pub fn rows(&self) -> usize {
        self.data.shape()[0]
    }

    pub fn cols(&self) -> usize {
        self.data.shape()[1]
    }

    pub fn channels(&self) -> usize {
        self.data.shape()[2]
    }

    pub fn is_empty(&self) -> bool {
        self.rows() == 0 || self.cols() == 0
    }

    /// Sample at (row, col, channel).
    pub fn get(&self, row: usize, col: usize, channel: usize) -> u8 {
        self.data[[row, col, channel]]
    }

    pub fn set(&mut self, row: usize, col: usize, channel: usize, value: u8) {
        self.data[[row, col, channel]] = value;
    }

    /// The (blue, green, red) samples at one pixel of a three-channel grid.
    pub fn bgr(&self, row: usize, col: usize) -> (u8, u8, u8) {
        (
            self.data[[row, col, BLUE]],
            self.data[[row, col, GREEN]],
            self.data[[row, col, RED]],
        )
    }

    /// Collapse a three-channel grid to single-channel intensity using the
    /// Rec. 601 luma weights. A single-channel grid is returned as a copy.
    pub fn to_gray(&self) -> PixelGrid {
        if self.channels() == 1 {
            return self.clone();
        }
        let mut gray = Array3::<u8>::zeros((self.rows(), self.cols(), 1));
        for r in 0..self.rows() {
            for c in 0..self.cols() {
                let (b, g, rd) = self.bgr(r, c);
                let luma = 0.114 * b as f32 + 0.587 * g as f32 + 0.299 * rd as f32;
                gray[[r, c, 0]] = luma.round().min(255.0) as u8;
            }
        }
        PixelGrid { data: gray }
    }
}

/// A 2D grid of wide signed samples, the output of the gradient filters.
/// Convolved values can exceed the 8-bit range in either direction.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedGrid {
    data: Array3<i16>,
}

impl SignedGrid {
    pub fn zeros(rows: usize, cols: usize, channels: usize) -> Self {
        Self {
            data: Array3::zeros((rows, cols, channels)),
        }
    }

    pub fn rows(&self) -> usize {
        self.data.shape()[0]
    }

    pub fn cols(&self) -> usize {
        self.data.shape()[1]
    }

    pub fn channels(&self) -> usize {
        self.data.shape()[2]
    }

    pub fn get(&self, row: usize, col: usize, channel: usize) -> i16 {
        self.data[[row, col, channel]]
    }

    pub fn set(&mut self, row: usize, col: usize, channel: usize, value: i16) {
        self.data[[row, col, channel]] = value;
    }
}

/// An axis-aligned rectangle delimiting a sub-area of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub row: usize,
    pub col: usize,
    pub height: usize,
    pub width: usize,
}

impl Region {
    pub fn new(row: usize, col: usize, height: usize, width: usize) -> Self {
        Self {
            row,
            col,
            height,
            width,
        }
    }

    pub fn area(&self) -> usize {
        self.height * self.width
    }

    /// Clip to grid bounds. Returns None when nothing of the region remains;
    /// a zero-area region is invalid for histogram work.
    pub fn clip(&self, rows: usize, cols: usize) -> Option<Region> {
        if self.row >= rows || self.col >= cols {
            return None;
        }
        let height = self.height.min(rows - self.row);
        let width = self.width.min(cols - self.col);
        if height == 0 || width == 0 {
            return None;
        }
        Some(Region {
            row: self.row,
            col: self.col,
            height,
            width,
        })
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row >= self.row && row < self.row + self.height && col >= self.col && col < self.col + self.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_shape_check() {
        assert!(PixelGrid::from_raw(2, 2, 3, vec![0; 12]).is_ok());
        assert!(matches!(
            PixelGrid::from_raw(2, 2, 3, vec![0; 11]),
            Err(ImatchError::InvalidInput { .. })
        ));
        assert!(matches!(
            PixelGrid::from_raw(2, 2, 2, vec![0; 8]),
            Err(ImatchError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_bgr_order() {
        let grid = PixelGrid::from_raw(1, 1, 3, vec![10, 20, 30]).unwrap();
        assert_eq!(grid.bgr(0, 0), (10, 20, 30));
    }

    #[test]
    fn test_to_gray_white() {
        let grid = PixelGrid::filled(2, 2, 3, 255).unwrap();
        let gray = grid.to_gray();
        assert_eq!(gray.channels(), 1);
        assert_eq!(gray.get(0, 0, 0), 255);
    }

    #[test]
    fn test_region_clip_inside() {
        let region = Region::new(1, 1, 2, 2);
        assert_eq!(region.clip(4, 4), Some(region));
    }

    #[test]
    fn test_region_clip_overhang() {
        let region = Region::new(2, 2, 10, 10);
        let clipped = region.clip(4, 4).unwrap();
        assert_eq!(clipped, Region::new(2, 2, 2, 2));
    }

    #[test]
    fn test_region_clip_outside() {
        let region = Region::new(5, 5, 2, 2);
        assert_eq!(region.clip(4, 4), None);
    }

    #[test]
    fn test_region_contains() {
        let region = Region::new(1, 1, 2, 2);
        assert!(region.contains(1, 1));
        assert!(region.contains(2, 2));
        assert!(!region.contains(3, 1));
        assert!(!region.contains(0, 1));
    }
}
