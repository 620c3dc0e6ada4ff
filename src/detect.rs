//! Detector boundary for face-aware extraction
//!
//! Detection itself is an external concern. The pipeline only needs
//! something that maps a grayscale grid to zero or more boxes; zero boxes
//! is a valid, non-error outcome.

use crate::grid::{PixelGrid, Region};

/// An external detector producing axis-aligned boxes from a grayscale grid.
pub trait FaceDetector {
    fn detect(&self, gray: &PixelGrid) -> Vec<Region>;
}

/// Adapter for callers that already have boxes (a prior detector run, a
/// labeled dataset): always reports the same regions regardless of input.
#[derive(Debug, Clone, Default)]
pub struct StaticDetector {
    regions: Vec<Region>,
}

impl StaticDetector {
    pub fn new(regions: Vec<Region>) -> Self {
        Self { regions }
    }
}

impl FaceDetector for StaticDetector {
    fn detect(&self, _gray: &PixelGrid) -> Vec<Region> {
        self.regions.clone()
    }
}
