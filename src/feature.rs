//! Feature extraction methods
//!
//! Five interchangeable methods, each mapping a pixel grid to a
//! fixed-length feature vector. The histogram family works in
//! rg-chromaticity space, so absolute brightness cancels out; spatial
//! locality comes from multi-region composition rather than from the
//! bins themselves.

use crate::detect::FaceDetector;
use crate::error::{ImatchError, Result};
use crate::filter;
use crate::grid::{PixelGrid, Region};
use crate::vector::{FeatureVector, MethodTag};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default histogram bin count per chromaticity axis.
pub const DEFAULT_BINS: usize = 16;

/// Parameters and external dependencies for an extraction call.
pub struct ExtractContext<'a> {
    /// Bins per histogram axis.
    pub bins: usize,
    /// Required by the face-aware method, ignored by the rest.
    pub detector: Option<&'a dyn FaceDetector>,
}

impl Default for ExtractContext<'_> {
    fn default() -> Self {
        Self {
            bins: DEFAULT_BINS,
            detector: None,
        }
    }
}

impl<'a> ExtractContext<'a> {
    pub fn with_bins(bins: usize) -> Self {
        Self {
            bins,
            detector: None,
        }
    }

    pub fn detector(mut self, detector: &'a dyn FaceDetector) -> Self {
        self.detector = Some(detector);
        self
    }
}

/// The closed set of extraction methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureMethod {
    /// Center 7x7 crop, flattened.
    #[serde(rename = "baseline")]
    Baseline,
    /// rg-chromaticity 2D histogram over the whole grid.
    #[serde(rename = "chistogram")]
    ColorHistogram,
    /// Whole-grid histogram + central 50% region histogram.
    #[serde(rename = "mhistogram")]
    MultiHistogram,
    /// Color histogram + gradient-magnitude texture histogram.
    #[serde(rename = "texture")]
    TextureColor,
    /// Whole / face-union / background histograms.
    #[serde(rename = "face")]
    FaceHistogram,
}

impl FeatureMethod {
    /// The tag stamped on vectors this method produces.
    pub fn tag(&self) -> MethodTag {
        match self {
            FeatureMethod::Baseline => MethodTag::Baseline,
            FeatureMethod::ColorHistogram => MethodTag::ColorHistogram,
            FeatureMethod::MultiHistogram => MethodTag::MultiHistogram,
            FeatureMethod::TextureColor => MethodTag::TextureColor,
            FeatureMethod::FaceHistogram => MethodTag::FaceHistogram,
        }
    }

    /// Extract a feature vector from the grid.
    pub fn extract(&self, grid: &PixelGrid, ctx: &ExtractContext) -> Result<FeatureVector> {
        if grid.is_empty() {
            return Err(ImatchError::InvalidInput {
                reason: "empty grid".to_string(),
            });
        }
        if ctx.bins == 0 {
            return Err(ImatchError::InvalidInput {
                reason: "bin count must be positive".to_string(),
            });
        }
        match self {
            FeatureMethod::Baseline => baseline_7x7(grid),
            FeatureMethod::ColorHistogram => color_histogram(grid, ctx.bins),
            FeatureMethod::MultiHistogram => multi_histogram(grid, ctx.bins),
            FeatureMethod::TextureColor => texture_and_color(grid, ctx.bins),
            FeatureMethod::FaceHistogram => {
                let detector = ctx.detector.ok_or_else(|| ImatchError::InvalidInput {
                    reason: "face extraction requires a detector".to_string(),
                })?;
                face_histogram(grid, ctx.bins, detector)
            }
        }
    }
}

impl fmt::Display for FeatureMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag().name())
    }
}

impl FromStr for FeatureMethod {
    type Err = ImatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "baseline" => Ok(FeatureMethod::Baseline),
            "chistogram" => Ok(FeatureMethod::ColorHistogram),
            "mhistogram" => Ok(FeatureMethod::MultiHistogram),
            "texture" => Ok(FeatureMethod::TextureColor),
            "face" => Ok(FeatureMethod::FaceHistogram),
            _ => Err(ImatchError::UnknownMethod {
                name: s.to_string(),
            }),
        }
    }
}

fn require_color(grid: &PixelGrid) -> Result<()> {
    if grid.channels() != 3 {
        return Err(ImatchError::InvalidInput {
            reason: "method requires a three-channel grid".to_string(),
        });
    }
    Ok(())
}

fn require_bins(bins: usize) -> Result<()> {
    if bins == 0 {
        return Err(ImatchError::InvalidInput {
            reason: "bin count must be positive".to_string(),
        });
    }
    Ok(())
}

/// Center 7x7 crop flattened row-major, channel-interleaved for color.
/// 49 values for grayscale input, 147 for color.
pub fn baseline_7x7(grid: &PixelGrid) -> Result<FeatureVector> {
    if grid.rows() < 7 || grid.cols() < 7 {
        return Err(ImatchError::InvalidInput {
            reason: "grid smaller than 7x7".to_string(),
        });
    }

    let start_row = grid.rows() / 2 - 3;
    let start_col = grid.cols() / 2 - 3;

    let mut features = Vec::with_capacity(49 * grid.channels());
    for i in start_row..start_row + 7 {
        for j in start_col..start_col + 7 {
            for c in 0..grid.channels() {
                features.push(grid.get(i, j, c) as f32);
            }
        }
    }

    Ok(FeatureVector::new(features, MethodTag::Baseline))
}

/// Map one pixel to its (r, g) chromaticity bin pair.
///
/// The divisor is floored to 1 so a black pixel lands in bin (0, 0)
/// instead of dividing by zero.
fn chroma_bins(b: u8, g: u8, r: u8, bins: usize) -> (usize, usize) {
    let sum = b as u32 + g as u32 + r as u32;
    let divisor = sum.max(1) as f32;
    let rn = r as f32 / divisor;
    let gn = g as f32 / divisor;
    let scale = (bins - 1) as f32;
    let r_bin = (rn * scale).round() as usize;
    let g_bin = (gn * scale).round() as usize;
    (r_bin.min(bins - 1), g_bin.min(bins - 1))
}

/// rg-chromaticity histogram over one region, normalized by its pixel count.
fn region_histogram(grid: &PixelGrid, region: &Region, bins: usize) -> Result<Array2<f32>> {
    let mut hist = Array2::<f32>::zeros((bins, bins));
    for i in region.row..region.row + region.height {
        for j in region.col..region.col + region.width {
            let (b, g, r) = grid.bgr(i, j);
            let (r_bin, g_bin) = chroma_bins(b, g, r, bins);
            hist[[r_bin, g_bin]] += 1.0;
        }
    }
    let count = region.area();
    if count == 0 {
        return Err(ImatchError::InvalidInput {
            reason: "zero-pixel region".to_string(),
        });
    }
    hist /= count as f32;
    Ok(hist)
}

/// Histogram over the pixels inside (or outside) a set of regions,
/// normalized by the number of contributing pixels.
fn masked_histogram(
    grid: &PixelGrid,
    regions: &[Region],
    inside: bool,
    bins: usize,
) -> Result<Array2<f32>> {
    let mut hist = Array2::<f32>::zeros((bins, bins));
    let mut count = 0usize;
    for i in 0..grid.rows() {
        for j in 0..grid.cols() {
            if regions.iter().any(|reg| reg.contains(i, j)) != inside {
                continue;
            }
            let (b, g, r) = grid.bgr(i, j);
            let (r_bin, g_bin) = chroma_bins(b, g, r, bins);
            hist[[r_bin, g_bin]] += 1.0;
            count += 1;
        }
    }
    if count == 0 {
        let which = if inside { "face" } else { "background" };
        return Err(ImatchError::InvalidInput {
            reason: format!("{} region has zero pixels", which),
        });
    }
    hist /= count as f32;
    Ok(hist)
}

fn full_region(grid: &PixelGrid) -> Region {
    Region::new(0, 0, grid.rows(), grid.cols())
}

fn flatten(hist: Array2<f32>) -> Vec<f32> {
    hist.iter().copied().collect()
}

/// Whole-grid rg-chromaticity histogram, bins x bins values.
pub fn color_histogram(grid: &PixelGrid, bins: usize) -> Result<FeatureVector> {
    require_color(grid)?;
    require_bins(bins)?;
    let hist = region_histogram(grid, &full_region(grid), bins)?;
    Ok(FeatureVector::new(flatten(hist), MethodTag::ColorHistogram))
}

/// Whole-grid histogram followed by the central 50%-by-50% region
/// histogram, 2 * bins^2 values.
pub fn multi_histogram(grid: &PixelGrid, bins: usize) -> Result<FeatureVector> {
    require_color(grid)?;
    require_bins(bins)?;
    let whole = region_histogram(grid, &full_region(grid), bins)?;

    let center = Region::new(
        grid.rows() / 4,
        grid.cols() / 4,
        grid.rows() / 2,
        grid.cols() / 2,
    );
    let center = center
        .clip(grid.rows(), grid.cols())
        .ok_or_else(|| ImatchError::InvalidInput {
            reason: "center region has zero area".to_string(),
        })?;
    let center_hist = region_histogram(grid, &center, bins)?;

    let mut features = flatten(whole);
    features.extend(flatten(center_hist));
    Ok(FeatureVector::new(features, MethodTag::MultiHistogram))
}

/// Color histogram (bins^2) concatenated with a 1D texture histogram
/// (bins) of log-compressed gradient magnitude.
pub fn texture_and_color(grid: &PixelGrid, bins: usize) -> Result<FeatureVector> {
    require_color(grid)?;
    require_bins(bins)?;
    let color = region_histogram(grid, &full_region(grid), bins)?;

    let gx = filter::sobel_x(grid)?;
    let gy = filter::sobel_y(grid)?;
    let mag = filter::magnitude(&gx, &gy);

    // Channel-average magnitude, log-compressed into [0, ln 256].
    let mut texture = vec![0.0f32; bins];
    let scale = (bins - 1) as f32 / 256f32.ln();
    for i in 0..mag.rows() {
        for j in 0..mag.cols() {
            let (b, g, r) = mag.bgr(i, j);
            let avg = (b as f32 + g as f32 + r as f32) / 3.0;
            let compressed = (1.0 + avg).ln();
            let bin = ((compressed * scale).round() as usize).min(bins - 1);
            texture[bin] += 1.0;
        }
    }
    let count = (mag.rows() * mag.cols()) as f32;
    for v in &mut texture {
        *v /= count;
    }

    let mut features = flatten(color);
    features.extend(texture);
    Ok(FeatureVector::new(features, MethodTag::TextureColor))
}

/// Whole / face-union / background histograms, 3 * bins^2 values.
///
/// The detector runs on the grayscale conversion of the grid. Zero
/// detected regions is reported as `NoFaceDetected`, which callers treat
/// as an expected outcome, not a failure.
pub fn face_histogram(
    grid: &PixelGrid,
    bins: usize,
    detector: &dyn FaceDetector,
) -> Result<FeatureVector> {
    require_color(grid)?;
    require_bins(bins)?;

    let gray = grid.to_gray();
    let detected = detector.detect(&gray);
    if detected.is_empty() {
        return Err(ImatchError::NoFaceDetected);
    }

    let faces: Vec<Region> = detected
        .iter()
        .filter_map(|reg| reg.clip(grid.rows(), grid.cols()))
        .collect();

    let whole = region_histogram(grid, &full_region(grid), bins)?;
    let face = masked_histogram(grid, &faces, true, bins)?;
    let background = masked_histogram(grid, &faces, false, bins)?;

    let mut features = flatten(whole);
    features.extend(flatten(face));
    features.extend(flatten(background));
    Ok(FeatureVector::new(features, MethodTag::FaceHistogram))
}
