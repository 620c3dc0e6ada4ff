//! Distance metrics for feature comparison
//!
//! Each metric accepts a specific set of method tags, so a mis-paired
//! method/metric call fails with an explicit error instead of producing a
//! plausible-looking wrong distance.

use crate::error::{ImatchError, Result};
use crate::vector::{FeatureVector, MethodTag};
use serde::{Deserialize, Serialize};

/// Distance metrics, one or more per feature-vector layout. Combination
/// weights are carried in the variants; the defaults come from
/// [`DistanceMetric::for_tag`] and callers may override them per query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// L2 distance. Pixel-crop baseline and external embedding vectors.
    Euclidean,
    /// 1 - sum of per-bin minimums. Single color histograms.
    HistogramIntersection,
    /// Intersection distance per half, combined
    /// `w * whole + (1 - w) * center`.
    MultiHistogram { whole_weight: f32 },
    /// Intersection distance on the color part (bins^2) and texture part
    /// (remainder), combined `c * color + (1 - c) * texture`.
    TextureColor { color_weight: f32, bins: usize },
    /// Intersection distance per third, combined with per-segment weights.
    FaceWeighted { whole: f32, face: f32, background: f32 },
    /// 1 - cosine similarity; 1.0 when either vector has zero norm.
    Cosine,
}

impl DistanceMetric {
    /// The default metric for vectors carrying the given tag, with the
    /// conventional weights (0.5/0.5 for two-part layouts, 0.2/0.6/0.2 for
    /// face-aware).
    pub fn for_tag(tag: MethodTag, bins: usize) -> DistanceMetric {
        match tag {
            MethodTag::Baseline | MethodTag::External => DistanceMetric::Euclidean,
            MethodTag::ColorHistogram => DistanceMetric::HistogramIntersection,
            MethodTag::MultiHistogram => DistanceMetric::MultiHistogram { whole_weight: 0.5 },
            MethodTag::TextureColor => DistanceMetric::TextureColor {
                color_weight: 0.5,
                bins,
            },
            MethodTag::FaceHistogram => DistanceMetric::FaceWeighted {
                whole: 0.2,
                face: 0.6,
                background: 0.2,
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DistanceMetric::Euclidean => "euclidean",
            DistanceMetric::HistogramIntersection => "histogram-intersection",
            DistanceMetric::MultiHistogram { .. } => "multi-histogram",
            DistanceMetric::TextureColor { .. } => "texture-color",
            DistanceMetric::FaceWeighted { .. } => "face-weighted",
            DistanceMetric::Cosine => "cosine",
        }
    }

    /// Whether this metric is defined for vectors carrying the given tag.
    pub fn accepts(&self, tag: MethodTag) -> bool {
        match self {
            DistanceMetric::Euclidean => {
                matches!(tag, MethodTag::Baseline | MethodTag::External)
            }
            DistanceMetric::HistogramIntersection => matches!(tag, MethodTag::ColorHistogram),
            DistanceMetric::MultiHistogram { .. } => matches!(tag, MethodTag::MultiHistogram),
            DistanceMetric::TextureColor { .. } => matches!(tag, MethodTag::TextureColor),
            DistanceMetric::FaceWeighted { .. } => matches!(tag, MethodTag::FaceHistogram),
            DistanceMetric::Cosine => matches!(tag, MethodTag::External),
        }
    }

    /// Compute the distance between two vectors using this metric.
    ///
    /// Fails with `MethodMismatch` when the vectors' tags disagree or the
    /// metric is not defined for them, and `SizeMismatch` when the lengths
    /// differ or do not fit the metric's segment layout.
    pub fn distance(&self, a: &FeatureVector, b: &FeatureVector) -> Result<f32> {
        if a.method() != b.method() {
            return Err(ImatchError::MethodMismatch {
                metric: self.name().to_string(),
                method: format!("{} vs {}", a.method(), b.method()),
            });
        }
        if !self.accepts(a.method()) {
            return Err(ImatchError::MethodMismatch {
                metric: self.name().to_string(),
                method: a.method().name().to_string(),
            });
        }
        if a.len() != b.len() {
            return Err(ImatchError::SizeMismatch {
                expected: a.len(),
                actual: b.len(),
            });
        }

        let (a, b) = (a.as_slice(), b.as_slice());
        match *self {
            DistanceMetric::Euclidean => Ok(euclidean(a, b)),
            DistanceMetric::HistogramIntersection => Ok(intersection_distance(a, b)),
            DistanceMetric::MultiHistogram { whole_weight } => {
                if a.len() % 2 != 0 {
                    return Err(ImatchError::SizeMismatch {
                        expected: a.len() + 1,
                        actual: a.len(),
                    });
                }
                let mid = a.len() / 2;
                let whole = intersection_distance(&a[..mid], &b[..mid]);
                let center = intersection_distance(&a[mid..], &b[mid..]);
                Ok(whole_weight * whole + (1.0 - whole_weight) * center)
            }
            DistanceMetric::TextureColor { color_weight, bins } => {
                let split = bins * bins;
                if a.len() <= split {
                    return Err(ImatchError::SizeMismatch {
                        expected: split + bins,
                        actual: a.len(),
                    });
                }
                let color = intersection_distance(&a[..split], &b[..split]);
                let texture = intersection_distance(&a[split..], &b[split..]);
                Ok(color_weight * color + (1.0 - color_weight) * texture)
            }
            DistanceMetric::FaceWeighted {
                whole,
                face,
                background,
            } => {
                if a.len() % 3 != 0 {
                    return Err(ImatchError::SizeMismatch {
                        expected: a.len() / 3 * 3,
                        actual: a.len(),
                    });
                }
                let third = a.len() / 3;
                let d_whole = intersection_distance(&a[..third], &b[..third]);
                let d_face = intersection_distance(&a[third..2 * third], &b[third..2 * third]);
                let d_background = intersection_distance(&a[2 * third..], &b[2 * third..]);
                Ok(whole * d_whole + face * d_face + background * d_background)
            }
            DistanceMetric::Cosine => Ok(cosine_distance(a, b)),
        }
    }
}

/// Euclidean (L2) distance between two equal-length slices.
pub fn euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f32>()
        .sqrt()
}

/// Histogram intersection distance: 1 - sum of per-bin minimums.
/// Zero for identical normalized histograms, 1 for disjoint ones.
pub fn intersection_distance(a: &[f32], b: &[f32]) -> f32 {
    let intersection: f32 = a.iter().zip(b.iter()).map(|(x, y)| x.min(*y)).sum();
    1.0 - intersection
}

/// Cosine distance: 1 - cosine similarity, in [0, 2].
/// Returns 1.0 when either vector has zero norm.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    // Clamp to [-1, 1] to absorb floating point error
    let similarity = (dot / (norm_a * norm_b)).clamp(-1.0, 1.0);
    1.0 - similarity
}
