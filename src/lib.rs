//! # imatch
//!
//! A content-based image retrieval core.
//!
//! This library provides:
//! - Feature extraction: five deterministic methods mapping a pixel grid
//!   to a fixed-length, method-tagged feature vector
//! - Gradient filters feeding the texture-aware method
//! - Distance metrics matched to each feature layout
//! - Top-N ranking over stored (identifier, vector) records
//! - A CSV feature store with a JSON sidecar manifest
//!
//! ## Example
//!
//! ```rust
//! use imatch::distance::DistanceMetric;
//! use imatch::feature::{ExtractContext, FeatureMethod};
//! use imatch::grid::PixelGrid;
//! use imatch::rank::rank;
//!
//! let black = PixelGrid::filled(8, 8, 3, 0).unwrap();
//! let white = PixelGrid::filled(8, 8, 3, 255).unwrap();
//! let ctx = ExtractContext::with_bins(8);
//!
//! let query = FeatureMethod::ColorHistogram.extract(&black, &ctx).unwrap();
//! let records = vec![
//!     ("white.png".to_string(), FeatureMethod::ColorHistogram.extract(&white, &ctx).unwrap()),
//!     ("black.png".to_string(), FeatureMethod::ColorHistogram.extract(&black, &ctx).unwrap()),
//! ];
//!
//! let matches = rank(&query, DistanceMetric::HistogramIntersection, &records, 1);
//! assert_eq!(matches[0].id, "black.png");
//! ```

pub mod detect;
pub mod distance;
pub mod error;
pub mod feature;
pub mod filter;
pub mod grid;
pub mod imageio;
pub mod rank;
pub mod store;
pub mod vector;

pub use detect::FaceDetector;
pub use distance::DistanceMetric;
pub use error::{ImatchError, Result};
pub use feature::{ExtractContext, FeatureMethod};
pub use grid::{PixelGrid, Region};
pub use rank::{rank, MatchRecord};
pub use store::FeatureStore;
pub use vector::{FeatureVector, MethodTag};
