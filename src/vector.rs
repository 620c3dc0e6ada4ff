//! Feature vectors tagged with their producing method

use crate::error::{ImatchError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifies which extraction method produced a feature vector.
///
/// Vectors are only comparable when produced by the same method with the
/// same parameters, so the tag travels with the data and metrics check it
/// before touching the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MethodTag {
    #[serde(rename = "baseline")]
    Baseline,
    #[serde(rename = "chistogram")]
    ColorHistogram,
    #[serde(rename = "mhistogram")]
    MultiHistogram,
    #[serde(rename = "texture")]
    TextureColor,
    #[serde(rename = "face")]
    FaceHistogram,
    /// Sourced from a precomputed embedding table, not a built-in extractor.
    #[serde(rename = "external")]
    External,
}

impl MethodTag {
    pub fn name(&self) -> &'static str {
        match self {
            MethodTag::Baseline => "baseline",
            MethodTag::ColorHistogram => "chistogram",
            MethodTag::MultiHistogram => "mhistogram",
            MethodTag::TextureColor => "texture",
            MethodTag::FaceHistogram => "face",
            MethodTag::External => "external",
        }
    }
}

impl fmt::Display for MethodTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MethodTag {
    type Err = ImatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "baseline" => Ok(MethodTag::Baseline),
            "chistogram" => Ok(MethodTag::ColorHistogram),
            "mhistogram" => Ok(MethodTag::MultiHistogram),
            "texture" => Ok(MethodTag::TextureColor),
            "face" => Ok(MethodTag::FaceHistogram),
            "external" => Ok(MethodTag::External),
            _ => Err(ImatchError::UnknownMethod {
                name: s.to_string(),
            }),
        }
    }
}

/// An ordered sequence of 32-bit floats whose length and per-position
/// meaning are fixed by the method that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    data: Vec<f32>,
    method: MethodTag,
}

impl FeatureVector {
    pub fn new(data: Vec<f32>, method: MethodTag) -> Self {
        Self { data, method }
    }

    /// A vector loaded from an external embedding table.
    pub fn external(data: Vec<f32>) -> Self {
        Self::new(data, MethodTag::External)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn method(&self) -> MethodTag {
        self.method
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// L2 norm of the vector.
    pub fn norm(&self) -> f32 {
        self.data.iter().map(|x| x * x).sum::<f32>().sqrt()
    }
}
