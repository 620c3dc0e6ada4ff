//! CSV-backed feature store
//!
//! One headerless row per record: identifier, then the vector values.
//! A JSON manifest sits beside the data file so vectors read back with
//! the method tag and bin count they were written with; stores without a
//! manifest (externally produced embedding tables) read back as
//! `External`.

use crate::error::{ImatchError, Result};
use crate::vector::{FeatureVector, MethodTag};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

/// Describes what a store file contains.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoreManifest {
    pub method: MethodTag,
    pub bins: usize,
}

/// An append-or-overwrite persisted mapping from identifier to feature
/// vector.
#[derive(Debug, Clone)]
pub struct FeatureStore {
    path: PathBuf,
}

impl FeatureStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn manifest_path(&self) -> PathBuf {
        self.path.with_extension("manifest.json")
    }

    /// Truncate the store and record what it will contain.
    pub fn reset(&self, manifest: &StoreManifest) -> Result<()> {
        File::create(&self.path)?;
        let bytes = serde_json::to_vec_pretty(manifest)
            .map_err(|e| ImatchError::Store(e.to_string()))?;
        fs::write(self.manifest_path(), bytes)?;
        Ok(())
    }

    /// Append one record. The file is created if it does not exist.
    pub fn append(&self, id: &str, vector: &FeatureVector) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        let mut row = Vec::with_capacity(1 + vector.len());
        row.push(id.to_string());
        row.extend(vector.as_slice().iter().map(|v| v.to_string()));
        writer
            .write_record(&row)
            .map_err(|e| ImatchError::Store(e.to_string()))?;
        writer
            .flush()
            .map_err(|e| ImatchError::Store(e.to_string()))?;
        Ok(())
    }

    /// The manifest, if one was written beside the data file.
    pub fn manifest(&self) -> Result<Option<StoreManifest>> {
        let path = self.manifest_path();
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        let manifest =
            serde_json::from_slice(&bytes).map_err(|e| ImatchError::Store(e.to_string()))?;
        Ok(Some(manifest))
    }

    /// Read every record back, in file order, tagged per the manifest
    /// (or `External` when there is none).
    pub fn read_all(&self) -> Result<Vec<(String, FeatureVector)>> {
        let tag = self
            .manifest()?
            .map(|m| m.method)
            .unwrap_or(MethodTag::External);

        let file = File::open(&self.path)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|e| ImatchError::Store(e.to_string()))?;
            let mut fields = row.iter();
            let id = match fields.next() {
                Some(id) => id.to_string(),
                None => continue,
            };
            let data: std::result::Result<Vec<f32>, _> =
                fields.map(|f| f.trim().parse::<f32>()).collect();
            let data = data.map_err(|e| {
                ImatchError::Store(format!("bad value in record {}: {}", id, e))
            })?;
            records.push((id, FeatureVector::new(data, tag)));
        }
        Ok(records)
    }
}

/// The identifier's final path component. Stores commonly hold full image
/// paths while queries name bare files, so joins compare basenames.
pub fn basename(id: &str) -> &str {
    id.rsplit(['/', '\\']).next().unwrap_or(id)
}

/// Find a record whose identifier basename matches the given one.
pub fn find_record<'a>(
    records: &'a [(String, FeatureVector)],
    id: &str,
) -> Option<&'a FeatureVector> {
    let want = basename(id);
    records
        .iter()
        .find(|(rid, _)| basename(rid) == want)
        .map(|(_, v)| v)
}
