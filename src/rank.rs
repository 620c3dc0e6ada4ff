//! Ranking engine: top-N nearest records for a query vector
//!
//! A full linear scan per query. Database sizes here are tens to low
//! thousands of records, so no pruning or indexing is warranted.

use crate::distance::{self, DistanceMetric};
use crate::error::{ImatchError, Result};
use crate::store::{basename, find_record};
use crate::vector::FeatureVector;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One ranked match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub id: String,
    pub distance: f32,
}

/// Rank records ascending by distance to the query and keep the first
/// `n`. Records the metric cannot compare (length or pairing mismatch)
/// are excluded rather than aborting the query; ties keep first-seen
/// order.
pub fn rank(
    query: &FeatureVector,
    metric: DistanceMetric,
    records: &[(String, FeatureVector)],
    n: usize,
) -> Vec<MatchRecord> {
    let mut results: Vec<MatchRecord> = records
        .iter()
        .filter_map(|(id, vector)| {
            metric.distance(query, vector).ok().map(|distance| MatchRecord {
                id: id.clone(),
                distance,
            })
        })
        .collect();

    sort_and_truncate(&mut results, n);
    results
}

/// Same contract and output ordering as [`rank`], with the per-record
/// distance loop spread across worker threads.
pub fn par_rank(
    query: &FeatureVector,
    metric: DistanceMetric,
    records: &[(String, FeatureVector)],
    n: usize,
) -> Vec<MatchRecord> {
    let mut results: Vec<MatchRecord> = records
        .par_iter()
        .filter_map(|(id, vector)| {
            metric.distance(query, vector).ok().map(|distance| MatchRecord {
                id: id.clone(),
                distance,
            })
        })
        .collect();

    sort_and_truncate(&mut results, n);
    results
}

fn sort_and_truncate(results: &mut Vec<MatchRecord>, n: usize) {
    // Stable sort: equal distances keep insertion order.
    results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    results.truncate(n);
}

/// Weights for the hybrid two-table distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HybridParams {
    pub embedding_weight: f32,
    pub color_weight: f32,
    /// Divisor bringing raw embedding distances into the same 0-1 range
    /// as intersection distances.
    pub embedding_scale: f32,
}

impl Default for HybridParams {
    fn default() -> Self {
        Self {
            embedding_weight: 0.5,
            color_weight: 0.5,
            embedding_scale: 50.0,
        }
    }
}

/// Rank by a weighted combination of embedding distance and color
/// histogram distance, joining the two tables by identifier basename.
///
/// Both tables are precomputed and persisted, so values are compared at
/// the slice level: rows whose lengths do not match the query rows, or
/// that are present in only one table, are skipped. The target must be
/// present in both tables.
pub fn rank_hybrid(
    target_id: &str,
    embeddings: &[(String, FeatureVector)],
    colors: &[(String, FeatureVector)],
    params: &HybridParams,
    n: usize,
) -> Result<Vec<MatchRecord>> {
    let target_embedding = find_record(embeddings, target_id).ok_or_else(|| {
        ImatchError::InvalidInput {
            reason: format!("{} not found in embedding table", target_id),
        }
    })?;
    let target_color = find_record(colors, target_id).ok_or_else(|| ImatchError::InvalidInput {
        reason: format!("{} not found in color table", target_id),
    })?;

    let color_by_name: HashMap<&str, &FeatureVector> = colors
        .iter()
        .map(|(id, vector)| (basename(id), vector))
        .collect();

    let mut results = Vec::new();
    for (id, embedding) in embeddings {
        let Some(color) = color_by_name.get(basename(id)) else {
            continue;
        };
        if embedding.len() != target_embedding.len() || color.len() != target_color.len() {
            continue;
        }
        let embedding_dist =
            distance::euclidean(target_embedding.as_slice(), embedding.as_slice())
                / params.embedding_scale;
        let color_dist =
            distance::intersection_distance(target_color.as_slice(), color.as_slice());
        results.push(MatchRecord {
            id: id.clone(),
            distance: params.embedding_weight * embedding_dist
                + params.color_weight * color_dist,
        });
    }

    sort_and_truncate(&mut results, n);
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::MethodTag;
    use approx::assert_relative_eq;

    fn external(data: Vec<f32>) -> FeatureVector {
        FeatureVector::external(data)
    }

    fn db() -> Vec<(String, FeatureVector)> {
        vec![
            ("a".to_string(), external(vec![0.9, 0.0])),
            ("b".to_string(), external(vec![0.1, 0.0])),
            ("c".to_string(), external(vec![0.5, 0.0])),
        ]
    }

    #[test]
    fn test_rank_orders_ascending() {
        // Distances from the origin: a = 0.9, b = 0.1, c = 0.5.
        let query = external(vec![0.0, 0.0]);
        let results = rank(&query, DistanceMetric::Euclidean, &db(), 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "b");
        assert_eq!(results[1].id, "c");
    }

    #[test]
    fn test_rank_n_zero() {
        let query = external(vec![0.0, 0.0]);
        assert!(rank(&query, DistanceMetric::Euclidean, &db(), 0).is_empty());
    }

    #[test]
    fn test_rank_n_exceeds_database() {
        let query = external(vec![0.0, 0.0]);
        let results = rank(&query, DistanceMetric::Euclidean, &db(), 100);
        assert_eq!(results.len(), 3);
        assert_eq!(results[2].id, "a");
    }

    #[test]
    fn test_rank_empty_database() {
        let query = external(vec![0.0, 0.0]);
        assert!(rank(&query, DistanceMetric::Euclidean, &[], 5).is_empty());
    }

    #[test]
    fn test_rank_excludes_mismatched_record() {
        let query = external(vec![0.0, 0.0]);
        let mut records = db();
        records.insert(1, ("bad".to_string(), external(vec![1.0, 2.0, 3.0])));
        let results = rank(&query, DistanceMetric::Euclidean, &records, 10);
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|m| m.id != "bad"));
        assert_eq!(results[0].id, "b");
    }

    #[test]
    fn test_rank_excludes_foreign_tag() {
        let query = external(vec![0.0, 0.0]);
        let mut records = db();
        records.push((
            "hist".to_string(),
            FeatureVector::new(vec![0.0, 0.0], MethodTag::ColorHistogram),
        ));
        let results = rank(&query, DistanceMetric::Euclidean, &records, 10);
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_rank_tie_break_is_insertion_order() {
        let query = external(vec![0.0]);
        let records = vec![
            ("first".to_string(), external(vec![1.0])),
            ("second".to_string(), external(vec![1.0])),
            ("third".to_string(), external(vec![1.0])),
        ];
        let results = rank(&query, DistanceMetric::Euclidean, &records, 3);
        let ids: Vec<&str> = results.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_par_rank_matches_sequential() {
        let query = external(vec![0.3, 0.3]);
        let records: Vec<(String, FeatureVector)> = (0..200)
            .map(|i| {
                // A few deliberate duplicates to exercise tie-breaks.
                let x = (i % 50) as f32 / 50.0;
                (format!("v{}", i), external(vec![x, 1.0 - x]))
            })
            .collect();
        let sequential = rank(&query, DistanceMetric::Euclidean, &records, 20);
        let parallel = par_rank(&query, DistanceMetric::Euclidean, &records, 20);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_hybrid_join_by_basename() {
        let embeddings = vec![
            ("db/a.jpg".to_string(), external(vec![0.0, 0.0])),
            ("db/b.jpg".to_string(), external(vec![30.0, 40.0])),
            ("db/orphan.jpg".to_string(), external(vec![1.0, 1.0])),
        ];
        let colors = vec![
            ("other/a.jpg".to_string(), external(vec![1.0, 0.0])),
            ("other/b.jpg".to_string(), external(vec![0.0, 1.0])),
        ];
        let results = rank_hybrid(
            "a.jpg",
            &embeddings,
            &colors,
            &HybridParams::default(),
            10,
        )
        .unwrap();

        // orphan.jpg has no color row and is skipped.
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "db/a.jpg");
        assert_relative_eq!(results[0].distance, 0.0, epsilon = 1e-6);
        // b: embedding distance 50/50 = 1, color distance 1 -> 0.5 + 0.5.
        assert_relative_eq!(results[1].distance, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_hybrid_missing_target() {
        let embeddings = vec![("a.jpg".to_string(), external(vec![0.0]))];
        let colors = vec![("a.jpg".to_string(), external(vec![1.0]))];
        assert!(matches!(
            rank_hybrid("zzz.jpg", &embeddings, &colors, &HybridParams::default(), 5),
            Err(ImatchError::InvalidInput { .. })
        ));
    }
}
