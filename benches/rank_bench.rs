//! Benchmarks for top-N ranking

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use imatch::distance::DistanceMetric;
use imatch::rank::{par_rank, rank};
use imatch::vector::FeatureVector;

/// Deterministic pseudo-varied vectors; no RNG needed for throughput work.
fn synthetic_records(n: usize, dim: usize) -> Vec<(String, FeatureVector)> {
    (0..n)
        .map(|i| {
            let data: Vec<f32> = (0..dim)
                .map(|j| ((i * 31 + j * 7) % 100) as f32 / 100.0)
                .collect();
            (format!("img{}", i), FeatureVector::external(data))
        })
        .collect()
}

fn benchmark_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank");

    for size in [100, 1000, 5000].iter() {
        let records = synthetic_records(*size, 256);
        let query = FeatureVector::external(vec![0.5; 256]);

        group.bench_with_input(BenchmarkId::new("sequential", size), size, |b, _| {
            b.iter(|| rank(black_box(&query), DistanceMetric::Euclidean, &records, 10));
        });
        group.bench_with_input(BenchmarkId::new("parallel", size), size, |b, _| {
            b.iter(|| par_rank(black_box(&query), DistanceMetric::Euclidean, &records, 10));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_rank);
criterion_main!(benches);
