//! Property tests: histogram normalization, metric symmetry, rank ordering

use imatch::distance::{cosine_distance, euclidean, intersection_distance, DistanceMetric};
use imatch::feature::color_histogram;
use imatch::grid::PixelGrid;
use imatch::rank::rank;
use imatch::vector::FeatureVector;
use proptest::prelude::*;

fn grid_strategy() -> impl Strategy<Value = PixelGrid> {
    (1usize..=10, 1usize..=10).prop_flat_map(|(rows, cols)| {
        proptest::collection::vec(any::<u8>(), rows * cols * 3)
            .prop_map(move |samples| PixelGrid::from_raw(rows, cols, 3, samples).unwrap())
    })
}

fn vec_pair() -> impl Strategy<Value = (Vec<f32>, Vec<f32>)> {
    (1usize..=64).prop_flat_map(|n| {
        (
            proptest::collection::vec(-100.0f32..100.0, n),
            proptest::collection::vec(-100.0f32..100.0, n),
        )
    })
}

proptest! {
    #[test]
    fn histogram_is_normalized(grid in grid_strategy(), bins in 2usize..=16) {
        let v = color_histogram(&grid, bins).unwrap();
        prop_assert_eq!(v.len(), bins * bins);
        let sum: f32 = v.as_slice().iter().sum();
        prop_assert!((sum - 1.0).abs() < 1e-4);
        prop_assert!(v.as_slice().iter().all(|&x| x >= 0.0));
    }

    #[test]
    fn intersection_bounded_symmetric_zero_on_self(
        a in grid_strategy(),
        b in grid_strategy(),
        bins in 2usize..=8,
    ) {
        let ha = color_histogram(&a, bins).unwrap();
        let hb = color_histogram(&b, bins).unwrap();
        let d_ab = intersection_distance(ha.as_slice(), hb.as_slice());
        let d_ba = intersection_distance(hb.as_slice(), ha.as_slice());
        prop_assert!((d_ab - d_ba).abs() < 1e-6);
        prop_assert!((-1e-6..=1.0 + 1e-6).contains(&d_ab));
        prop_assert!(intersection_distance(ha.as_slice(), ha.as_slice()).abs() < 1e-4);
    }

    #[test]
    fn euclidean_and_cosine_symmetry((a, b) in vec_pair()) {
        prop_assert_eq!(euclidean(&a, &a), 0.0);
        prop_assert!((euclidean(&a, &b) - euclidean(&b, &a)).abs() < 1e-6);
        prop_assert!((cosine_distance(&a, &b) - cosine_distance(&b, &a)).abs() < 1e-6);
    }

    #[test]
    fn rank_output_sorted_and_bounded(
        (query, database) in (1usize..=8).prop_flat_map(|dim| {
            (
                proptest::collection::vec(-10.0f32..10.0, dim),
                proptest::collection::vec(
                    proptest::collection::vec(-10.0f32..10.0, dim),
                    0..30,
                ),
            )
        }),
        n in 0usize..=20,
    ) {
        let records: Vec<(String, FeatureVector)> = database
            .into_iter()
            .enumerate()
            .map(|(i, data)| (format!("v{}", i), FeatureVector::external(data)))
            .collect();
        let query = FeatureVector::external(query);

        let results = rank(&query, DistanceMetric::Euclidean, &records, n);
        prop_assert_eq!(results.len(), n.min(records.len()));
        for pair in results.windows(2) {
            prop_assert!(pair[0].distance <= pair[1].distance);
        }
    }
}
