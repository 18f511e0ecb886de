use kcluster::{ClusterEngine, PointSet};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn dataset() -> impl Strategy<Value = Vec<Vec<f64>>> {
    (1usize..4).prop_flat_map(|dims| {
        prop::collection::vec(prop::collection::vec(-10.0f64..10.0, dims), 1..30)
    })
}

proptest! {
    #[test]
    fn prop_labels_in_range(data in dataset(), k in 1usize..6, seed in any::<u64>()) {
        prop_assume!(k <= data.len());
        let points = PointSet::from_rows(&data).unwrap();
        let mut engine = ClusterEngine::new(k, &points).unwrap();
        let report = engine.fit(50, 1e-9, &mut StdRng::seed_from_u64(seed)).unwrap();

        prop_assert!(report.iterations <= 50);
        prop_assert_eq!(engine.labels().len(), data.len());
        for &l in engine.labels().iter() {
            prop_assert!(l < k);
        }
        prop_assert!(engine.centroids().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn prop_inertia_non_negative(data in dataset(), k in 1usize..6, seed in any::<u64>()) {
        prop_assume!(k <= data.len());
        let points = PointSet::from_rows(&data).unwrap();
        let mut engine = ClusterEngine::new(k, &points).unwrap();
        engine.fit(50, 1e-9, &mut StdRng::seed_from_u64(seed)).unwrap();
        prop_assert!(engine.inertia() >= 0.0);
    }

    #[test]
    fn prop_seeded_fit_is_bit_identical(data in dataset(), k in 1usize..6, seed in any::<u64>()) {
        prop_assume!(k <= data.len());
        let points = PointSet::from_rows(&data).unwrap();
        let fit = || {
            let mut engine = ClusterEngine::new(k, &points).unwrap();
            let report = engine.fit(50, 1e-9, &mut StdRng::seed_from_u64(seed)).unwrap();
            (engine.centroids().to_owned(), engine.labels().to_owned(), report.iterations)
        };
        prop_assert_eq!(fit(), fit());
    }

    #[test]
    fn prop_single_cluster_is_the_mean(data in dataset(), seed in any::<u64>()) {
        let points = PointSet::from_rows(&data).unwrap();
        let mut engine = ClusterEngine::new(1, &points).unwrap();
        engine.fit(10, 1e-12, &mut StdRng::seed_from_u64(seed)).unwrap();

        let n = data.len() as f64;
        for (d, &c) in engine.centroids().row(0).iter().enumerate() {
            let mean = data.iter().map(|row| row[d]).sum::<f64>() / n;
            prop_assert!((c - mean).abs() < 1e-9);
        }
    }
}
