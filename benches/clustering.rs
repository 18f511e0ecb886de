use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kcluster::{generate_blobs, BlobConfig, ClusterEngine, ElbowSelector, Spread};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn bench_kmeans(c: &mut Criterion) {
    let mut group = c.benchmark_group("kmeans");

    let config = BlobConfig {
        num_points: 2000,
        num_dims: 16,
        num_clusters: 10,
        radius: 0.2,
        spread: Spread::Uniform,
    };
    let blobs = generate_blobs(&config, &mut StdRng::seed_from_u64(42)).unwrap();

    group.bench_function("fit_n2000_d16_k10", |b| {
        b.iter(|| {
            let mut engine = ClusterEngine::new(10, &blobs.points).unwrap();
            engine
                .fit(25, 1e-6, &mut StdRng::seed_from_u64(42))
                .unwrap();
            black_box(engine.inertia());
        })
    });

    group.bench_function("elbow_n2000_d16_k1_12", |b| {
        let selector = ElbowSelector::new(1, 12).unwrap().with_seed(42);
        b.iter(|| selector.search(black_box(&blobs.points)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_kmeans);
criterion_main!(benches);
