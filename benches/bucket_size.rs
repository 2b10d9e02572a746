use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kdbucket::{KdTree, KdTreeConfig, SplitRule};
use rand::prelude::*;
use rand::rngs::StdRng;

// Trade-off between node count and bucket scan length
const N_POINTS: usize = 100_000;
const BUCKET_SIZES: [usize; 7] = [1, 4, 8, 16, 32, 64, 128];

fn benchmark_bucket_size(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let data: Vec<f64> = (0..N_POINTS * 3).map(|_| rng.gen_range(0.0..100.0)).collect();
    let queries: Vec<[f64; 3]> = (0..1000)
        .map(|_| [rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)])
        .collect();
    let delta = [1.0, 1.0, 1.0];

    let mut group = c.benchmark_group(format!("bucket_size_{}k", N_POINTS / 1000));
    group.sample_size(20);

    for rule in [SplitRule::RoundRobin, SplitRule::WidestSpread] {
        for &bucket_size in &BUCKET_SIZES {
            let points = kdbucket::PointSet::from_interleaved(3, &data).unwrap();
            let config = KdTreeConfig::new(bucket_size).with_split_rule(rule);
            let mut tree = KdTree::from_points(points, config).unwrap();
            tree.build().unwrap();

            let id = BenchmarkId::new(format!("{:?}", rule), bucket_size);
            group.bench_with_input(id, &bucket_size, |b, _| {
                let mut buffer = Vec::new();
                b.iter(|| {
                    for q in &queries {
                        black_box(tree.find_in_range_into(q, &delta, &mut buffer).unwrap());
                    }
                })
            });
        }
    }

    group.finish();
}

criterion_group!(benches, benchmark_bucket_size);
criterion_main!(benches);
