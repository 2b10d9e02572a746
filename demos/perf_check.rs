use kdbucket::KdTree;
use rand::prelude::*;
use rand::rngs::StdRng;
use std::time::Instant;

fn main() {
    // RUST_LOG=debug shows the node table geometry of each build
    env_logger::init();

    let n_points = 1_000_000;
    let bucket_size = 10;
    let mut rng = StdRng::seed_from_u64(0);
    let xs: Vec<f32> = (0..n_points).map(|_| rng.gen_range(-100.0..100.0)).collect();
    let ys: Vec<f32> = (0..n_points).map(|_| rng.gen_range(-100.0..100.0)).collect();

    let start = Instant::now();
    let mut tree = KdTree::with_data(n_points, bucket_size, &[&xs[..], &ys[..]]).unwrap();
    tree.build().unwrap();
    println!("build: {} points, {} nodes in {:?}", n_points, tree.total_nodes(), start.elapsed());

    // Search around every point with a small tolerance (this is the hot path)
    let delta = [0.1f32, 0.1];
    let mut buffer = Vec::new();
    let mut found = 0usize;
    let mut iterations = 0usize;
    let start = Instant::now();
    for i in 0..n_points {
        let stats = tree.find_in_range_into(&[xs[i], ys[i]], &delta, &mut buffer).unwrap();
        if !buffer.contains(&i) {
            println!("point {} not found in its own range", i);
        }
        found += stats.count;
        iterations += stats.iterations;
    }
    println!(
        "range: {:?}, mean found {:.2}, mean nodes visited {:.2}",
        start.elapsed(),
        found as f64 / n_points as f64,
        iterations as f64 / n_points as f64
    );

    let queries: Vec<Vec<f32>> = (0..n_points).map(|i| vec![xs[i], ys[i]]).collect();
    let start = Instant::now();
    let results = tree.find_in_range_batch(&queries, &delta).unwrap();
    let batch_found: usize = results.iter().map(|r| r.count()).sum();
    println!("batch range: {:?}, same totals: {}", start.elapsed(), batch_found == found);
}
