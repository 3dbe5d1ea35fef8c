use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use sweep_plot::analysis::aggregator::{Aggregator, ColumnSelection};

/// 200 arrival rates × 8 replicates, three columns each.
fn sweep_csv() -> String {
    let mut rows = String::new();
    for step in 0..200 {
        let rate = 0.05 * (step + 1) as f64;
        for seed in 0..8 {
            rows.push_str(&format!(
                "{:.2},{:.6},{:.6}\n",
                rate,
                rate * 1.7 + seed as f64 * 0.01,
                rate * 0.9 + seed as f64 * 0.02
            ));
        }
    }
    rows
}

fn aggregate_bench(c: &mut Criterion) {
    let input = sweep_csv();
    let aggregator = Aggregator::new(ColumnSelection::default()).replicates(8);

    c.bench_function("aggregate_sweep_1600_rows", |b| {
        b.iter(|| {
            let points = aggregator
                .aggregate(black_box(input.as_bytes()))
                .unwrap();
            black_box(points)
        })
    });
}

criterion_group!(benches, aggregate_bench);
criterion_main!(benches);
