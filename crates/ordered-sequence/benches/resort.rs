use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use ordered_sequence::OrderedSequence;

/// Sorted input with every tenth value nudged, the shape a per-frame bounds
/// refresh produces.
fn nearly_sorted(len: usize) -> OrderedSequence<f64> {
    let mut seq = OrderedSequence::from_vec((0..len).map(|i| i as f64).collect());
    let mut i = 0;
    seq.update_each(|v| {
        if i % 10 == 0 {
            *v += 1.5;
        }
        i += 1;
    });
    seq
}

fn bench_resort(c: &mut Criterion) {
    for len in [100, 1_000] {
        c.bench_function(&format!("resort nearly sorted {len}"), |b| {
            b.iter_batched(
                || nearly_sorted(len),
                |mut seq| {
                    seq.resort();
                    black_box(seq)
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }
}

fn bench_search(c: &mut Criterion) {
    let seq = OrderedSequence::from_vec((0..10_000).collect::<Vec<u32>>());
    c.bench_function("search_last 10k", |b| {
        b.iter(|| seq.search_last(black_box(&7_321)))
    });
}

criterion_group!(benches, bench_resort, bench_search);
criterion_main!(benches);
