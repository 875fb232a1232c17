//! Benchmarks for result interpretation.
//!
//! Run with: cargo bench -p fishlens-core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fishlens_core::interpret::FishResultInterpreter;
use fishlens_core::{normalize_ranking, ClassificationEntry};

/// An ImageNet-sized ranking with a sprinkling of fish labels.
fn ranking(n: usize) -> Vec<ClassificationEntry> {
    const LABELS: &[&str] = &[
        "tench",
        "goldfish",
        "great white shark",
        "umbrella",
        "coho salmon",
        "beach towel",
        "coral reef",
        "rainbow trout",
    ];
    (0..n)
        .map(|i| {
            let label = format!("{} {i}", LABELS[i % LABELS.len()]);
            ClassificationEntry::new(label, 1.0 / (i as f32 + 1.0))
        })
        .collect()
}

fn benchmark_interpret(c: &mut Criterion) {
    let entries = ranking(1000);
    let interpreter = FishResultInterpreter::default();

    c.bench_function("interpret_top5_of_1000", |b| {
        b.iter(|| interpreter.interpret(black_box(&entries)))
    });

    let wide = interpreter.with_top_k(1000);
    c.bench_function("interpret_all_1000", |b| {
        b.iter(|| wide.interpret(black_box(&entries)))
    });
}

fn benchmark_normalize(c: &mut Criterion) {
    let mut entries = ranking(1000);
    entries.reverse();

    c.bench_function("normalize_ranking_1000", |b| {
        b.iter(|| normalize_ranking(black_box(entries.clone())))
    });
}

criterion_group!(benches, benchmark_interpret, benchmark_normalize);
criterion_main!(benches);
