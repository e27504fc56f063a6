//! Benchmarks for the evaluator.
//!
//! Run with: `cargo bench` in the core/ directory.
//!
//! Benchmark groups:
//! 1. full_pipeline: lex, resolve and reduce on every run
//! 2. snapshot_replay: reevaluation of a cached token sequence
//! 3. propagation: pushing one edit through a chain of dependents

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use reckon_core::api::{Document, Engine, EngineOptions};
use reckon_core::source::Detached;

/// Generate an arithmetic expression like "1 + 1 + 1 + ... + 1" with `n` additions.
fn generate_arithmetic_chain(n: usize) -> String {
    let mut expr = String::from("1");
    for _ in 0..n {
        expr.push_str(" + 1");
    }
    expr
}

fn bench_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_pipeline");
    for size in [10, 100, 400] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut engine = Engine::new(EngineOptions::default(), |_| {});
            let source = generate_arithmetic_chain(size);
            b.iter(|| {
                engine
                    .try_evaluate_in("", black_box(&source), &Detached)
                    .unwrap()
            });
        });
    }
    group.finish();
}

fn bench_snapshot_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot_replay");
    for size in [10, 100, 400] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut doc = Document::new(EngineOptions::default());
            let root = doc.root();
            doc.add_expression(root, "x", "1").unwrap();
            let text = format!("@(x) + {}", generate_arithmetic_chain(size));
            let (id, _) = doc.add_expression(root, "y", &text).unwrap();
            b.iter(|| doc.demand(black_box(id)).unwrap());
        });
    }
    group.finish();
}

fn bench_propagation(c: &mut Criterion) {
    let mut group = c.benchmark_group("propagation");
    for length in [10, 50, 200] {
        group.throughput(Throughput::Elements(length as u64));
        group.bench_with_input(BenchmarkId::from_parameter(length), &length, |b, &length| {
            let mut doc = Document::new(EngineOptions::default());
            let root = doc.root();
            let (head, _) = doc.add_expression(root, "e0", "1").unwrap();
            for i in 1..=length {
                let text = format!("@(e{}) + 1", i - 1);
                doc.add_expression(root, &format!("e{}", i), &text).unwrap();
            }
            let mut n = 0i64;
            b.iter(|| {
                n += 1;
                doc.edit(head, &n.to_string()).unwrap()
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_full_pipeline,
    bench_snapshot_replay,
    bench_propagation
);
criterion_main!(benches);
