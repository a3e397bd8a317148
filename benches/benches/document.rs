// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for `arbor_node` property access, history and memoization.

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use arbor_memo::MemoCache;
use arbor_node::{Document, NodeId, NodeTypeBuilder, NodeTypeId, Rule, TypeRegistry, UpdatePolicy};
use arbor_undo::{Transaction, UndoStack};

fn registry() -> (TypeRegistry, NodeTypeId, NodeTypeId) {
    let mut types = TypeRegistry::new();
    let line = types.register(
        NodeTypeBuilder::new("CamberLine")
            .update_policy(UpdatePolicy::Derived)
            .shared_bounded("sample_rate", 0.0, 9999.0, 200)
            .shared("distribution", "chebyshev", Rule::Any)
            .bounded("angle_of_inflow", 0.0, 180.0, 0),
    );
    let holder = types.register(
        NodeTypeBuilder::new("Profile")
            .update_policy(UpdatePolicy::Derived)
            .shared_bounded("sample_rate", 0.0, 9999.0, 200)
            .child_slot("camber_line"),
    );
    (types, line, holder)
}

/// A chain `root -> ... -> leaf` of `depth` profiles ending in a camber line.
fn chain(depth: usize) -> (Document, NodeId, NodeId) {
    let (types, line, holder) = registry();
    let mut doc = Document::new(types);
    let root = doc.create(holder);
    let mut parent = root;
    for _ in 1..depth {
        let next = doc.create(holder);
        doc.set(parent, "camber_line", next).unwrap();
        parent = next;
    }
    let leaf = doc.create(line);
    doc.set(parent, "camber_line", leaf).unwrap();
    doc.set(leaf, "angle_of_inflow", 1).unwrap();
    doc.set(root, "sample_rate", 100).unwrap();
    (doc, root, leaf)
}

fn bench_document(c: &mut Criterion) {
    let mut group = c.benchmark_group("document/get");

    group.bench_function("stored", |b| {
        let (doc, _, leaf) = chain(1);
        b.iter(|| black_box(doc.get(leaf, "angle_of_inflow").unwrap()));
    });

    group.bench_function("default", |b| {
        let (doc, _, leaf) = chain(1);
        b.iter(|| black_box(doc.get(leaf, "distribution").unwrap()));
    });

    group.bench_function("child_slot", |b| {
        let (doc, root, _) = chain(1);
        b.iter(|| black_box(doc.get(root, "camber_line").unwrap()));
    });

    group.finish();

    let mut group = c.benchmark_group("document/set");

    group.bench_function("idempotent", |b| {
        let (mut doc, _, leaf) = chain(1);
        b.iter(|| doc.set(leaf, "angle_of_inflow", 1).unwrap());
    });

    group.bench_function("rejected", |b| {
        let (mut doc, _, leaf) = chain(1);
        b.iter(|| black_box(doc.set(leaf, "angle_of_inflow", 400).is_err()));
    });

    for depth in [1_usize, 8, 32] {
        group.bench_with_input(BenchmarkId::new("bubbling", depth), &depth, |b, &depth| {
            b.iter_batched(
                || chain(depth),
                |(mut doc, _, leaf)| {
                    doc.set(leaf, "angle_of_inflow", 90).unwrap();
                    black_box(doc);
                },
                BatchSize::SmallInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("shared_fan_out", depth), &depth, |b, &depth| {
            b.iter_batched(
                || chain(depth),
                |(mut doc, root, _)| {
                    doc.set(root, "sample_rate", 500).unwrap();
                    black_box(doc);
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.bench_function("set_undo_redo", |b| {
        b.iter_batched(
            || chain(4),
            |(mut doc, _, leaf)| {
                doc.set(leaf, "angle_of_inflow", 90).unwrap();
                doc.undo().unwrap();
                doc.redo().unwrap();
                black_box(doc);
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();

    let mut group = c.benchmark_group("memo");

    group.bench_function("document_hit", |b| {
        let (mut doc, _, leaf) = chain(1);
        doc.memoized(leaf, "as_array", |_| vec![0.0_f64; 200]).unwrap();
        b.iter(|| black_box(doc.memoized(leaf, "as_array", |_| Vec::<f64>::new()).unwrap()));
    });

    group.bench_function("cache_refill", |b| {
        let mut cache = MemoCache::new();
        b.iter(|| {
            cache.invalidate();
            black_box(cache.get_or_insert_with("slope", || 0.5_f64));
        });
    });

    group.finish();

    let mut group = c.benchmark_group("undo_stack");

    group.bench_function(BenchmarkId::new("commit_bounded", 64), |b| {
        let mut stack = UndoStack::<i64, ()>::with_limit(64);
        b.iter(|| {
            stack.commit(Transaction::new(
                "step",
                |n: &mut i64| {
                    *n += 1;
                    Ok(())
                },
                |n: &mut i64| {
                    *n -= 1;
                    Ok(())
                },
            ));
        });
    });

    group.finish();
}

criterion_group!(benches, bench_document);
criterion_main!(benches);
