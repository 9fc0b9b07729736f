//! Benchmarks for content reconciliation.
//!
//! Run with: cargo bench -p trellis-core --bench content

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use trellis_core::{Data, ElementData, Engine};

fn items(n: usize) -> Vec<Data> {
    (0..n)
        .map(|i| ElementData::new("li").text(i.to_string()).into())
        .collect()
}

fn bench_set_content(c: &mut Criterion) {
    let mut group = c.benchmark_group("content/set");

    for n in [10, 100, 1000] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("replace", n), &n, |b, &n| {
            let engine = Engine::new();
            let list = engine.create_model(ElementData::new("ul")).unwrap();
            b.iter(|| black_box(list.set_content(items(n)).unwrap()));
        });
    }

    group.finish();
}

fn bench_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("content/push");

    for n in [10, 100, 1000] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("append", n), &n, |b, &n| {
            b.iter(|| {
                let engine = Engine::new();
                let list = engine.create_model(ElementData::new("ul")).unwrap();
                let content = list.content_list().unwrap();
                for item in items(n) {
                    content.push(item).unwrap();
                }
                black_box(content.len())
            });
        });
    }

    group.finish();
}

fn bench_reverse_sync(c: &mut Criterion) {
    let mut group = c.benchmark_group("content/reverse_sync");

    for n in [10, 100] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("outside_appends", n), &n, |b, &n| {
            b.iter(|| {
                let engine = Engine::new();
                let list = engine.create_model(ElementData::new("ul")).unwrap();
                let doc = engine.document();
                for i in 0..n {
                    let text = doc.create_text(&i.to_string());
                    doc.append_child(list.node(), text).unwrap();
                }
                engine.tick();
                black_box(list.children().len())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_set_content, bench_push, bench_reverse_sync);
criterion_main!(benches);
