//! Benchmarks for converter resolution and value conversion
//!
//! Measures the cost of resolving converters with and without the
//! registry cache, structural conversion of nested documents and
//! record loading through a type catalog.
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use shapeshift_core::{default_registry, ConversionBus, TypeCatalog, TypeDescriptor, Value};

const CATALOG: &str = r#"{
    "enums": [{ "name": "Level", "constants": ["LOW", "MEDIUM", "HIGH"] }],
    "records": [
        { "name": "Reading",
          "fields": [{ "name": "sensor", "type": "string" },
                     { "name": "level", "type": "Level" },
                     { "name": "samples", "type": "List<double>" }] }
    ]
}"#;

fn ty(expr: &str) -> TypeDescriptor {
    expr.parse().unwrap()
}

fn create_map_document(entries: usize) -> Value {
    let body: Vec<String> = (0..entries)
        .map(|i| format!(r#""key{}": ["{}", {}, "0x{:x}"]"#, i, i, i, i))
        .collect();
    Value::from_json_str(&format!("{{{}}}", body.join(", "))).unwrap()
}

fn create_readings(count: usize) -> Value {
    let body: Vec<String> = (0..count)
        .map(|i| {
            format!(
                r#"{{"sensor": "s{}", "level": "medium", "samples": ["1.5", {}, 2]}}"#,
                i, i
            )
        })
        .collect();
    Value::from_json_str(&format!("[{}]", body.join(", "))).unwrap()
}

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");
    let targets = ["int", "List<string>", "Map<string, List<Set<long>>>"];

    for expr in targets {
        let target = ty(expr);

        let warm = default_registry();
        warm.get_for(&target).unwrap();
        group.bench_with_input(BenchmarkId::new("cached", expr), &target, |b, target| {
            b.iter(|| warm.get_for(black_box(target)).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("uncached", expr), &target, |b, target| {
            b.iter(|| default_registry().get_for(black_box(target)).unwrap())
        });
    }

    group.finish();
}

fn bench_structural_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("structural_conversion");
    let bus = default_registry();
    let target = ty("Map<string, List<int>>");

    for size in [10, 100, 1000] {
        let document = create_map_document(size);
        group.bench_with_input(BenchmarkId::new("map_of_lists", size), &document, |b, doc| {
            b.iter(|| bus.convert(black_box(doc), &target).unwrap())
        });
    }

    let typed = bus.convert(&create_map_document(100), &target).unwrap();
    group.bench_function("serialize_map_of_lists", |b| {
        b.iter(|| bus.serialize(black_box(&typed), &target).unwrap())
    });

    group.finish();
}

fn bench_record_loading(c: &mut Criterion) {
    let catalog = TypeCatalog::from_json_str(CATALOG).unwrap();
    let bus = catalog
        .install(ConversionBus::builder().with_defaults())
        .unwrap()
        .build();
    let target = TypeDescriptor::list(catalog.parse_type("Reading").unwrap());

    let mut group = c.benchmark_group("record_loading");
    for count in [1, 50, 500] {
        let readings = create_readings(count);
        group.bench_with_input(BenchmarkId::new("readings", count), &readings, |b, doc| {
            b.iter(|| bus.convert(black_box(doc), &target).unwrap())
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_resolution,
    bench_structural_conversion,
    bench_record_loading
);
criterion_main!(benches);
