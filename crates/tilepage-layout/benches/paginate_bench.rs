//! Benchmarks for greedy widget pagination.
//!
//! Run with: cargo bench -p tilepage-layout

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tilepage_core::{SizeClass, SizeMap, WidgetCatalog, WidgetDescriptor, WidgetId};
use tilepage_layout::{Paginator, ViewportClass};

/// Synthetic catalog of `count` grid widgets with cycling default sizes.
fn synthetic_catalog(count: usize) -> WidgetCatalog {
    WidgetCatalog::from_descriptors((0..count).map(|i| {
        WidgetDescriptor::grid(format!("w{i}"), format!("Widget {i}"))
            .with_default_size(SizeClass::clamped((i % 3) as i64 + 1))
    }))
}

fn synthetic_order(count: usize) -> Vec<WidgetId> {
    (0..count).map(|i| WidgetId::new(format!("w{i}"))).collect()
}

fn bench_paginate(c: &mut Criterion) {
    let mut group = c.benchmark_group("paginate");
    let paginator = Paginator::default();

    for count in [7usize, 64, 512] {
        let catalog = synthetic_catalog(count);
        let order = synthetic_order(count);
        let sizes = SizeMap::new();

        for class in ViewportClass::ALL {
            group.bench_with_input(
                BenchmarkId::new(class.label(), count),
                &(&order, &sizes, &catalog),
                |b, (order, sizes, catalog)| {
                    b.iter(|| paginator.paginate(black_box(order), sizes, catalog, class))
                },
            );
        }
    }

    group.finish();
}

fn bench_standard_catalog(c: &mut Criterion) {
    let catalog = WidgetCatalog::standard();
    let order: Vec<WidgetId> = catalog.all().iter().map(|d| d.id.clone()).collect();
    let sizes: SizeMap = order
        .iter()
        .map(|id| (id.clone(), SizeClass::MAX))
        .collect();
    let paginator = Paginator::default();

    c.bench_function("paginate/standard_all_max", |b| {
        b.iter(|| paginator.paginate(black_box(&order), &sizes, &catalog, ViewportClass::Medium))
    });
}

criterion_group!(benches, bench_paginate, bench_standard_catalog);
criterion_main!(benches);
