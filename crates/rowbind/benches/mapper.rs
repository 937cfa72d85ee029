//! Benchmarks for row mapping and insert generation.

#![allow(clippy::unwrap_used, missing_docs)]

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use rowbind::{
    Command, Escaping, Reflect, Row, SqlValue, TypeDescriptorCache, generate_insert, map_row,
    map_row_dynamic,
};
use std::hint::black_box;

const TEMPLATE: &str = "INSERT INTO {0} ({1}) VALUES({2});";

#[derive(Debug, Default, Reflect)]
#[rowbind(rename_all = "PascalCase")]
struct Customer {
    customer_id: i32,
    first_name: String,
    middle_name: Option<String>,
    last_name: String,
    email: String,
    balance: f64,
    is_active: bool,
}

fn customer_row() -> Row {
    Row::from_pairs([
        ("CustomerId", SqlValue::Int(42)),
        ("FirstName", SqlValue::from("Clark")),
        ("MiddleName", SqlValue::Null),
        ("LastName", SqlValue::from("Kent")),
        ("Email", SqlValue::from("clark@dailyplanet.com")),
        ("Balance", SqlValue::from("1938.25")),
        ("IsActive", SqlValue::TinyInt(1)),
    ])
}

/// Benchmark descriptor lookups.
fn bench_descriptor(c: &mut Criterion) {
    let mut group = c.benchmark_group("descriptor");

    group.bench_function("cached", |b| {
        let cache = TypeDescriptorCache::new();
        cache.descriptor::<Customer>();
        b.iter(|| black_box(cache.descriptor::<Customer>()))
    });

    group.bench_function("cold", |b| {
        b.iter_batched(
            TypeDescriptorCache::new,
            |cache| black_box(cache.descriptor::<Customer>()),
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

/// Benchmark mapping a row onto objects.
fn bench_map_row(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_row");
    let row = customer_row();

    group.bench_function("typed", |b| {
        b.iter(|| map_row::<Customer, _>(black_box(&row)).unwrap())
    });

    group.bench_function("dynamic", |b| {
        b.iter(|| map_row_dynamic(black_box(&row)))
    });

    let scalar = [("count", SqlValue::Int(7))];
    group.bench_function("scalar", |b| {
        b.iter(|| map_row::<i64, _>(black_box(&scalar)).unwrap())
    });

    group.finish();
}

/// Benchmark INSERT generation.
fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    let customer: Customer = map_row(&customer_row()).unwrap();

    group.bench_function("single", |b| {
        b.iter_batched(
            Command::new,
            |mut cmd| {
                generate_insert(&mut cmd, black_box(&customer), TEMPLATE, None, Escaping::SquareBracket)
                    .unwrap();
                cmd
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function("batch_100", |b| {
        b.iter_batched(
            Command::new,
            |mut cmd| {
                for _ in 0..100 {
                    generate_insert(&mut cmd, &customer, TEMPLATE, None, Escaping::SquareBracket)
                        .unwrap();
                }
                cmd
            },
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_descriptor, bench_map_row, bench_insert);
criterion_main!(benches);
