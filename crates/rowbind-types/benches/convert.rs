//! Benchmarks for value coercion.

#![allow(clippy::unwrap_used, missing_docs)]

use criterion::{Criterion, criterion_group, criterion_main};
use rowbind_types::{DeclaredType, EnumInfo, SqlType, SqlValue, TypeKind, convert, convert_to};
use std::hint::black_box;

static ACCOUNT_TYPE: EnumInfo = EnumInfo {
    name: "AccountType",
    variants: &[("Checking", 0), ("Savings", 1), ("MoneyMarket", 2)],
};

/// Benchmark conversions that need no coercion.
fn bench_identity(c: &mut Criterion) {
    let mut group = c.benchmark_group("identity");

    let int = SqlValue::Int(42);
    group.bench_function("i32", |b| {
        b.iter(|| convert_to::<i32>(black_box(&int)).unwrap())
    });

    let text = SqlValue::from("a typical column value");
    group.bench_function("string", |b| {
        b.iter(|| convert_to::<String>(black_box(&text)).unwrap())
    });

    group.finish();
}

/// Benchmark conversions that reshape the value.
fn bench_coercion(c: &mut Criterion) {
    let mut group = c.benchmark_group("coercion");

    let big = SqlValue::BigInt(1_000);
    group.bench_function("i64_to_i16", |b| {
        b.iter(|| convert_to::<i16>(black_box(&big)).unwrap())
    });

    let numeric_text = SqlValue::from("123456");
    group.bench_function("text_to_i64", |b| {
        b.iter(|| convert_to::<i64>(black_box(&numeric_text)).unwrap())
    });

    let double = SqlValue::Double(2.5);
    group.bench_function("f64_to_i32", |b| {
        b.iter(|| convert_to::<i32>(black_box(&double)).unwrap())
    });

    let null = SqlValue::Null;
    let target = i64::declared_type();
    group.bench_function("null_to_zero", |b| {
        b.iter(|| convert(black_box(&null), black_box(&target)).unwrap())
    });

    group.finish();
}

/// Benchmark enum literal resolution.
fn bench_enum(c: &mut Criterion) {
    let mut group = c.benchmark_group("enum");
    let target = DeclaredType::new("AccountType", TypeKind::Enum(&ACCOUNT_TYPE));

    let name = SqlValue::from("moneymarket");
    group.bench_function("by_name", |b| {
        b.iter(|| convert(black_box(&name), black_box(&target)).unwrap())
    });

    let number = SqlValue::Int(1);
    group.bench_function("by_discriminant", |b| {
        b.iter(|| convert(black_box(&number), black_box(&target)).unwrap())
    });

    group.finish();
}

/// Benchmark unique identifier parsing.
#[cfg(feature = "uuid")]
fn bench_uuid(c: &mut Criterion) {
    let mut group = c.benchmark_group("uuid");

    let text = SqlValue::from("8e3f5b9c-2a41-4d6e-9b1f-0c7a3e5d2f10");
    group.bench_function("from_text", |b| {
        b.iter(|| convert_to::<uuid::Uuid>(black_box(&text)).unwrap())
    });

    let bytes = SqlValue::from(vec![0x8eu8; 16]);
    group.bench_function("from_bytes", |b| {
        b.iter(|| convert_to::<uuid::Uuid>(black_box(&bytes)).unwrap())
    });

    group.finish();
}

#[cfg(not(feature = "uuid"))]
fn bench_uuid(_c: &mut Criterion) {}

criterion_group!(benches, bench_identity, bench_coercion, bench_enum, bench_uuid);
criterion_main!(benches);
