#![no_main]

use arbitrary::Arbitrary;
use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use rowbind_types::{DeclaredType, EnumInfo, SqlType, SqlValue, TypeKind, convert};

static ACCOUNT_TYPE: EnumInfo = EnumInfo {
    name: "AccountType",
    variants: &[("Checking", 0), ("Savings", 1), ("MoneyMarket", -2)],
};

/// Arbitrary source value.
#[derive(Debug, Arbitrary)]
enum FuzzValue {
    Null,
    Bool(bool),
    TinyInt(u8),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    Float(f32),
    Double(f64),
    Text(String),
    Binary(Vec<u8>),
}

impl From<FuzzValue> for SqlValue {
    fn from(value: FuzzValue) -> Self {
        match value {
            FuzzValue::Null => SqlValue::Null,
            FuzzValue::Bool(v) => SqlValue::Bool(v),
            FuzzValue::TinyInt(v) => SqlValue::TinyInt(v),
            FuzzValue::SmallInt(v) => SqlValue::SmallInt(v),
            FuzzValue::Int(v) => SqlValue::Int(v),
            FuzzValue::BigInt(v) => SqlValue::BigInt(v),
            FuzzValue::Float(v) => SqlValue::Float(v),
            FuzzValue::Double(v) => SqlValue::Double(v),
            FuzzValue::Text(v) => SqlValue::String(v),
            FuzzValue::Binary(v) => SqlValue::Binary(Bytes::from(v)),
        }
    }
}

/// Fuzz input: a value, a target selector and nullability.
#[derive(Debug, Arbitrary)]
struct FuzzInput {
    value: FuzzValue,
    target: u8,
    nullable: bool,
}

fn target(selector: u8) -> DeclaredType {
    match selector % 17 {
        0 => bool::declared_type(),
        1 => u8::declared_type(),
        2 => i16::declared_type(),
        3 => i32::declared_type(),
        4 => i64::declared_type(),
        5 => f32::declared_type(),
        6 => f64::declared_type(),
        7 => rust_decimal::Decimal::declared_type(),
        8 => String::declared_type(),
        9 => Vec::<u8>::declared_type(),
        10 => uuid::Uuid::declared_type(),
        11 => chrono::NaiveDate::declared_type(),
        12 => chrono::NaiveTime::declared_type(),
        13 => chrono::NaiveDateTime::declared_type(),
        14 => chrono::DateTime::<chrono::FixedOffset>::declared_type(),
        15 => serde_json::Value::declared_type(),
        _ => DeclaredType::new(ACCOUNT_TYPE.name, TypeKind::Enum(&ACCOUNT_TYPE)),
    }
}

fuzz_target!(|input: FuzzInput| {
    let mut declared = target(input.target);
    if input.nullable {
        declared = declared.into_nullable();
    }

    let value = SqlValue::from(input.value);
    match convert(&value, &declared) {
        Ok(converted) if value.is_null() && declared.nullable => assert!(converted.is_null()),
        Ok(converted) => {
            // Whatever comes out must be accepted as input again.
            let _ = convert(&converted, &declared);
        }
        Err(_) => {}
    }
});
