//! # rowbind-types
//!
//! Loosely-typed SQL values and the coercion rules used to turn them into
//! strongly-typed Rust values.
//!
//! A query result hands out values whose runtime type rarely matches the Rust
//! type a caller wants: an `INT` column read into an `i64`, a `VARCHAR`
//! holding an enum literal, a 16-byte `BINARY` holding a GUID. This crate
//! describes target types at runtime ([`DeclaredType`]) and converts any
//! [`SqlValue`] into them with [`convert`].
//!
//! ## Features
//!
//! - `chrono` (default): Enable date/time type support via chrono
//! - `uuid` (default): Enable unique identifier support
//! - `decimal` (default): Enable decimal type support via rust_decimal
//! - `json`: Enable JSON type support via serde_json
//!
//! ## Type Mappings
//!
//! | Declared kind | Rust Type | Normalised value |
//! |---------------|-----------|------------------|
//! | `Bool` | `bool` | `SqlValue::Bool` |
//! | `U8` | `u8` | `SqlValue::TinyInt` |
//! | `I16` | `i16` | `SqlValue::SmallInt` |
//! | `I32` | `i32` | `SqlValue::Int` |
//! | `I64` | `i64` | `SqlValue::BigInt` |
//! | `F32` | `f32` | `SqlValue::Float` |
//! | `F64` | `f64` | `SqlValue::Double` |
//! | `Decimal` | `rust_decimal::Decimal` | `SqlValue::Decimal` |
//! | `String` | `String` | `SqlValue::String` |
//! | `Binary` | `Vec<u8>` | `SqlValue::Binary` |
//! | `Uuid` | `uuid::Uuid` | `SqlValue::Uuid` |
//! | `Date` | `chrono::NaiveDate` | `SqlValue::Date` |
//! | `Time` | `chrono::NaiveTime` | `SqlValue::Time` |
//! | `DateTime` | `chrono::NaiveDateTime` | `SqlValue::DateTime` |
//! | `DateTimeOffset` | `chrono::DateTime<FixedOffset>` | `SqlValue::DateTimeOffset` |
//! | `Enum` | any `SqlEnum` | `SqlValue::BigInt` (discriminant) |

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod convert;
pub mod declared;
pub mod error;
pub mod from_sql;
pub mod to_sql;
pub mod value;

pub use convert::{convert, convert_enum, convert_to, from_converted};
pub use declared::{DeclaredType, EnumInfo, SqlEnum, SqlType, TypeKind};
pub use error::TypeError;
pub use from_sql::FromSql;
pub use to_sql::ToSql;
pub use value::SqlValue;
