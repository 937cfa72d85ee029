//! Coercion of loosely-typed values into declared target types.
//!
//! Rules, in order:
//!
//! 1. NULL stays NULL for nullable targets and reference types (text,
//!    binary, JSON, untyped).
//! 2. NULL into a non-nullable value type yields that type's zero value
//!    (`0`, `false`, the nil UUID, the first enum variant, ...).
//! 3. `Option<T>` targets are converted as `T`.
//! 4. Enum targets accept a variant name (ignoring case) or a defined
//!    discriminant, as an integer or as numeric text.
//! 5. UUID targets accept textual forms and exactly 16 raw bytes.
//! 6. Everything else goes through the standard scalar conversions:
//!    integer widening and range-checked narrowing, banker's rounding from
//!    floating point and decimal, text parsing, date/time reshaping and
//!    `Display` formatting into text.
//!
//! Every failure names the offending value, its runtime type and the target.

use crate::declared::{DeclaredType, EnumInfo, SqlType, TypeKind};
use crate::error::TypeError;
use crate::value::SqlValue;

#[cfg(feature = "chrono")]
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};
#[cfg(feature = "decimal")]
use rust_decimal::prelude::ToPrimitive;

#[cfg(feature = "chrono")]
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

#[cfg(feature = "chrono")]
const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

#[cfg(feature = "chrono")]
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
];

#[cfg(feature = "chrono")]
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f %:z", "%Y-%m-%d %H:%M:%S%.f%:z"];

/// Convert a value into the declared target type.
///
/// The result is normalised to the variant matching `target.kind`, so it can
/// be extracted with [`FromSql`](crate::FromSql) without further coercion.
/// Enum targets normalise to `SqlValue::BigInt` holding the discriminant.
pub fn convert(value: &SqlValue, target: &DeclaredType) -> Result<SqlValue, TypeError> {
    if value.is_null() {
        if target.nullable {
            return Ok(SqlValue::Null);
        }
        return Ok(target.kind.zero_value().unwrap_or(SqlValue::Null));
    }

    match target.kind {
        TypeKind::Enum(info) => convert_enum(value, info).map(SqlValue::BigInt),
        #[cfg(feature = "uuid")]
        TypeKind::Uuid => convert_uuid(value, target),
        _ => convert_scalar(value, target),
    }
}

/// Convert a value straight into a Rust type.
pub fn convert_to<T: SqlType>(value: &SqlValue) -> Result<T, TypeError> {
    let converted = convert(value, &T::declared_type())?;
    from_converted(&converted)
}

/// Extract a Rust type from a value already produced by [`convert`].
///
/// NULL into a non-`Option` reference type (such as `String`) yields
/// `T::default()`.
pub fn from_converted<T: SqlType>(value: &SqlValue) -> Result<T, TypeError> {
    if value.is_null() && !T::declared_type().nullable {
        return Ok(T::default());
    }
    T::from_sql(value)
}

/// Resolve a value to the discriminant of an enum variant.
///
/// Accepts a variant name (ignoring ASCII case), numeric text, or any
/// integer equal to a declared discriminant.
pub fn convert_enum(value: &SqlValue, info: &EnumInfo) -> Result<i64, TypeError> {
    let found = match value {
        SqlValue::Null => return Err(TypeError::UnexpectedNull),
        SqlValue::String(s) => {
            let s = s.trim();
            info.find_by_name(s).or_else(|| {
                s.parse::<i64>()
                    .ok()
                    .and_then(|d| info.find_by_discriminant(d))
            })
        }
        other if other.is_integral() => other
            .as_i64()
            .and_then(|d| info.find_by_discriminant(d)),
        _ => None,
    };

    found
        .map(|(_, discriminant)| discriminant)
        .ok_or_else(|| TypeError::InvalidEnum {
            value: value.to_string(),
            enum_name: info.name,
        })
}

#[cfg(feature = "uuid")]
fn convert_uuid(value: &SqlValue, target: &DeclaredType) -> Result<SqlValue, TypeError> {
    match value {
        SqlValue::Uuid(v) => Ok(SqlValue::Uuid(*v)),
        SqlValue::String(s) => uuid::Uuid::parse_str(s.trim())
            .map(SqlValue::Uuid)
            .map_err(|e| TypeError::InvalidUuid {
                value: s.clone(),
                reason: e.to_string(),
            }),
        SqlValue::Binary(b) if b.len() == 16 => uuid::Uuid::from_slice(b)
            .map(SqlValue::Uuid)
            .map_err(|e| TypeError::InvalidUuid {
                value: value.to_string(),
                reason: e.to_string(),
            }),
        _ => Err(failure(value, target, "no unique identifier form")),
    }
}

fn convert_scalar(value: &SqlValue, target: &DeclaredType) -> Result<SqlValue, TypeError> {
    let fail = |reason: String| failure(value, target, reason);

    match target.kind {
        TypeKind::Value => Ok(value.clone()),
        TypeKind::Bool => to_bool(value).map(SqlValue::Bool).map_err(fail),
        TypeKind::U8 => narrow(value, target).map(SqlValue::TinyInt),
        TypeKind::I16 => narrow(value, target).map(SqlValue::SmallInt),
        TypeKind::I32 => narrow(value, target).map(SqlValue::Int),
        TypeKind::I64 => narrow(value, target).map(SqlValue::BigInt),
        TypeKind::F32 => to_f64(value)
            .map(|v| SqlValue::Float(v as f32))
            .map_err(fail),
        TypeKind::F64 => to_f64(value).map(SqlValue::Double).map_err(fail),
        #[cfg(feature = "decimal")]
        TypeKind::Decimal => to_decimal(value).map(SqlValue::Decimal).map_err(fail),
        TypeKind::String => to_text(value).map(SqlValue::String).map_err(fail),
        TypeKind::Binary => match value {
            SqlValue::Binary(b) => Ok(SqlValue::Binary(b.clone())),
            _ => Err(fail("only binary values convert to binary".to_string())),
        },
        #[cfg(feature = "uuid")]
        TypeKind::Uuid => convert_uuid(value, target),
        #[cfg(feature = "chrono")]
        TypeKind::Date => to_date(value).map(SqlValue::Date).map_err(fail),
        #[cfg(feature = "chrono")]
        TypeKind::Time => to_time(value).map(SqlValue::Time).map_err(fail),
        #[cfg(feature = "chrono")]
        TypeKind::DateTime => to_datetime(value).map(SqlValue::DateTime).map_err(fail),
        #[cfg(feature = "chrono")]
        TypeKind::DateTimeOffset => to_datetime_offset(value)
            .map(SqlValue::DateTimeOffset)
            .map_err(fail),
        #[cfg(feature = "json")]
        TypeKind::Json => to_json(value).map(SqlValue::Json).map_err(fail),
        TypeKind::Enum(info) => convert_enum(value, info).map(SqlValue::BigInt),
    }
}

fn failure(value: &SqlValue, target: &DeclaredType, reason: impl Into<String>) -> TypeError {
    TypeError::Conversion {
        value: value.to_string(),
        source_type: value.type_name(),
        target_type: target.to_string(),
        reason: reason.into(),
    }
}

fn narrow<T: TryFrom<i128>>(value: &SqlValue, target: &DeclaredType) -> Result<T, TypeError> {
    let wide = to_i128(value).map_err(|reason| failure(value, target, reason))?;
    T::try_from(wide).map_err(|_| failure(value, target, "value out of range"))
}

fn to_i128(value: &SqlValue) -> Result<i128, String> {
    match value {
        SqlValue::Bool(v) => Ok(i128::from(*v)),
        SqlValue::TinyInt(v) => Ok(i128::from(*v)),
        SqlValue::SmallInt(v) => Ok(i128::from(*v)),
        SqlValue::Int(v) => Ok(i128::from(*v)),
        SqlValue::BigInt(v) => Ok(i128::from(*v)),
        SqlValue::Float(v) => float_to_i128(f64::from(*v)),
        SqlValue::Double(v) => float_to_i128(*v),
        #[cfg(feature = "decimal")]
        SqlValue::Decimal(v) => v
            .round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointNearestEven)
            .to_i128()
            .ok_or_else(|| "value out of range".to_string()),
        SqlValue::String(s) => s.trim().parse::<i128>().map_err(|e| e.to_string()),
        _ => Err("no numeric form".to_string()),
    }
}

fn float_to_i128(v: f64) -> Result<i128, String> {
    if v.is_finite() {
        Ok(v.round_ties_even() as i128)
    } else {
        Err("value is not finite".to_string())
    }
}

fn to_f64(value: &SqlValue) -> Result<f64, String> {
    match value {
        SqlValue::Bool(v) => Ok(if *v { 1.0 } else { 0.0 }),
        SqlValue::Float(v) => Ok(f64::from(*v)),
        SqlValue::Double(v) => Ok(*v),
        #[cfg(feature = "decimal")]
        SqlValue::Decimal(v) => v.to_f64().ok_or_else(|| "value out of range".to_string()),
        SqlValue::String(s) => s.trim().parse::<f64>().map_err(|e| e.to_string()),
        other => other
            .as_i64()
            .map(|v| v as f64)
            .ok_or_else(|| "no numeric form".to_string()),
    }
}

fn to_bool(value: &SqlValue) -> Result<bool, String> {
    match value {
        SqlValue::Bool(v) => Ok(*v),
        SqlValue::Float(v) => Ok(*v != 0.0),
        SqlValue::Double(v) => Ok(*v != 0.0),
        #[cfg(feature = "decimal")]
        SqlValue::Decimal(v) => Ok(!v.is_zero()),
        SqlValue::String(s) => {
            let s = s.trim();
            if s.eq_ignore_ascii_case("true") {
                Ok(true)
            } else if s.eq_ignore_ascii_case("false") {
                Ok(false)
            } else {
                Err("expected 'true' or 'false'".to_string())
            }
        }
        other => other
            .as_i64()
            .map(|v| v != 0)
            .ok_or_else(|| "no boolean form".to_string()),
    }
}

#[cfg(feature = "decimal")]
fn to_decimal(value: &SqlValue) -> Result<rust_decimal::Decimal, String> {
    use rust_decimal::Decimal;

    match value {
        SqlValue::Decimal(v) => Ok(*v),
        SqlValue::Bool(v) => Ok(if *v { Decimal::ONE } else { Decimal::ZERO }),
        SqlValue::Float(v) => Decimal::try_from(*v).map_err(|e| e.to_string()),
        SqlValue::Double(v) => Decimal::try_from(*v).map_err(|e| e.to_string()),
        SqlValue::String(s) => {
            let s = s.trim();
            s.parse::<Decimal>()
                .or_else(|_| Decimal::from_scientific(s))
                .map_err(|e| e.to_string())
        }
        other => other
            .as_i64()
            .map(Decimal::from)
            .ok_or_else(|| "no numeric form".to_string()),
    }
}

fn to_text(value: &SqlValue) -> Result<String, String> {
    match value {
        SqlValue::String(s) => Ok(s.clone()),
        SqlValue::Binary(_) => Err("binary values have no text form".to_string()),
        #[cfg(feature = "json")]
        SqlValue::Json(serde_json::Value::String(s)) => Ok(s.clone()),
        other => Ok(other.to_string()),
    }
}

#[cfg(feature = "chrono")]
fn parse_date_only(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
}

#[cfg(feature = "chrono")]
fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .or_else(|| parse_date_only(s).map(|d| d.and_time(NaiveTime::default())))
}

#[cfg(feature = "chrono")]
fn utc_offset(dt: NaiveDateTime) -> DateTime<FixedOffset> {
    DateTime::from_naive_utc_and_offset(dt, Utc.fix())
}

#[cfg(feature = "chrono")]
fn to_date(value: &SqlValue) -> Result<NaiveDate, String> {
    match value {
        SqlValue::Date(v) => Ok(*v),
        SqlValue::DateTime(v) => Ok(v.date()),
        SqlValue::DateTimeOffset(v) => Ok(v.date_naive()),
        SqlValue::String(s) => {
            let s = s.trim();
            parse_date_only(s)
                .or_else(|| parse_datetime(s).map(|dt| dt.date()))
                .ok_or_else(|| "unrecognised date format".to_string())
        }
        _ => Err("no date form".to_string()),
    }
}

#[cfg(feature = "chrono")]
fn to_time(value: &SqlValue) -> Result<NaiveTime, String> {
    match value {
        SqlValue::Time(v) => Ok(*v),
        SqlValue::DateTime(v) => Ok(v.time()),
        SqlValue::DateTimeOffset(v) => Ok(v.time()),
        SqlValue::String(s) => {
            let s = s.trim();
            TIME_FORMATS
                .iter()
                .find_map(|format| NaiveTime::parse_from_str(s, format).ok())
                .or_else(|| parse_datetime(s).map(|dt| dt.time()))
                .ok_or_else(|| "unrecognised time format".to_string())
        }
        _ => Err("no time form".to_string()),
    }
}

#[cfg(feature = "chrono")]
fn to_datetime(value: &SqlValue) -> Result<NaiveDateTime, String> {
    match value {
        SqlValue::DateTime(v) => Ok(*v),
        SqlValue::Date(v) => Ok(v.and_time(NaiveTime::default())),
        SqlValue::DateTimeOffset(v) => Ok(v.naive_utc()),
        SqlValue::String(s) => {
            parse_datetime(s.trim()).ok_or_else(|| "unrecognised date/time format".to_string())
        }
        _ => Err("no date/time form".to_string()),
    }
}

#[cfg(feature = "chrono")]
fn to_datetime_offset(value: &SqlValue) -> Result<DateTime<FixedOffset>, String> {
    match value {
        SqlValue::DateTimeOffset(v) => Ok(*v),
        SqlValue::DateTime(v) => Ok(utc_offset(*v)),
        SqlValue::Date(v) => Ok(utc_offset(v.and_time(NaiveTime::default()))),
        SqlValue::String(s) => {
            let s = s.trim();
            DateTime::parse_from_rfc3339(s)
                .ok()
                .or_else(|| {
                    OFFSET_FORMATS
                        .iter()
                        .find_map(|format| DateTime::parse_from_str(s, format).ok())
                })
                .or_else(|| parse_datetime(s).map(utc_offset))
                .ok_or_else(|| "unrecognised date/time format".to_string())
        }
        _ => Err("no date/time form".to_string()),
    }
}

#[cfg(feature = "json")]
fn to_json(value: &SqlValue) -> Result<serde_json::Value, String> {
    use serde_json::Value;

    match value {
        SqlValue::Json(v) => Ok(v.clone()),
        SqlValue::String(s) => serde_json::from_str(s).map_err(|e| e.to_string()),
        SqlValue::Bool(v) => Ok(Value::Bool(*v)),
        SqlValue::Float(v) => serde_json::Number::from_f64(f64::from(*v))
            .map(Value::Number)
            .ok_or_else(|| "value is not finite".to_string()),
        SqlValue::Double(v) => serde_json::Number::from_f64(*v)
            .map(Value::Number)
            .ok_or_else(|| "value is not finite".to_string()),
        SqlValue::Binary(_) => Err("binary values have no JSON form".to_string()),
        other => Ok(other
            .as_i64()
            .map_or_else(|| Value::String(other.to_string()), Value::from)),
    }
}
