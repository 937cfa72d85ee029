//! Strict extraction of Rust values from SQL values.
//!
//! `FromSql` only accepts values that already have the right shape, plus
//! lossless integer widening. Loose coercion (parsing, narrowing, enum names)
//! lives in [`crate::convert`], which normalises a value before it reaches
//! `FromSql`.

use crate::error::TypeError;
use crate::value::SqlValue;

/// Trait for types that can be extracted from SQL values.
pub trait FromSql: Sized {
    /// Extract this type from a SQL value.
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError>;

    /// Extract this type from a SQL value that may be NULL.
    ///
    /// Returns `None` if the value is NULL.
    fn from_sql_nullable(value: &SqlValue) -> Result<Option<Self>, TypeError> {
        if value.is_null() {
            Ok(None)
        } else {
            Self::from_sql(value).map(Some)
        }
    }
}

fn mismatch(expected: &'static str, value: &SqlValue) -> TypeError {
    if value.is_null() {
        TypeError::UnexpectedNull
    } else {
        TypeError::TypeMismatch {
            expected,
            actual: value.type_name().to_string(),
        }
    }
}

impl FromSql for bool {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        match value {
            SqlValue::Bool(v) => Ok(*v),
            _ => Err(mismatch("bool", value)),
        }
    }
}

impl FromSql for u8 {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        match value {
            SqlValue::TinyInt(v) => Ok(*v),
            _ => Err(mismatch("u8", value)),
        }
    }
}

impl FromSql for i16 {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        match value {
            SqlValue::SmallInt(v) => Ok(*v),
            SqlValue::TinyInt(v) => Ok(i16::from(*v)),
            _ => Err(mismatch("i16", value)),
        }
    }
}

impl FromSql for i32 {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        match value {
            SqlValue::Int(v) => Ok(*v),
            SqlValue::SmallInt(v) => Ok(i32::from(*v)),
            SqlValue::TinyInt(v) => Ok(i32::from(*v)),
            _ => Err(mismatch("i32", value)),
        }
    }
}

impl FromSql for i64 {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        value.as_i64().ok_or_else(|| mismatch("i64", value))
    }
}

impl FromSql for f32 {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        match value {
            SqlValue::Float(v) => Ok(*v),
            _ => Err(mismatch("f32", value)),
        }
    }
}

impl FromSql for f64 {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        value.as_f64().ok_or_else(|| mismatch("f64", value))
    }
}

impl FromSql for String {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| mismatch("String", value))
    }
}

impl FromSql for Vec<u8> {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        value
            .as_bytes()
            .map(<[u8]>::to_vec)
            .ok_or_else(|| mismatch("Vec<u8>", value))
    }
}

impl FromSql for SqlValue {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        Ok(value.clone())
    }
}

impl<T: FromSql> FromSql for Option<T> {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        T::from_sql_nullable(value)
    }
}

#[cfg(feature = "uuid")]
impl FromSql for uuid::Uuid {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        match value {
            SqlValue::Uuid(v) => Ok(*v),
            _ => Err(mismatch("Uuid", value)),
        }
    }
}

#[cfg(feature = "decimal")]
impl FromSql for rust_decimal::Decimal {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        match value {
            SqlValue::Decimal(v) => Ok(*v),
            other => other
                .as_i64()
                .map(rust_decimal::Decimal::from)
                .ok_or_else(|| mismatch("Decimal", value)),
        }
    }
}

#[cfg(feature = "chrono")]
impl FromSql for chrono::NaiveDate {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        match value {
            SqlValue::Date(v) => Ok(*v),
            _ => Err(mismatch("NaiveDate", value)),
        }
    }
}

#[cfg(feature = "chrono")]
impl FromSql for chrono::NaiveTime {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        match value {
            SqlValue::Time(v) => Ok(*v),
            _ => Err(mismatch("NaiveTime", value)),
        }
    }
}

#[cfg(feature = "chrono")]
impl FromSql for chrono::NaiveDateTime {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        match value {
            SqlValue::DateTime(v) => Ok(*v),
            _ => Err(mismatch("NaiveDateTime", value)),
        }
    }
}

#[cfg(feature = "chrono")]
impl FromSql for chrono::DateTime<chrono::FixedOffset> {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        match value {
            SqlValue::DateTimeOffset(v) => Ok(*v),
            _ => Err(mismatch("DateTime<FixedOffset>", value)),
        }
    }
}

#[cfg(feature = "json")]
impl FromSql for serde_json::Value {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        match value {
            SqlValue::Json(v) => Ok(v.clone()),
            _ => Err(mismatch("JsonValue", value)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_sql_widens_integers() {
        assert_eq!(i64::from_sql(&SqlValue::TinyInt(7)).unwrap(), 7);
        assert_eq!(i32::from_sql(&SqlValue::SmallInt(-3)).unwrap(), -3);
    }

    #[test]
    fn test_from_sql_rejects_narrowing() {
        let err = i32::from_sql(&SqlValue::BigInt(1)).unwrap_err();
        assert!(matches!(err, TypeError::TypeMismatch { expected: "i32", .. }));
    }

    #[test]
    fn test_from_sql_null() {
        assert!(i32::from_sql(&SqlValue::Null).unwrap_err().is_null());
        assert_eq!(Option::<i32>::from_sql(&SqlValue::Null).unwrap(), None);
    }

    #[test]
    fn test_from_sql_string() {
        let value = SqlValue::String("hello".to_string());
        assert_eq!(String::from_sql(&value).unwrap(), "hello");
    }
}
