//! Runtime descriptions of conversion target types.
//!
//! A [`DeclaredType`] is what a member descriptor records about the Rust type
//! of a field or property, and what [`convert`](crate::convert::convert)
//! coerces values into.

use std::fmt;

use crate::from_sql::FromSql;
use crate::to_sql::ToSql;
use crate::value::SqlValue;

/// Metadata for an enumeration usable as a conversion target.
///
/// Variants are listed in declaration order; the first one is the enum's
/// zero value.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct EnumInfo {
    /// Enum type name.
    pub name: &'static str,
    /// `(variant name, discriminant)` pairs in declaration order.
    pub variants: &'static [(&'static str, i64)],
}

impl EnumInfo {
    /// Find a variant by name, ignoring ASCII case.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<(&'static str, i64)> {
        self.variants
            .iter()
            .find(|(variant, _)| variant.eq_ignore_ascii_case(name))
            .copied()
    }

    /// Find a variant by discriminant.
    #[must_use]
    pub fn find_by_discriminant(&self, discriminant: i64) -> Option<(&'static str, i64)> {
        self.variants
            .iter()
            .find(|(_, value)| *value == discriminant)
            .copied()
    }

    /// The first declared variant, if any.
    #[must_use]
    pub fn first(&self) -> Option<(&'static str, i64)> {
        self.variants.first().copied()
    }
}

/// The shape of a conversion target, without nullability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum TypeKind {
    /// `bool`.
    Bool,
    /// `u8`.
    U8,
    /// `i16`.
    I16,
    /// `i32`.
    I32,
    /// `i64`.
    I64,
    /// `f32`.
    F32,
    /// `f64`.
    F64,
    /// `rust_decimal::Decimal`.
    #[cfg(feature = "decimal")]
    Decimal,
    /// `String`.
    String,
    /// `Vec<u8>`.
    Binary,
    /// `uuid::Uuid`.
    #[cfg(feature = "uuid")]
    Uuid,
    /// `chrono::NaiveDate`.
    #[cfg(feature = "chrono")]
    Date,
    /// `chrono::NaiveTime`.
    #[cfg(feature = "chrono")]
    Time,
    /// `chrono::NaiveDateTime`.
    #[cfg(feature = "chrono")]
    DateTime,
    /// `chrono::DateTime<FixedOffset>`.
    #[cfg(feature = "chrono")]
    DateTimeOffset,
    /// `serde_json::Value`.
    #[cfg(feature = "json")]
    Json,
    /// An enumeration described by [`EnumInfo`].
    Enum(&'static EnumInfo),
    /// An untyped [`SqlValue`]; values pass through unchanged.
    Value,
}

impl TypeKind {
    /// Check if the kind is a value type.
    ///
    /// Value types have a zero value that stands in for NULL when the target
    /// is not nullable. Text, binary, JSON and untyped values are reference
    /// types and keep NULL.
    #[must_use]
    pub fn is_value_type(self) -> bool {
        !matches!(self, Self::String | Self::Binary | Self::Value) && !self.is_json()
    }

    #[cfg(feature = "json")]
    fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }

    #[cfg(not(feature = "json"))]
    fn is_json(self) -> bool {
        false
    }

    /// The zero value for value types, `None` for reference types.
    #[must_use]
    pub fn zero_value(self) -> Option<SqlValue> {
        match self {
            Self::Bool => Some(SqlValue::Bool(false)),
            Self::U8 => Some(SqlValue::TinyInt(0)),
            Self::I16 => Some(SqlValue::SmallInt(0)),
            Self::I32 => Some(SqlValue::Int(0)),
            Self::I64 => Some(SqlValue::BigInt(0)),
            Self::F32 => Some(SqlValue::Float(0.0)),
            Self::F64 => Some(SqlValue::Double(0.0)),
            #[cfg(feature = "decimal")]
            Self::Decimal => Some(SqlValue::Decimal(rust_decimal::Decimal::ZERO)),
            #[cfg(feature = "uuid")]
            Self::Uuid => Some(SqlValue::Uuid(uuid::Uuid::nil())),
            #[cfg(feature = "chrono")]
            Self::Date => Some(SqlValue::Date(chrono::NaiveDate::default())),
            #[cfg(feature = "chrono")]
            Self::Time => Some(SqlValue::Time(chrono::NaiveTime::default())),
            #[cfg(feature = "chrono")]
            Self::DateTime => Some(SqlValue::DateTime(chrono::NaiveDateTime::default())),
            #[cfg(feature = "chrono")]
            Self::DateTimeOffset => Some(SqlValue::DateTimeOffset(
                chrono::DateTime::<chrono::FixedOffset>::default(),
            )),
            #[cfg(feature = "json")]
            Self::Json => None,
            Self::Enum(info) => info.first().map(|(_, value)| SqlValue::BigInt(value)),
            Self::String | Self::Binary | Self::Value => None,
        }
    }
}

/// A runtime description of a Rust type that values can be converted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeclaredType {
    /// Name of the (unwrapped) Rust type.
    pub name: &'static str,
    /// Shape of the (unwrapped) type.
    pub kind: TypeKind,
    /// Whether the type is `Option<_>` around the kind.
    pub nullable: bool,
}

impl DeclaredType {
    /// Create a non-nullable declared type.
    #[must_use]
    pub const fn new(name: &'static str, kind: TypeKind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
        }
    }

    /// Wrap the type in `Option`.
    #[must_use]
    pub const fn into_nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Strip the `Option` wrapper.
    #[must_use]
    pub const fn unwrapped(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Check if NULL converts to a zero value rather than staying NULL.
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        !self.nullable && self.kind.is_value_type()
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "Option<{}>", self.name)
        } else {
            f.write_str(self.name)
        }
    }
}

/// A Rust type that can be the target of a conversion.
///
/// `Default` supplies the value used when NULL reaches a non-nullable target.
pub trait SqlType: FromSql + ToSql + Default + Sized + 'static {
    /// The runtime description of this type.
    fn declared_type() -> DeclaredType;
}

/// An enumeration convertible from its variant names or discriminants.
///
/// Usually implemented with `#[derive(SqlEnum)]`.
pub trait SqlEnum: Sized + 'static {
    /// Variant metadata.
    fn enum_info() -> &'static EnumInfo;

    /// The variant with the given discriminant.
    fn from_discriminant(discriminant: i64) -> Option<Self>;

    /// This variant's discriminant.
    fn discriminant(&self) -> i64;

    /// This variant's name.
    fn variant_name(&self) -> &'static str {
        Self::enum_info()
            .find_by_discriminant(self.discriminant())
            .map_or("", |(name, _)| name)
    }
}

macro_rules! impl_sql_type {
    ($($ty:ty => $name:literal, $kind:expr;)*) => {
        $(
            impl SqlType for $ty {
                fn declared_type() -> DeclaredType {
                    DeclaredType::new($name, $kind)
                }
            }
        )*
    };
}

impl_sql_type! {
    bool => "bool", TypeKind::Bool;
    u8 => "u8", TypeKind::U8;
    i16 => "i16", TypeKind::I16;
    i32 => "i32", TypeKind::I32;
    i64 => "i64", TypeKind::I64;
    f32 => "f32", TypeKind::F32;
    f64 => "f64", TypeKind::F64;
    String => "String", TypeKind::String;
    Vec<u8> => "Vec<u8>", TypeKind::Binary;
    SqlValue => "SqlValue", TypeKind::Value;
}

#[cfg(feature = "decimal")]
impl_sql_type! {
    rust_decimal::Decimal => "Decimal", TypeKind::Decimal;
}

#[cfg(feature = "uuid")]
impl_sql_type! {
    uuid::Uuid => "Uuid", TypeKind::Uuid;
}

#[cfg(feature = "chrono")]
impl_sql_type! {
    chrono::NaiveDate => "NaiveDate", TypeKind::Date;
    chrono::NaiveTime => "NaiveTime", TypeKind::Time;
    chrono::NaiveDateTime => "NaiveDateTime", TypeKind::DateTime;
    chrono::DateTime<chrono::FixedOffset> => "DateTime<FixedOffset>", TypeKind::DateTimeOffset;
}

#[cfg(feature = "json")]
impl_sql_type! {
    serde_json::Value => "JsonValue", TypeKind::Json;
}

impl<T: SqlType> SqlType for Option<T> {
    fn declared_type() -> DeclaredType {
        T::declared_type().into_nullable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static ACCOUNT: EnumInfo = EnumInfo {
        name: "AccountType",
        variants: &[("Checking", 0), ("Savings", 1), ("MoneyMarket", 2)],
    };

    #[test]
    fn test_option_declared_type_is_nullable() {
        let declared = <Option<i32>>::declared_type();
        assert!(declared.nullable);
        assert_eq!(declared.kind, TypeKind::I32);
        assert_eq!(declared.to_string(), "Option<i32>");
    }

    #[test]
    fn test_value_types() {
        assert!(i32::declared_type().is_value_type());
        assert!(!String::declared_type().is_value_type());
        assert!(!<Option<i32>>::declared_type().is_value_type());
    }

    #[test]
    fn test_enum_zero_value_is_first_variant() {
        assert_eq!(
            TypeKind::Enum(&ACCOUNT).zero_value(),
            Some(SqlValue::BigInt(0))
        );
    }

    #[test]
    fn test_enum_lookup_ignores_case() {
        assert_eq!(ACCOUNT.find_by_name("savings"), Some(("Savings", 1)));
        assert_eq!(ACCOUNT.find_by_discriminant(2), Some(("MoneyMarket", 2)));
        assert_eq!(ACCOUNT.find_by_name("asdf"), None);
    }
}
