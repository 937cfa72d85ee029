//! Member reflection for mapped types.
//!
//! A [`Reflect`] implementation lists the members of a type once, as
//! [`MemberDescriptor`]s carrying type-erased accessors. [`TypeDescriptor`]
//! arranges them into the ordered, case-insensitive map the row mapper and
//! insert builder work from. Descriptors are normally obtained through the
//! [`metadata_cache`](crate::metadata_cache) rather than built directly.
//!
//! ## Derive Macro
//!
//! The recommended way to implement `Reflect` is via the derive macro:
//!
//! ```rust,ignore
//! use rowbind::Reflect;
//!
//! #[derive(Default, Reflect)]
//! #[rowbind(property(name = "FullName", ty = "String", get = "full_name"))]
//! struct Customer {
//!     id: i32,
//!     first_name: String,
//!     last_name: String,
//! }
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use rowbind_types::{
    DeclaredType, SqlType, SqlValue, ToSql, TypeError, convert, convert_to, from_converted,
};
use tracing::debug;

use crate::case_map::CaseInsensitiveMap;
use crate::error::{Error, Result};

type Getter = Arc<dyn Fn(&dyn Any) -> std::result::Result<SqlValue, TypeError> + Send + Sync>;
type Setter =
    Arc<dyn Fn(&mut dyn Any, &SqlValue) -> std::result::Result<(), TypeError> + Send + Sync>;

/// How a member is exposed by its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// A struct field.
    Field,
    /// A value exposed through getter and/or setter methods.
    Property,
}

/// Metadata for one field or property of a reflected type.
///
/// Accessors operate on `&dyn Any` so descriptors for different types can
/// share one cache; passing an object of the wrong type is reported as an
/// error rather than a panic.
#[derive(Clone)]
pub struct MemberDescriptor {
    name: String,
    kind: MemberKind,
    declared_type: DeclaredType,
    owner: &'static str,
    getter: Option<Getter>,
    setter: Option<Setter>,
}

fn downcast<O: 'static>(obj: &dyn Any) -> std::result::Result<&O, TypeError> {
    obj.downcast_ref::<O>().ok_or_else(wrong_owner::<O>)
}

fn downcast_mut<O: 'static>(obj: &mut dyn Any) -> std::result::Result<&mut O, TypeError> {
    obj.downcast_mut::<O>().ok_or_else(wrong_owner::<O>)
}

fn wrong_owner<O: 'static>() -> TypeError {
    TypeError::TypeMismatch {
        expected: std::any::type_name::<O>(),
        actual: "an object of another type".to_string(),
    }
}

impl MemberDescriptor {
    /// Describe a readable and writable field.
    pub fn field<O: Reflect, T: SqlType>(
        name: impl Into<String>,
        get: fn(&O) -> &T,
        get_mut: fn(&mut O) -> &mut T,
    ) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Field,
            declared_type: T::declared_type(),
            owner: O::type_name(),
            getter: Some(Arc::new(move |obj: &dyn Any| {
                ToSql::to_sql(get(downcast::<O>(obj)?))
            })),
            setter: Some(Arc::new(move |obj: &mut dyn Any, value: &SqlValue| {
                *get_mut(downcast_mut::<O>(obj)?) = from_converted::<T>(value)?;
                Ok(())
            })),
        }
    }

    /// Describe a field that can be read but not assigned.
    pub fn readonly_field<O: Reflect, T: SqlType>(
        name: impl Into<String>,
        get: fn(&O) -> &T,
    ) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Field,
            declared_type: T::declared_type(),
            owner: O::type_name(),
            getter: Some(Arc::new(move |obj: &dyn Any| {
                ToSql::to_sql(get(downcast::<O>(obj)?))
            })),
            setter: None,
        }
    }

    /// Describe a property with both a getter and a setter.
    pub fn property<O: Reflect, T: SqlType>(
        name: impl Into<String>,
        get: fn(&O) -> T,
        set: fn(&mut O, T),
    ) -> Self {
        let mut member = Self::readonly_property(name, get);
        member.setter = Some(Self::property_setter(set));
        member
    }

    /// Describe a property with only a getter.
    pub fn readonly_property<O: Reflect, T: SqlType>(
        name: impl Into<String>,
        get: fn(&O) -> T,
    ) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Property,
            declared_type: T::declared_type(),
            owner: O::type_name(),
            getter: Some(Arc::new(move |obj: &dyn Any| {
                ToSql::to_sql(&get(downcast::<O>(obj)?))
            })),
            setter: None,
        }
    }

    /// Describe a property with only a setter.
    pub fn writeonly_property<O: Reflect, T: SqlType>(
        name: impl Into<String>,
        set: fn(&mut O, T),
    ) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Property,
            declared_type: T::declared_type(),
            owner: O::type_name(),
            getter: None,
            setter: Some(Self::property_setter(set)),
        }
    }

    fn property_setter<O: Reflect, T: SqlType>(set: fn(&mut O, T)) -> Setter {
        Arc::new(move |obj: &mut dyn Any, value: &SqlValue| {
            set(downcast_mut::<O>(obj)?, from_converted::<T>(value)?);
            Ok(())
        })
    }

    /// Get the member name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get whether the member is a field or a property.
    #[must_use]
    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    /// Get the declared type values are converted into.
    #[must_use]
    pub fn declared_type(&self) -> DeclaredType {
        self.declared_type
    }

    /// Get the name of the type owning this member.
    #[must_use]
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    /// Check if the member has a getter.
    #[must_use]
    pub fn can_read(&self) -> bool {
        self.getter.is_some()
    }

    /// Check if the member has a setter.
    #[must_use]
    pub fn can_write(&self) -> bool {
        self.setter.is_some()
    }

    /// Read the member's current value from `obj`.
    pub fn get_value(&self, obj: &dyn Any) -> Result<SqlValue> {
        let getter = self.getter.as_ref().ok_or_else(|| Error::MemberAccess {
            member: self.name.clone(),
            owner: self.owner,
            reason: "member has no getter".to_string(),
        })?;

        getter(obj).map_err(|e| Error::MemberAccess {
            member: self.name.clone(),
            owner: self.owner,
            reason: e.to_string(),
        })
    }

    /// Convert `value` to the declared type and write it to the member.
    pub fn set_value(&self, obj: &mut dyn Any, value: &SqlValue) -> Result<()> {
        let converted = convert(value, &self.declared_type).map_err(|source| Error::Conversion {
            member: self.name.clone(),
            declared_type: self.declared_type.to_string(),
            value: value.to_string(),
            owner: self.owner,
            source,
        })?;

        let assignment_error = |reason: String| Error::MemberAssignment {
            member: self.name.clone(),
            declared_type: self.declared_type.to_string(),
            value: value.to_string(),
            owner: self.owner,
            reason,
        };

        let setter = self
            .setter
            .as_ref()
            .ok_or_else(|| assignment_error("member has no setter".to_string()))?;

        setter(obj, &converted).map_err(|e| assignment_error(e.to_string()))
    }
}

impl fmt::Debug for MemberDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("declared_type", &self.declared_type)
            .field("owner", &self.owner)
            .field("can_read", &self.can_read())
            .field("can_write", &self.can_write())
            .finish()
    }
}

/// Trait for types whose members can be mapped from rows and read for inserts.
///
/// This trait is typically implemented via the `#[derive(Reflect)]` macro.
/// It is implemented here for every scalar type the converter supports, so a
/// single-column row can be mapped straight into `i32`, `String` and so on.
///
/// # Example
///
/// ```rust
/// use rowbind::{MemberDescriptor, Reflect};
///
/// #[derive(Default)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// impl Reflect for Point {
///     fn type_name() -> &'static str {
///         "Point"
///     }
///
///     fn reflect_members() -> Vec<MemberDescriptor> {
///         vec![
///             MemberDescriptor::field::<Self, i32>("x", |p| &p.x, |p| &mut p.x),
///             MemberDescriptor::field::<Self, i32>("y", |p| &p.y, |p| &mut p.y),
///         ]
///     }
/// }
/// ```
pub trait Reflect: Default + 'static {
    /// Name of the type, used for default table names and in errors.
    fn type_name() -> &'static str;

    /// Check if the type has no usable name.
    ///
    /// Inserting an anonymous value requires an explicit table name.
    fn is_anonymous() -> bool {
        false
    }

    /// List the type's fields and properties.
    fn reflect_members() -> Vec<MemberDescriptor> {
        Vec::new()
    }

    /// The declared type when this is a scalar rather than a composite type.
    fn scalar_type() -> Option<DeclaredType> {
        None
    }

    /// Build a value directly from a single column value.
    fn from_scalar(value: &SqlValue) -> std::result::Result<Self, TypeError> {
        Err(TypeError::UnsupportedConversion {
            from: value.type_name().to_string(),
            to: Self::type_name(),
        })
    }
}

macro_rules! impl_reflect_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn type_name() -> &'static str {
                    <$ty as SqlType>::declared_type().name
                }

                fn scalar_type() -> Option<DeclaredType> {
                    Some(<$ty as SqlType>::declared_type())
                }

                fn from_scalar(value: &SqlValue) -> std::result::Result<Self, TypeError> {
                    convert_to::<$ty>(value)
                }
            }
        )*
    };
}

impl_reflect_scalar!(bool, u8, i16, i32, i64, f32, f64, String, Vec<u8>, SqlValue);

#[cfg(feature = "decimal")]
impl_reflect_scalar!(rust_decimal::Decimal);

#[cfg(feature = "uuid")]
impl_reflect_scalar!(uuid::Uuid);

#[cfg(feature = "chrono")]
impl_reflect_scalar!(
    chrono::NaiveDate,
    chrono::NaiveTime,
    chrono::NaiveDateTime,
    chrono::DateTime<chrono::FixedOffset>,
);

#[cfg(feature = "json")]
impl_reflect_scalar!(serde_json::Value);

impl<T: SqlType> Reflect for Option<T> {
    fn type_name() -> &'static str {
        T::declared_type().name
    }

    fn scalar_type() -> Option<DeclaredType> {
        Some(<Self as SqlType>::declared_type())
    }

    fn from_scalar(value: &SqlValue) -> std::result::Result<Self, TypeError> {
        convert_to::<Self>(value)
    }
}

/// The ordered, case-insensitive member map of one type.
///
/// Properties are placed before fields. When two members share a name
/// (ignoring case) the later one replaces the earlier in place, so a field
/// wins over a property of the same name.
#[derive(Debug)]
pub struct TypeDescriptor {
    type_name: &'static str,
    anonymous: bool,
    members: CaseInsensitiveMap<MemberDescriptor>,
}

impl TypeDescriptor {
    /// Build a descriptor from a member list.
    pub fn build(type_name: &'static str, anonymous: bool, members: Vec<MemberDescriptor>) -> Self {
        let (properties, fields): (Vec<_>, Vec<_>) = members
            .into_iter()
            .partition(|m| m.kind == MemberKind::Property);

        let mut map = CaseInsensitiveMap::with_capacity(properties.len() + fields.len());
        for member in properties.into_iter().chain(fields) {
            let name = member.name.clone();
            let kind = member.kind;
            if let Some(previous) = map.insert(name, member) {
                debug!(
                    type_name,
                    member = %previous.name,
                    replaced = ?previous.kind,
                    replacement = ?kind,
                    "member replaced by a later member with the same name"
                );
            }
        }

        Self {
            type_name,
            anonymous,
            members: map,
        }
    }

    /// Build the descriptor of a reflected type.
    pub fn of<T: Reflect>() -> Self {
        Self::build(T::type_name(), T::is_anonymous(), T::reflect_members())
    }

    /// Get the type name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Check if the type has no usable name.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    /// Look up a member by name, ignoring case.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&MemberDescriptor> {
        self.members.get(name)
    }

    /// Iterate over members in order.
    pub fn members(&self) -> impl Iterator<Item = &MemberDescriptor> {
        self.members.values()
    }

    /// Iterate over member names in order.
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.keys()
    }

    /// Get the number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if the type has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Contact {
        name: String,
        age: i32,
        nickname: Option<String>,
    }

    impl Contact {
        fn display_name(&self) -> String {
            format!("{} ({})", self.name, self.age)
        }

        fn label(&self) -> String {
            "property".to_string()
        }
    }

    impl Reflect for Contact {
        fn type_name() -> &'static str {
            "Contact"
        }

        fn reflect_members() -> Vec<MemberDescriptor> {
            vec![
                MemberDescriptor::field::<Self, String>("Name", |c| &c.name, |c| &mut c.name),
                MemberDescriptor::readonly_field::<Self, i32>("Age", |c| &c.age),
                MemberDescriptor::field::<Self, Option<String>>(
                    "Nickname",
                    |c| &c.nickname,
                    |c| &mut c.nickname,
                ),
                MemberDescriptor::readonly_property::<Self, String>("DisplayName", |c| {
                    c.display_name()
                }),
                MemberDescriptor::readonly_property::<Self, String>("name", |c| c.label()),
            ]
        }
    }

    #[test]
    fn test_properties_come_before_fields() {
        let descriptor = TypeDescriptor::of::<Contact>();
        let names: Vec<_> = descriptor.member_names().collect();
        assert_eq!(names, vec!["DisplayName", "Name", "Age", "Nickname"]);
    }

    #[test]
    fn test_field_replaces_property_with_same_name() {
        let descriptor = TypeDescriptor::of::<Contact>();
        let member = descriptor.member("NAME").unwrap();
        assert_eq!(member.kind(), MemberKind::Field);
        assert!(member.can_write());
        assert_eq!(descriptor.len(), 4);
    }

    #[test]
    fn test_get_and_set_through_descriptor() {
        let descriptor = TypeDescriptor::of::<Contact>();
        let mut contact = Contact::default();

        descriptor
            .member("name")
            .unwrap()
            .set_value(&mut contact, &SqlValue::from("Lois"))
            .unwrap();
        assert_eq!(contact.name, "Lois");

        let value = descriptor
            .member("DisplayName")
            .unwrap()
            .get_value(&contact)
            .unwrap();
        assert_eq!(value, SqlValue::from("Lois (0)"));
    }

    #[test]
    fn test_readonly_member_rejects_assignment() {
        let descriptor = TypeDescriptor::of::<Contact>();
        let mut contact = Contact::default();
        let err = descriptor
            .member("Age")
            .unwrap()
            .set_value(&mut contact, &SqlValue::Int(3))
            .unwrap_err();
        assert!(matches!(err, Error::MemberAssignment { owner: "Contact", .. }));
        assert_eq!(err.member_name(), Some("Age"));
    }

    #[test]
    fn test_conversion_failure_names_member() {
        let descriptor = TypeDescriptor::of::<Contact>();
        let mut contact = Contact::default();
        let err = descriptor
            .member("name")
            .unwrap()
            .set_value(&mut contact, &SqlValue::from(vec![1u8]))
            .unwrap_err();
        assert!(err.is_conversion_error());
        assert!(err.to_string().contains("Contact"));
    }

    #[test]
    fn test_wrong_object_type_is_an_error() {
        let descriptor = TypeDescriptor::of::<Contact>();
        let mut other = 5i32;
        let result = descriptor
            .member("Nickname")
            .unwrap()
            .set_value(&mut other, &SqlValue::from("x"));
        assert!(result.is_err());
    }

    #[test]
    fn test_scalar_reflection() {
        assert_eq!(<i32 as Reflect>::from_scalar(&SqlValue::from("7")).unwrap(), 7);
        assert!(<Option<i64> as Reflect>::scalar_type().unwrap().nullable);
        assert!(<Contact as Reflect>::scalar_type().is_none());
        assert!(Contact::from_scalar(&SqlValue::Int(1)).is_err());
    }
}
