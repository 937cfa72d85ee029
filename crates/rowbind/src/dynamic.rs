//! Dynamic objects: case-insensitive name/value containers.
//!
//! A [`DynamicObject`] stands in for a statically-typed object when the shape
//! of a row is not known ahead of time. Reading a name that was never set
//! yields `SqlValue::Null` rather than an error.

use std::ops::Index;

use rowbind_types::{SqlType, SqlValue, TypeError, convert_to};

use crate::case_map::CaseInsensitiveMap;

static NULL: SqlValue = SqlValue::Null;

/// An ordered, case-insensitive map from names to values.
///
/// # Example
///
/// ```rust
/// use rowbind::{DynamicObject, SqlValue};
///
/// let mut obj = DynamicObject::new();
/// obj.insert("FirstName", "Clark");
///
/// assert_eq!(obj["firstname"], SqlValue::from("Clark"));
/// assert!(obj["MiddleName"].is_null());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DynamicObject {
    values: CaseInsensitiveMap<SqlValue>,
}

impl DynamicObject {
    /// Create an empty object.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty object with room for `capacity` values.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: CaseInsensitiveMap::with_capacity(capacity),
        }
    }

    /// Get a value by name, ignoring case. Missing names read as NULL.
    #[must_use]
    pub fn get(&self, name: &str) -> &SqlValue {
        self.values.get(name).unwrap_or(&NULL)
    }

    /// Get a value by name and convert it.
    pub fn get_as<T: SqlType>(&self, name: &str) -> Result<T, TypeError> {
        convert_to(self.get(name))
    }

    /// Set a value, replacing any value stored under the same name.
    ///
    /// The replaced entry keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<SqlValue>) -> Option<SqlValue> {
        self.values.insert(name, value.into())
    }

    /// Remove a value by name.
    pub fn remove(&mut self, name: &str) -> Option<SqlValue> {
        self.values.remove(name)
    }

    /// Check if a name has been set, ignoring case.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Get the number of names set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if no names are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.values.iter()
    }

    /// Iterate over names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys()
    }
}

impl Index<&str> for DynamicObject {
    type Output = SqlValue;

    fn index(&self, name: &str) -> &SqlValue {
        self.get(name)
    }
}

impl<K: Into<String>, V: Into<SqlValue>> FromIterator<(K, V)> for DynamicObject {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k, v.into())).collect(),
        }
    }
}

impl IntoIterator for DynamicObject {
    type Item = (String, SqlValue);
    type IntoIter = indexmap::map::IntoValues<String, (String, SqlValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_name_reads_null() {
        let obj = DynamicObject::new();
        assert!(obj.get("anything").is_null());
        assert!(obj["anything"].is_null());
    }

    #[test]
    fn test_last_write_wins() {
        let obj: DynamicObject = [("X", 1i32), ("x", 2i32)].into_iter().collect();
        assert_eq!(obj.len(), 1);
        assert_eq!(obj["X"], SqlValue::Int(2));
    }

    #[test]
    fn test_get_as_converts() {
        let mut obj = DynamicObject::new();
        obj.insert("Age", "41");
        assert_eq!(obj.get_as::<i32>("age").unwrap(), 41);
        assert_eq!(obj.get_as::<Option<i32>>("missing").unwrap(), None);
    }

    #[test]
    fn test_iteration_order() {
        let mut obj = DynamicObject::new();
        obj.insert("b", 1i32);
        obj.insert("a", 2i32);
        let names: Vec<_> = obj.names().collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
