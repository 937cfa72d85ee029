//! Row representation for query results.
//!
//! The mapper only needs to see a row as an ordered list of named values, so
//! it works against the [`RowSource`] trait. [`Row`] is the concrete row this
//! crate provides: values plus column metadata shared across a result set.
//! Plain `(name, value)` slices also implement `RowSource`, which is handy
//! for callers that assemble rows themselves.
//!
//! ## Access Patterns
//!
//! - `get_raw()` - Returns the value exactly as received
//! - `get<T>()` - Converts through the type converter, so `NULL` into `i32`
//!   yields `0` and `"42"` into `i64` yields `42`
//! - `try_get<T>()` - Like `get`, but `None` for NULL, missing or unconvertible

use std::sync::Arc;

use rowbind_types::{SqlType, SqlValue, TypeError, convert_to};

use crate::case_map::fold;

/// An ordered sequence of named column values.
///
/// Column order is stable: index `i` always refers to the same column, and
/// names may repeat.
pub trait RowSource {
    /// Get the number of columns.
    fn column_count(&self) -> usize;

    /// Get the name of the column at `index`.
    fn column_name(&self, index: usize) -> Option<&str>;

    /// Get the value of the column at `index`.
    fn value(&self, index: usize) -> Option<&SqlValue>;
}

/// Column metadata describing a result set column.
///
/// This struct is marked `#[non_exhaustive]` to allow adding new fields
/// in future versions without breaking semver compatibility. Use
/// [`Column::new()`] to construct instances.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Column index (0-based).
    pub index: usize,
}

impl Column {
    /// Create a new column.
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }
}

/// Shared column metadata for a result set.
///
/// This is shared across all rows in the result set to avoid
/// duplicating metadata per row.
#[derive(Debug, Clone)]
pub struct ColMetaData {
    /// Column definitions.
    pub columns: Arc<[Column]>,
}

impl ColMetaData {
    /// Create new column metadata from a list of columns.
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns: columns.into(),
        }
    }

    /// Create column metadata from names alone.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            names
                .into_iter()
                .enumerate()
                .map(|(index, name)| Column::new(name, index))
                .collect(),
        )
    }

    /// Get the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if there are no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Get a column by index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Find the column index with the given name (case-insensitive).
    ///
    /// When several columns share the name, the last one is returned, the
    /// same column whose value row mapping keeps.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        let wanted = fold(name);
        self.columns.iter().rposition(|c| fold(&c.name) == wanted)
    }
}

/// A row from a query result.
///
/// Multiple `Row` instances from the same result set share the metadata;
/// cloning a row is cheap.
#[derive(Clone)]
pub struct Row {
    /// Column metadata (shared across result set).
    metadata: Arc<ColMetaData>,
    /// Column values in column order.
    values: Arc<[SqlValue]>,
}

fn index_out_of_bounds(index: usize) -> TypeError {
    TypeError::TypeMismatch {
        expected: "valid column index",
        actual: format!("index {index} out of bounds"),
    }
}

fn column_not_found(name: &str) -> TypeError {
    TypeError::TypeMismatch {
        expected: "valid column name",
        actual: format!("column '{name}' not found"),
    }
}

impl Row {
    /// Create a row over shared metadata.
    ///
    /// Missing trailing values read as NULL; extra values are ignored.
    pub fn new(metadata: Arc<ColMetaData>, mut values: Vec<SqlValue>) -> Self {
        values.resize(metadata.len(), SqlValue::Null);
        Self {
            metadata,
            values: values.into(),
        }
    }

    /// Create a row from column definitions and values.
    pub fn from_values(columns: Vec<Column>, values: Vec<SqlValue>) -> Self {
        Self::new(Arc::new(ColMetaData::new(columns)), values)
    }

    /// Create a row from `(name, value)` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, SqlValue)>,
        S: Into<String>,
    {
        let (names, values): (Vec<S>, Vec<SqlValue>) = pairs.into_iter().unzip();
        Self::new(Arc::new(ColMetaData::from_names(names)), values)
    }

    // ========================================================================
    // Type-Converting Access
    // ========================================================================

    /// Get a value by column index with type conversion.
    pub fn get<T: SqlType>(&self, index: usize) -> Result<T, TypeError> {
        let value = self
            .values
            .get(index)
            .ok_or_else(|| index_out_of_bounds(index))?;
        convert_to(value)
    }

    /// Get a value by column name with type conversion.
    pub fn get_by_name<T: SqlType>(&self, name: &str) -> Result<T, TypeError> {
        let index = self
            .metadata
            .find_by_name(name)
            .ok_or_else(|| column_not_found(name))?;

        self.get(index)
    }

    /// Try to get a value by column index, returning None if NULL, not found
    /// or not convertible.
    pub fn try_get<T: SqlType>(&self, index: usize) -> Option<T> {
        let value = self.values.get(index)?;
        if value.is_null() {
            return None;
        }
        convert_to(value).ok()
    }

    /// Try to get a value by column name, returning None if NULL, not found
    /// or not convertible.
    pub fn try_get_by_name<T: SqlType>(&self, name: &str) -> Option<T> {
        let index = self.metadata.find_by_name(name)?;
        self.try_get(index)
    }

    // ========================================================================
    // Raw Value Access
    // ========================================================================

    /// Get the raw SQL value by index.
    #[must_use]
    pub fn get_raw(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }

    /// Get the raw SQL value by column name.
    #[must_use]
    pub fn get_raw_by_name(&self, name: &str) -> Option<&SqlValue> {
        let index = self.metadata.find_by_name(name)?;
        self.get_raw(index)
    }

    // ========================================================================
    // Metadata Access
    // ========================================================================

    /// Get the number of columns in the row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the row is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the column metadata.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.metadata.columns
    }

    /// Get the shared column metadata.
    #[must_use]
    pub fn metadata(&self) -> &Arc<ColMetaData> {
        &self.metadata
    }

    /// Check if a column value is NULL.
    ///
    /// Out-of-range indexes count as NULL.
    #[must_use]
    pub fn is_null(&self, index: usize) -> bool {
        self.values.get(index).is_none_or(SqlValue::is_null)
    }

    /// Check if a column value is NULL by name.
    #[must_use]
    pub fn is_null_by_name(&self, name: &str) -> bool {
        self.metadata
            .find_by_name(name)
            .is_none_or(|i| self.is_null(i))
    }

    /// Iterate over the values in column order.
    pub fn iter(&self) -> std::slice::Iter<'_, SqlValue> {
        self.values.iter()
    }
}

impl std::fmt::Debug for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (column, value) in self.metadata.columns.iter().zip(self.values.iter()) {
            map.entry(&column.name, value);
        }
        map.finish()
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = &'a SqlValue;
    type IntoIter = std::slice::Iter<'a, SqlValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl RowSource for Row {
    fn column_count(&self) -> usize {
        self.values.len()
    }

    fn column_name(&self, index: usize) -> Option<&str> {
        self.metadata.get(index).map(|c| c.name.as_str())
    }

    fn value(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }
}

impl<N: AsRef<str>> RowSource for [(N, SqlValue)] {
    fn column_count(&self) -> usize {
        self.len()
    }

    fn column_name(&self, index: usize) -> Option<&str> {
        self.get(index).map(|(name, _)| name.as_ref())
    }

    fn value(&self, index: usize) -> Option<&SqlValue> {
        self.get(index).map(|(_, value)| value)
    }
}

impl<N: AsRef<str>, const C: usize> RowSource for [(N, SqlValue); C] {
    fn column_count(&self) -> usize {
        C
    }

    fn column_name(&self, index: usize) -> Option<&str> {
        self.as_slice().column_name(index)
    }

    fn value(&self, index: usize) -> Option<&SqlValue> {
        self.as_slice().value(index)
    }
}

impl<N: AsRef<str>> RowSource for Vec<(N, SqlValue)> {
    fn column_count(&self) -> usize {
        self.len()
    }

    fn column_name(&self, index: usize) -> Option<&str> {
        self.as_slice().column_name(index)
    }

    fn value(&self, index: usize) -> Option<&SqlValue> {
        self.as_slice().value(index)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> Row {
        Row::from_values(
            vec![
                Column::new("id", 0),
                Column::new("Name", 1),
                Column::new("nickname", 2),
            ],
            vec![SqlValue::Int(42), SqlValue::from("Alice"), SqlValue::Null],
        )
    }

    #[test]
    fn test_column_metadata() {
        let meta = ColMetaData::from_names(["id", "Name"]);
        let col = meta.get(1).unwrap();

        assert_eq!(col.name, "Name");
        assert_eq!(col.index, 1);
        assert!(meta.get(2).is_none());
    }

    #[test]
    fn test_col_metadata_find_by_name() {
        let meta = ColMetaData::from_names(["id", "Name"]);

        assert_eq!(meta.find_by_name("id"), Some(0));
        assert_eq!(meta.find_by_name("ID"), Some(0)); // case-insensitive
        assert_eq!(meta.find_by_name("name"), Some(1));
        assert_eq!(meta.find_by_name("unknown"), None);
    }

    #[test]
    fn test_col_metadata_find_by_name_folds_unicode() {
        let meta = ColMetaData::from_names(["Straße", "\u{01C5}x"]);

        assert_eq!(meta.find_by_name("STRAßE"), Some(0));
        assert_eq!(meta.find_by_name("\u{01C4}X"), Some(1));
        assert_eq!(meta.find_by_name("\u{01C6}x"), Some(1));
    }

    #[test]
    fn test_duplicate_names_read_the_last_column() {
        let row = Row::from_pairs([("X", SqlValue::Int(1)), ("x", SqlValue::Int(2))]);

        assert_eq!(row.metadata().find_by_name("X"), Some(1));
        assert_eq!(row.get_by_name::<i32>("x").unwrap(), 2);
        assert_eq!(row.try_get_by_name::<i32>("X"), Some(2));
        assert_eq!(row.get_raw_by_name("X"), Some(&SqlValue::Int(2)));
    }

    #[test]
    fn test_row_get_converts() {
        let row = sample();

        assert_eq!(row.len(), 3);
        assert_eq!(row.get::<i32>(0).unwrap(), 42);
        assert_eq!(row.get::<i64>(0).unwrap(), 42);
        assert_eq!(row.get::<String>(0).unwrap(), "42");
        assert_eq!(row.get_by_name::<String>("name").unwrap(), "Alice");
    }

    #[test]
    fn test_row_get_null() {
        let row = sample();

        assert_eq!(row.get::<Option<String>>(2).unwrap(), None);
        assert_eq!(row.get::<String>(2).unwrap(), "");
        assert_eq!(row.try_get::<String>(2), None);
        assert!(row.get::<i32>(9).is_err());
        assert!(row.get_by_name::<i32>("missing").is_err());
    }

    #[test]
    fn test_row_is_null() {
        let row = sample();

        assert!(!row.is_null(0));
        assert!(row.is_null(2));
        assert!(row.is_null(99)); // Out of bounds returns true
        assert!(row.is_null_by_name("NICKNAME"));
    }

    #[test]
    fn test_row_pads_missing_values() {
        let meta = Arc::new(ColMetaData::from_names(["a", "b"]));
        let row = Row::new(meta, vec![SqlValue::Int(1)]);
        assert_eq!(row.len(), 2);
        assert!(row.get_raw(1).unwrap().is_null());
    }

    #[test]
    fn test_slices_are_row_sources() {
        let pairs = [("X", SqlValue::Int(1)), ("x", SqlValue::Int(2))];
        assert_eq!(pairs.column_count(), 2);
        assert_eq!(pairs.column_name(1), Some("x"));
        assert_eq!(pairs.value(0), Some(&SqlValue::Int(1)));
        assert_eq!(pairs.value(2), None);
    }
}
