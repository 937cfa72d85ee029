//! Ordered map with case-insensitive string keys.
//!
//! Used for member lookup in type descriptors and for dynamic objects.
//! Entries keep the position of their first insertion; re-inserting a name
//! under any casing replaces the value and the stored spelling in place.

use std::borrow::Cow;

use indexmap::IndexMap;

/// An insertion-ordered map keyed by case-insensitive names.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseInsensitiveMap<V> {
    /// Folded key -> (original name, value).
    entries: IndexMap<String, (String, V)>,
}

/// Fold a name for case-insensitive comparison.
///
/// Borrows when the name is already in lowercase form. Titlecase letters
/// such as `ǅ` are neither upper- nor lowercase, so each character is
/// checked against its own lowercase mapping.
pub(crate) fn fold(name: &str) -> Cow<'_, str> {
    if name.chars().all(|c| c.to_lowercase().eq(std::iter::once(c))) {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(name.to_lowercase())
    }
}

impl<V> CaseInsensitiveMap<V> {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Create an empty map with room for `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Insert a value, returning the value previously stored under the name.
    pub fn insert(&mut self, name: impl Into<String>, value: V) -> Option<V> {
        let name = name.into();
        let key = fold(&name).into_owned();
        self.entries
            .insert(key, (name, value))
            .map(|(_, previous)| previous)
    }

    /// Get the value stored under a name, ignoring case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&V> {
        self.entries.get(&*fold(name)).map(|(_, v)| v)
    }

    /// Get a mutable reference to the value stored under a name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut V> {
        self.entries.get_mut(&*fold(name)).map(|(_, v)| v)
    }

    /// Get the stored spelling of a name, ignoring case.
    #[must_use]
    pub fn original_name(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&*fold(name))
            .map(|(original, _)| original.as_str())
    }

    /// Check if a name is present, ignoring case.
    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(&*fold(name))
    }

    /// Remove a name, preserving the order of the remaining entries.
    pub fn remove(&mut self, name: &str) -> Option<V> {
        self.entries
            .shift_remove(&*fold(name))
            .map(|(_, v)| v)
    }

    /// Get the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries
            .values()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Iterate over names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(|(name, _)| name.as_str())
    }

    /// Iterate over values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values().map(|(_, value)| value)
    }
}

impl<V> Default for CaseInsensitiveMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for CaseInsensitiveMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut map = Self::with_capacity(iter.size_hint().0);
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

impl<V> IntoIterator for CaseInsensitiveMap<V> {
    type Item = (String, V);
    type IntoIter = indexmap::map::IntoValues<String, (String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_values()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ignores_case() {
        let mut map = CaseInsensitiveMap::new();
        map.insert("FirstName", 1);

        assert_eq!(map.get("firstname"), Some(&1));
        assert_eq!(map.get("FIRSTNAME"), Some(&1));
        assert!(map.contains_key("firstName"));
        assert_eq!(map.get("LastName"), None);
    }

    #[test]
    fn test_lookup_folds_titlecase() {
        let mut map = CaseInsensitiveMap::new();
        map.insert("\u{01C5}x", 1);

        assert_eq!(map.get("\u{01C6}x"), Some(&1));
        assert_eq!(map.get("\u{01C4}X"), Some(&1));
        assert_eq!(map.original_name("\u{01C6}X"), Some("\u{01C5}x"));
        assert_eq!(fold("\u{01C5}x"), "\u{01C6}x");
        assert!(matches!(fold("already lower"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut map = CaseInsensitiveMap::new();
        map.insert("a", 1);
        map.insert("b", 2);
        let previous = map.insert("A", 3);

        assert_eq!(previous, Some(1));
        assert_eq!(map.len(), 2);
        let entries: Vec<_> = map.iter().collect();
        assert_eq!(entries, vec![("A", &3), ("b", &2)]);
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut map: CaseInsensitiveMap<i32> =
            [("x", 1), ("y", 2), ("z", 3)].into_iter().collect();
        assert_eq!(map.remove("Y"), Some(2));
        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, vec!["x", "z"]);
    }
}
