//! Command sinks: statement text plus bound parameters.
//!
//! Insert generation appends to a command rather than building a finished
//! statement, so several inserts can be composed into one batch. The
//! [`CommandSink`] trait is the seam to whatever executes the command;
//! [`Command`] is a ready-made in-memory implementation.

use std::collections::HashSet;

use rowbind_types::{DeclaredType, SqlValue, ToSql};

use crate::error::{Error, Result};

/// A command that statement text and parameters can be appended to.
pub trait CommandSink {
    /// Get the text accumulated so far.
    fn text(&self) -> &str;

    /// Append text to the command.
    fn append_text(&mut self, text: &str);

    /// Bind a parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] if a parameter with the same name
    /// (ignoring case) is already bound.
    fn add_parameter(
        &mut self,
        name: String,
        value: SqlValue,
        declared_type: Option<DeclaredType>,
    ) -> Result<()>;

    /// Get the number of parameters currently bound.
    fn parameter_count(&self) -> usize;
}

/// A named parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedParam {
    /// Parameter name, including any prefix such as `@`.
    pub name: String,
    /// Parameter value.
    pub value: SqlValue,
    /// Declared type of the member the value was read from, if known.
    pub declared_type: Option<DeclaredType>,
}

impl NamedParam {
    /// Create a new named parameter.
    pub fn new<S: Into<String>>(name: S, value: SqlValue) -> Self {
        Self {
            name: name.into(),
            value,
            declared_type: None,
        }
    }

    /// Create a named parameter from a value implementing `ToSql`.
    pub fn from_value<S: Into<String>, T: ToSql>(name: S, value: &T) -> Result<Self> {
        Ok(Self::new(name, value.to_sql()?))
    }

    /// Attach a declared type.
    #[must_use]
    pub fn with_declared_type(mut self, declared_type: DeclaredType) -> Self {
        self.declared_type = Some(declared_type);
        self
    }
}

/// An ordered list of uniquely-named parameters.
#[derive(Debug, Clone, Default)]
pub struct ParamList {
    params: Vec<NamedParam>,
    /// Lowercased names, for duplicate detection.
    names: HashSet<String>,
}

impl ParamList {
    /// Create a new empty parameter list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parameter list with the given capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            params: Vec::with_capacity(capacity),
            names: HashSet::with_capacity(capacity),
        }
    }

    /// Add a parameter to the list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] if the name is already present.
    pub fn push(&mut self, param: NamedParam) -> Result<()> {
        if !self.names.insert(param.name.to_lowercase()) {
            return Err(Error::argument(
                "name",
                format!("parameter '{}' is already bound", param.name),
            ));
        }
        self.params.push(param);
        Ok(())
    }

    /// Add a parameter by name and value.
    pub fn add<S: Into<String>, T: ToSql>(&mut self, name: S, value: &T) -> Result<()> {
        self.push(NamedParam::from_value(name, value)?)
    }

    /// Look up a parameter by name, ignoring case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&NamedParam> {
        let folded = name.to_lowercase();
        if !self.names.contains(&folded) {
            return None;
        }
        self.params.iter().find(|p| p.name.to_lowercase() == folded)
    }

    /// Check if a parameter name is bound, ignoring case.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name.to_lowercase())
    }

    /// Get the parameters as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[NamedParam] {
        &self.params
    }

    /// Get the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Check if the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Iterate over the parameters.
    pub fn iter(&self) -> impl Iterator<Item = &NamedParam> {
        self.params.iter()
    }
}

impl TryFrom<Vec<NamedParam>> for ParamList {
    type Error = Error;

    fn try_from(params: Vec<NamedParam>) -> Result<Self> {
        let mut list = Self::with_capacity(params.len());
        for param in params {
            list.push(param)?;
        }
        Ok(list)
    }
}

impl IntoIterator for ParamList {
    type Item = NamedParam;
    type IntoIter = std::vec::IntoIter<NamedParam>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParamList {
    type Item = &'a NamedParam;
    type IntoIter = std::slice::Iter<'a, NamedParam>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

/// An in-memory command: statement text and its parameters.
#[derive(Debug, Clone, Default)]
pub struct Command {
    text: String,
    params: ParamList,
}

impl Command {
    /// Create an empty command.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a command starting with the given text.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: ParamList::new(),
        }
    }

    /// Get the statement text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Get the bound parameters.
    #[must_use]
    pub fn params(&self) -> &ParamList {
        &self.params
    }

    /// Split the command into its text and parameters.
    #[must_use]
    pub fn into_parts(self) -> (String, ParamList) {
        (self.text, self.params)
    }
}

impl CommandSink for Command {
    fn text(&self) -> &str {
        &self.text
    }

    fn append_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    fn add_parameter(
        &mut self,
        name: String,
        value: SqlValue,
        declared_type: Option<DeclaredType>,
    ) -> Result<()> {
        self.params.push(NamedParam {
            name,
            value,
            declared_type,
        })
    }

    fn parameter_count(&self) -> usize {
        self.params.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_named_param_creation() {
        let param = NamedParam::from_value("@test", &42i32).unwrap();
        assert_eq!(param.name, "@test");
        assert!(matches!(param.value, SqlValue::Int(42)));
        assert!(param.declared_type.is_none());
    }

    #[test]
    fn test_param_list() {
        let mut list = ParamList::new();
        list.add("@name", &"Alice").unwrap();
        list.add("@age", &30i32).unwrap();

        assert_eq!(list.len(), 2);
        assert!(!list.is_empty());
        assert!(list.contains("@AGE"));
        assert_eq!(list.get("@Name").unwrap().value, SqlValue::from("Alice"));

        let names: Vec<&str> = list.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["@name", "@age"]);
    }

    #[test]
    fn test_param_list_rejects_duplicates() {
        let mut list = ParamList::new();
        list.add("@id", &1i32).unwrap();
        let err = list.add("@ID", &2i32).unwrap_err();
        assert!(err.is_argument_error());
        assert_eq!(list.len(), 1);

        let result = ParamList::try_from(vec![
            NamedParam::new("a", SqlValue::Int(1)),
            NamedParam::new("A", SqlValue::Int(2)),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_command_appends() {
        let mut cmd = Command::with_text("SET NOCOUNT ON;");
        cmd.append_text("SELECT 1;");
        cmd.add_parameter("@p".to_string(), SqlValue::Null, None).unwrap();

        assert_eq!(cmd.text(), "SET NOCOUNT ON;SELECT 1;");
        assert_eq!(cmd.parameter_count(), 1);
        let (text, params) = cmd.into_parts();
        assert!(text.ends_with("SELECT 1;"));
        assert_eq!(params.len(), 1);
    }
}
