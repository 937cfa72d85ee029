//! INSERT statement generation.
//!
//! [`generate_insert`] reads the non-null values of an object, binds each one
//! as a parameter on a command and appends a formatted INSERT statement to
//! the command's text. Parameter names carry the command's running parameter
//! count (`@FirstName_p0`, `@FirstName_p3`, ...), so calling it repeatedly
//! against one command composes a collision-free batch.
//!
//! ## Templates
//!
//! A template has three positional placeholders: `{0}` for the table name,
//! `{1}` for the column list and `{2}` for the parameter list. `{{` and `}}`
//! produce literal braces.
//!
//! ```text
//! INSERT INTO {0} ({1}) VALUES({2});
//! ```
//!
//! ## Value sources
//!
//! Anything implementing [`Insertable`] can be inserted:
//!
//! - every [`Reflect`] type, read through its cached type descriptor
//! - [`DynamicObject`], in insertion order
//! - [`AnonymousRecord`], usually built with the [`anonymous!`](crate::anonymous) macro
//!
//! Sources without a usable type name need an explicit table name.

use std::any::Any;
use std::collections::BTreeSet;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use rowbind_types::{DeclaredType, SqlValue};
use tracing::trace;

use crate::command::CommandSink;
use crate::dynamic::DynamicObject;
use crate::error::{Error, Result};
use crate::metadata_cache;
use crate::reflect::{Reflect, TypeDescriptor};

#[allow(clippy::expect_used)]
static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{|\}\}|\{(\d+)\}").expect("placeholder pattern is valid"));

/// Identifier quoting policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Escaping {
    /// Identifiers are used as-is.
    #[default]
    None,
    /// `[name]`, as used by SQL Server.
    SquareBracket,
    /// `"name"`, as used by PostgreSQL and SQLite.
    DoubleQuote,
    /// `` `name` ``, as used by MySQL.
    Backtick,
}

impl Escaping {
    /// Get the (prefix, suffix) delimiters.
    #[must_use]
    pub fn affixes(self) -> (&'static str, &'static str) {
        match self {
            Self::None => ("", ""),
            Self::SquareBracket => ("[", "]"),
            Self::DoubleQuote => ("\"", "\""),
            Self::Backtick => ("`", "`"),
        }
    }

    /// Quote an identifier.
    ///
    /// A closing delimiter inside the identifier is doubled.
    #[must_use]
    pub fn escape(self, identifier: &str) -> String {
        let (prefix, suffix) = self.affixes();
        if suffix.is_empty() {
            return identifier.to_string();
        }

        let mut escaped = String::with_capacity(identifier.len() + 2);
        escaped.push_str(prefix);
        for (i, part) in identifier.split(suffix).enumerate() {
            if i > 0 {
                escaped.push_str(suffix);
                escaped.push_str(suffix);
            }
            escaped.push_str(part);
        }
        escaped.push_str(suffix);
        escaped
    }
}

/// An object with no type name, given as an ordered list of named values.
///
/// ```rust
/// use rowbind::anonymous;
///
/// let record = anonymous! { FirstName: "Clark", MiddleName: None::<String> };
/// assert_eq!(record.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnonymousRecord {
    values: Vec<(String, SqlValue)>,
}

impl AnonymousRecord {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named value.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.values.push((name.into(), value.into()));
        self
    }

    /// Get the number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the record has no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(name, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// Build an [`AnonymousRecord`] from `name: value` pairs.
#[macro_export]
macro_rules! anonymous {
    ($($name:ident : $value:expr),* $(,)?) => {
        $crate::AnonymousRecord::new()$(.with(stringify!($name), $value))*
    };
}

/// Where the named values of an insertable object come from.
pub enum ValueSource<'a> {
    /// Members of a reflected type.
    Reflected {
        /// The type's descriptor.
        descriptor: Arc<TypeDescriptor>,
        /// The object to read members from.
        object: &'a dyn Any,
    },
    /// A map-backed object.
    Map(&'a DynamicObject),
    /// A caller-declared anonymous record.
    Anonymous(&'a AnonymousRecord),
}

impl ValueSource<'_> {
    /// Get the type name usable as a default table name.
    #[must_use]
    pub fn type_name(&self) -> Option<&'static str> {
        match self {
            Self::Reflected { descriptor, .. } if !descriptor.is_anonymous() => {
                Some(descriptor.type_name())
            }
            _ => None,
        }
    }

    /// Read the named values in order.
    pub fn values(&self) -> Result<Vec<(String, SqlValue, Option<DeclaredType>)>> {
        match self {
            Self::Reflected { descriptor, object } => descriptor
                .members()
                .filter(|m| m.can_read())
                .map(|m| {
                    Ok((
                        m.name().to_string(),
                        m.get_value(*object)?,
                        Some(m.declared_type()),
                    ))
                })
                .collect(),
            Self::Map(map) => Ok(map
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone(), None))
                .collect()),
            Self::Anonymous(record) => Ok(record
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone(), None))
                .collect()),
        }
    }
}

/// Objects an INSERT statement can be generated from.
pub trait Insertable {
    /// Get the source of this object's named values.
    fn value_source(&self) -> ValueSource<'_>;
}

impl<T: Reflect> Insertable for T {
    fn value_source(&self) -> ValueSource<'_> {
        ValueSource::Reflected {
            descriptor: metadata_cache::descriptor::<T>(),
            object: self,
        }
    }
}

impl Insertable for DynamicObject {
    fn value_source(&self) -> ValueSource<'_> {
        ValueSource::Map(self)
    }
}

impl Insertable for AnonymousRecord {
    fn value_source(&self) -> ValueSource<'_> {
        ValueSource::Anonymous(self)
    }
}

/// One column of a resolved insert.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertColumn {
    /// Escaped column name.
    pub column: String,
    /// Generated parameter name.
    pub parameter: String,
    /// Value to bind.
    pub value: SqlValue,
    /// Declared type of the source member, if known.
    pub declared_type: Option<DeclaredType>,
}

/// A resolved insert: table name plus the columns to bind.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertSpec {
    /// Table name, escaped unless supplied by the caller.
    pub table: String,
    /// Non-null columns in source order.
    pub columns: Vec<InsertColumn>,
}

impl InsertSpec {
    /// Resolve the table name and non-null values of `obj`.
    ///
    /// Parameter numbering starts at `parameter_offset`, normally the number
    /// of parameters already bound on the target command.
    pub fn resolve<S: Insertable + ?Sized>(
        obj: &S,
        table_name: Option<&str>,
        escaping: Escaping,
        parameter_offset: usize,
    ) -> Result<Self> {
        let source = obj.value_source();

        let table = match (table_name, source.type_name()) {
            (Some(name), _) if name.trim().is_empty() => {
                return Err(Error::argument("table_name", "table name cannot be blank"));
            }
            (Some(name), _) => name.to_string(),
            (None, Some(type_name)) => escaping.escape(type_name),
            (None, None) => {
                return Err(Error::argument(
                    "table_name",
                    "table name is required when the object has no usable type name",
                ));
            }
        };

        let columns = source
            .values()?
            .into_iter()
            .filter(|(_, value, _)| !value.is_null())
            .enumerate()
            .map(|(i, (name, value, declared_type))| InsertColumn {
                column: escaping.escape(&name),
                parameter: format!("@{name}_p{}", parameter_offset + i),
                value,
                declared_type,
            })
            .collect();

        Ok(Self { table, columns })
    }

    /// Format a validated template with this insert's table, columns and parameters.
    pub fn render(&self, template: &str) -> Result<String> {
        validate_template(template)?;
        let columns = join(self.columns.iter().map(|c| c.column.as_str()));
        let parameters = join(self.columns.iter().map(|c| c.parameter.as_str()));
        Ok(format_template(template, [&self.table, &columns, &parameters]))
    }
}

fn join<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts.collect::<Vec<_>>().join(", ")
}

/// Check that a template is non-blank and uses exactly `{0}`, `{1}` and `{2}`.
pub fn validate_template(template: &str) -> Result<()> {
    if template.trim().is_empty() {
        return Err(Error::argument("template", "template cannot be blank"));
    }

    let mut found = BTreeSet::new();
    for caps in PLACEHOLDER_RE.captures_iter(template) {
        if let Some(index) = caps.get(1) {
            let index: usize = index
                .as_str()
                .parse()
                .map_err(|_| Error::Format(format!("placeholder {{{}}} is out of range", index.as_str())))?;
            found.insert(index);
        }
    }

    if found != BTreeSet::from([0, 1, 2]) {
        return Err(Error::Format(format!(
            "template must use placeholders {{0}}, {{1}} and {{2}}, found {found:?}"
        )));
    }
    Ok(())
}

fn format_template(template: &str, args: [&str; 3]) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures<'_>| match caps.get(1) {
            Some(index) => index
                .as_str()
                .parse::<usize>()
                .ok()
                .and_then(|i| args.get(i))
                .map_or_else(|| caps[0].to_string(), |arg| (*arg).to_string()),
            None => caps[0][..1].to_string(),
        })
        .into_owned()
}

/// Append an INSERT statement for `obj` to a command and bind its values.
///
/// Null values are left out of the statement entirely. When `table_name` is
/// `None` the object's type name, escaped, is used.
///
/// # Errors
///
/// - [`Error::Argument`] if the template is blank, or the object has no
///   usable type name and no table name is given
/// - [`Error::Format`] if the template does not use exactly `{0}`, `{1}`
///   and `{2}`
/// - [`Error::MemberAccess`] if a member cannot be read
///
/// Validation happens before the command is touched. A failure while binding
/// can leave the command partially modified; discard it.
///
/// # Example
///
/// ```rust
/// use rowbind::{Command, Escaping, anonymous, generate_insert};
///
/// let mut cmd = Command::new();
/// generate_insert(
///     &mut cmd,
///     &anonymous! { FirstName: "Clark" },
///     "INSERT INTO {0} ({1}) VALUES({2});",
///     Some("Customer"),
///     Escaping::SquareBracket,
/// )
/// .unwrap();
///
/// assert_eq!(cmd.text(), "INSERT INTO Customer ([FirstName]) VALUES(@FirstName_p0);");
/// ```
pub fn generate_insert<'c, C, S>(
    cmd: &'c mut C,
    obj: &S,
    template: &str,
    table_name: Option<&str>,
    escaping: Escaping,
) -> Result<&'c mut C>
where
    C: CommandSink + ?Sized,
    S: Insertable + ?Sized,
{
    validate_template(template)?;

    let first = cmd.parameter_count();
    let spec = InsertSpec::resolve(obj, table_name, escaping, first)?;
    let text = spec.render(template)?;

    trace!(
        table = %spec.table,
        columns = spec.columns.len(),
        first_parameter = first,
        "generated insert statement"
    );

    for column in spec.columns {
        cmd.add_parameter(column.parameter, column.value, column.declared_type)?;
    }
    cmd.append_text(&text);

    Ok(cmd)
}

/// Append one INSERT statement per object, in order.
///
/// # Errors
///
/// Stops at the first failing object; statements for earlier objects stay
/// appended.
pub fn generate_insert_batch<'c, 'o, C, S, I>(
    cmd: &'c mut C,
    objs: I,
    template: &str,
    table_name: Option<&str>,
    escaping: Escaping,
) -> Result<&'c mut C>
where
    C: CommandSink + ?Sized,
    S: Insertable + ?Sized + 'o,
    I: IntoIterator<Item = &'o S>,
{
    validate_template(template)?;
    for obj in objs {
        generate_insert(&mut *cmd, obj, template, table_name, escaping)?;
    }
    Ok(cmd)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::command::Command;

    const TEMPLATE: &str = "INSERT INTO {0} ({1}) VALUES({2});";

    #[test]
    fn test_escape() {
        assert_eq!(Escaping::None.escape("Customer"), "Customer");
        assert_eq!(Escaping::SquareBracket.escape("Customer"), "[Customer]");
        assert_eq!(Escaping::DoubleQuote.escape("Customer"), "\"Customer\"");
        assert_eq!(Escaping::Backtick.escape("Customer"), "`Customer`");
        assert_eq!(Escaping::SquareBracket.escape("odd]name"), "[odd]]name]");
        assert_eq!(Escaping::DoubleQuote.escape("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_validate_template() {
        assert!(validate_template(TEMPLATE).is_ok());
        assert!(validate_template("{2}{1}{0}{0}").is_ok());
        assert!(validate_template("   ").unwrap_err().is_argument_error());
        assert!(matches!(validate_template("INSERT INTO {0} ({1})"), Err(Error::Format(_))));
        assert!(matches!(validate_template("{0}{1}{2}{3}"), Err(Error::Format(_))));
        assert!(matches!(validate_template("{{0}} {1} {2}"), Err(Error::Format(_))));
    }

    #[test]
    fn test_format_template_handles_literal_braces() {
        let text = format_template("{{{0}}} {1} {2}", ["t", "c", "v"]);
        assert_eq!(text, "{t} c v");
    }

    #[test]
    fn test_resolve_skips_nulls_and_numbers_from_offset() {
        let record = AnonymousRecord::new()
            .with("A", 1i32)
            .with("B", SqlValue::Null)
            .with("C", "x");
        let spec = InsertSpec::resolve(&record, Some("t"), Escaping::Backtick, 5).unwrap();

        let parameters: Vec<_> = spec.columns.iter().map(|c| c.parameter.as_str()).collect();
        assert_eq!(parameters, vec!["@A_p5", "@C_p6"]);
        assert_eq!(spec.columns[1].column, "`C`");
    }

    #[test]
    fn test_blank_table_name_is_rejected() {
        let record = anonymous! { A: 1i32 };
        let mut cmd = Command::new();
        let err = generate_insert(&mut cmd, &record, TEMPLATE, Some(" "), Escaping::None).unwrap_err();
        assert!(err.is_argument_error());
    }

    #[test]
    fn test_invalid_template_leaves_command_untouched() {
        let record = anonymous! { A: 1i32 };
        let mut cmd = Command::new();
        let result = generate_insert(&mut cmd, &record, "INSERT {0}", Some("t"), Escaping::None);
        assert!(result.is_err());
        assert!(cmd.text().is_empty());
        assert_eq!(cmd.params().len(), 0);
    }

    #[test]
    fn test_empty_record_still_renders() {
        let mut cmd = Command::new();
        generate_insert(&mut cmd, &AnonymousRecord::new(), TEMPLATE, Some("t"), Escaping::None)
            .unwrap();
        assert_eq!(cmd.text(), "INSERT INTO t () VALUES();");
    }
}
