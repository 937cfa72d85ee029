//! Per-dialect insert presets.
//!
//! Each dialect fixes the identifier escaping and a template whose tail
//! fetches the identity generated by the insert.

use crate::command::CommandSink;
use crate::error::Result;
use crate::insert::{Escaping, Insertable, generate_insert, generate_insert_batch};

/// SQL dialects with insert presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Dialect {
    /// Microsoft SQL Server.
    SqlServer,
    /// MySQL and MariaDB.
    MySql,
    /// PostgreSQL.
    PostgreSql,
    /// SQLite.
    Sqlite,
}

impl Dialect {
    /// Get the identifier escaping used by this dialect.
    #[must_use]
    pub fn escaping(self) -> Escaping {
        match self {
            Self::SqlServer => Escaping::SquareBracket,
            Self::MySql => Escaping::Backtick,
            Self::PostgreSql => Escaping::None,
            Self::Sqlite => Escaping::DoubleQuote,
        }
    }

    /// Get the INSERT template, including the identity tail.
    #[must_use]
    pub fn insert_template(self) -> &'static str {
        match self {
            Self::SqlServer => "INSERT INTO {0} ({1}) VALUES({2}); SELECT SCOPE_IDENTITY();",
            Self::MySql => "INSERT INTO {0} ({1}) VALUES({2}); SELECT LAST_INSERT_ID();",
            Self::PostgreSql => "INSERT INTO {0} ({1}) VALUES({2}); SELECT LASTVAL();",
            Self::Sqlite => "INSERT INTO {0} ({1}) VALUES({2}); SELECT last_insert_rowid();",
        }
    }

    /// Append this dialect's INSERT statement for `obj` to a command.
    pub fn generate_insert<'c, C, S>(
        self,
        cmd: &'c mut C,
        obj: &S,
        table_name: Option<&str>,
    ) -> Result<&'c mut C>
    where
        C: CommandSink + ?Sized,
        S: Insertable + ?Sized,
    {
        generate_insert(cmd, obj, self.insert_template(), table_name, self.escaping())
    }

    /// Append this dialect's INSERT statement for each object to a command.
    pub fn generate_insert_batch<'c, 'o, C, S, I>(
        self,
        cmd: &'c mut C,
        objs: I,
        table_name: Option<&str>,
    ) -> Result<&'c mut C>
    where
        C: CommandSink + ?Sized,
        S: Insertable + ?Sized + 'o,
        I: IntoIterator<Item = &'o S>,
    {
        generate_insert_batch(cmd, objs, self.insert_template(), table_name, self.escaping())
    }
}
