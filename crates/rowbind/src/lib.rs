//! # rowbind
//!
//! Map query-result rows onto Rust types and generate parameterized INSERT
//! statements from them.
//!
//! This crate sits between an execution layer that already has rows and
//! commands and application code that wants typed objects. It does no I/O.
//!
//! ## Features
//!
//! - **Row mapping**: Case-insensitive column-to-member matching with
//!   loose type coercion (`"42"` into `i32`, `1` into an enum, 16 bytes
//!   into a `Uuid`)
//! - **Dynamic objects**: Case-insensitive name/value containers for rows
//!   of unknown shape
//! - **Insert generation**: Parameterized, dialect-escaped INSERT statements
//!   appended to a command, safe to repeat for batches
//! - **Type descriptor cache**: Member reflection happens once per type
//!
//! ## Cargo Features
//!
//! - `derive` (default): Re-export `#[derive(Reflect)]` and `#[derive(SqlEnum)]`
//! - `chrono`, `uuid`, `decimal` (default): Date/time, GUID and decimal support
//! - `json`: JSON value support via serde_json
//!
//! ## Example
//!
//! ```rust
//! use rowbind::{Command, Dialect, Reflect, SqlValue, map_row};
//!
//! #[derive(Debug, Default, Reflect)]
//! #[rowbind(rename_all = "PascalCase")]
//! struct Customer {
//!     id: i32,
//!     first_name: String,
//!     middle_name: Option<String>,
//! }
//!
//! let row = [
//!     ("ID", SqlValue::Int(7)),
//!     ("first_name", SqlValue::from("Clark")),
//!     ("FirstName", SqlValue::from("Lois")),
//! ];
//! let customer: Customer = map_row(&row).unwrap();
//! assert_eq!(customer.first_name, "Lois");
//!
//! let mut cmd = Command::new();
//! Dialect::SqlServer.generate_insert(&mut cmd, &customer, None).unwrap();
//! assert!(cmd.text().starts_with("INSERT INTO [Customer] ([Id], [FirstName])"));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

extern crate self as rowbind;

pub mod case_map;
pub mod command;
pub mod dialect;
pub mod dynamic;
pub mod error;
pub mod insert;
pub mod mapper;
pub mod metadata_cache;
pub mod reflect;
pub mod row;

// Re-export commonly used types
pub use case_map::CaseInsensitiveMap;
pub use command::{Command, CommandSink, NamedParam, ParamList};
pub use dialect::Dialect;
pub use dynamic::DynamicObject;
pub use error::{Error, Result};
pub use insert::{
    AnonymousRecord, Escaping, InsertColumn, InsertSpec, Insertable, ValueSource,
    generate_insert, generate_insert_batch, validate_template,
};
pub use mapper::{MapRows, MapRowsDynamic, RowIteratorExt, map_row, map_row_dynamic, map_row_with};
pub use metadata_cache::{TypeDescriptorCache, descriptor};
pub use reflect::{MemberDescriptor, MemberKind, Reflect, TypeDescriptor};
pub use row::{ColMetaData, Column, Row, RowSource};
pub use rowbind_types::{
    DeclaredType, EnumInfo, FromSql, SqlEnum, SqlType, SqlValue, ToSql, TypeError, TypeKind,
    convert, convert_enum, convert_to, from_converted,
};

#[cfg(feature = "derive")]
pub use rowbind_derive::{Reflect, SqlEnum};
