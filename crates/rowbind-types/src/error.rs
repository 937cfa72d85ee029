//! Type conversion error types.

use thiserror::Error;

/// Errors that can occur during type conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypeError {
    /// Value is null when non-null was expected.
    #[error("unexpected null value")]
    UnexpectedNull,

    /// Type mismatch during extraction of an already normalised value.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Expected type name.
        expected: &'static str,
        /// Actual type name.
        actual: String,
    },

    /// Value is neither a member name nor a defined discriminant of the enum.
    #[error("'{value}' is not a valid value for enum {enum_name}")]
    InvalidEnum {
        /// The offending value, formatted.
        value: String,
        /// Name of the enum type.
        enum_name: &'static str,
    },

    /// Value has a textual form that is not a unique identifier.
    #[error("'{value}' is not a valid unique identifier: {reason}")]
    InvalidUuid {
        /// The offending value, formatted.
        value: String,
        /// Parser message.
        reason: String,
    },

    /// General scalar conversion failed.
    #[error("cannot convert '{value}' of type {source_type} to {target_type}: {reason}")]
    Conversion {
        /// The offending value, formatted.
        value: String,
        /// Runtime type of the source value.
        source_type: &'static str,
        /// Declared target type.
        target_type: String,
        /// Why the conversion failed.
        reason: String,
    },

    /// No conversion exists between the two types.
    #[error("unsupported conversion from {from} to {to}")]
    UnsupportedConversion {
        /// Source type.
        from: String,
        /// Target type.
        to: &'static str,
    },
}

impl TypeError {
    /// Check if this error was caused by a null reaching a non-null target.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::UnexpectedNull)
    }
}
