//! Mapping and insert generation error types.

use thiserror::Error;

use rowbind_types::TypeError;

/// Errors that can occur while mapping rows or generating statements.
///
/// Every error is returned to the immediate caller. A command that failed
/// part way through insert generation may already hold some appended text
/// and parameters and should be discarded.
#[derive(Debug, Error)]
pub enum Error {
    /// A required argument is missing or structurally invalid.
    #[error("invalid argument '{name}': {message}")]
    Argument {
        /// Argument name.
        name: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// A statement template does not have the expected placeholders.
    #[error("format error: {0}")]
    Format(String),

    /// A value could not be converted to a member's declared type.
    #[error("cannot convert '{value}' for member '{member}' ({declared_type}) of {owner}: {source}")]
    Conversion {
        /// Member name.
        member: String,
        /// Declared type of the member.
        declared_type: String,
        /// The offending value, formatted.
        value: String,
        /// Name of the type owning the member.
        owner: &'static str,
        /// Underlying conversion failure.
        #[source]
        source: TypeError,
    },

    /// A converted value could not be written to a member.
    #[error("cannot assign '{value}' to member '{member}' ({declared_type}) of {owner}: {reason}")]
    MemberAssignment {
        /// Member name.
        member: String,
        /// Declared type of the member.
        declared_type: String,
        /// The value being assigned, formatted.
        value: String,
        /// Name of the type owning the member.
        owner: &'static str,
        /// Why the assignment failed.
        reason: String,
    },

    /// A member's value could not be read.
    #[error("cannot read member '{member}' of {owner}: {reason}")]
    MemberAccess {
        /// Member name.
        member: String,
        /// Name of the type owning the member.
        owner: &'static str,
        /// Why the read failed.
        reason: String,
    },

    /// Type conversion error outside of a member context.
    #[error("type error: {0}")]
    Type(#[from] TypeError),
}

impl Error {
    /// Create an argument error.
    pub(crate) fn argument(name: &'static str, message: impl Into<String>) -> Self {
        Self::Argument {
            name,
            message: message.into(),
        }
    }

    /// Check if this error reports an invalid argument.
    #[must_use]
    pub fn is_argument_error(&self) -> bool {
        matches!(self, Self::Argument { .. })
    }

    /// Check if this error reports a failed value conversion.
    #[must_use]
    pub fn is_conversion_error(&self) -> bool {
        matches!(self, Self::Conversion { .. } | Self::Type(_))
    }

    /// Get the member name the error refers to, if any.
    #[must_use]
    pub fn member_name(&self) -> Option<&str> {
        match self {
            Self::Conversion { member, .. }
            | Self::MemberAssignment { member, .. }
            | Self::MemberAccess { member, .. } => Some(member),
            _ => None,
        }
    }
}

/// Result type for mapping and insert operations.
pub type Result<T> = std::result::Result<T, Error>;
