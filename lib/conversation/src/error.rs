//! Error types for the conversation crate.

use std::fmt;

/// Errors from session operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The session key is blank.
    InvalidKey,
    /// The token lifetime is outside the representable time range.
    InvalidExpiry,
    /// Storage operation failed.
    StorageFailed { reason: String },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKey => write!(f, "session key must not be blank"),
            Self::InvalidExpiry => write!(f, "token lifetime is out of range"),
            Self::StorageFailed { reason } => {
                write!(f, "session storage failed: {reason}")
            }
        }
    }
}

impl std::error::Error for SessionError {}
