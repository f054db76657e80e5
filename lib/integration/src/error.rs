//! Error types for the integration crate.
//!
//! Request failures are not errors: they come back as an unsuccessful
//! [`ApiResponse`](crate::ApiResponse). `ClientError` only covers building
//! the client itself.

use std::fmt;

/// Errors from constructing an API client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The underlying HTTP client could not be built.
    BuildFailed { reason: String },
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BuildFailed { reason } => {
                write!(f, "failed to build HTTP client: {reason}")
            }
        }
    }
}

impl std::error::Error for ClientError {}
