//! Error types for the catalog crate.
//!
//! Catalog loading itself is soft: unusable sources are skipped and an empty
//! catalog is a valid outcome. These errors surface from constructor
//! validation and from parsing/serializing a single document.

use std::fmt;

/// Errors from catalog declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// A required field was blank or missing.
    MissingField {
        kind: &'static str,
        field: &'static str,
    },
    /// The YAML document could not be parsed.
    InvalidDocument { reason: String },
    /// The catalog could not be serialized.
    SerializationFailed { reason: String },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { kind, field } => {
                write!(f, "{kind} is missing required field '{field}'")
            }
            Self::InvalidDocument { reason } => {
                write!(f, "invalid catalog document: {reason}")
            }
            Self::SerializationFailed { reason } => {
                write!(f, "failed to serialize catalog: {reason}")
            }
        }
    }
}

impl std::error::Error for CatalogError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_display() {
        let err = CatalogError::MissingField {
            kind: "service definition",
            field: "API-Name",
        };
        assert_eq!(
            err.to_string(),
            "service definition is missing required field 'API-Name'"
        );
    }

    #[test]
    fn invalid_document_display() {
        let err = CatalogError::InvalidDocument {
            reason: "expected a mapping".to_string(),
        };
        assert!(err.to_string().contains("expected a mapping"));
    }
}
