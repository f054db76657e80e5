//! Error types for the menu crate.

use std::fmt;

/// Errors from loading the menu configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuError {
    /// No source provided any business menu.
    NoMenus,
    /// Menus were loaded but none carries the root id.
    RootMenuMissing { root_id: &'static str },
    /// A menu document could not be parsed.
    InvalidDocument { reason: String },
}

impl fmt::Display for MenuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMenus => write!(f, "business menu configuration could not be loaded"),
            Self::RootMenuMissing { root_id } => {
                write!(f, "business menu configuration must include a root menu with id '{root_id}'")
            }
            Self::InvalidDocument { reason } => {
                write!(f, "invalid menu document: {reason}")
            }
        }
    }
}

impl std::error::Error for MenuError {}
