//! Shared `Result` alias for fallible gateway operations.
//!
//! Crates keep their own error enums (`CatalogError`, `MenuError`, ...) and
//! return them wrapped in a rootcause [`Report`] where a failure is fatal to
//! the caller, such as loading the menu configuration at startup. Recoverable
//! conditions (a missing service definition, a failed backend call) are not
//! errors and never pass through this alias.

use rootcause::Report;

/// Result carrying a [`Report`] of the crate's error type `C`.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;
