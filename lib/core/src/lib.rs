//! Core domain types and utilities for the selfservice gateway.
//!
//! This crate provides the foundational pieces shared by the declaration
//! catalogs, the menu normalizer and the service-function engine:
//!
//! - **Context model**: account / service / object selection tiers
//! - **Slugs**: normalized lookup keys for declared names and ids
//! - **Placeholders**: `${...}` substitution for templated values
//! - **Sources**: the local-override, default, packaged resolution chain

pub mod context;
pub mod error;
pub mod placeholder;
pub mod slug;
pub mod source;

pub use context::{
    AccountContext, ContextTier, ObjectContextUpdate, SelectionContext, ServiceContext,
};
pub use error::Result;
pub use placeholder::PlaceholderResolver;
pub use slug::{same_slug, slugify};
pub use source::{ConfigSource, Loaded, SourceChain};
