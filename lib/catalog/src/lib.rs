//! Declarative API and service-function catalogs.
//!
//! This crate provides:
//!
//! - **API registry**: named backend endpoints with templated URLs
//! - **Service catalog**: service functions exposed to chat callback ids,
//!   each binding an API to query parameters, context fields, a response
//!   template and the output fields to extract
//!
//! Both catalogs are loaded once from YAML through a
//! [`SourceChain`](selfservice_core::SourceChain) and are read-only afterwards.

pub mod api;
pub mod error;
mod scalar;
pub mod service;

pub use api::{ApiDefinition, ApiRegistry};
pub use error::CatalogError;
pub use service::{OutputField, ResponseTemplate, ServiceCatalog, ServiceDefinition};
