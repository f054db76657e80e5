//! Backend API access for the self-service gateway.
//!
//! This crate provides:
//!
//! - **API client trait**: the uniform request/response contract the
//!   service-function engine calls through
//! - **HTTP client**: the reqwest-backed implementation

pub mod client;
pub mod error;
pub mod http;

pub use client::{ApiClient, ApiRequest, ApiResponse, HttpMethod};
pub use error::ClientError;
pub use http::{HttpApiClient, HttpClientConfig};
