//! API client trait and request/response types.
//!
//! Every backend call goes through [`ApiClient`]. Implementations never
//! fail: transport problems come back as a response with status code `0`
//! and an error message, HTTP errors as an unsuccessful response carrying
//! the status.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;

/// HTTP methods a backend request may use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A backend request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiRequest {
    /// Target URL, without the query string.
    pub url: String,
    pub method: HttpMethod,
    /// Bearer token; blank tokens are not sent.
    pub bearer_token: Option<String>,
    /// Query parameters in insertion order.
    pub query: IndexMap<String, String>,
}

impl ApiRequest {
    /// Creates a GET request.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Get,
            bearer_token: None,
            query: IndexMap::new(),
        }
    }

    /// Sets the bearer token.
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Replaces the query parameters.
    #[must_use]
    pub fn with_query(mut self, query: IndexMap<String, String>) -> Self {
        self.query = query;
        self
    }

    /// The bearer token, if non-blank.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.bearer_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// The outcome of a backend request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// True for a 2xx response.
    pub success: bool,
    /// HTTP status; `0` when no response was received.
    pub status_code: u16,
    /// Response headers with lower-cased names.
    pub headers: BTreeMap<String, String>,
    /// Raw response body.
    pub body: Option<String>,
    /// Failure description.
    pub error_message: Option<String>,
}

impl ApiResponse {
    /// A response received from the server.
    #[must_use]
    pub fn received(status_code: u16, body: impl Into<String>) -> Self {
        let success = (200..300).contains(&status_code);
        Self {
            success,
            status_code,
            headers: BTreeMap::new(),
            body: Some(body.into()),
            error_message: None,
        }
    }

    /// A JSON response with `application/json` content type.
    #[must_use]
    pub fn json(status_code: u16, body: &JsonValue) -> Self {
        Self::received(status_code, body.to_string()).with_header("content-type", "application/json")
    }

    /// A request that never reached the server.
    #[must_use]
    pub fn transport_failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            status_code: 0,
            headers: BTreeMap::new(),
            body: None,
            error_message: Some(message.into()),
        }
    }

    /// Adds a header; the name is lower-cased.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Looks up a header case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// True when the content type is `application/json` or
    /// `application/*+json`.
    #[must_use]
    pub fn is_json(&self) -> bool {
        let Some(content_type) = self.header("content-type") else {
            return false;
        };
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.split_once('/') {
            Some(("application", subtype)) => subtype == "json" || subtype.ends_with("+json"),
            _ => false,
        }
    }

    /// True when the request never reached the server.
    #[must_use]
    pub fn is_transport_failure(&self) -> bool {
        self.status_code == 0
    }
}

/// Trait for backend API clients.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Executes one request.
    async fn execute(&self, request: ApiRequest) -> ApiResponse;
}
