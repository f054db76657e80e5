//! Error types for the server.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use selfservice_conversation::SessionError;
use serde_json::json;
use std::fmt;

/// Errors that stop the server from starting.
#[derive(Debug)]
pub enum StartupError {
    /// Menu configuration is unusable.
    Menus { reason: String },
    /// The outbound HTTP client could not be built.
    HttpClient { reason: String },
    /// The listen address could not be bound.
    Bind { address: String, reason: String },
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Menus { reason } => write!(f, "menu configuration is unusable: {reason}"),
            Self::HttpClient { reason } => write!(f, "failed to build HTTP client: {reason}"),
            Self::Bind { address, reason } => {
                write!(f, "failed to bind to '{address}': {reason}")
            }
        }
    }
}

impl std::error::Error for StartupError {}

/// Request errors returned by the HTTP routes.
#[derive(Debug)]
pub enum ApiError {
    /// The session has no valid access token.
    Unauthorized,
    /// The callback is not a service function.
    NotHandled { callback_id: String },
    Session(SessionError),
    /// Rendering an admin document failed.
    Internal { reason: String },
}

impl From<SessionError> for ApiError {
    fn from(error: SessionError) -> Self {
        Self::Session(error)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "no valid access token for session"),
            Self::NotHandled { callback_id } => {
                write!(f, "callback '{callback_id}' is not a service function")
            }
            Self::Session(error) => write!(f, "{error}"),
            Self::Internal { reason } => write!(f, "internal error: {reason}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            Self::NotHandled { .. } => (StatusCode::NOT_FOUND, self.to_string()),
            Self::Session(SessionError::InvalidKey | SessionError::InvalidExpiry) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            Self::Session(SessionError::StorageFailed { reason }) => {
                tracing::error!(%reason, "session storage failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            Self::Internal { reason } => {
                tracing::error!(%reason, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
