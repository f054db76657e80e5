//! Chat session state for the self-service gateway.
//!
//! This crate provides:
//!
//! - **Session store trait**: per-session access token and selected
//!   account / service / object context
//! - **In-memory store**: the process-local implementation

pub mod error;
pub mod session;

pub use error::SessionError;
pub use session::{InMemorySessionStore, SessionState, SessionStore, TokenSnapshot, TokenState};
