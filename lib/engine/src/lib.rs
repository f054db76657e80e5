//! Declarative service-function engine.
//!
//! A service function is an operator-declared API call plus a rendering
//! rule. This crate turns a chat callback id and the session's selected
//! context into one backend request, extracts fields from the JSON
//! response and decides what to show and which object context to carry
//! into the next turn.
//!
//! - [`path`]: soft-failing JSON path resolution
//! - [`query`]: query parameter assembly from declarations and context
//! - [`render`]: text and selection-list rendering
//! - [`executor`]: the orchestration
//!
//! The engine never writes session state; the returned
//! [`ExecutionResult`] carries the update for the caller to persist.

pub mod executor;
pub mod path;
pub mod query;
pub mod render;
pub mod result;
mod trace;

pub use executor::{ExecutionRequest, ServiceFunctionExecutor};
pub use result::{ExecutionResult, ResponseMode};
