//! Self-service gateway server.
//!
//! An axum front end over the engine: it serves the effective catalogs and
//! menus, keeps per-chat session state, and runs service-function
//! callbacks on behalf of the chat channel.

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
