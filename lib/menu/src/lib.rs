//! Chat menu declarations.
//!
//! This crate provides:
//!
//! - **Menu items**: buttons with their classification (submenu, weblink,
//!   action) and per-item context directives
//! - **Menu definitions**: the business menu tree rooted at `home`
//! - **Login menu**: the pre-authentication projection of a menu tree
//! - **Menu catalog**: the loaded, normalized and indexed configuration

pub mod catalog;
pub mod definition;
pub mod error;
pub mod item;
pub mod login;

pub use catalog::MenuCatalog;
pub use definition::{BusinessMenuDefinition, MenuConfiguration, ROOT_MENU_ID};
pub use error::MenuError;
pub use item::{BusinessMenuItem, ContextDirective, ContextDirectives, LinkContext};
pub use login::{LOGIN_ROOT_MENU_ID, LoginMenuDefinition, LoginMenuFunction, LoginMenuItem};
