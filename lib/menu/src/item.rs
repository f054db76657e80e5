//! Menu items and their context directives.

use serde::{Deserialize, Serialize};

/// Which selection an item requires before it can run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkContext {
    /// Requires a selected billing account.
    Account,
    /// Requires a selected service.
    Service,
    /// Runs without any selection.
    #[default]
    NoContext,
}

impl LinkContext {
    /// Parses a context label case-insensitively; blank or unknown labels
    /// mean no context.
    #[must_use]
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(str::trim) {
            Some(l) if l.eq_ignore_ascii_case("account") => Self::Account,
            Some(l) if l.eq_ignore_ascii_case("service") => Self::Service,
            _ => Self::NoContext,
        }
    }
}

/// One tier of a menu item's context directives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextDirective {
    /// Whether the tier is enabled for the item.
    pub enabled: bool,
    /// Query parameter key that receives the tier's id.
    pub key: Option<String>,
    /// Label shown ahead of the response.
    pub label: Option<String>,
}

impl ContextDirective {
    fn new(enabled: Option<bool>, key: Option<&str>, label: Option<&str>) -> Self {
        Self {
            enabled: enabled.unwrap_or(false),
            key: non_blank(key).map(str::to_string),
            label: non_blank(label).map(str::to_string),
        }
    }

    /// The key, when the tier is enabled and declares one.
    #[must_use]
    pub fn active_key(&self) -> Option<&str> {
        if self.enabled { self.key.as_deref() } else { None }
    }
}

/// Per-item overrides for context injection and labelling.
///
/// Tiers are consulted in priority order: menu, then service, then account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextDirectives {
    /// Menu tier.
    pub menu: ContextDirective,
    /// Service tier.
    pub service: ContextDirective,
    /// Account tier.
    pub account: ContextDirective,
}

impl ContextDirectives {
    /// Query key forced to the selected account id.
    #[must_use]
    pub fn account_key(&self) -> Option<&str> {
        self.account.active_key()
    }

    /// Query key forced to the selected service id.
    #[must_use]
    pub fn service_key(&self) -> Option<&str> {
        self.service.active_key()
    }

    /// Label of the first enabled tier.
    #[must_use]
    pub fn resolved_label(&self) -> Option<&str> {
        [&self.menu, &self.service, &self.account]
            .into_iter()
            .find(|tier| tier.enabled)
            .and_then(|tier| tier.label.as_deref())
    }
}

/// A button in a business menu.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessMenuItem {
    pub order: i32,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submenu_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weblink: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authenticated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_translation: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu_context_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu_context_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu_context_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_context_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_context_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_context_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_context_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_context_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_context_label: Option<String>,
}

impl BusinessMenuItem {
    /// Creates an action item.
    #[must_use]
    pub fn action(order: i32, label: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            order,
            label: Some(label.into()),
            function: Some(function.into()),
            ..Self::default()
        }
    }

    /// Creates an item that opens another menu.
    #[must_use]
    pub fn submenu(order: i32, label: impl Into<String>, submenu_id: impl Into<String>) -> Self {
        Self {
            order,
            label: Some(label.into()),
            submenu_id: Some(submenu_id.into()),
            ..Self::default()
        }
    }

    /// Sets the callback data.
    #[must_use]
    pub fn with_callback_data(mut self, callback_data: impl Into<String>) -> Self {
        self.callback_data = Some(callback_data.into());
        self
    }

    /// Sets the required link context.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Returns true if the item opens a submenu.
    #[must_use]
    pub fn is_sub_menu(&self) -> bool {
        non_blank(self.submenu_id.as_deref()).is_some()
    }

    /// Returns true if the item is an external link.
    #[must_use]
    pub fn is_weblink(&self) -> bool {
        non_blank(self.weblink.as_deref()).is_some()
    }

    /// Returns true if the item runs a function.
    #[must_use]
    pub fn is_action(&self) -> bool {
        !self.is_sub_menu() && !self.is_weblink() && non_blank(self.function.as_deref()).is_some()
    }

    /// Returns true if the link requires an authenticated user.
    #[must_use]
    pub fn is_authenticated_link(&self) -> bool {
        self.authenticated.unwrap_or(false)
    }

    /// The selection this item requires.
    #[must_use]
    pub fn link_context(&self) -> LinkContext {
        LinkContext::from_label(self.context.as_deref())
    }

    #[must_use]
    pub fn requires_account_context(&self) -> bool {
        self.link_context() == LinkContext::Account
    }

    #[must_use]
    pub fn requires_service_context(&self) -> bool {
        self.link_context() == LinkContext::Service
    }

    /// Collects the item's context directives.
    #[must_use]
    pub fn context_directives(&self) -> ContextDirectives {
        ContextDirectives {
            menu: ContextDirective::new(
                self.menu_context_enabled,
                self.menu_context_key.as_deref(),
                self.menu_context_label.as_deref(),
            ),
            service: ContextDirective::new(
                self.service_context_enabled,
                self.service_context_key.as_deref(),
                self.service_context_label.as_deref(),
            ),
            account: ContextDirective::new(
                self.account_context_enabled,
                self.account_context_key.as_deref(),
                self.account_context_label.as_deref(),
            ),
        }
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
