//! Conversation context tiers.
//!
//! A chat session carries up to three independent selections that later
//! service calls can be parameterized with:
//!
//! - **Account**: the billing account the user picked after login
//! - **Service**: a product/subscription under that account
//! - **Object**: a free-form value captured from a previous single-item
//!   response (for example the trouble ticket just selected)

use serde::{Deserialize, Serialize};
use std::fmt;

const ACCOUNT_NAME_DISPLAY_MAX: usize = 10;

/// The tier a context value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextTier {
    /// Billing account selection.
    Account,
    /// Service/product selection.
    Service,
    /// Object captured from a prior response.
    Object,
}

impl ContextTier {
    /// Returns the tier name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Service => "service",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for ContextTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The selected billing account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountContext {
    /// Backend account identifier.
    pub id: String,
    /// Account display name.
    #[serde(default)]
    pub name: Option<String>,
}

impl AccountContext {
    /// Creates an account context.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Label shown in selection lists: `"<id> - <name>"`, with the name
    /// truncated to ten characters.
    #[must_use]
    pub fn display_label(&self) -> String {
        let name: String = self
            .name
            .as_deref()
            .unwrap_or_default()
            .trim()
            .chars()
            .take(ACCOUNT_NAME_DISPLAY_MAX)
            .collect();
        if name.is_empty() {
            self.id.clone()
        } else {
            format!("{} - {}", self.id, name)
        }
    }
}

/// The selected service (product instance).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceContext {
    /// Backend product identifier.
    pub id: String,
    /// Product display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Access identifier (MSISDN, line number, ...).
    #[serde(default)]
    pub access_number: Option<String>,
}

impl ServiceContext {
    /// Creates a service context.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            access_number: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the access number.
    #[must_use]
    pub fn with_access_number(mut self, access_number: impl Into<String>) -> Self {
        self.access_number = Some(access_number.into());
        self
    }

    /// Label shown in selection lists: `"<name> (<access number>)"`.
    #[must_use]
    pub fn display_label(&self) -> String {
        let name = non_blank(self.name.as_deref()).unwrap_or("<unknown>");
        let number = non_blank(self.access_number.as_deref()).unwrap_or("<no number>");
        format!("{name} ({number})")
    }
}

/// All context tiers of one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionContext {
    /// Selected account.
    pub account: Option<AccountContext>,
    /// Selected service.
    pub service: Option<ServiceContext>,
    /// Captured object value.
    pub object: Option<String>,
}

impl SelectionContext {
    /// Returns true if no tier is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.account.is_none() && self.service.is_none() && self.object.is_none()
    }

    /// Returns the object value if it is non-blank.
    #[must_use]
    pub fn object_value(&self) -> Option<&str> {
        non_blank(self.object.as_deref())
    }
}

/// A change to the object tier produced by one service execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum ObjectContextUpdate {
    /// Keep whatever is stored.
    #[default]
    Unchanged,
    /// Remove the stored value.
    Clear,
    /// Replace the stored value.
    Set(String),
}

impl ObjectContextUpdate {
    /// Returns the object value after applying this update to `current`.
    #[must_use]
    pub fn apply(&self, current: Option<String>) -> Option<String> {
        match self {
            Self::Unchanged => current,
            Self::Clear => None,
            Self::Set(value) => Some(value.clone()),
        }
    }

    /// Returns true if the update leaves the context as is.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_label_truncates_name() {
        let account = AccountContext::new("ACC-1").with_name("Globex Corporation");
        assert_eq!(account.display_label(), "ACC-1 - Globex Cor");
    }

    #[test]
    fn account_label_without_name_is_id() {
        assert_eq!(AccountContext::new("ACC-1").display_label(), "ACC-1");
        let blank = AccountContext::new("ACC-2").with_name("   ");
        assert_eq!(blank.display_label(), "ACC-2");
    }

    #[test]
    fn service_label_uses_placeholders() {
        let service = ServiceContext::new("PRD-9");
        assert_eq!(service.display_label(), "<unknown> (<no number>)");

        let service = ServiceContext::new("PRD-9")
            .with_name("Fibre 500")
            .with_access_number("+35799123456");
        assert_eq!(service.display_label(), "Fibre 500 (+35799123456)");
    }

    #[test]
    fn blank_object_is_not_a_value() {
        let context = SelectionContext {
            object: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(context.object_value().is_none());
        assert!(!context.is_empty());
    }

    #[test]
    fn object_update_apply() {
        let current = Some("TT-1".to_string());
        assert_eq!(ObjectContextUpdate::Unchanged.apply(current.clone()), current);
        assert_eq!(ObjectContextUpdate::Clear.apply(current.clone()), None);
        assert_eq!(
            ObjectContextUpdate::Set("TT-2".to_string()).apply(current),
            Some("TT-2".to_string())
        );
    }

    #[test]
    fn object_update_serializes_tagged() {
        let json = serde_json::to_value(ObjectContextUpdate::Set("TT-2".to_string()))
            .expect("serialize");
        assert_eq!(json["action"], "set");
        assert_eq!(json["value"], "TT-2");
        let json = serde_json::to_value(ObjectContextUpdate::Clear).expect("serialize");
        assert_eq!(json["action"], "clear");
    }

    #[test]
    fn selection_context_serde_uses_camel_case() {
        let context = SelectionContext {
            account: None,
            service: Some(ServiceContext::new("PRD-1").with_access_number("555")),
            object: Some("TT-7".to_string()),
        };
        let json = serde_json::to_value(&context).expect("serialize");
        assert_eq!(json["service"]["accessNumber"], "555");
        assert_eq!(json["object"], "TT-7");
    }
}
