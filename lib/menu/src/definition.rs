//! Business menu definitions and the menu configuration document.

use crate::error::MenuError;
use crate::item::BusinessMenuItem;
use crate::login::LoginMenuDefinition;
use serde::{Deserialize, Serialize};

/// Reserved id of the root business menu.
pub const ROOT_MENU_ID: &str = "home";

const ROOT_MENU_NAME: &str = "Home";

/// A named menu with its items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessMenuDefinition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub items: Vec<BusinessMenuItem>,
}

impl BusinessMenuDefinition {
    /// Creates a menu with the given id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    #[must_use]
    pub fn with_item(mut self, item: BusinessMenuItem) -> Self {
        self.items.push(item);
        self
    }

    /// The trimmed id, if non-blank.
    #[must_use]
    pub fn menu_id(&self) -> Option<&str> {
        crate::item::non_blank(self.id.as_deref())
    }

    /// Items sorted by `order`; equal orders keep declaration order.
    #[must_use]
    pub fn sorted_items(&self) -> Vec<BusinessMenuItem> {
        let mut items = self.items.clone();
        items.sort_by_key(|item| item.order);
        items
    }

    /// Display name: the declared name, else `Home` for the root, else the id.
    #[must_use]
    pub fn resolved_name(&self) -> String {
        if let Some(name) = crate::item::non_blank(self.name.as_deref()) {
            return name.to_string();
        }
        match self.menu_id() {
            Some(id) if id.eq_ignore_ascii_case(ROOT_MENU_ID) => ROOT_MENU_NAME.to_string(),
            Some(id) => id.to_string(),
            None => String::new(),
        }
    }
}

/// The menu configuration document.
///
/// Either `menus` (a tree of definitions) or the legacy flat `menu` list is
/// present; `loginMenu` is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MenuConfiguration {
    pub version: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    pub menus: Vec<BusinessMenuDefinition>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub menu: Vec<BusinessMenuItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_menu: Option<LoginMenuDefinition>,
}

impl MenuConfiguration {
    /// Parses a JSON menu document. Unknown fields are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not a valid menu document.
    pub fn parse(json: &str) -> Result<Self, MenuError> {
        serde_json::from_str(json).map_err(|e| MenuError::InvalidDocument {
            reason: e.to_string(),
        })
    }

    /// The menu tree; a flat `menu` list becomes a single synthetic root.
    #[must_use]
    pub fn normalized_menus(&self) -> Vec<BusinessMenuDefinition> {
        if !self.menus.is_empty() {
            return self.menus.clone();
        }
        if self.menu.is_empty() {
            return Vec::new();
        }
        let mut items = self.menu.clone();
        items.sort_by_key(|item| item.order);
        vec![BusinessMenuDefinition {
            id: Some(ROOT_MENU_ID.to_string()),
            name: Some(ROOT_MENU_NAME.to_string()),
            parent_id: None,
            items,
        }]
    }

    /// The login menu, or an empty one.
    #[must_use]
    pub fn normalized_login_menu(&self) -> LoginMenuDefinition {
        self.login_menu.clone().unwrap_or_default()
    }

    /// Returns true if the document declares any business or login menu.
    #[must_use]
    pub fn has_any_menu(&self) -> bool {
        !self.normalized_menus().is_empty() || self.normalized_login_menu().has_content()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_menu_becomes_sorted_home_root() {
        let config = MenuConfiguration {
            menu: vec![
                BusinessMenuItem::action(2, "Second", "b"),
                BusinessMenuItem::action(1, "First", "a"),
                BusinessMenuItem::action(2, "Third", "c"),
            ],
            ..MenuConfiguration::default()
        };

        let menus = config.normalized_menus();
        assert_eq!(menus.len(), 1);
        assert_eq!(menus[0].menu_id(), Some(ROOT_MENU_ID));
        assert_eq!(menus[0].resolved_name(), "Home");
        let labels: Vec<_> = menus[0]
            .items
            .iter()
            .filter_map(|i| i.label.as_deref())
            .collect();
        assert_eq!(labels, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn tree_takes_precedence_over_flat_menu() {
        let config = MenuConfiguration {
            menus: vec![BusinessMenuDefinition::new("home")],
            menu: vec![BusinessMenuItem::action(1, "Flat", "flat")],
            ..MenuConfiguration::default()
        };
        let menus = config.normalized_menus();
        assert_eq!(menus.len(), 1);
        assert!(menus[0].items.is_empty());
    }

    #[test]
    fn resolved_name_fallbacks() {
        assert_eq!(BusinessMenuDefinition::new("home").resolved_name(), "Home");
        assert_eq!(BusinessMenuDefinition::new("billing").resolved_name(), "billing");
        assert_eq!(
            BusinessMenuDefinition::new("billing")
                .with_name("Billing")
                .resolved_name(),
            "Billing"
        );
    }

    #[test]
    fn parse_ignores_unknown_fields() {
        let config = MenuConfiguration::parse(
            r#"{"version":4,"generatedAt":"2025-01-01T00:00:00Z","extra":true,
                "menus":[{"id":"home","items":[{"order":1,"label":"A","function":"a"}]}]}"#,
        )
        .expect("parse");
        assert_eq!(config.version, 4);
        assert_eq!(config.menus[0].items.len(), 1);
        assert!(config.has_any_menu());
    }

    #[test]
    fn parse_rejects_invalid_json() {
        assert!(MenuConfiguration::parse("{not json").is_err());
    }

    #[test]
    fn empty_document_has_no_menu() {
        let config = MenuConfiguration::parse("{}").expect("parse");
        assert!(!config.has_any_menu());
    }
}
