//! Login menu: the pre-authentication projection of a menu tree.
//!
//! A login menu is declared either as a tree (`menus`, rooted at
//! `login-home`) or as the legacy flat pair `menu` / `settingsMenu`. The tree
//! form wins when it yields any items.

use crate::definition::BusinessMenuDefinition;
use crate::item::{BusinessMenuItem, non_blank};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved id of the login menu root.
pub const LOGIN_ROOT_MENU_ID: &str = "login-home";

const SETTINGS_LABEL: &str = "Settings";
const SETTINGS_TRANSLATION_KEY: &str = "ButtonSettings";
const SETTINGS_CALLBACK: &str = "SETTINGS_MENU";

/// Functions available before login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoginMenuFunction {
    DigitalLogin,
    CrmLogin,
    OptIn,
    ChangeLanguage,
    Settings,
    Home,
}

impl LoginMenuFunction {
    /// Parses a function name case-insensitively.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "DIGITAL_LOGIN" => Some(Self::DigitalLogin),
            "CRM_LOGIN" => Some(Self::CrmLogin),
            "OPT_IN" => Some(Self::OptIn),
            "CHANGE_LANGUAGE" => Some(Self::ChangeLanguage),
            "SETTINGS" => Some(Self::Settings),
            "HOME" => Some(Self::Home),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DigitalLogin => "DIGITAL_LOGIN",
            Self::CrmLogin => "CRM_LOGIN",
            Self::OptIn => "OPT_IN",
            Self::ChangeLanguage => "CHANGE_LANGUAGE",
            Self::Settings => "SETTINGS",
            Self::Home => "HOME",
        }
    }
}

impl fmt::Display for LoginMenuFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A button in the login menu.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginMenuItem {
    pub order: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
}

impl LoginMenuItem {
    /// The parsed function, if recognized.
    #[must_use]
    pub fn resolved_function(&self) -> Option<LoginMenuFunction> {
        self.function.as_deref().and_then(LoginMenuFunction::parse)
    }

    /// Copy with the function rewritten to its canonical name, or `None` when
    /// the function is not recognized.
    fn canonical(&self) -> Option<Self> {
        let function = self.resolved_function()?;
        Some(Self {
            function: Some(function.as_str().to_string()),
            ..self.clone()
        })
    }

    fn from_business_item(item: &BusinessMenuItem) -> Self {
        Self {
            order: item.order,
            label: item.label.clone(),
            function: item.function.clone(),
            translation_key: item.translation_key.clone(),
            callback_data: item.callback_data.clone(),
        }
    }

    /// The Settings entry a submenu item turns into.
    fn settings_entry(item: &BusinessMenuItem) -> Self {
        let or_default = |value: Option<&str>, default: &str| {
            non_blank(value).unwrap_or(default).to_string()
        };
        Self {
            order: item.order,
            label: Some(or_default(item.label.as_deref(), SETTINGS_LABEL)),
            function: Some(LoginMenuFunction::Settings.as_str().to_string()),
            translation_key: Some(or_default(
                item.translation_key.as_deref(),
                SETTINGS_TRANSLATION_KEY,
            )),
            callback_data: Some(or_default(item.callback_data.as_deref(), SETTINGS_CALLBACK)),
        }
    }
}

/// The login menu declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginMenuDefinition {
    pub menus: Vec<BusinessMenuDefinition>,
    pub menu: Vec<LoginMenuItem>,
    pub settings_menu: Vec<LoginMenuItem>,
}

impl LoginMenuDefinition {
    /// Returns true if any of the three forms declares something.
    #[must_use]
    pub fn has_content(&self) -> bool {
        !(self.menus.is_empty() && self.menu.is_empty() && self.settings_menu.is_empty())
    }

    /// The main login menu.
    #[must_use]
    pub fn normalized_menu(&self) -> Vec<LoginMenuItem> {
        let tree = self.tree_menu();
        if tree.is_empty() {
            normalize_flat(&self.menu)
        } else {
            tree
        }
    }

    /// The settings submenu of the login menu.
    #[must_use]
    pub fn normalized_settings_menu(&self) -> Vec<LoginMenuItem> {
        let tree = self.tree_settings_menu();
        if tree.is_empty() {
            normalize_flat(&self.settings_menu)
        } else {
            tree
        }
    }

    /// Main items followed by settings items.
    #[must_use]
    pub fn all_items(&self) -> Vec<LoginMenuItem> {
        let mut items = self.normalized_menu();
        items.extend(self.normalized_settings_menu());
        items
    }

    fn tree_root(&self) -> Option<&BusinessMenuDefinition> {
        self.menus
            .iter()
            .find(|menu| {
                menu.menu_id()
                    .is_some_and(|id| id.eq_ignore_ascii_case(LOGIN_ROOT_MENU_ID))
            })
            .or_else(|| self.menus.first())
    }

    fn tree_menu(&self) -> Vec<LoginMenuItem> {
        let Some(root) = self.tree_root() else {
            return Vec::new();
        };
        root.sorted_items()
            .iter()
            .filter_map(|item| {
                if item.is_sub_menu() {
                    Some(LoginMenuItem::settings_entry(item))
                } else if item.is_action() {
                    LoginMenuItem::from_business_item(item).canonical()
                } else {
                    None
                }
            })
            .collect()
    }

    fn tree_settings_menu(&self) -> Vec<LoginMenuItem> {
        let Some(root) = self.tree_root() else {
            return Vec::new();
        };
        let root_id = root.menu_id();
        let root_items = root.sorted_items();
        let settings_id = root_items
            .iter()
            .filter(|item| item.is_sub_menu())
            .find_map(|item| non_blank(item.submenu_id.as_deref()))
            .or_else(|| {
                self.menus
                    .iter()
                    .filter(|menu| root_id.is_some() && non_blank(menu.parent_id.as_deref()) == root_id)
                    .find_map(BusinessMenuDefinition::menu_id)
            });
        let Some(settings_id) = settings_id else {
            return Vec::new();
        };

        self.menus
            .iter()
            .find(|menu| menu.menu_id() == Some(settings_id))
            .map(|menu| {
                menu.sorted_items()
                    .iter()
                    .filter(|item| item.is_action())
                    .filter_map(|item| LoginMenuItem::from_business_item(item).canonical())
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn normalize_flat(items: &[LoginMenuItem]) -> Vec<LoginMenuItem> {
    let mut items: Vec<_> = items.iter().filter_map(LoginMenuItem::canonical).collect();
    items.sort_by_key(|item| item.order);
    items
}
