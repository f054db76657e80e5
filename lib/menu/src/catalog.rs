//! The loaded and indexed menu configuration.

use crate::definition::{BusinessMenuDefinition, MenuConfiguration, ROOT_MENU_ID};
use crate::error::MenuError;
use crate::item::BusinessMenuItem;
use crate::login::{LoginMenuDefinition, LoginMenuItem};
use indexmap::IndexMap;
use selfservice_core::{ConfigSource, Result, SourceChain, slugify};
use std::path::Path;
use tracing::{info, warn};

const PACKAGED_MENUS: &str = include_str!("../defaults/menus.json");

/// Business and login menus, normalized and indexed by menu id.
///
/// Menu ids are compared by slug. Items of every menu are kept sorted by
/// `order`.
#[derive(Debug, Clone)]
pub struct MenuCatalog {
    menus: IndexMap<String, BusinessMenuDefinition>,
    login_menu: LoginMenuDefinition,
    effective: MenuConfiguration,
}

impl MenuCatalog {
    /// Override file name.
    pub const OVERRIDE_FILE: &'static str = "IM-menus.override.json";
    /// Default file name.
    pub const DEFAULT_FILE: &'static str = "IM-menus.default.json";

    /// The standard source chain for a configuration directory.
    #[must_use]
    pub fn source_chain(config_dir: &Path) -> SourceChain {
        SourceChain::standard(
            config_dir,
            Self::OVERRIDE_FILE,
            Self::DEFAULT_FILE,
            Some(ConfigSource::packaged("menus.json", PACKAGED_MENUS)),
        )
    }

    /// Loads menus from the standard chain under `config_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if no source declares a business menu or the root
    /// menu is missing.
    pub fn load(config_dir: &Path) -> Result<Self, MenuError> {
        Self::load_from(&Self::source_chain(config_dir))
    }

    /// Loads menus from a source chain.
    ///
    /// Business menus come from the first source that declares any; the
    /// login menu from the first source that declares one. Version metadata
    /// comes from the first source declaring either.
    ///
    /// # Errors
    ///
    /// Returns an error if no source declares a business menu or the root
    /// menu is missing.
    pub fn load_from(chain: &SourceChain) -> Result<Self, MenuError> {
        let loaded = chain.load_all(MenuConfiguration::parse);
        for candidate in &loaded {
            if candidate.value.normalized_menus().is_empty() {
                warn!(source = %candidate.source, "menu configuration contains no business menu");
            }
        }

        let selected = loaded
            .iter()
            .find(|candidate| candidate.value.has_any_menu())
            .ok_or(MenuError::NoMenus)?;
        let menus = loaded
            .iter()
            .map(|candidate| candidate.value.normalized_menus())
            .find(|menus| !menus.is_empty())
            .ok_or(MenuError::NoMenus)?;
        let login_menu = loaded
            .iter()
            .map(|candidate| candidate.value.normalized_login_menu())
            .find(LoginMenuDefinition::has_content)
            .unwrap_or_default();

        let catalog = Self::build(&selected.value, menus, login_menu)?;
        info!(source = %selected.source, menus = catalog.menus.len(), "menu configuration loaded");
        Ok(catalog)
    }

    /// Builds a catalog from a single configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document has no business menu or no root menu.
    pub fn from_configuration(configuration: &MenuConfiguration) -> Result<Self, MenuError> {
        let menus = configuration.normalized_menus();
        if menus.is_empty() {
            return Err(MenuError::NoMenus.into());
        }
        Self::build(configuration, menus, configuration.normalized_login_menu())
    }

    fn build(
        metadata: &MenuConfiguration,
        definitions: Vec<BusinessMenuDefinition>,
        login_menu: LoginMenuDefinition,
    ) -> Result<Self, MenuError> {
        let mut menus = IndexMap::new();
        for definition in &definitions {
            let Some(id) = definition.menu_id() else {
                warn!("skipping business menu without an id");
                continue;
            };
            let key = slugify(id);
            if key.is_empty() {
                warn!(menu_id = %id, "skipping business menu with an unusable id");
                continue;
            }
            menus.insert(
                key,
                BusinessMenuDefinition {
                    id: Some(id.to_string()),
                    name: Some(definition.resolved_name()),
                    parent_id: definition.parent_id.clone(),
                    items: definition.sorted_items(),
                },
            );
        }

        if !menus.contains_key(ROOT_MENU_ID) {
            return Err(MenuError::RootMenuMissing {
                root_id: ROOT_MENU_ID,
            }
            .into());
        }

        let effective = MenuConfiguration {
            version: metadata.version,
            generated_at: metadata.generated_at.clone(),
            menus: menus.values().cloned().collect(),
            menu: Vec::new(),
            login_menu: Some(snapshot_login_menu(&login_menu)),
        };

        Ok(Self {
            menus,
            login_menu,
            effective,
        })
    }

    /// The reserved root menu id.
    #[must_use]
    pub fn root_menu_id(&self) -> &'static str {
        ROOT_MENU_ID
    }

    /// Returns true if a menu with this id exists.
    #[must_use]
    pub fn menu_exists(&self, menu_id: &str) -> bool {
        self.menu(menu_id).is_some()
    }

    /// Looks up a menu by id.
    #[must_use]
    pub fn menu(&self, menu_id: &str) -> Option<&BusinessMenuDefinition> {
        self.menus.get(&slugify(menu_id))
    }

    /// All menus in declaration order.
    pub fn menus(&self) -> impl Iterator<Item = &BusinessMenuDefinition> {
        self.menus.values()
    }

    /// Sorted items of a menu; unknown ids fall back to the root menu.
    #[must_use]
    pub fn menu_items(&self, menu_id: &str) -> &[BusinessMenuItem] {
        self.menu(menu_id)
            .or_else(|| self.menus.get(ROOT_MENU_ID))
            .map(|menu| menu.items.as_slice())
            .unwrap_or_default()
    }

    /// Finds the item a callback refers to: first by `callbackData`, then by
    /// `function`, both case-insensitive.
    #[must_use]
    pub fn find_item_by_callback(&self, callback: &str) -> Option<&BusinessMenuItem> {
        let callback = callback.trim();
        if callback.is_empty() {
            return None;
        }
        let equals = |value: Option<&String>| {
            value.is_some_and(|v| v.trim().eq_ignore_ascii_case(callback))
        };
        let items = || self.menus.values().flat_map(|menu| menu.items.iter());
        items()
            .find(|item| equals(item.callback_data.as_ref()))
            .or_else(|| items().find(|item| equals(item.function.as_ref())))
    }

    /// The login menu declaration.
    #[must_use]
    pub fn login_menu(&self) -> &LoginMenuDefinition {
        &self.login_menu
    }

    /// The main login menu.
    #[must_use]
    pub fn login_menu_items(&self) -> Vec<LoginMenuItem> {
        self.login_menu.normalized_menu()
    }

    /// The login settings menu.
    #[must_use]
    pub fn login_settings_items(&self) -> Vec<LoginMenuItem> {
        self.login_menu.normalized_settings_menu()
    }

    /// Finds a login item (main or settings) by callback data,
    /// case-insensitive.
    #[must_use]
    pub fn find_login_item_by_callback(&self, callback: &str) -> Option<LoginMenuItem> {
        let callback = callback.trim();
        if callback.is_empty() {
            return None;
        }
        self.login_menu.all_items().into_iter().find(|item| {
            item.callback_data
                .as_deref()
                .is_some_and(|data| data.trim().eq_ignore_ascii_case(callback))
        })
    }

    /// Snapshot of the configuration in effect.
    #[must_use]
    pub fn effective_configuration(&self) -> &MenuConfiguration {
        &self.effective
    }
}

fn snapshot_login_menu(login_menu: &LoginMenuDefinition) -> LoginMenuDefinition {
    LoginMenuDefinition {
        menus: login_menu
            .menus
            .iter()
            .map(|menu| BusinessMenuDefinition {
                items: menu.sorted_items(),
                ..menu.clone()
            })
            .collect(),
        menu: login_menu.normalized_menu(),
        settings_menu: login_menu.normalized_settings_menu(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TREE: &str = r#"{
      "version": 2,
      "generatedAt": "2025-03-01T10:00:00Z",
      "menus": [
        {"id": "home", "items": [
          {"order": 2, "label": "Bills", "function": "latest-bill", "callbackData": "BILLS"},
          {"order": 1, "label": "Tickets", "function": "trouble-tickets"},
          {"order": 2, "label": "More", "submenuId": "more"}
        ]},
        {"id": "more", "name": "More options", "parentId": "home", "items": [
          {"order": 1, "label": "Services", "function": "services", "context": "account"}
        ]},
        {"name": "no id", "items": []}
      ],
      "loginMenu": {"menu": [
        {"order": 1, "label": "Login", "function": "digital_login", "callbackData": "LOGIN"}
      ]}
    }"#;

    fn catalog() -> MenuCatalog {
        let config = MenuConfiguration::parse(TREE).expect("parse");
        MenuCatalog::from_configuration(&config).expect("catalog")
    }

    fn labels(items: &[BusinessMenuItem]) -> Vec<&str> {
        items.iter().filter_map(|i| i.label.as_deref()).collect()
    }

    #[test]
    fn items_are_sorted_stably() {
        let catalog = catalog();
        assert_eq!(labels(catalog.menu_items("home")), vec!["Tickets", "Bills", "More"]);
    }

    #[test]
    fn unknown_menu_falls_back_to_root() {
        let catalog = catalog();
        assert_eq!(catalog.menu_items("nope"), catalog.menu_items("home"));
        assert!(!catalog.menu_exists("nope"));
        assert!(catalog.menu_exists("MORE"));
    }

    #[test]
    fn menus_without_id_are_skipped_and_names_resolved() {
        let catalog = catalog();
        let names: Vec<_> = catalog.menus().filter_map(|m| m.name.as_deref()).collect();
        assert_eq!(names, vec!["Home", "More options"]);
    }

    #[test]
    fn callback_lookup_prefers_callback_data_then_function() {
        let catalog = catalog();
        let bills = catalog.find_item_by_callback("bills").expect("bills");
        assert_eq!(bills.function.as_deref(), Some("latest-bill"));

        let services = catalog.find_item_by_callback("SERVICES").expect("services");
        assert!(services.requires_account_context());

        assert!(catalog.find_item_by_callback("  ").is_none());
        assert!(catalog.find_item_by_callback("missing").is_none());
    }

    #[test]
    fn login_lookups() {
        let catalog = catalog();
        assert_eq!(catalog.login_menu_items().len(), 1);
        assert!(catalog.login_settings_items().is_empty());
        let login = catalog.find_login_item_by_callback("login").expect("login");
        assert_eq!(login.function.as_deref(), Some("DIGITAL_LOGIN"));
    }

    #[test]
    fn effective_configuration_snapshot() {
        let catalog = catalog();
        let effective = catalog.effective_configuration();
        assert_eq!(effective.version, 2);
        assert_eq!(effective.generated_at.as_deref(), Some("2025-03-01T10:00:00Z"));
        assert_eq!(effective.menus.len(), 2);
        let login = effective.login_menu.as_ref().expect("login menu");
        assert_eq!(login.menu.len(), 1);
    }

    #[test]
    fn missing_root_is_fatal() {
        let config = MenuConfiguration {
            menus: vec![BusinessMenuDefinition::new("billing")],
            ..MenuConfiguration::default()
        };
        let err = MenuCatalog::from_configuration(&config).expect_err("no root");
        assert!(err.to_string().contains("root menu"));
    }

    #[test]
    fn empty_configuration_is_fatal() {
        assert!(MenuCatalog::from_configuration(&MenuConfiguration::default()).is_err());
        assert!(MenuCatalog::load_from(&SourceChain::new()).is_err());
    }

    #[test]
    fn override_file_wins_and_login_menu_falls_through() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join(MenuCatalog::OVERRIDE_FILE),
            r#"{"menu": [{"order": 1, "label": "Override", "function": "x"}]}"#,
        )
        .expect("write");
        std::fs::write(dir.path().join(MenuCatalog::DEFAULT_FILE), TREE).expect("write");

        let catalog = MenuCatalog::load(dir.path()).expect("load");
        assert_eq!(labels(catalog.menu_items("home")), vec!["Override"]);
        assert_eq!(catalog.login_menu_items().len(), 1);
    }

    #[test]
    fn packaged_default_loads() {
        let dir = tempfile::tempdir().expect("tempdir");
        let catalog = MenuCatalog::load(dir.path()).expect("load");
        assert!(!catalog.menu_items("home").is_empty());
        assert!(!catalog.login_menu_items().is_empty());
    }
}
