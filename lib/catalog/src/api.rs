//! API registry: named backend endpoints.
//!
//! Document shape:
//!
//! ```yaml
//! apis:
//!   - API-name: Trouble Ticket
//!     API-URL: ${apiman.base-url}/tmf-api/troubleTicket/v4/troubleTicket
//! ```

use crate::error::CatalogError;
use crate::scalar;
use selfservice_core::{ConfigSource, SourceChain, slugify};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

const PACKAGED_APIS: &str = include_str!("../defaults/api-list.yml");

/// A named backend endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiDefinition {
    name: String,
    url: String,
}

impl ApiDefinition {
    /// Creates a definition; the name is slugified.
    ///
    /// # Errors
    ///
    /// Returns an error if the name slugifies to nothing or the URL is blank.
    pub fn new(name: &str, url: impl Into<String>) -> Result<Self, CatalogError> {
        let name = slugify(name);
        if name.is_empty() {
            return Err(CatalogError::MissingField {
                kind: "API definition",
                field: "API-name",
            });
        }
        let url = url.into().trim().to_string();
        if url.is_empty() {
            return Err(CatalogError::MissingField {
                kind: "API definition",
                field: "API-URL",
            });
        }
        Ok(Self { name, url })
    }

    /// The slugified API name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The templated URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Debug, Deserialize)]
struct ApiListDocument {
    #[serde(default)]
    apis: Option<Vec<serde_yaml::Value>>,
}

#[derive(Serialize)]
struct ApiListOut<'a> {
    apis: Vec<ApiEntryOut<'a>>,
}

#[derive(Serialize)]
struct ApiEntryOut<'a> {
    #[serde(rename = "API-name")]
    name: &'a str,
    #[serde(rename = "API-URL")]
    url: &'a str,
}

/// Read-only registry of API definitions.
#[derive(Debug, Clone, Default)]
pub struct ApiRegistry {
    apis: Vec<ApiDefinition>,
}

impl ApiRegistry {
    /// Local override file name.
    pub const LOCAL_FILE: &'static str = "API-list-local.yml";
    /// Default file name.
    pub const DEFAULT_FILE: &'static str = "API-list-default.yml";

    /// Creates a registry from definitions.
    #[must_use]
    pub fn new(apis: Vec<ApiDefinition>) -> Self {
        Self { apis }
    }

    /// The standard source chain for a configuration directory.
    #[must_use]
    pub fn source_chain(config_dir: &Path) -> SourceChain {
        SourceChain::standard(
            config_dir,
            Self::LOCAL_FILE,
            Self::DEFAULT_FILE,
            Some(ConfigSource::packaged("api-list.yml", PACKAGED_APIS)),
        )
    }

    /// Loads the registry from the standard chain under `config_dir`.
    #[must_use]
    pub fn load(config_dir: &Path) -> Self {
        Self::load_from(&Self::source_chain(config_dir))
    }

    /// Loads the registry from the first source with at least one API.
    ///
    /// No usable source yields an empty registry and a warning.
    #[must_use]
    pub fn load_from(chain: &SourceChain) -> Self {
        match chain.first_non_empty(Self::parse) {
            Some(loaded) => {
                info!(source = %loaded.source, apis = loaded.value.len(), "API registry loaded");
                Self::new(loaded.value)
            }
            None => {
                warn!("no API configuration found, API registry is empty");
                Self::default()
            }
        }
    }

    /// Parses an API list document. Entries missing a name or URL are
    /// dropped silently.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid YAML or not a mapping.
    pub fn parse(yaml: &str) -> Result<Vec<ApiDefinition>, CatalogError> {
        if yaml.trim().is_empty() {
            return Ok(Vec::new());
        }
        let document: ApiListDocument =
            serde_yaml::from_str(yaml).map_err(|e| CatalogError::InvalidDocument {
                reason: e.to_string(),
            })?;

        Ok(document
            .apis
            .unwrap_or_default()
            .iter()
            .filter_map(|entry| {
                let name = scalar::text(scalar::field(entry, "API-name"))?;
                let url = scalar::text(scalar::field(entry, "API-URL"))?;
                ApiDefinition::new(&name, url).ok()
            })
            .collect())
    }

    /// Returns all definitions in declaration order.
    #[must_use]
    pub fn apis(&self) -> &[ApiDefinition] {
        &self.apis
    }

    /// Finds an API by name, compared by slug. Blank names never match.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&ApiDefinition> {
        let slug = slugify(name);
        if slug.is_empty() {
            return None;
        }
        self.apis.iter().find(|api| api.name == slug)
    }

    /// Returns the number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.apis.len()
    }

    /// Returns true if the registry has no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.apis.is_empty()
    }

    /// Serializes the registry back into its document shape.
    ///
    /// # Errors
    ///
    /// Returns an error if YAML serialization fails.
    pub fn to_yaml(&self) -> Result<String, CatalogError> {
        let document = ApiListOut {
            apis: self
                .apis
                .iter()
                .map(|api| ApiEntryOut {
                    name: &api.name,
                    url: &api.url,
                })
                .collect(),
        };
        serde_yaml::to_string(&document).map_err(|e| CatalogError::SerializationFailed {
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"
apis:
  - API-name: Trouble Ticket
    API-URL: https://gw.example.com/troubleTicket
  - API-name: Product Inventory
    API-URL: ${apiman.base-url}/product
  - API-name: No Url
  - API-URL: https://gw.example.com/orphan
  - just a string
"#;

    #[test]
    fn parse_drops_incomplete_entries() {
        let apis = ApiRegistry::parse(DOCUMENT).expect("parse");
        assert_eq!(apis.len(), 2);
        assert_eq!(apis[0].name(), "trouble-ticket");
        assert_eq!(apis[1].url(), "${apiman.base-url}/product");
    }

    #[test]
    fn parse_without_apis_key_is_empty() {
        assert!(ApiRegistry::parse("other: 1").expect("parse").is_empty());
        assert!(ApiRegistry::parse("").expect("parse").is_empty());
    }

    #[test]
    fn parse_rejects_malformed_yaml() {
        assert!(ApiRegistry::parse("apis: [unterminated").is_err());
    }

    #[test]
    fn lookup_is_case_and_punctuation_insensitive() {
        let registry = ApiRegistry::new(ApiRegistry::parse(DOCUMENT).expect("parse"));
        assert!(registry.find_by_name("TROUBLE_TICKET").is_some());
        assert!(registry.find_by_name("product inventory").is_some());
        assert!(registry.find_by_name("customer-bill").is_none());
        assert!(registry.find_by_name("  ").is_none());
    }

    #[test]
    fn definition_requires_name_and_url() {
        assert!(ApiDefinition::new("!!!", "https://x").is_err());
        assert!(ApiDefinition::new("name", "  ").is_err());
    }

    #[test]
    fn local_file_overrides_packaged_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join(ApiRegistry::LOCAL_FILE),
            "apis:\n  - API-name: Local Only\n    API-URL: http://localhost/x\n",
        )
        .expect("write");

        let registry = ApiRegistry::load(dir.path());
        assert_eq!(registry.len(), 1);
        assert!(registry.find_by_name("local-only").is_some());
    }

    #[test]
    fn packaged_default_used_when_directory_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let registry = ApiRegistry::load(dir.path());
        assert!(!registry.is_empty());
        assert!(registry.find_by_name("trouble-ticket").is_some());
    }

    #[test]
    fn empty_chain_yields_empty_registry() {
        let registry = ApiRegistry::load_from(&SourceChain::new());
        assert!(registry.is_empty());
    }

    #[test]
    fn to_yaml_round_trips_through_parse() {
        let registry = ApiRegistry::new(ApiRegistry::parse(DOCUMENT).expect("parse"));
        let yaml = registry.to_yaml().expect("serialize");
        assert!(yaml.contains("API-name: trouble-ticket"));
        let reparsed = ApiRegistry::parse(&yaml).expect("reparse");
        assert_eq!(reparsed, registry.apis());
    }
}
