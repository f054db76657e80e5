//! Service catalog: operator-declared service functions.
//!
//! Each service binds a callback id to an API, a set of query parameters,
//! the session context fields to inject, a response template and the output
//! fields to extract from the response.

use crate::error::CatalogError;
use crate::scalar;
use indexmap::IndexMap;
use selfservice_core::{ConfigSource, SourceChain, slugify};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

const PACKAGED_SERVICES: &str = include_str!("../defaults/services.yml");

/// How a service response is presented to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseTemplate {
    /// Handled by a built-in flow; the executor declines it.
    Existing,
    /// Response is logged, nothing is shown.
    #[default]
    Json,
    /// Multi-item responses become a selection list.
    Card,
    /// Plain text rendering.
    Text,
}

impl ResponseTemplate {
    /// Parses a template label case-insensitively. Unknown or missing labels
    /// fall back to [`ResponseTemplate::Json`].
    #[must_use]
    pub fn from_label(label: Option<&str>) -> Self {
        let Some(label) = label.map(str::trim).filter(|l| !l.is_empty()) else {
            return Self::Json;
        };
        match label.to_ascii_uppercase().as_str() {
            "EXISTING" | "LEGACY" => Self::Existing,
            "CARD" => Self::Card,
            "TEXT" | "MESSAGE" => Self::Text,
            _ => Self::Json,
        }
    }

    /// Returns the canonical label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Existing => "EXISTING",
            Self::Json => "JSON",
            Self::Card => "CARD",
            Self::Text => "TEXT",
        }
    }
}

impl fmt::Display for ResponseTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field extracted from a service response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputField {
    field: String,
    label: String,
    object_context: bool,
}

impl OutputField {
    /// Creates an output field. A blank label defaults to the field path.
    #[must_use]
    pub fn new(field: impl Into<String>, label: Option<&str>) -> Self {
        let field = field.into().trim().to_string();
        let label = label
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map_or_else(|| field.clone(), str::to_string);
        Self {
            field,
            label,
            object_context: false,
        }
    }

    /// Marks this field as the source of the object context.
    #[must_use]
    pub fn with_object_context(mut self, object_context: bool) -> Self {
        self.object_context = object_context;
        self
    }

    /// The path expression.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The display label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether this field feeds the object context.
    #[must_use]
    pub fn is_object_context(&self) -> bool {
        self.object_context
    }
}

/// A declared service function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDefinition {
    name: String,
    api_name: String,
    query_parameters: IndexMap<String, String>,
    response_template: ResponseTemplate,
    account_context_field: Option<String>,
    service_context_field: Option<String>,
    object_context_field: Option<String>,
    outputs: Vec<OutputField>,
}

impl ServiceDefinition {
    /// Creates a definition; name and API name are slugified.
    ///
    /// # Errors
    ///
    /// Returns an error if either name slugifies to nothing.
    pub fn new(name: &str, api_name: &str) -> Result<Self, CatalogError> {
        let name = slugify(name);
        if name.is_empty() {
            return Err(CatalogError::MissingField {
                kind: "service definition",
                field: "Service Name",
            });
        }
        let api_name = slugify(api_name);
        if api_name.is_empty() {
            return Err(CatalogError::MissingField {
                kind: "service definition",
                field: "API-Name",
            });
        }
        Ok(Self {
            name,
            api_name,
            query_parameters: IndexMap::new(),
            response_template: ResponseTemplate::Json,
            account_context_field: None,
            service_context_field: None,
            object_context_field: None,
            outputs: Vec::new(),
        })
    }

    /// Adds a static query parameter. Insertion order is kept.
    #[must_use]
    pub fn with_query_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_parameters.insert(key.into(), value.into());
        self
    }

    /// Sets the response template.
    #[must_use]
    pub fn with_response_template(mut self, template: ResponseTemplate) -> Self {
        self.response_template = template;
        self
    }

    /// Sets the query key that receives the selected account id.
    #[must_use]
    pub fn with_account_context_field(mut self, field: impl Into<String>) -> Self {
        self.account_context_field = non_blank(field.into());
        self
    }

    /// Sets the query key that receives the selected service id.
    #[must_use]
    pub fn with_service_context_field(mut self, field: impl Into<String>) -> Self {
        self.service_context_field = non_blank(field.into());
        self
    }

    /// Sets the query key that receives the object context value.
    #[must_use]
    pub fn with_object_context_field(mut self, field: impl Into<String>) -> Self {
        self.object_context_field = non_blank(field.into());
        self
    }

    /// Sets the output fields. Only the first field flagged as object
    /// context keeps the flag.
    #[must_use]
    pub fn with_outputs(mut self, outputs: Vec<OutputField>) -> Self {
        let mut flagged = false;
        self.outputs = outputs
            .into_iter()
            .filter(|output| !output.field.is_empty())
            .map(|mut output| {
                if output.object_context {
                    output.object_context = !flagged;
                    flagged = true;
                }
                output
            })
            .collect();
        self
    }

    /// The slugified service name (callback id).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The slugified API name.
    #[must_use]
    pub fn api_name(&self) -> &str {
        &self.api_name
    }

    /// Static query parameters in declaration order.
    #[must_use]
    pub fn query_parameters(&self) -> &IndexMap<String, String> {
        &self.query_parameters
    }

    /// The response template.
    #[must_use]
    pub fn response_template(&self) -> ResponseTemplate {
        self.response_template
    }

    /// Query key for the account id, if declared.
    #[must_use]
    pub fn account_context_field(&self) -> Option<&str> {
        self.account_context_field.as_deref()
    }

    /// Query key for the service id, if declared.
    #[must_use]
    pub fn service_context_field(&self) -> Option<&str> {
        self.service_context_field.as_deref()
    }

    /// Query key for the object context, if declared.
    #[must_use]
    pub fn object_context_field(&self) -> Option<&str> {
        self.object_context_field.as_deref()
    }

    /// Output fields in declaration order.
    #[must_use]
    pub fn outputs(&self) -> &[OutputField] {
        &self.outputs
    }

    /// The output field flagged as object context, if any.
    #[must_use]
    pub fn object_context_output(&self) -> Option<&OutputField> {
        self.outputs.iter().find(|output| output.object_context)
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Debug, Deserialize)]
struct ServiceListDocument {
    #[serde(default)]
    services: Option<Vec<Value>>,
}

/// Read-only catalog of service definitions.
#[derive(Debug, Clone, Default)]
pub struct ServiceCatalog {
    services: Vec<ServiceDefinition>,
}

impl ServiceCatalog {
    /// Local override file name.
    pub const LOCAL_FILE: &'static str = "services-local.yml";
    /// Default file name.
    pub const DEFAULT_FILE: &'static str = "services-default.yml";

    /// Creates a catalog from definitions.
    #[must_use]
    pub fn new(services: Vec<ServiceDefinition>) -> Self {
        Self { services }
    }

    /// The standard source chain for a configuration directory.
    #[must_use]
    pub fn source_chain(config_dir: &Path) -> SourceChain {
        SourceChain::standard(
            config_dir,
            Self::LOCAL_FILE,
            Self::DEFAULT_FILE,
            Some(ConfigSource::packaged("services.yml", PACKAGED_SERVICES)),
        )
    }

    /// Loads the catalog from the standard chain under `config_dir`.
    #[must_use]
    pub fn load(config_dir: &Path) -> Self {
        Self::load_from(&Self::source_chain(config_dir))
    }

    /// Loads the catalog from the first source with at least one service.
    #[must_use]
    pub fn load_from(chain: &SourceChain) -> Self {
        match chain.first_non_empty(Self::parse) {
            Some(loaded) => {
                info!(source = %loaded.source, services = loaded.value.len(), "service catalog loaded");
                Self::new(loaded.value)
            }
            None => {
                warn!("no service configuration found, service catalog is empty");
                Self::default()
            }
        }
    }

    /// Parses a service list document. Entries without a service or API name
    /// are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Vec<ServiceDefinition>, CatalogError> {
        if yaml.trim().is_empty() {
            return Ok(Vec::new());
        }
        let document: ServiceListDocument =
            serde_yaml::from_str(yaml).map_err(|e| CatalogError::InvalidDocument {
                reason: e.to_string(),
            })?;

        Ok(document
            .services
            .unwrap_or_default()
            .iter()
            .filter_map(parse_service)
            .collect())
    }

    /// Returns all definitions in declaration order.
    #[must_use]
    pub fn services(&self) -> &[ServiceDefinition] {
        &self.services
    }

    /// Finds a service by callback id, compared by slug.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&ServiceDefinition> {
        let slug = slugify(name);
        if slug.is_empty() {
            return None;
        }
        self.services.iter().find(|service| service.name == slug)
    }

    /// Returns the number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Returns true if the catalog has no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Serializes the catalog back into its document shape.
    ///
    /// # Errors
    ///
    /// Returns an error if YAML serialization fails.
    pub fn to_yaml(&self) -> Result<String, CatalogError> {
        let document = ServiceListOut {
            services: self.services.iter().map(ServiceEntryOut::from).collect(),
        };
        serde_yaml::to_string(&document).map_err(|e| CatalogError::SerializationFailed {
            reason: e.to_string(),
        })
    }
}

fn parse_service(entry: &Value) -> Option<ServiceDefinition> {
    let name = scalar::text(scalar::field(entry, "Service Name"))?;
    let api_name = scalar::text(scalar::field(entry, "API-Name"))?;
    let mut service = ServiceDefinition::new(&name, &api_name).ok()?;

    if let Some(Value::Mapping(params)) = scalar::field(entry, "Query Parameters") {
        for (key, value) in params {
            let Some(key) = scalar::text(Some(key)) else {
                continue;
            };
            let value = scalar::text(Some(value)).unwrap_or_default();
            service = service.with_query_parameter(key, value);
        }
    }

    let template = scalar::text(scalar::field(entry, "Response Template"));
    service = service.with_response_template(ResponseTemplate::from_label(template.as_deref()));

    if let Some(field) = scalar::text(scalar::field(entry, "Account Context Field")) {
        service = service.with_account_context_field(field);
    }
    if let Some(field) = scalar::text(scalar::field(entry, "Service Context Field")) {
        service = service.with_service_context_field(field);
    }
    if let Some(field) = scalar::text(scalar::field(entry, "Object Context Field")) {
        service = service.with_object_context_field(field);
    }

    Some(service.with_outputs(parse_outputs(scalar::field(entry, "Output"))))
}

/// Accepts a list of maps, a list of strings, a comma-separated string, or a
/// single map.
fn parse_outputs(raw: Option<&Value>) -> Vec<OutputField> {
    match raw {
        Some(Value::String(list)) => list
            .split(',')
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .map(|path| OutputField::new(path, None))
            .collect(),
        Some(Value::Sequence(items)) => {
            if items.iter().any(Value::is_mapping) {
                items.iter().filter_map(output_from_mapping).collect()
            } else {
                items
                    .iter()
                    .filter_map(|item| scalar::text(Some(item)))
                    .map(|path| OutputField::new(path, None))
                    .collect()
            }
        }
        Some(map @ Value::Mapping(_)) => output_from_mapping(map).into_iter().collect(),
        _ => Vec::new(),
    }
}

fn output_from_mapping(entry: &Value) -> Option<OutputField> {
    let field = scalar::text(scalar::field(entry, "Field"))?;
    let label = scalar::text(scalar::field(entry, "Label"));
    let object_context = scalar::flag(scalar::field(entry, "Object Context"));
    Some(OutputField::new(field, label.as_deref()).with_object_context(object_context))
}

#[derive(Serialize)]
struct ServiceListOut<'a> {
    services: Vec<ServiceEntryOut<'a>>,
}

#[derive(Serialize)]
struct ServiceEntryOut<'a> {
    #[serde(rename = "Service Name")]
    name: &'a str,
    #[serde(rename = "API-Name")]
    api_name: &'a str,
    #[serde(rename = "Query Parameters")]
    query_parameters: &'a IndexMap<String, String>,
    #[serde(rename = "Account Context Field", skip_serializing_if = "Option::is_none")]
    account_context_field: Option<&'a str>,
    #[serde(rename = "Service Context Field", skip_serializing_if = "Option::is_none")]
    service_context_field: Option<&'a str>,
    #[serde(rename = "Object Context Field", skip_serializing_if = "Option::is_none")]
    object_context_field: Option<&'a str>,
    #[serde(rename = "Response Template")]
    response_template: &'static str,
    #[serde(rename = "Output")]
    outputs: Vec<OutputEntryOut<'a>>,
}

#[derive(Serialize)]
struct OutputEntryOut<'a> {
    #[serde(rename = "Field")]
    field: &'a str,
    #[serde(rename = "Label")]
    label: &'a str,
    #[serde(rename = "Object Context")]
    object_context: bool,
}

impl<'a> From<&'a ServiceDefinition> for ServiceEntryOut<'a> {
    fn from(service: &'a ServiceDefinition) -> Self {
        Self {
            name: &service.name,
            api_name: &service.api_name,
            query_parameters: &service.query_parameters,
            account_context_field: service.account_context_field(),
            service_context_field: service.service_context_field(),
            object_context_field: service.object_context_field(),
            response_template: service.response_template.as_str(),
            outputs: service
                .outputs
                .iter()
                .map(|output| OutputEntryOut {
                    field: &output.field,
                    label: &output.label,
                    object_context: output.object_context,
                })
                .collect(),
        }
    }
}
