//! `${...}` placeholder substitution for templated configuration values.
//!
//! API URLs and static query parameters may reference deployment-specific
//! values (`${apiman.base-url}/troubleTicket`). Resolution consults the
//! configured property map first, then the process environment. A
//! placeholder may carry a default after a colon: `${name:fallback}`.
//!
//! Resolution never fails: a placeholder that cannot be resolved is left in
//! the output as the original literal.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]*)\}").expect("placeholder pattern is valid"));

/// Resolves `${...}` placeholders against properties and the environment.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderResolver {
    properties: HashMap<String, String>,
    use_environment: bool,
}

impl PlaceholderResolver {
    /// Creates a resolver backed by the given properties and the process
    /// environment.
    #[must_use]
    pub fn new(properties: HashMap<String, String>) -> Self {
        Self {
            properties,
            use_environment: true,
        }
    }

    /// Creates a resolver that only consults the given properties.
    #[must_use]
    pub fn from_properties(properties: HashMap<String, String>) -> Self {
        Self {
            properties,
            use_environment: false,
        }
    }

    /// Adds or replaces a property.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Substitutes every resolvable placeholder in `value`.
    #[must_use]
    pub fn resolve(&self, value: &str) -> String {
        if !value.contains("${") {
            return value.to_string();
        }

        PLACEHOLDER
            .replace_all(value, |caps: &Captures<'_>| {
                let expression = &caps[1];
                let (name, default) = match expression.split_once(':') {
                    Some((name, default)) => (name.trim(), Some(default)),
                    None => (expression.trim(), None),
                };

                self.lookup(name)
                    .or_else(|| default.map(str::to_string))
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    fn lookup(&self, name: &str) -> Option<String> {
        if name.is_empty() {
            return None;
        }
        if let Some(value) = self.properties.get(name) {
            return Some(value.clone());
        }
        if !self.use_environment {
            return None;
        }
        std::env::var(name)
            .ok()
            .or_else(|| std::env::var(environment_key(name)).ok())
    }
}

/// Relaxed environment name for a dotted property (`apiman.base-url` →
/// `APIMAN_BASE_URL`).
fn environment_key(name: &str) -> String {
    name.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() {
                ch.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PlaceholderResolver {
        PlaceholderResolver::from_properties(HashMap::new())
            .with_property("apiman.base-url", "https://gw.example.com")
            .with_property("tenant", "acme")
    }

    #[test]
    fn resolves_known_properties() {
        let resolved = resolver().resolve("${apiman.base-url}/troubleTicket?tenant=${tenant}");
        assert_eq!(resolved, "https://gw.example.com/troubleTicket?tenant=acme");
    }

    #[test]
    fn uses_default_when_property_missing() {
        assert_eq!(resolver().resolve("${page.size:20}"), "20");
        assert_eq!(resolver().resolve("${empty.default:}"), "");
    }

    #[test]
    fn leaves_unresolvable_placeholders_literal() {
        assert_eq!(
            resolver().resolve("${unknown.host}/path"),
            "${unknown.host}/path"
        );
        assert_eq!(resolver().resolve("${}"), "${}");
    }

    #[test]
    fn values_without_placeholders_pass_through() {
        assert_eq!(resolver().resolve("plain value"), "plain value");
        assert_eq!(resolver().resolve("$notaplaceholder"), "$notaplaceholder");
    }

    #[test]
    fn environment_key_uppercases_and_replaces_separators() {
        assert_eq!(environment_key("apiman.base-url"), "APIMAN_BASE_URL");
    }
}
