//! Query parameter assembly.
//!
//! Parameters are built in layers, each able to overwrite the previous:
//!
//! 1. static parameters from the definition, placeholder-resolved
//! 2. blank account- or service-shaped keys filled from the selection
//! 3. the definition's account and service context fields
//! 4. the menu item's account and service directives
//! 5. the definition's object context field
//!
//! Insertion order of the static parameters is kept; forced keys that were
//! not declared are appended.

use crate::executor::ExecutionRequest;
use indexmap::IndexMap;
use selfservice_catalog::ServiceDefinition;
use selfservice_core::PlaceholderResolver;

/// Builds the query map for one call.
#[must_use]
pub fn build(
    definition: &ServiceDefinition,
    resolver: &PlaceholderResolver,
    request: &ExecutionRequest<'_>,
) -> IndexMap<String, String> {
    let account_id = request.account_id();
    let service_id = request.service_id();

    let mut query: IndexMap<String, String> = definition
        .query_parameters()
        .iter()
        .map(|(key, value)| (key.clone(), resolver.resolve(value)))
        .collect();

    for (key, value) in &mut query {
        if !value.trim().is_empty() {
            continue;
        }
        if let Some(id) = account_id.filter(|_| is_account_key(key)) {
            *value = id.to_string();
        } else if let Some(id) = service_id.filter(|_| is_service_key(key)) {
            *value = id.to_string();
        }
    }

    let mut force = |key: Option<&str>, value: Option<&str>| {
        if let (Some(key), Some(value)) = (key, value) {
            query.insert(key.to_string(), value.to_string());
        }
    };

    force(definition.account_context_field(), account_id);
    force(definition.service_context_field(), service_id);
    if let Some(directives) = request.directives {
        force(directives.account_key(), account_id);
        force(directives.service_key(), service_id);
    }
    force(definition.object_context_field(), request.object_value());

    query
}

/// Keys that conventionally carry a billing account id.
fn is_account_key(key: &str) -> bool {
    key.contains("billingAccount.id") || key.ends_with("accountId") || key.ends_with("account.id")
}

/// Keys that conventionally carry a product or service id.
fn is_service_key(key: &str) -> bool {
    key.contains("product.id") || key.ends_with("serviceId") || key.ends_with("productId")
}

#[cfg(test)]
mod tests {
    use super::*;
    use selfservice_core::{AccountContext, ServiceContext};
    use selfservice_menu::{ContextDirective, ContextDirectives};
    use std::collections::HashMap;

    fn resolver() -> PlaceholderResolver {
        PlaceholderResolver::from_properties(HashMap::new()).with_property("page.size", "20")
    }

    fn definition() -> ServiceDefinition {
        ServiceDefinition::new("tickets", "trouble-ticket").expect("definition")
    }

    fn pairs(query: &IndexMap<String, String>) -> Vec<(&str, &str)> {
        query.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
    }

    #[test]
    fn static_parameters_are_resolved_in_order() {
        let definition = definition()
            .with_query_parameter("status", "open")
            .with_query_parameter("limit", "${page.size}")
            .with_query_parameter("sort", "${sort.order:-creationDate}");
        let request = ExecutionRequest::new("tickets");

        let query = build(&definition, &resolver(), &request);

        assert_eq!(
            pairs(&query),
            vec![("status", "open"), ("limit", "20"), ("sort", "-creationDate")]
        );
    }

    #[test]
    fn blank_shaped_keys_take_selected_ids() {
        let definition = definition()
            .with_query_parameter("billingAccount.id", "")
            .with_query_parameter("relatedParty.accountId", " ")
            .with_query_parameter("product.id", "")
            .with_query_parameter("serviceId", "")
            .with_query_parameter("note", "");
        let account = AccountContext::new("ACC-1");
        let service = ServiceContext::new("SRV-9");
        let request = ExecutionRequest::new("tickets")
            .with_account(Some(&account))
            .with_service(Some(&service));

        let query = build(&definition, &resolver(), &request);

        assert_eq!(
            pairs(&query),
            vec![
                ("billingAccount.id", "ACC-1"),
                ("relatedParty.accountId", "ACC-1"),
                ("product.id", "SRV-9"),
                ("serviceId", "SRV-9"),
                ("note", ""),
            ]
        );
    }

    #[test]
    fn declared_context_fields_are_forced() {
        let definition = definition()
            .with_query_parameter("relatedParty.id", "placeholder")
            .with_account_context_field("relatedParty.id")
            .with_service_context_field("productId");
        let account = AccountContext::new("ACC-1");
        let service = ServiceContext::new("SRV-9");
        let request = ExecutionRequest::new("tickets")
            .with_account(Some(&account))
            .with_service(Some(&service));

        let query = build(&definition, &resolver(), &request);

        assert_eq!(
            pairs(&query),
            vec![("relatedParty.id", "ACC-1"), ("productId", "SRV-9")]
        );
    }

    #[test]
    fn missing_selection_leaves_fields_out() {
        let definition = definition()
            .with_account_context_field("relatedParty.id")
            .with_object_context_field("ticketId");
        let request = ExecutionRequest::new("tickets").with_object_context(Some("  "));

        let query = build(&definition, &resolver(), &request);

        assert!(query.is_empty());
    }

    #[test]
    fn directives_force_their_keys() {
        let directives = ContextDirectives {
            account: ContextDirective {
                enabled: true,
                key: Some("customerAccount".into()),
                label: None,
            },
            service: ContextDirective {
                enabled: false,
                key: Some("ignored".into()),
                label: None,
            },
            ..ContextDirectives::default()
        };
        let account = AccountContext::new("ACC-7");
        let service = ServiceContext::new("SRV-1");
        let request = ExecutionRequest::new("tickets")
            .with_account(Some(&account))
            .with_service(Some(&service))
            .with_directives(Some(&directives));

        let query = build(&definition(), &resolver(), &request);

        assert_eq!(pairs(&query), vec![("customerAccount", "ACC-7")]);
    }

    #[test]
    fn object_context_is_applied_last() {
        let definition = definition()
            .with_query_parameter("id", "${missing}")
            .with_object_context_field("id");
        let request = ExecutionRequest::new("tickets").with_object_context(Some("T-42"));

        let query = build(&definition, &resolver(), &request);

        assert_eq!(pairs(&query), vec![("id", "T-42")]);
    }
}
