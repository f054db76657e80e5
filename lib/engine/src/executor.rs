//! Service-function orchestration.

use crate::query;
use crate::render::{self, Rendered, ResponseBody};
use crate::result::{ExecutionResult, ResponseMode};
use crate::trace;
use selfservice_catalog::{ApiRegistry, ResponseTemplate, ServiceCatalog, ServiceDefinition};
use selfservice_core::{
    AccountContext, ObjectContextUpdate, PlaceholderResolver, SelectionContext, ServiceContext,
};
use selfservice_integration::{ApiClient, ApiRequest, ApiResponse};
use selfservice_menu::ContextDirectives;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

const MISSING_API: &str = "Service is not available: missing API definition.";
const EMPTY_RESPONSE: &str = "Service call succeeded but returned an empty response.";
const RECORDED: &str = "Service response recorded in logs.";

/// Everything one execution needs from the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionRequest<'a> {
    /// Callback id; matched against service names by slug.
    pub callback_id: &'a str,
    pub access_token: Option<&'a str>,
    pub account: Option<&'a AccountContext>,
    pub service: Option<&'a ServiceContext>,
    pub object_context: Option<&'a str>,
    /// Directives of the menu item that triggered the callback.
    pub directives: Option<&'a ContextDirectives>,
}

impl<'a> ExecutionRequest<'a> {
    #[must_use]
    pub fn new(callback_id: &'a str) -> Self {
        Self {
            callback_id,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_access_token(mut self, token: Option<&'a str>) -> Self {
        self.access_token = token;
        self
    }

    #[must_use]
    pub fn with_account(mut self, account: Option<&'a AccountContext>) -> Self {
        self.account = account;
        self
    }

    #[must_use]
    pub fn with_service(mut self, service: Option<&'a ServiceContext>) -> Self {
        self.service = service;
        self
    }

    #[must_use]
    pub fn with_object_context(mut self, value: Option<&'a str>) -> Self {
        self.object_context = value;
        self
    }

    /// Takes all three tiers from a session's selection.
    #[must_use]
    pub fn with_selection(self, selection: &'a SelectionContext) -> Self {
        self.with_account(selection.account.as_ref())
            .with_service(selection.service.as_ref())
            .with_object_context(selection.object.as_deref())
    }

    #[must_use]
    pub fn with_directives(mut self, directives: Option<&'a ContextDirectives>) -> Self {
        self.directives = directives;
        self
    }

    /// The selected account id, if non-blank.
    #[must_use]
    pub fn account_id(&self) -> Option<&'a str> {
        non_blank(self.account.map(|account| account.id.as_str()))
    }

    /// The selected service id, if non-blank.
    #[must_use]
    pub fn service_id(&self) -> Option<&'a str> {
        non_blank(self.service.map(|service| service.id.as_str()))
    }

    /// The object context value, if non-blank.
    #[must_use]
    pub fn object_value(&self) -> Option<&'a str> {
        non_blank(self.object_context)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Runs declared service functions against the backend.
///
/// The executor is stateless between calls: catalogs are shared read-only
/// and every outcome, including the object-context change, is returned in
/// the [`ExecutionResult`].
#[derive(Clone)]
pub struct ServiceFunctionExecutor {
    apis: Arc<ApiRegistry>,
    services: Arc<ServiceCatalog>,
    client: Arc<dyn ApiClient>,
    resolver: PlaceholderResolver,
    context_trace: bool,
}

impl ServiceFunctionExecutor {
    /// Creates an executor that resolves placeholders from the process
    /// environment.
    #[must_use]
    pub fn new(
        apis: Arc<ApiRegistry>,
        services: Arc<ServiceCatalog>,
        client: Arc<dyn ApiClient>,
    ) -> Self {
        Self {
            apis,
            services,
            client,
            resolver: PlaceholderResolver::new(HashMap::new()),
            context_trace: false,
        }
    }

    /// Sets the placeholder resolver for URLs and static parameters.
    #[must_use]
    pub fn with_resolver(mut self, resolver: PlaceholderResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Logs the selection of every execution at info level.
    #[must_use]
    pub fn with_context_trace(mut self, enabled: bool) -> Self {
        self.context_trace = enabled;
        self
    }

    #[must_use]
    pub fn apis(&self) -> &ApiRegistry {
        &self.apis
    }

    #[must_use]
    pub fn services(&self) -> &ServiceCatalog {
        &self.services
    }

    /// Returns true if `callback_id` names a service this executor runs.
    #[must_use]
    pub fn handles(&self, callback_id: &str) -> bool {
        self.services
            .find_by_name(callback_id)
            .is_some_and(|definition| definition.response_template() != ResponseTemplate::Existing)
    }

    /// Executes the service function named by the request's callback id.
    ///
    /// Never fails: backend problems are reported as handled results with a
    /// user-facing message.
    #[instrument(skip_all, fields(callback = %request.callback_id))]
    pub async fn execute(&self, request: &ExecutionRequest<'_>) -> ExecutionResult {
        let Some(definition) = self.services.find_by_name(request.callback_id) else {
            debug!("no service definition for callback");
            return ExecutionResult::not_handled();
        };
        if definition.response_template() == ResponseTemplate::Existing {
            debug!(service = definition.name(), "service delegates to an existing handler");
            return ExecutionResult::not_handled();
        }
        if self.context_trace {
            trace::log_context(definition.name(), request);
        }

        let Some(api) = self.apis.find_by_name(definition.api_name()) else {
            warn!(
                service = definition.name(),
                api = definition.api_name(),
                "service references an unknown API"
            );
            return ExecutionResult::handled(MISSING_API).with_enablement(definition);
        };

        let url = self.resolver.resolve(api.url());
        let query = query::build(definition, &self.resolver, request);
        debug!(service = definition.name(), %url, ?query, "calling service API");
        let mut api_request = ApiRequest::get(url).with_query(query);
        if let Some(token) = request.access_token {
            api_request = api_request.with_bearer_token(token);
        }

        let response = self.client.execute(api_request).await;
        interpret(definition, request, &response).with_enablement(definition)
    }
}

/// Turns a backend response into a result.
fn interpret(
    definition: &ServiceDefinition,
    request: &ExecutionRequest<'_>,
    response: &ApiResponse,
) -> ExecutionResult {
    if !response.success {
        let error = if response.is_transport_failure() {
            response
                .error_message
                .clone()
                .unwrap_or_else(|| "no response".to_string())
        } else {
            format!("HTTP {}", response.status_code)
        };
        warn!(
            service = definition.name(),
            status = response.status_code,
            %error,
            "service call failed"
        );
        return ExecutionResult::handled(format!("Service call failed: {error}"));
    }

    let Some(raw) = response.body.as_deref().filter(|body| !body.trim().is_empty()) else {
        return ExecutionResult::handled(EMPTY_RESPONSE);
    };
    let body = ResponseBody::parse(raw, response.is_json());
    let object_context = object_context_update(definition, &body);

    let rendered = match definition.response_template() {
        ResponseTemplate::Json => {
            info!(
                service = definition.name(),
                body = %body.pretty(),
                "service response"
            );
            return ExecutionResult::handled(RECORDED)
                .with_mode(ResponseMode::Silent)
                .with_object_context(object_context);
        }
        ResponseTemplate::Card => render::render_card(
            &body,
            definition.outputs(),
            definition.object_context_output(),
        ),
        ResponseTemplate::Text => render::render_text(&body, definition.outputs()),
        ResponseTemplate::Existing => return ExecutionResult::not_handled(),
    };

    let Rendered {
        mode,
        message,
        choices,
        context_values,
    } = rendered;
    let mut result = ExecutionResult::handled(message)
        .with_mode(mode)
        .with_choices(choices, context_values)
        .with_object_context(object_context);
    if let Some(label) = request.directives.and_then(ContextDirectives::resolved_label) {
        result = result.with_message_prefix(&format!("{label} select: "));
    }
    result
}

/// Object-context change for a successful response.
fn object_context_update(definition: &ServiceDefinition, body: &ResponseBody) -> ObjectContextUpdate {
    let Some(field) = definition.object_context_output() else {
        return ObjectContextUpdate::Unchanged;
    };
    if body.item_count() != 1 {
        return ObjectContextUpdate::Clear;
    }
    body.single_item()
        .and_then(|item| crate::path::resolve(item, field.field()))
        .map(render::value_text)
        .filter(|value| !value.trim().is_empty())
        .map_or(ObjectContextUpdate::Clear, ObjectContextUpdate::Set)
}
