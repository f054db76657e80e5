//! HTTP handlers.

use crate::app::AppState;
use crate::error::ApiError;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use chrono::TimeDelta;
use selfservice_conversation::{SessionError, SessionStore, TokenState};
use selfservice_core::{AccountContext, SelectionContext, ServiceContext};
use selfservice_engine::{ExecutionRequest, ExecutionResult};
use selfservice_menu::{BusinessMenuItem, LoginMenuItem, MenuConfiguration};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info};

const YAML_CONTENT_TYPE: &str = "application/yaml";

/// Items of one business menu.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuView {
    /// The menu actually shown; unknown ids fall back to the root menu.
    pub menu_id: String,
    pub items: Vec<BusinessMenuItem>,
}

/// The login menu and its settings menu.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginMenuView {
    pub items: Vec<LoginMenuItem>,
    pub settings_items: Vec<LoginMenuItem>,
}

/// Body of `PUT /sessions/{key}/token`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    pub access_token: String,
    pub expires_in_seconds: i64,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// The effective API registry as YAML.
pub async fn api_registry(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let yaml = state
        .executor
        .apis()
        .to_yaml()
        .map_err(|e| ApiError::Internal {
            reason: e.to_string(),
        })?;
    Ok(([(header::CONTENT_TYPE, YAML_CONTENT_TYPE)], yaml))
}

/// The effective service catalog as YAML.
pub async fn service_catalog(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let yaml = state
        .executor
        .services()
        .to_yaml()
        .map_err(|e| ApiError::Internal {
            reason: e.to_string(),
        })?;
    Ok(([(header::CONTENT_TYPE, YAML_CONTENT_TYPE)], yaml))
}

pub async fn menu_configuration(State(state): State<Arc<AppState>>) -> Json<MenuConfiguration> {
    Json(state.menus.effective_configuration().clone())
}

pub async fn menu(
    State(state): State<Arc<AppState>>,
    Path(menu_id): Path<String>,
) -> Json<MenuView> {
    let shown = match state.menus.menu(&menu_id).and_then(|menu| menu.menu_id()) {
        Some(id) => id.to_string(),
        None => {
            debug!(%menu_id, "unknown menu, showing root");
            state.menus.root_menu_id().to_string()
        }
    };
    Json(MenuView {
        menu_id: shown,
        items: state.menus.menu_items(&menu_id).to_vec(),
    })
}

pub async fn login_menu(State(state): State<Arc<AppState>>) -> Json<LoginMenuView> {
    Json(LoginMenuView {
        items: state.menus.login_menu_items(),
        settings_items: state.menus.login_settings_items(),
    })
}

pub async fn store_token(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(body): Json<TokenRequest>,
) -> Result<StatusCode, ApiError> {
    let expires_in =
        TimeDelta::try_seconds(body.expires_in_seconds).ok_or(SessionError::InvalidExpiry)?;
    state
        .sessions
        .store_token(&key, body.access_token, expires_in)
        .await?;
    info!(session = %key, "access token stored");
    Ok(StatusCode::NO_CONTENT)
}

/// Selects an account; a JSON `null` body clears it.
pub async fn select_account(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(account): Json<Option<AccountContext>>,
) -> Result<Json<SelectionContext>, ApiError> {
    state.sessions.select_account(&key, account).await?;
    Ok(Json(state.sessions.context(&key).await?))
}

/// Selects a service; a JSON `null` body clears it.
pub async fn select_service(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(service): Json<Option<ServiceContext>>,
) -> Result<Json<SelectionContext>, ApiError> {
    state.sessions.select_service(&key, service).await?;
    Ok(Json(state.sessions.context(&key).await?))
}

pub async fn session_context(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<SelectionContext>, ApiError> {
    Ok(Json(state.sessions.context(&key).await?))
}

/// Runs the service function behind a chat callback.
///
/// A callback matching a menu item's `callbackData` runs that item's
/// function with the item's context directives; anything else is taken as
/// a service name.
pub async fn run_callback(
    State(state): State<Arc<AppState>>,
    Path((key, callback_id)): Path<(String, String)>,
) -> Result<Json<ExecutionResult>, ApiError> {
    let item = state.menus.find_item_by_callback(&callback_id);
    let function = item
        .and_then(|item| item.function.as_deref())
        .map(str::trim)
        .filter(|function| !function.is_empty())
        .unwrap_or(callback_id.as_str());
    if !state.executor.handles(function) {
        return Err(ApiError::NotHandled { callback_id });
    }

    let token = state.sessions.token_snapshot(&key).await?;
    if token.state != TokenState::Valid {
        debug!(session = %key, state = ?token.state, "callback without a valid token");
        return Err(ApiError::Unauthorized);
    }

    let selection = state.sessions.context(&key).await?;
    let directives = item.map(BusinessMenuItem::context_directives);
    let request = ExecutionRequest::new(function)
        .with_access_token(token.token.as_deref())
        .with_selection(&selection)
        .with_directives(directives.as_ref());
    let result = state.executor.execute(&request).await;
    if !result.handled {
        return Err(ApiError::NotHandled { callback_id });
    }

    state.sessions.apply_update(&key, &result.object_context).await?;
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::router;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use selfservice_catalog::{
        ApiDefinition, ApiRegistry, OutputField, ResponseTemplate, ServiceCatalog,
        ServiceDefinition,
    };
    use selfservice_conversation::InMemorySessionStore;
    use selfservice_core::PlaceholderResolver;
    use selfservice_engine::ServiceFunctionExecutor;
    use selfservice_integration::{ApiClient, ApiRequest, ApiResponse};
    use selfservice_menu::MenuCatalog;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tower::ServiceExt;

    const MENUS: &str = r#"{
        "menus": [{
            "id": "home",
            "items": [
                {"order": 2, "label": "Bill", "function": "latest-bill"},
                {"order": 1, "label": "Tickets", "function": "trouble-tickets",
                 "callbackData": "MY_TICKETS",
                 "accountContextEnabled": true, "accountContextKey": "customer.id",
                 "accountContextLabel": "Account"}
            ]
        }],
        "loginMenu": {"menu": [{"order": 1, "label": "Login", "callbackData": "DIGITAL_LOGIN"}]}
    }"#;

    struct FakeBackend {
        response: ApiResponse,
        requests: Mutex<Vec<ApiRequest>>,
    }

    #[async_trait]
    impl ApiClient for FakeBackend {
        async fn execute(&self, request: ApiRequest) -> ApiResponse {
            self.requests.lock().expect("lock").push(request);
            self.response.clone()
        }
    }

    fn state(response: ApiResponse) -> (Arc<AppState>, Arc<FakeBackend>) {
        let backend = Arc::new(FakeBackend {
            response,
            requests: Mutex::default(),
        });
        let apis = ApiRegistry::new(vec![
            ApiDefinition::new("trouble-ticket", "${base}/troubleTicket").expect("api"),
        ]);
        let services = ServiceCatalog::new(vec![
            ServiceDefinition::new("trouble-tickets", "trouble-ticket")
                .expect("service")
                .with_response_template(ResponseTemplate::Card)
                .with_outputs(vec![
                    OutputField::new("id", Some("Ticket:")).with_object_context(true),
                ]),
        ]);
        let executor = ServiceFunctionExecutor::new(
            Arc::new(apis),
            Arc::new(services),
            backend.clone(),
        )
        .with_resolver(
            PlaceholderResolver::from_properties(HashMap::new())
                .with_property("base", "https://gw.example.com"),
        );
        let configuration = MenuConfiguration::parse(MENUS).expect("menus");
        let menus = MenuCatalog::from_configuration(&configuration).expect("catalog");
        let state = AppState::new(executor, menus, Arc::new(InMemorySessionStore::new()));
        (Arc::new(state), backend)
    }

    async fn send(state: &Arc<AppState>, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");
        let response = router(state.clone()).oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (state, _) = state(ApiResponse::received(200, ""));
        let (status, body) = send(&state, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn unknown_menu_shows_root_items_in_order() {
        let (state, _) = state(ApiResponse::received(200, ""));
        let (status, body) = send(&state, "GET", "/menus/nowhere", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["menuId"], "home");
        assert_eq!(body["items"][0]["label"], "Tickets");
        assert_eq!(body["items"][1]["label"], "Bill");
    }

    #[tokio::test]
    async fn login_menu_is_served() {
        let (state, _) = state(ApiResponse::received(200, ""));
        let (_, body) = send(&state, "GET", "/login-menu", None).await;
        assert_eq!(body["items"][0]["callbackData"], "DIGITAL_LOGIN");
    }

    #[tokio::test]
    async fn callback_requires_a_valid_token() {
        let (state, backend) = state(ApiResponse::received(200, ""));
        let (status, _) = send(&state, "POST", "/sessions/chat-1/callbacks/MY_TICKETS", None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(backend.requests.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn unknown_callback_is_not_found() {
        let (state, _) = state(ApiResponse::received(200, ""));
        let (status, body) = send(&state, "POST", "/sessions/chat-1/callbacks/nothing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().is_some_and(|e| e.contains("nothing")));
    }

    #[tokio::test]
    async fn callback_runs_item_function_and_stores_object_context() {
        let (state, backend) = state(ApiResponse::json(200, &json!([{"id": "T-1"}])));
        let token = json!({"accessToken": "tok", "expiresInSeconds": 3600});
        let (status, _) = send(&state, "PUT", "/sessions/chat-1/token", Some(token)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let account = json!({"id": "ACC-1", "name": "Home"});
        let (status, context) = send(&state, "PUT", "/sessions/chat-1/account", Some(account)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(context["account"]["id"], "ACC-1");

        let (status, result) =
            send(&state, "POST", "/sessions/chat-1/callbacks/my_tickets", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(result["handled"], true);
        assert_eq!(result["mode"], "TEXT");
        assert_eq!(result["message"], "Account select: Ticket: T-1");
        let calls = backend.requests.lock().expect("lock").clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].token(), Some("tok"));
        assert_eq!(calls[0].query.get("customer.id").map(String::as_str), Some("ACC-1"));

        let stored = state.sessions.object_context("chat-1").await.expect("context");
        assert_eq!(stored.as_deref(), Some("T-1"));
        let (_, context) = send(&state, "GET", "/sessions/chat-1/context", None).await;
        assert_eq!(context["object"], "T-1");
    }

    #[tokio::test]
    async fn out_of_range_token_lifetime_is_rejected() {
        let (state, _) = state(ApiResponse::received(200, ""));
        for seconds in [i64::MAX, 9_000_000_000_000, i64::MIN] {
            let token = json!({"accessToken": "tok", "expiresInSeconds": seconds});
            let (status, body) = send(&state, "PUT", "/sessions/chat-1/token", Some(token)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(body["error"].as_str().is_some_and(|e| e.contains("out of range")));
        }

        let account = json!({"id": "ACC-1"});
        let (status, _) = send(&state, "PUT", "/sessions/chat-2/account", Some(account)).await;
        assert_eq!(status, StatusCode::OK);
        let token = json!({"accessToken": "tok", "expiresInSeconds": 3600});
        let (status, _) = send(&state, "PUT", "/sessions/chat-2/token", Some(token)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn null_body_clears_selection() {
        let (state, _) = state(ApiResponse::received(200, ""));
        let service = json!({"id": "SRV-1"});
        send(&state, "PUT", "/sessions/chat-2/service", Some(service)).await;
        let (status, context) = send(&state, "PUT", "/sessions/chat-2/service", Some(Value::Null)).await;

        assert_eq!(status, StatusCode::OK);
        assert!(context["service"].is_null());
    }

    #[tokio::test]
    async fn admin_documents_are_served() {
        let (state, _) = state(ApiResponse::received(200, ""));
        let response = router(state.clone())
            .oneshot(Request::get("/admin/apis").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let yaml = String::from_utf8_lossy(&bytes);
        assert!(yaml.contains("${base}/troubleTicket"));

        let (status, body) = send(&state, "GET", "/admin/menu-configuration", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["menus"].is_array());
    }
}
