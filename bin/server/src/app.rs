//! Application state and router.

use crate::config::ServerConfig;
use crate::error::StartupError;
use crate::routes;
use axum::Router;
use axum::routing::{get, post, put};
use rootcause::prelude::Report;
use selfservice_catalog::{ApiRegistry, ServiceCatalog};
use selfservice_conversation::{InMemorySessionStore, SessionStore};
use selfservice_core::PlaceholderResolver;
use selfservice_engine::ServiceFunctionExecutor;
use selfservice_integration::HttpApiClient;
use selfservice_menu::MenuCatalog;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application state.
pub struct AppState {
    /// Service-function executor with the API registry and service catalog.
    pub executor: ServiceFunctionExecutor,
    /// Business and login menus.
    pub menus: MenuCatalog,
    /// Per-chat session state.
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        executor: ServiceFunctionExecutor,
        menus: MenuCatalog,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            executor,
            menus,
            sessions,
        }
    }

    /// Loads catalogs from the configured directory and wires the
    /// production collaborators.
    ///
    /// Missing API or service files are tolerated; an unusable menu
    /// configuration is not.
    ///
    /// # Errors
    ///
    /// Returns an error if no root menu can be loaded or the HTTP client
    /// cannot be built.
    pub fn from_config(config: &ServerConfig) -> Result<Self, Report<StartupError>> {
        let apis = ApiRegistry::load(&config.config_dir);
        let services = ServiceCatalog::load(&config.config_dir);
        let menus = MenuCatalog::load(&config.config_dir).map_err(|e| StartupError::Menus {
            reason: e.to_string(),
        })?;
        info!(
            apis = apis.len(),
            services = services.len(),
            menus = menus.menus().count(),
            config_dir = %config.config_dir.display(),
            "catalogs loaded"
        );

        let client = HttpApiClient::new(&config.http.client_config()).map_err(|e| {
            StartupError::HttpClient {
                reason: e.to_string(),
            }
        })?;
        let executor = ServiceFunctionExecutor::new(Arc::new(apis), Arc::new(services), Arc::new(client))
            .with_resolver(PlaceholderResolver::new(config.properties.clone()))
            .with_context_trace(config.context_trace);
        let sessions =
            InMemorySessionStore::new().with_token_skew(config.session.token_skew());

        Ok(Self::new(executor, menus, Arc::new(sessions)))
    }
}

/// Builds the HTTP router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/admin/apis", get(routes::api_registry))
        .route("/admin/services", get(routes::service_catalog))
        .route("/admin/menu-configuration", get(routes::menu_configuration))
        .route("/menus/{menu_id}", get(routes::menu))
        .route("/login-menu", get(routes::login_menu))
        .route("/sessions/{key}/token", put(routes::store_token))
        .route("/sessions/{key}/account", put(routes::select_account))
        .route("/sessions/{key}/service", put(routes::select_service))
        .route("/sessions/{key}/context", get(routes::session_context))
        .route(
            "/sessions/{key}/callbacks/{callback_id}",
            post(routes::run_callback),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
