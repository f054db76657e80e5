use selfservice_server::app::{AppState, router};
use selfservice_server::config::ServerConfig;
use selfservice_server::error::StartupError;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid server configuration");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("Loaded configuration");

    let state = match AppState::from_config(&config) {
        Ok(state) => Arc::new(state),
        Err(report) => {
            tracing::error!(error = %report, "failed to initialise");
            return ExitCode::FAILURE;
        }
    };

    let listener = match tokio::net::TcpListener::bind(&config.bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            let error = StartupError::Bind {
                address: config.bind_address.clone(),
                reason: e.to_string(),
            };
            tracing::error!(%error, "failed to start");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("listening on http://{}", config.bind_address);

    if let Err(e) = axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
