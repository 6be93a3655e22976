//! fluxredir resolver entry point
//!
//! Reads configuration from the environment, opens the correspondence store
//! pool, and serves the redirect router until Ctrl-C.

use std::sync::Arc;

use fluxredir_api::telemetry::{init_tracing, TelemetryConfig};
use fluxredir_api::{create_router, ApiConfig, ApiError, ApiResult, AppState, DbClient, DbConfig};

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::from_env()?;
    init_tracing(&telemetry_config)?;

    let api_config = ApiConfig::from_env()?;
    let db_config = DbConfig::from_env()?;
    let db = Arc::new(DbClient::from_config(&db_config)?);

    let state = AppState::new(db.clone(), &api_config);
    let app = create_router(state);

    let addr = api_config.bind_addr()?;
    tracing::info!(
        %addr,
        forum_url = %api_config.forum_url,
        schema = %db_config.schema.name(),
        "Starting fluxredir resolver"
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;

    db.close();
    tracing::info!("Resolver stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
