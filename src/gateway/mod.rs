pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::GatewayConfig;
use crate::nip98::nip98_admin_middleware;
use state::AppState;

/// Build the gateway router.
pub fn build_router(state: Arc<AppState>) -> Router {
    // ==========================================================================
    // Admin routes (NIP-98, elevated privilege required)
    // ==========================================================================
    // Last layer runs first: module switch, then authentication.
    let admin_routes = Router::new()
        .route("/register", post(handlers::register))
        .layer(from_fn_with_state(
            state.nip98.clone(),
            nip98_admin_middleware,
        ))
        .layer(from_fn_with_state(
            state.clone(),
            handlers::register_module_gate,
        ));

    Router::new()
        .route("/api/v1/health", get(handlers::health_check))
        .route("/api/v1/verify", post(handlers::verify))
        .nest("/api/v1", admin_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Bind and serve until the process exits.
pub async fn run_server(config: &GatewayConfig, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        tracing::error!(
            "FATAL: Failed to bind to {}: {} (port {} may already be in use)",
            addr,
            e,
            config.port
        );
        e
    })?;

    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("API Docs: http://{}/docs", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
