//! Gateway HTTP handlers

pub mod health;
pub mod register;
pub mod verify;

use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use super::state::AppState;
use super::types::{ApiResponse, error_codes};

pub use health::{HealthResponse, health_check};
pub use register::{RegistrationRequest, register};
pub use verify::verify;

/// Response for a route whose module is switched off in config.
pub(crate) fn module_disabled(module: &str) -> (StatusCode, Json<ApiResponse<()>>) {
    warn!(module, "RES -> 400 Bad request - module is not enabled");
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error(
            error_codes::MODULE_DISABLED,
            "Module is not enabled",
        )),
    )
}

/// Short-circuits `/register` while the module is off.
///
/// Layered outside the NIP-98 middleware so it answers before any
/// `Authorization` header is looked at.
pub async fn register_module_gate(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !state.modules.register {
        return module_disabled("register").into_response();
    }
    next.run(request).await
}
