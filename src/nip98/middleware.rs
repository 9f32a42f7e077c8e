//! NIP-98 authentication middleware for Axum.
//!
//! Buffers the body so the payload can be bound, runs the validator and
//! injects [`AuthenticatedPubkey`] into request extensions.

use axum::{
    body::{Body, to_bytes},
    extract::State,
    http::{Request, header::CONTENT_LENGTH},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

use super::{
    context::{RequestBindingContext, UrlPolicy},
    error::{AuthError, AuthErrorCode},
    header::{extract_auth_header, parse_authorization},
    validator::HttpAuthBindingValidator,
};

/// Default request body limit while authenticating (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Pubkey of the caller, set by the middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedPubkey(pub String);

/// Shared middleware state.
#[derive(Clone)]
pub struct Nip98State {
    pub validator: Arc<HttpAuthBindingValidator>,
    pub url_policy: UrlPolicy,
    pub max_body_bytes: usize,
}

impl Nip98State {
    pub fn new(validator: Arc<HttpAuthBindingValidator>) -> Self {
        Self {
            validator,
            url_policy: UrlPolicy::default(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Middleware for routes any valid NIP-98 caller may use.
pub async fn nip98_auth_middleware(
    State(state): State<Arc<Nip98State>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    authorize(&state, request, next, false).await
}

/// Middleware for admin-only routes.
pub async fn nip98_admin_middleware(
    State(state): State<Arc<Nip98State>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    authorize(&state, request, next, true).await
}

async fn authorize(
    state: &Nip98State,
    request: Request<Body>,
    next: Next,
    require_privilege: bool,
) -> Result<Response, AuthError> {
    // Step 1: Decode the event before touching the body
    let event = parse_authorization(extract_auth_header(request.headers())?)?;

    // Step 2: Buffer body and rebuild the binding context
    let declared = request
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if let Some(len) = declared {
        if len > state.max_body_bytes {
            warn!(len, limit = state.max_body_bytes, "PAYLOAD_TOO_LARGE: declared body over limit");
            return Err(AuthError::from_code(AuthErrorCode::PayloadTooLarge));
        }
    }
    let (mut parts, body) = request.into_parts();
    // Chunked bodies have no length up front; the limit trips while reading
    let raw_body = to_bytes(body, state.max_body_bytes).await.map_err(|e| {
        warn!(error = %e, limit = state.max_body_bytes, "PAYLOAD_TOO_LARGE: failed to buffer body");
        AuthError::from_code(AuthErrorCode::PayloadTooLarge)
    })?;
    let context = RequestBindingContext::from_parts(&parts, raw_body.clone(), &state.url_policy);

    // Step 3: Validate
    let pubkey = state
        .validator
        .authenticate(&event, &context, require_privilege)
        .await
        .map_err(|rejection| rejection.error)?;

    // Step 4: Inject and continue
    parts.extensions.insert(AuthenticatedPubkey(pubkey));
    let request = Request::from_parts(parts, Body::from(raw_body));
    Ok(next.run(request).await)
}
