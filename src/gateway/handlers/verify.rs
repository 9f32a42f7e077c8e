//! Event verification handler

use std::sync::Arc;

use axum::{Json, body::Bytes, extract::State, http::StatusCode};
use tracing::{debug, warn};

use super::super::state::AppState;
use super::super::types::{ApiResponse, VerifyResultMessage};
use super::module_disabled;
use crate::nostr::{SignedEvent, VerificationOutcome, verify_event};

/// Verify a Nostr event
///
/// Checks id and signature only; no binding to this request.
#[utoipa::path(
    post,
    path = "/api/v1/verify",
    request_body = SignedEvent,
    responses(
        (status = 200, description = "Valid event", body = VerifyResultMessage),
        (status = 400, description = "Invalid or malformed event, or module disabled", body = VerifyResultMessage)
    ),
    tag = "Verify"
)]
pub async fn verify(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<VerifyResultMessage>), (StatusCode, Json<ApiResponse<()>>)> {
    if !state.modules.verify {
        return Err(module_disabled("verify"));
    }

    let event = match SignedEvent::from_json(&body) {
        Ok(event) => event,
        Err(e) => {
            debug!(error = %e, "Verify body is not an event");
            return Ok(reply(String::new(), VerificationOutcome::Malformed));
        }
    };

    let outcome = verify_event(&event);
    if !outcome.is_valid() {
        warn!(id = %event.id, pubkey = %event.pubkey, %outcome, "Event verification failed");
    }
    Ok(reply(event.pubkey, outcome))
}

fn reply(pubkey: String, outcome: VerificationOutcome) -> (StatusCode, Json<VerifyResultMessage>) {
    let status = if outcome.is_valid() {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    (
        status,
        Json(VerifyResultMessage {
            pubkey,
            result: outcome.is_valid(),
            description: outcome.description().to_string(),
        }),
    )
}
