//! OpenAPI / Swagger UI documentation
//!
//! - Swagger UI: `http://localhost:3000/docs`
//! - OpenAPI JSON: `http://localhost:3000/api-docs/openapi.json`

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::gateway::handlers::HealthResponse;
use crate::gateway::types::{RegisterResultMessage, VerifyResultMessage};
use crate::nip98::AuthErrorResponse;
use crate::nostr::SignedEvent;

/// NIP-98 Nostr event authorization security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "nostr_auth",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "Authorization",
                    r#"NIP-98 HTTP auth: Nostr {base64(signed kind 27235 event)}

Required tags:
- ["u", absolute request URL]
- ["method", HTTP method]
- ["payload", sha256(body) hex] (when the request has a JSON body)

created_at must be within 60 seconds of server time."#,
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Nostr Gate API",
        version = "1.0.0",
        description = "Nostr event verification and NIP-98 authenticated identity registration."
    ),
    servers(
        (url = "http://localhost:3000", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::verify::verify,
        crate::gateway::handlers::register::register,
    ),
    components(
        schemas(
            HealthResponse,
            SignedEvent,
            VerifyResultMessage,
            RegisterResultMessage,
            AuthErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "System", description = "Health checks and system info"),
        (name = "Verify", description = "Event id and signature verification"),
        (name = "Register", description = "Identity registration (NIP-98 admin auth required)")
    )
)]
pub struct ApiDoc;
