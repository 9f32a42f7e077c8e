//! Identity registration handler
//!
//! Mounted behind `nip98_admin_middleware`: the `Authorization` event must
//! come from an admin. The body is a second signed event naming the new
//! identity in its first two tags: `["username", u]`, `["domain", d]`.

use std::sync::Arc;

use axum::{Extension, Json, body::Bytes, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{error, info, warn};
use validator::Validate;

use super::super::state::AppState;
use super::super::types::{ApiResponse, RegisterResultMessage, error_codes};
use crate::nip98::{AuthenticatedPubkey, BindingMode};
use crate::nostr::{SignedEvent, verify_event};
use crate::registry::{InsertError, NewIdentity};

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]+$").expect("username pattern is valid"));

/// Username/domain pair carried by the registration event.
#[derive(Debug, Clone, Validate)]
pub struct RegistrationRequest {
    #[validate(length(min = 3, max = 50), regex(path = *USERNAME_RE))]
    pub username: String,
    pub domain: String,
}

/// Which tag was missing or malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagError {
    Username,
    Domain,
}

impl TagError {
    fn message(self) -> &'static str {
        match self {
            Self::Username => "Malformed or non-existent username tag",
            Self::Domain => "Malformed or non-existent domain tag",
        }
    }
}

impl RegistrationRequest {
    /// Read `tags[0] = ["username", u]` and `tags[1] = ["domain", d]`.
    pub fn from_event(event: &SignedEvent) -> Result<Self, TagError> {
        let username = positional_tag(event, 0, "username").ok_or(TagError::Username)?;
        let domain = positional_tag(event, 1, "domain").ok_or(TagError::Domain)?;
        Ok(Self {
            username: username.to_string(),
            domain: domain.to_string(),
        })
    }
}

fn positional_tag<'a>(event: &'a SignedEvent, index: usize, name: &str) -> Option<&'a str> {
    match event.tags.get(index)?.as_slice() {
        [key, value, ..] if key == name => Some(value.as_str()),
        _ => None,
    }
}

type RegisterReply = (StatusCode, Json<RegisterResultMessage>);

fn rejected(status: StatusCode, message: &str, username: &str, domain: &str) -> RegisterReply {
    (
        status,
        Json(RegisterResultMessage {
            status: "error".to_string(),
            message: message.to_string(),
            username: username.to_string(),
            pubkey: String::new(),
            domain: domain.to_string(),
        }),
    )
}

fn internal_error(e: anyhow::Error) -> (StatusCode, Json<ApiResponse<()>>) {
    error!(error = %e, "Registry operation failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error(
            error_codes::INTERNAL_ERROR,
            "Internal server error",
        )),
    )
}

/// Register a new `username@domain` identity
///
/// Requires a NIP-98 `Authorization` header signed by an admin. The
/// module switch is checked by `register_module_gate` before that.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = SignedEvent,
    responses(
        (status = 200, description = "Identity registered", body = RegisterResultMessage),
        (status = 400, description = "Missing tags, invalid event or module disabled", body = RegisterResultMessage),
        (status = 401, description = "Missing or invalid Authorization event", body = crate::nip98::AuthErrorResponse),
        (status = 403, description = "Authorization pubkey is not an admin", body = crate::nip98::AuthErrorResponse),
        (status = 406, description = "Domain not accepted or identity already registered", body = RegisterResultMessage),
        (status = 413, description = "Body over gateway.max_body_bytes", body = crate::nip98::AuthErrorResponse),
        (status = 422, description = "Username not allowed", body = RegisterResultMessage),
        (status = 500, description = "Registry unavailable")
    ),
    security(("nostr_auth" = [])),
    tag = "Register"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedPubkey(admin)): Extension<AuthenticatedPubkey>,
    body: Bytes,
) -> Result<RegisterReply, (StatusCode, Json<ApiResponse<()>>)> {
    // Step 1: Parse body event
    let event = match SignedEvent::from_json(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "RES -> 400 Bad request - malformed registration event");
            return Ok(rejected(StatusCode::BAD_REQUEST, "Malformed event", "", ""));
        }
    };

    // Step 2: Username and domain tags
    let request = match RegistrationRequest::from_event(&event) {
        Ok(request) => request,
        Err(tag) => {
            warn!(?tag, "RES -> 400 Bad request - missing registration tag");
            return Ok(rejected(StatusCode::BAD_REQUEST, tag.message(), "", ""));
        }
    };

    // Step 3: Domain
    let accepted = if state.mode == BindingMode::Development {
        warn!(domain = %request.domain, "DEVMODE: accepting registration for any domain");
        true
    } else {
        state
            .registry
            .is_domain_accepted(&request.domain)
            .await
            .map_err(internal_error)?
    };
    if !accepted {
        warn!(domain = %request.domain, "RES -> 406 Bad request - domain not accepted");
        return Ok(rejected(StatusCode::NOT_ACCEPTABLE, "Domain not accepted", "", ""));
    }

    // Step 4: Event integrity
    let outcome = verify_event(&event);
    if !outcome.is_valid() {
        warn!(id = %event.id, %outcome, "RES -> 400 Bad request - registration event invalid");
        return Ok(rejected(
            StatusCode::BAD_REQUEST,
            outcome.description(),
            "",
            "",
        ));
    }

    // Step 5: Username rules
    if let Err(e) = request.validate() {
        warn!(username = %request.username, errors = %e, "RES -> 422 Username not allowed");
        return Ok(rejected(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Username not allowed",
            &request.username,
            &request.domain,
        ));
    }

    // Step 6: Uniqueness
    let taken = state
        .registry
        .is_taken(&request.username, &request.domain, &event.pubkey)
        .await
        .map_err(internal_error)?;
    if taken {
        warn!(username = %request.username, "RES -> 406 Username or pubkey already registered");
        return Ok(rejected(
            StatusCode::NOT_ACCEPTABLE,
            "Username or pubkey already registered",
            &request.username,
            &request.domain,
        ));
    }

    // Step 7: Insert
    let created_at = DateTime::<Utc>::from_timestamp(event.created_at, 0).unwrap_or_else(Utc::now);
    let identity = NewIdentity::new(
        event.pubkey.as_str(),
        request.username.as_str(),
        request.domain.as_str(),
        created_at,
    )
    .map_err(|e| internal_error(e.into()))?;
    let npub = identity.npub.clone();
    match state.registry.insert(identity).await {
        Ok(()) => {}
        Err(InsertError::AlreadyRegistered) => {
            // Lost a race with a concurrent registration
            warn!(username = %request.username, "RES -> 406 Username already registered");
            return Ok(rejected(
                StatusCode::NOT_ACCEPTABLE,
                "Username already registered",
                &request.username,
                &request.domain,
            ));
        }
        Err(InsertError::Storage(e)) => return Err(internal_error(e)),
    }

    info!(
        username = %request.username,
        hex = %event.pubkey,
        %npub,
        domain = %request.domain,
        admin = %admin,
        "Registered"
    );
    Ok((
        StatusCode::OK,
        Json(RegisterResultMessage {
            status: "success".to_string(),
            message: "New user registered successfully".to_string(),
            username: request.username,
            pubkey: event.pubkey,
            domain: request.domain,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModulesConfig;
    use crate::nip98::{HttpAuthBindingValidator, Nip98State, PrivilegeLookup, StaticPrivileges};
    use crate::nostr::signature::{generate_keypair, sign_digest};
    use crate::registry::IdentityRegistry;
    use async_trait::async_trait;

    /// Accepts every domain and name, then fails on insert.
    struct InsertFails(fn() -> InsertError);

    #[async_trait]
    impl PrivilegeLookup for InsertFails {
        async fn is_privileged(&self, _pubkey_hex: &str) -> anyhow::Result<bool> {
            Ok(true)
        }
    }

    #[async_trait]
    impl IdentityRegistry for InsertFails {
        async fn is_domain_accepted(&self, _domain: &str) -> anyhow::Result<bool> {
            Ok(true)
        }

        async fn is_taken(&self, _username: &str, _domain: &str, _hex: &str) -> anyhow::Result<bool> {
            Ok(false)
        }

        async fn insert(&self, _identity: NewIdentity) -> Result<(), InsertError> {
            Err((self.0)())
        }
    }

    fn state_with(registry: InsertFails) -> Arc<AppState> {
        let validator = HttpAuthBindingValidator::new(Arc::new(StaticPrivileges::default()));
        Arc::new(AppState::new(
            Arc::new(registry),
            Arc::new(Nip98State::new(Arc::new(validator))),
            ModulesConfig::default(),
            BindingMode::Production,
        ))
    }

    fn registration_body() -> Bytes {
        let (secret, pubkey) = generate_keypair();
        let mut event = SignedEvent {
            id: String::new(),
            pubkey,
            created_at: Utc::now().timestamp(),
            kind: 1,
            tags: vec![
                vec!["username".into(), "alice".into()],
                vec!["domain".into(), "a.com".into()],
            ],
            content: String::new(),
            sig: String::new(),
        };
        let digest = event.compute_id().unwrap();
        event.id = hex::encode(digest);
        event.sig = sign_digest(&secret, &digest);
        Bytes::from(serde_json::to_vec(&event).unwrap())
    }

    async fn call(registry: InsertFails) -> StatusCode {
        let admin = Extension(AuthenticatedPubkey("admin".to_string()));
        match register(State(state_with(registry)), admin, registration_body()).await {
            Ok((status, _)) => status,
            Err((status, _)) => status,
        }
    }

    #[tokio::test]
    async fn test_storage_failure_is_internal_error() {
        let status = call(InsertFails(|| {
            InsertError::Storage(anyhow::anyhow!("connection reset"))
        }))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_insert_conflict_is_not_acceptable() {
        let status = call(InsertFails(|| InsertError::AlreadyRegistered)).await;
        assert_eq!(status, StatusCode::NOT_ACCEPTABLE);
    }

    fn event_with_tags(tags: Vec<Vec<&str>>) -> SignedEvent {
        SignedEvent {
            id: String::new(),
            pubkey: String::new(),
            created_at: 0,
            kind: 1,
            tags: tags
                .into_iter()
                .map(|t| t.into_iter().map(String::from).collect())
                .collect(),
            content: String::new(),
            sig: String::new(),
        }
    }

    #[test]
    fn test_tags_read_by_position() {
        let event = event_with_tags(vec![vec!["username", "alice"], vec!["domain", "a.com"]]);
        let request = RegistrationRequest::from_event(&event).unwrap();
        assert_eq!(request.username, "alice");
        assert_eq!(request.domain, "a.com");
    }

    #[test]
    fn test_missing_tags() {
        let swapped = event_with_tags(vec![vec!["domain", "a.com"], vec!["username", "alice"]]);
        assert_eq!(
            RegistrationRequest::from_event(&swapped).unwrap_err(),
            TagError::Username
        );

        let no_domain = event_with_tags(vec![vec!["username", "alice"]]);
        assert_eq!(
            RegistrationRequest::from_event(&no_domain).unwrap_err(),
            TagError::Domain
        );

        let empty_value = event_with_tags(vec![vec!["username"], vec!["domain", "a.com"]]);
        assert_eq!(
            RegistrationRequest::from_event(&empty_value).unwrap_err(),
            TagError::Username
        );
    }

    #[test]
    fn test_username_rules() {
        let ok = |username: &str| {
            RegistrationRequest {
                username: username.to_string(),
                domain: "a.com".to_string(),
            }
            .validate()
            .is_ok()
        };
        assert!(ok("alice"));
        assert!(ok("Bob42"));
        assert!(ok(&"a".repeat(50)));
        assert!(!ok("ab"));
        assert!(!ok(&"a".repeat(51)));
        assert!(!ok("al ice"));
        assert!(!ok("alice!"));
        assert!(!ok("ålice"));
    }
}
