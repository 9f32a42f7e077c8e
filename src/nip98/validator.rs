//! NIP-98 request authentication.
//!
//! Flow, stopping at the first failure:
//! 1. Event integrity (id hash + schnorr signature)
//! 2. Binding rules: kind, freshness, url, method, payload
//! 3. Admin privilege (only when required)

use std::sync::Arc;
use tracing::{debug, error, warn};

use super::context::{BindingMode, Clock, RequestBindingContext, SystemClock};
use super::error::{AuthError, AuthErrorCode};
use super::privilege::PrivilegeLookup;
use super::result::{AuthResult, Rejection};
use super::rules::{BindingRule, RuleInput, default_rules, run_rules};
use crate::nostr::{SignedEvent, VerificationOutcome, verify_event};

/// Validates that a signed event is a credential for one concrete request.
pub struct HttpAuthBindingValidator {
    rules: Vec<Box<dyn BindingRule>>,
    clock: Arc<dyn Clock>,
    privileges: Arc<dyn PrivilegeLookup>,
    mode: BindingMode,
}

impl HttpAuthBindingValidator {
    /// Production-mode validator on the wall clock.
    pub fn new(privileges: Arc<dyn PrivilegeLookup>) -> Self {
        Self {
            rules: default_rules(),
            clock: Arc::new(SystemClock),
            privileges,
            mode: BindingMode::Production,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_mode(mut self, mode: BindingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> BindingMode {
        self.mode
    }

    /// Authenticate and return the verified pubkey.
    pub async fn authenticate(
        &self,
        event: &SignedEvent,
        request: &RequestBindingContext,
        require_privilege: bool,
    ) -> Result<String, Rejection> {
        let code = match verify_event(event) {
            VerificationOutcome::Valid => None,
            VerificationOutcome::HashMismatch => Some(AuthErrorCode::HashMismatch),
            VerificationOutcome::SignatureInvalid => Some(AuthErrorCode::SignatureInvalid),
            VerificationOutcome::Malformed => Some(AuthErrorCode::MalformedEvent),
        };
        if let Some(code) = code {
            warn!(code = code.name(), "Auth header event failed integrity check");
            return Err(AuthError::from_code(code).into());
        }

        let input = RuleInput {
            event,
            request,
            now: self.clock.now(),
            mode: self.mode,
        };
        run_rules(&self.rules, &input).map_err(|e| {
            warn!(code = e.code.name(), pubkey = %event.pubkey, "NIP-98 binding rejected");
            e
        })?;

        debug!(
            method = event.tag_value("method"),
            u = event.tag_value("u"),
            payload = event.tag_value("payload"),
            "NIP 98 data"
        );

        if require_privilege {
            self.check_privilege(&event.pubkey).await.map_err(|error| Rejection {
                error,
                pubkey: Some(event.pubkey.clone()),
            })?;
        }

        Ok(event.pubkey.clone())
    }

    async fn check_privilege(&self, pubkey: &str) -> Result<(), AuthError> {
        match self.privileges.is_privileged(pubkey).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                warn!(
                    code = AuthErrorCode::InsufficientPrivilege.name(),
                    pubkey,
                    "Pubkey does not have admin privileges"
                );
                Err(AuthError::from_code(AuthErrorCode::InsufficientPrivilege))
            }
            Err(e) => {
                error!(pubkey, error = %e, "Privilege lookup failed");
                Err(AuthError::from_code(AuthErrorCode::InsufficientPrivilege))
            }
        }
    }

    /// Same as [`Self::authenticate`], flattened into an [`AuthResult`].
    pub async fn validate(
        &self,
        event: &SignedEvent,
        request: &RequestBindingContext,
        require_privilege: bool,
    ) -> AuthResult {
        self.authenticate(event, request, require_privilege)
            .await
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nip98::context::FixedClock;
    use crate::nip98::privilege::StaticPrivileges;
    use crate::nostr::signature::{generate_keypair, sign_digest};
    use async_trait::async_trait;
    use axum::body::Bytes;

    const NOW: i64 = 1_700_000_000;
    const URL: &str = "https://host/api/v1/media";

    struct FailingLookup;

    #[async_trait]
    impl PrivilegeLookup for FailingLookup {
        async fn is_privileged(&self, _: &str) -> anyhow::Result<bool> {
            anyhow::bail!("connection refused")
        }
    }

    fn sign(secret: &[u8; 32], pubkey: &str, kind: u16, created_at: i64, tags: Vec<Vec<String>>) -> SignedEvent {
        let mut event = SignedEvent {
            id: String::new(),
            pubkey: pubkey.to_string(),
            created_at,
            kind,
            tags,
            content: String::new(),
            sig: String::new(),
        };
        let digest = event.compute_id().unwrap();
        event.id = hex::encode(digest);
        event.sig = sign_digest(secret, &digest);
        event
    }

    fn auth_tags() -> Vec<Vec<String>> {
        vec![
            vec!["u".into(), URL.into()],
            vec!["method".into(), "POST".into()],
        ]
    }

    fn validator(admins: &[&str]) -> HttpAuthBindingValidator {
        HttpAuthBindingValidator::new(Arc::new(StaticPrivileges::new(admins.iter().copied())))
            .with_clock(Arc::new(FixedClock(NOW)))
    }

    fn request() -> RequestBindingContext {
        RequestBindingContext::new("POST", URL, Bytes::new())
    }

    #[tokio::test]
    async fn test_valid_event_accepted() {
        let (secret, pubkey) = generate_keypair();
        let event = sign(&secret, &pubkey, 27235, NOW, auth_tags());
        let result = validator(&[]).validate(&event, &request(), false).await;
        assert!(result.is_success(), "{:?}", result);
        assert_eq!(result.authenticated_pubkey, pubkey);
    }

    #[tokio::test]
    async fn test_tampered_event_rejected_before_rules() {
        let (secret, pubkey) = generate_keypair();
        let mut event = sign(&secret, &pubkey, 27235, NOW, auth_tags());
        event.content = "changed".into();
        let err = validator(&[])
            .authenticate(&event, &request(), false)
            .await
            .unwrap_err();
        assert_eq!(err.error.code, AuthErrorCode::HashMismatch);
        assert_eq!(err.pubkey, None);
    }

    #[tokio::test]
    async fn test_privilege_required_and_missing() {
        let (secret, pubkey) = generate_keypair();
        let event = sign(&secret, &pubkey, 27235, NOW, auth_tags());
        let result = validator(&[]).validate(&event, &request(), true).await;
        assert!(!result.is_success());
        assert_eq!(result.message, "no admin privileges");
        assert!(result.requires_privilege_failed);
    }

    #[tokio::test]
    async fn test_privilege_required_and_present() {
        let (secret, pubkey) = generate_keypair();
        let event = sign(&secret, &pubkey, 27235, NOW, auth_tags());
        let result = validator(&[pubkey.as_str()])
            .validate(&event, &request(), true)
            .await;
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn test_lookup_failure_fails_closed() {
        let (secret, pubkey) = generate_keypair();
        let event = sign(&secret, &pubkey, 27235, NOW, auth_tags());
        let validator = HttpAuthBindingValidator::new(Arc::new(FailingLookup))
            .with_clock(Arc::new(FixedClock(NOW)));
        let result = validator.validate(&event, &request(), true).await;
        assert_eq!(result.message, "no admin privileges");
        assert!(result.requires_privilege_failed);
    }

    #[tokio::test]
    async fn test_lookup_not_consulted_when_not_required() {
        let (secret, pubkey) = generate_keypair();
        let event = sign(&secret, &pubkey, 27235, NOW, auth_tags());
        let validator = HttpAuthBindingValidator::new(Arc::new(FailingLookup))
            .with_clock(Arc::new(FixedClock(NOW)));
        assert!(validator.validate(&event, &request(), false).await.is_success());
    }

    #[tokio::test]
    async fn test_development_mode_relaxes_time_and_url() {
        let (secret, pubkey) = generate_keypair();
        let tags = vec![
            vec!["u".into(), "http://localhost:3000/api/v1/media".into()],
            vec!["method".into(), "POST".into()],
        ];
        let event = sign(&secret, &pubkey, 27235, NOW - 10_000, tags);

        let strict = validator(&[]).validate(&event, &request(), false).await;
        assert!(!strict.is_success());

        let dev = validator(&[])
            .with_mode(BindingMode::Development)
            .validate(&event, &request(), false)
            .await;
        assert!(dev.is_success(), "{:?}", dev);
    }

    #[tokio::test]
    async fn test_development_mode_still_checks_method_and_kind() {
        let (secret, pubkey) = generate_keypair();
        let tags = vec![vec!["method".into(), "GET".into()]];
        let event = sign(&secret, &pubkey, 27235, NOW, tags);
        let result = validator(&[])
            .with_mode(BindingMode::Development)
            .authenticate(&event, &request(), false)
            .await
            .unwrap_err();
        assert_eq!(result.error.code, AuthErrorCode::MethodMismatch);
    }
}
