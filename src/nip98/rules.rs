//! Ordered NIP-98 binding rules.
//!
//! Each rule checks one property of an already self-consistent event against
//! the live request. [`default_rules`] returns them in evaluation order; the
//! validator stops at the first failure.

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::context::{BindingMode, RequestBindingContext};
use super::error::{AuthError, AuthErrorCode};
use crate::nostr::{SignedEvent, kinds};

/// Maximum age of an authorization event, in seconds.
pub const FRESHNESS_WINDOW_SECS: i64 = 60;

/// created_at substituted in development mode, relative to now.
pub const DEV_MODE_AGE_SECS: i64 = 30;

/// Everything a rule may look at.
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    pub event: &'a SignedEvent,
    pub request: &'a RequestBindingContext,
    pub now: i64,
    pub mode: BindingMode,
}

/// One step of the binding pipeline.
pub trait BindingRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn check(&self, input: &RuleInput<'_>) -> Result<(), AuthError>;
}

/// Event kind must be 27235.
#[derive(Debug, Clone, Copy, Default)]
pub struct KindRule;

impl BindingRule for KindRule {
    fn name(&self) -> &'static str {
        "kind"
    }

    fn check(&self, input: &RuleInput<'_>) -> Result<(), AuthError> {
        if input.event.kind != kinds::HTTP_AUTH {
            warn!(kind = input.event.kind, "Auth header event kind is not 27235");
            return Err(AuthError::from_code(AuthErrorCode::KindInvalid));
        }
        Ok(())
    }
}

/// created_at must not be older than the window. Future timestamps pass.
#[derive(Debug, Clone, Copy)]
pub struct FreshnessRule {
    pub window_secs: i64,
}

impl Default for FreshnessRule {
    fn default() -> Self {
        Self {
            window_secs: FRESHNESS_WINDOW_SECS,
        }
    }
}

impl BindingRule for FreshnessRule {
    fn name(&self) -> &'static str {
        "freshness"
    }

    fn check(&self, input: &RuleInput<'_>) -> Result<(), AuthError> {
        let created_at = match input.mode {
            BindingMode::Development => {
                warn!("DEVMODE: Setting created_at to now - {}", DEV_MODE_AGE_SECS);
                input.now - DEV_MODE_AGE_SECS
            }
            BindingMode::Production => input.event.created_at,
        };

        if input.now.saturating_sub(created_at) > self.window_secs {
            warn!(
                created_at,
                now = input.now,
                "Auth header event created_at is not within a reasonable time window"
            );
            return Err(AuthError::new(
                AuthErrorCode::StaleTimestamp,
                format!(
                    "event created_at is not within a reasonable time window {}<>{}",
                    created_at, input.now
                ),
            ));
        }
        Ok(())
    }
}

/// `u` tag must equal the reconstructed request URL byte for byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlRule;

impl BindingRule for UrlRule {
    fn name(&self) -> &'static str {
        "url"
    }

    fn check(&self, input: &RuleInput<'_>) -> Result<(), AuthError> {
        let server_url = input.request.full_url.as_str();
        let event_url = match input.mode {
            BindingMode::Development => {
                warn!("DEVMODE: Setting 'u'(url) tag same as the endpoint URL");
                Some(server_url)
            }
            BindingMode::Production => input.event.tag_value("u"),
        };

        match event_url {
            Some(url) if url == server_url => Ok(()),
            other => {
                let shown = other.unwrap_or("<missing>");
                warn!(event_url = shown, server_url, "Auth header event endpoint is not valid");
                Err(AuthError::new(
                    AuthErrorCode::UrlMismatch,
                    format!("event endpoint is not valid: {} <> {}", shown, server_url),
                ))
            }
        }
    }
}

/// `method` tag must equal the request method, case-sensitive.
#[derive(Debug, Clone, Copy, Default)]
pub struct MethodRule;

impl BindingRule for MethodRule {
    fn name(&self) -> &'static str {
        "method"
    }

    fn check(&self, input: &RuleInput<'_>) -> Result<(), AuthError> {
        let event_method = input.event.tag_value("method");
        if event_method != Some(input.request.method.as_str()) {
            warn!(
                event_method = event_method.unwrap_or("<missing>"),
                request_method = %input.request.method,
                "Auth header event method is not valid"
            );
            return Err(AuthError::from_code(AuthErrorCode::MethodMismatch));
        }
        Ok(())
    }
}

/// `payload` tag vs sha256 of the body.
///
/// A missing or mismatching payload is logged and never rejects the
/// request.
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadRule;

impl PayloadRule {
    pub fn body_digest(body: &[u8]) -> String {
        hex::encode(Sha256::digest(body))
    }
}

impl BindingRule for PayloadRule {
    fn name(&self) -> &'static str {
        "payload"
    }

    fn check(&self, input: &RuleInput<'_>) -> Result<(), AuthError> {
        let request = input.request;
        if request.is_no_body_method() || !request.has_body {
            return Ok(());
        }

        let received = Self::body_digest(&request.raw_body);
        match input.event.tag_value("payload") {
            None => {
                warn!(code = AuthErrorCode::PayloadMismatch.name(), "Auth header event payload not exist");
            }
            Some(declared) if declared != received => {
                warn!(
                    code = AuthErrorCode::PayloadMismatch.name(),
                    declared,
                    received = %received,
                    "Auth header event payload is not valid"
                );
            }
            Some(_) => debug!("Auth header event payload matches body"),
        }
        Ok(())
    }
}

/// Rules in evaluation order.
pub fn default_rules() -> Vec<Box<dyn BindingRule>> {
    vec![
        Box::new(KindRule),
        Box::new(FreshnessRule::default()),
        Box::new(UrlRule),
        Box::new(MethodRule),
        Box::new(PayloadRule),
    ]
}

/// Run rules in order, stopping at the first failure.
pub fn run_rules(rules: &[Box<dyn BindingRule>], input: &RuleInput<'_>) -> Result<(), AuthError> {
    for rule in rules {
        rule.check(input)?;
        debug!(rule = rule.name(), "passed");
    }
    Ok(())
}
