//! Per-request inputs to the binding check.

use axum::body::Bytes;
use axum::extract::OriginalUri;
use axum::http::{HeaderMap, Uri, header, request::Parts};
use std::time::{SystemTime, UNIX_EPOCH};

/// Methods that never carry a payload to bind.
pub const NO_BODY_METHODS: [&str; 2] = ["GET", "HEAD"];

/// What the server actually received, reconstructed per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBindingContext {
    pub method: String,
    /// `scheme://host` + path + query, exactly as the server saw it
    pub full_url: String,
    /// Non-empty JSON body present
    pub has_body: bool,
    pub raw_body: Bytes,
}

impl RequestBindingContext {
    pub fn new(method: impl Into<String>, full_url: impl Into<String>, raw_body: Bytes) -> Self {
        let has_body = !raw_body.is_empty();
        Self {
            method: method.into(),
            full_url: full_url.into(),
            has_body,
            raw_body,
        }
    }

    /// Override whether the body counts as a bindable JSON payload.
    pub fn with_has_body(mut self, has_body: bool) -> Self {
        self.has_body = has_body;
        self
    }

    /// Build the context from request parts plus the buffered body.
    pub fn from_parts(parts: &Parts, raw_body: Bytes, url: &UrlPolicy) -> Self {
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map(|original| &original.0)
            .unwrap_or(&parts.uri);
        let has_body = !raw_body.is_empty() && is_json(&parts.headers);
        Self {
            method: parts.method.as_str().to_string(),
            full_url: url.reconstruct(&parts.headers, uri),
            has_body,
            raw_body,
        }
    }

    pub fn is_no_body_method(&self) -> bool {
        NO_BODY_METHODS.contains(&self.method.as_str())
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.trim_start().to_ascii_lowercase().starts_with("application/json"))
        .unwrap_or(false)
}

/// How the public request URL is derived from what reaches the server.
#[derive(Debug, Clone)]
pub struct UrlPolicy {
    /// Scheme used when no trusted proxy header is present
    pub scheme: String,
    /// Honor `X-Forwarded-Proto` / `X-Forwarded-Host`
    pub trust_proxy: bool,
}

impl Default for UrlPolicy {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            trust_proxy: false,
        }
    }
}

impl UrlPolicy {
    fn forwarded<'a>(&self, headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
        if !self.trust_proxy {
            return None;
        }
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// `scheme://host` + path + query.
    pub fn reconstruct(&self, headers: &HeaderMap, uri: &Uri) -> String {
        let scheme = self
            .forwarded(headers, "x-forwarded-proto")
            .unwrap_or(self.scheme.as_str());
        let host = self
            .forwarded(headers, "x-forwarded-host")
            .or_else(|| headers.get(header::HOST).and_then(|v| v.to_str().ok()))
            .or_else(|| uri.authority().map(|a| a.as_str()))
            .unwrap_or_default();
        let path_and_query = uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| uri.path());
        format!("{}://{}{}", scheme, host, path_and_query)
    }
}

/// Source of the current unix time.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}

/// Clock frozen at a given instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.0
    }
}

/// Strictness of the freshness and URL rules.
///
/// `Development` is only selected when the configured environment is
/// `development`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindingMode {
    #[default]
    Production,
    /// created_at is forced to `now - 30` and the `u` tag to the server URL
    Development,
}

impl BindingMode {
    pub fn from_environment(environment: &str) -> Self {
        if environment == "development" {
            Self::Development
        } else {
            Self::Production
        }
    }
}
