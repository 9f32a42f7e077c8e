//! Structured outcome of the NIP-98 binding check.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::{AuthError, AuthErrorCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AuthStatus {
    Success,
    Error,
}

/// Result of authenticating one request.
///
/// Same shape for every outcome so callers can pick a status code uniformly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthResult {
    pub status: AuthStatus,
    pub message: String,
    /// Hex pubkey once the event itself verified, empty otherwise
    pub authenticated_pubkey: String,
    pub requires_privilege_failed: bool,
}

impl AuthResult {
    pub fn success(pubkey: impl Into<String>) -> Self {
        Self {
            status: AuthStatus::Success,
            message: "Auth header event is valid".to_string(),
            authenticated_pubkey: pubkey.into(),
            requires_privilege_failed: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: AuthStatus::Error,
            message: message.into(),
            authenticated_pubkey: String::new(),
            requires_privilege_failed: false,
        }
    }

    /// Result for a header that never decoded into an event.
    pub fn malformed() -> Self {
        Self::error(AuthError::from_code(AuthErrorCode::MalformedEvent).message)
    }

    pub fn is_success(&self) -> bool {
        self.status == AuthStatus::Success
    }
}

/// A rejection together with the pubkey it concerns, if already verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub error: AuthError,
    pub pubkey: Option<String>,
}

impl From<AuthError> for Rejection {
    fn from(error: AuthError) -> Self {
        Self {
            error,
            pubkey: None,
        }
    }
}

impl From<Result<String, Rejection>> for AuthResult {
    fn from(result: Result<String, Rejection>) -> Self {
        match result {
            Ok(pubkey) => Self::success(pubkey),
            Err(Rejection { error, pubkey }) => Self {
                status: AuthStatus::Error,
                requires_privilege_failed: error.code == AuthErrorCode::InsufficientPrivilege,
                message: error.message,
                authenticated_pubkey: pubkey.unwrap_or_default(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_serializes_lowercase_status() {
        let json = serde_json::to_value(AuthResult::success("ab")).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["authenticated_pubkey"], "ab");
        assert_eq!(json["requires_privilege_failed"], false);
    }

    #[test]
    fn test_malformed() {
        let result = AuthResult::malformed();
        assert!(!result.is_success());
        assert_eq!(result.message, "Malformed event");
        assert!(result.authenticated_pubkey.is_empty());
    }

    #[test]
    fn test_privilege_rejection_sets_flag() {
        let rejection = Rejection {
            error: AuthError::from_code(AuthErrorCode::InsufficientPrivilege),
            pubkey: Some("cafe".into()),
        };
        let result = AuthResult::from(Err(rejection));
        assert!(result.requires_privilege_failed);
        assert_eq!(result.authenticated_pubkey, "cafe");
        assert_eq!(result.message, "no admin privileges");
    }

    #[test]
    fn test_other_rejection_clears_flag() {
        let result = AuthResult::from(Err(Rejection::from(AuthError::from_code(
            AuthErrorCode::KindInvalid,
        ))));
        assert!(!result.requires_privilege_failed);
        assert_eq!(result.status, AuthStatus::Error);
    }
}
