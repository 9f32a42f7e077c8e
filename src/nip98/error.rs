//! NIP-98 authentication error types.
//!
//! Every rejection carries a code and a human-readable message. The HTTP
//! status is chosen from the code by the transport layer.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Authentication error codes (4101-4112).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(i32)]
pub enum AuthErrorCode {
    /// 4101: Authorization header absent
    MissingHeader = 4101,
    /// 4102: Header or event could not be decoded
    MalformedEvent = 4102,
    /// 4103: Declared id is not the hash of the event
    HashMismatch = 4103,
    /// 4104: Signature does not verify under pubkey
    SignatureInvalid = 4104,
    /// 4105: Event kind is not 27235
    KindInvalid = 4105,
    /// 4106: created_at older than the freshness window
    StaleTimestamp = 4106,
    /// 4107: `u` tag differs from the request URL
    UrlMismatch = 4107,
    /// 4108: `method` tag differs from the request method
    MethodMismatch = 4108,
    /// 4109: `payload` tag differs from the body digest (logged only)
    PayloadMismatch = 4109,
    /// 4110: Pubkey is not flagged as admin
    InsufficientPrivilege = 4110,
    /// 4111: Internal server error
    InternalError = 4111,
    /// 4112: Body exceeds `gateway.max_body_bytes`
    PayloadTooLarge = 4112,
}

impl AuthErrorCode {
    /// Get error code as i32.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Get error name string.
    pub fn name(self) -> &'static str {
        match self {
            Self::MissingHeader => "MISSING_HEADER",
            Self::MalformedEvent => "MALFORMED_EVENT",
            Self::HashMismatch => "HASH_MISMATCH",
            Self::SignatureInvalid => "SIGNATURE_INVALID",
            Self::KindInvalid => "KIND_INVALID",
            Self::StaleTimestamp => "STALE_TIMESTAMP",
            Self::UrlMismatch => "URL_MISMATCH",
            Self::MethodMismatch => "METHOD_MISMATCH",
            Self::PayloadMismatch => "PAYLOAD_MISMATCH",
            Self::InsufficientPrivilege => "INSUFFICIENT_PRIVILEGE",
            Self::InternalError => "INTERNAL_ERROR",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
        }
    }

    /// Get HTTP status code.
    ///
    /// Shape and binding failures are 400, unauthenticated callers 401,
    /// privilege failures 403, oversized bodies 413.
    pub fn http_status(self) -> StatusCode {
        match self {
            Self::MissingHeader | Self::HashMismatch | Self::SignatureInvalid => {
                StatusCode::UNAUTHORIZED
            }
            Self::InsufficientPrivilege => StatusCode::FORBIDDEN,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// Authentication error with message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthError {
    pub code: AuthErrorCode,
    pub message: String,
}

impl AuthError {
    /// Create a new auth error.
    pub fn new(code: AuthErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create error with default message.
    pub fn from_code(code: AuthErrorCode) -> Self {
        let message = match code {
            AuthErrorCode::MissingHeader => "Missing Authorization header",
            AuthErrorCode::MalformedEvent => "Malformed event",
            AuthErrorCode::HashMismatch => "event hash is not valid",
            AuthErrorCode::SignatureInvalid => "event signature is not valid",
            AuthErrorCode::KindInvalid => "event kind invalid",
            AuthErrorCode::StaleTimestamp => {
                "event created_at is not within a reasonable time window"
            }
            AuthErrorCode::UrlMismatch => "event endpoint is not valid",
            AuthErrorCode::MethodMismatch => "event method is not valid",
            AuthErrorCode::PayloadMismatch => "event payload is not valid",
            AuthErrorCode::InsufficientPrivilege => "no admin privileges",
            AuthErrorCode::InternalError => "Internal server error",
            AuthErrorCode::PayloadTooLarge => "Request body too large",
        };
        Self::new(code, message)
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.name(), self.message)
    }
}

impl std::error::Error for AuthError {}

/// JSON response body for auth errors.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthErrorResponse {
    #[schema(example = 4105)]
    pub code: i32,
    #[schema(example = "KIND_INVALID")]
    pub error: &'static str,
    #[schema(example = "event kind invalid")]
    pub message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = AuthErrorResponse {
            code: self.code.code(),
            error: self.code.name(),
            message: self.message,
        };
        (self.code.http_status(), Json(body)).into_response()
    }
}
