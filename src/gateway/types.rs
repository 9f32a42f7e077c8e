//! API response types and error codes
//!
//! - `ApiResponse<T>`: unified response wrapper
//! - `error_codes`: standard error code constants
//! - Verify / register response DTOs

use serde::Serialize;
use utoipa::ToSchema;

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or null (error)
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response code: 0 for success, non-zero for errors
    #[schema(example = 0)]
    pub code: i32,
    /// Response message
    #[schema(example = "ok")]
    pub msg: String,
    /// Response data (only present when code == 0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: error_codes::SUCCESS,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Outcome of `POST /api/v1/verify`.
#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyResultMessage {
    /// Pubkey declared by the event (empty when the body did not parse)
    #[schema(example = "79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798")]
    pub pubkey: String,
    pub result: bool,
    #[schema(example = "Valid Event")]
    pub description: String,
}

/// Outcome of `POST /api/v1/register`.
#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResultMessage {
    #[schema(example = "success")]
    pub status: String,
    #[schema(example = "New user registered successfully")]
    pub message: String,
    pub username: String,
    pub pubkey: String,
    pub domain: String,
}

// ============================================================================
// Error Codes
// ============================================================================

pub mod error_codes {
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const MODULE_DISABLED: i32 = 1002;

    // Server errors (5xxx)
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const SERVICE_UNAVAILABLE: i32 = 5001;
}
