//! NIP-98 HTTP authorization.
//!
//! Binds a signed Nostr event to one HTTP request (method, URL, body, time).
//!
//! ## Components
//! - `context`: request binding context, clock and binding mode
//! - `error`: authentication error codes (4101-4112)
//! - `header`: `Authorization: Nostr <base64>` decoding
//! - `privilege`: admin privilege lookup trait
//! - `result`: `AuthResult` returned to callers
//! - `rules`: ordered binding rules
//! - `validator`: `HttpAuthBindingValidator`
//! - `middleware`: Axum authentication middleware

pub mod context;
pub mod error;
pub mod header;
pub mod middleware;
pub mod privilege;
pub mod result;
pub mod rules;
pub mod validator;

// Re-export for convenience
pub use context::{BindingMode, Clock, FixedClock, RequestBindingContext, SystemClock, UrlPolicy};
pub use error::{AuthError, AuthErrorCode, AuthErrorResponse};
pub use header::{encode_authorization, extract_auth_header, parse_authorization};
pub use middleware::{
    AuthenticatedPubkey, Nip98State, nip98_admin_middleware, nip98_auth_middleware,
};
pub use privilege::{PrivilegeLookup, StaticPrivileges};
pub use result::{AuthResult, AuthStatus, Rejection};
pub use rules::{FRESHNESS_WINDOW_SECS, PayloadRule};
pub use validator::HttpAuthBindingValidator;
