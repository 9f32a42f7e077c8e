//! Authorization header decoding.
//!
//! Format: `Nostr <base64(JSON event)>`

use axum::http::{HeaderMap, header};
use base64::Engine;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::{DecodePaddingMode, general_purpose};

use super::error::{AuthError, AuthErrorCode};
use crate::nostr::SignedEvent;

/// Authorization scheme prefix.
pub const AUTH_SCHEME: &str = "Nostr";

/// Standard alphabet, padding optional.
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &base64::alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Extract Authorization header from request.
pub fn extract_auth_header(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AuthError::from_code(AuthErrorCode::MissingHeader))?;
    value
        .to_str()
        .map_err(|_| AuthError::from_code(AuthErrorCode::MalformedEvent))
}

/// Decode `Nostr <base64>` into an event.
///
/// Every failure maps to `MalformedEvent` with the message `Malformed event`.
pub fn parse_authorization(auth_header: &str) -> Result<SignedEvent, AuthError> {
    let malformed = || AuthError::from_code(AuthErrorCode::MalformedEvent);

    let (scheme, encoded) = auth_header.trim().split_once(' ').ok_or_else(malformed)?;
    if scheme != AUTH_SCHEME {
        return Err(malformed());
    }

    let json = LENIENT_STANDARD
        .decode(encoded.trim())
        .map_err(|_| malformed())?;
    SignedEvent::from_json(&json).map_err(|_| malformed())
}

/// Encode an event as an Authorization header value.
pub fn encode_authorization(event: &SignedEvent) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(event)?;
    Ok(format!("{} {}", AUTH_SCHEME, general_purpose::STANDARD.encode(json)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn sample() -> SignedEvent {
        SignedEvent {
            id: "00".repeat(32),
            pubkey: "11".repeat(32),
            created_at: 1,
            kind: 27235,
            tags: vec![vec!["method".into(), "GET".into()]],
            content: String::new(),
            sig: "22".repeat(64),
        }
    }

    #[test]
    fn test_roundtrip() {
        let header = encode_authorization(&sample()).unwrap();
        assert!(header.starts_with("Nostr "));
        assert_eq!(parse_authorization(&header).unwrap(), sample());
    }

    #[test]
    fn test_unpadded_base64_accepted() {
        let header = encode_authorization(&sample()).unwrap();
        let unpadded = header.trim_end_matches('=');
        assert_eq!(parse_authorization(unpadded).unwrap(), sample());
    }

    #[test]
    fn test_wrong_scheme() {
        let header = encode_authorization(&sample()).unwrap().replace("Nostr", "Bearer");
        let err = parse_authorization(&header).unwrap_err();
        assert_eq!(err.code, AuthErrorCode::MalformedEvent);
        assert_eq!(err.message, "Malformed event");
    }

    #[test]
    fn test_garbage() {
        for header in ["", "Nostr", "Nostr !!!", "Nostr aGVsbG8="] {
            assert_eq!(
                parse_authorization(header).unwrap_err().code,
                AuthErrorCode::MalformedEvent,
                "{header:?}"
            );
        }
    }

    #[test]
    fn test_extract_missing_header() {
        let headers = HeaderMap::new();
        assert_eq!(
            extract_auth_header(&headers).unwrap_err().code,
            AuthErrorCode::MissingHeader
        );
    }

    #[test]
    fn test_extract_present_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Nostr abc"));
        assert_eq!(extract_auth_header(&headers).unwrap(), "Nostr abc");
    }
}
