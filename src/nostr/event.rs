//! NIP-01 event model.
//!
//! A [`SignedEvent`] is produced in exactly one step from untrusted JSON via
//! [`SignedEvent::from_json`]. Nothing in it is trusted until
//! [`crate::nostr::verify_event`] returns `Valid`.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;

/// Event kinds this server knows about.
pub mod kinds {
    /// NIP-98 HTTP authorization event
    pub const HTTP_AUTH: u16 = 27235;
}

/// Error from the strict JSON parse.
#[derive(Debug, thiserror::Error)]
#[error("Malformed event: {0}")]
pub struct EventParseError(#[from] serde_json::Error);

/// A signed Nostr event as received from a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SignedEvent {
    /// Lowercase hex sha256 of the canonical serialization
    #[schema(example = "5c83da77af1dec6d7289834998ad7aafbd9e2191396d75ec3cc27f5a77226f36")]
    pub id: String,
    /// x-only public key, lowercase hex
    pub pubkey: String,
    /// Unix seconds
    pub created_at: i64,
    #[schema(example = 27235)]
    pub kind: u16,
    pub tags: Vec<Vec<String>>,
    pub content: String,
    /// 64-byte BIP-340 signature, lowercase hex
    pub sig: String,
}

impl SignedEvent {
    /// Parse an event from raw JSON bytes.
    ///
    /// Every field is required and must have the right JSON type. Unknown
    /// fields are ignored.
    pub fn from_json(bytes: &[u8]) -> Result<Self, EventParseError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Canonical NIP-01 serialization: `[0,pubkey,created_at,kind,tags,content]`.
    pub fn canonical_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&(
            0u8,
            &self.pubkey,
            self.created_at,
            self.kind,
            &self.tags,
            &self.content,
        ))
    }

    /// sha256 of the canonical serialization.
    pub fn compute_id(&self) -> Result<[u8; 32], serde_json::Error> {
        let canonical = self.canonical_json()?;
        Ok(Sha256::digest(canonical.as_bytes()).into())
    }

    /// Value of the first tag named `name`, if it has one.
    pub fn tag_value(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|tag| tag.first().map(String::as_str) == Some(name))
            .and_then(|tag| tag.get(1))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SignedEvent {
        SignedEvent {
            id: String::new(),
            pubkey: "a".repeat(64),
            created_at: 1_700_000_000,
            kind: kinds::HTTP_AUTH,
            tags: vec![
                vec!["u".into(), "https://host/api/v1/media".into()],
                vec!["method".into(), "POST".into()],
            ],
            content: "line\n\"quoted\" ünï".into(),
            sig: String::new(),
        }
    }

    #[test]
    fn test_canonical_json_layout() {
        let json = sample().canonical_json().unwrap();
        assert_eq!(
            json,
            format!(
                "[0,\"{}\",1700000000,27235,[[\"u\",\"https://host/api/v1/media\"],[\"method\",\"POST\"]],\"line\\n\\\"quoted\\\" ünï\"]",
                "a".repeat(64)
            )
        );
    }

    #[test]
    fn test_compute_id_known_vector() {
        // sha256 of `[0,"<64 x 'a'>",0,1,[],""]`
        let event = SignedEvent {
            id: String::new(),
            pubkey: "a".repeat(64),
            created_at: 0,
            kind: 1,
            tags: vec![],
            content: String::new(),
            sig: String::new(),
        };
        let expected = hex::encode(Sha256::digest(
            format!("[0,\"{}\",0,1,[],\"\"]", "a".repeat(64)).as_bytes(),
        ));
        assert_eq!(hex::encode(event.compute_id().unwrap()), expected);
    }

    #[test]
    fn test_tag_value() {
        let event = sample();
        assert_eq!(event.tag_value("method"), Some("POST"));
        assert_eq!(event.tag_value("payload"), None);
    }

    #[test]
    fn test_tag_value_without_value() {
        let mut event = sample();
        event.tags = vec![vec!["payload".into()]];
        assert_eq!(event.tag_value("payload"), None);
    }

    #[test]
    fn test_from_json_rejects_wrong_types() {
        let bad = br#"{"id":"x","pubkey":"y","created_at":"now","kind":27235,"tags":[],"content":"","sig":"z"}"#;
        assert!(SignedEvent::from_json(bad).is_err());

        let bad_tags = br#"{"id":"x","pubkey":"y","created_at":1,"kind":27235,"tags":[[1,2]],"content":"","sig":"z"}"#;
        assert!(SignedEvent::from_json(bad_tags).is_err());
    }

    #[test]
    fn test_from_json_rejects_missing_field() {
        let missing_sig =
            br#"{"id":"x","pubkey":"y","created_at":1,"kind":27235,"tags":[],"content":""}"#;
        assert!(SignedEvent::from_json(missing_sig).is_err());
    }

    #[test]
    fn test_from_json_ignores_unknown_fields() {
        let json = br#"{"id":"x","pubkey":"y","created_at":1,"kind":1,"tags":[],"content":"","sig":"z","relay":"wss://r"}"#;
        let event = SignedEvent::from_json(json).unwrap();
        assert_eq!(event.kind, 1);
    }
}
