//! Shared helpers for integration tests: test keys and signed events.

#![allow(dead_code)]

use nostr_gate::SignedEvent;
use nostr_gate::nip98::PayloadRule;
use nostr_gate::nostr::kinds;
use rand::Rng;
use secp256k1::{Keypair, Message, Secp256k1};

/// A throwaway secp256k1 identity.
pub struct TestKey {
    keypair: Keypair,
    pub pubkey: String,
}

impl TestKey {
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let keypair = Keypair::new(&secp, &mut secp256k1::rand::thread_rng());
        let (xonly, _parity) = keypair.x_only_public_key();
        Self {
            keypair,
            pubkey: hex::encode(xonly.serialize()),
        }
    }

    /// Build, hash and sign an event.
    pub fn sign(&self, kind: u16, created_at: i64, tags: Vec<Vec<String>>, content: &str) -> SignedEvent {
        let mut event = SignedEvent {
            id: String::new(),
            pubkey: self.pubkey.clone(),
            created_at,
            kind,
            tags,
            content: content.to_string(),
            sig: String::new(),
        };
        resign(&mut event, &self.keypair);
        event
    }

    /// Sign an existing event's current fields as-is, overwriting id and sig.
    pub fn resign(&self, event: &mut SignedEvent) {
        resign(event, &self.keypair);
    }

    /// NIP-98 authorization event for one request.
    pub fn http_auth(&self, created_at: i64, method: &str, url: &str, body: Option<&[u8]>) -> SignedEvent {
        self.sign(kinds::HTTP_AUTH, created_at, http_auth_tags(method, url, body), "")
    }
}

fn resign(event: &mut SignedEvent, keypair: &Keypair) {
    let secp = Secp256k1::new();
    let digest = event.compute_id().expect("event serializes");
    event.id = hex::encode(digest);
    let sig = secp.sign_schnorr_no_aux_rand(&Message::from_digest(digest), keypair);
    event.sig = hex::encode(sig.serialize());
}

pub fn tag(name: &str, value: &str) -> Vec<String> {
    vec![name.to_string(), value.to_string()]
}

pub fn http_auth_tags(method: &str, url: &str, body: Option<&[u8]>) -> Vec<Vec<String>> {
    let mut tags = vec![tag("u", url), tag("method", method)];
    if let Some(body) = body {
        tags.push(tag("payload", &PayloadRule::body_digest(body)));
    }
    tags
}

/// Random alphanumeric username, 8 chars.
pub fn random_username() -> String {
    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(8)
        .map(char::from)
        .collect()
}

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
