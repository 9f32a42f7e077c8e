//! Registered identity records.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::nostr::{Nip19Error, hex_to_npub};

/// A registered `username@domain` bound to a pubkey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredIdentity {
    /// x-only pubkey, lowercase hex
    pub hex: String,
    /// Same key, NIP-19 bech32
    pub npub: String,
    pub username: String,
    pub domain: String,
    pub active: bool,
    /// Admin flag
    pub allowed: bool,
    pub created_at: DateTime<Utc>,
}

/// Insert request for a new identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIdentity {
    pub hex: String,
    pub npub: String,
    pub username: String,
    pub domain: String,
    pub created_at: DateTime<Utc>,
}

impl NewIdentity {
    /// Derives the npub from `hex`.
    pub fn new(
        hex: impl Into<String>,
        username: impl Into<String>,
        domain: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, Nip19Error> {
        let hex = hex.into();
        let npub = hex_to_npub(&hex)?;
        Ok(Self {
            hex,
            npub,
            username: username.into(),
            domain: domain.into(),
            created_at,
        })
    }

    /// Newly registered identities are active and not admins.
    pub fn into_record(self) -> RegisteredIdentity {
        RegisteredIdentity {
            hex: self.hex,
            npub: self.npub,
            username: self.username,
            domain: self.domain,
            active: true,
            allowed: false,
            created_at: self.created_at,
        }
    }
}
