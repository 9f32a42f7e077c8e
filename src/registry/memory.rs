//! In-memory identity registry.
//!
//! Used when no PostgreSQL URL is configured, and by tests.

use anyhow::Result;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};

use super::models::{NewIdentity, RegisteredIdentity};
use super::{IdentityRegistry, InsertError};
use crate::nip98::PrivilegeLookup;

/// Thread-safe registry keyed by `(username, domain)`, with a
/// `(hex, domain)` index so a pubkey holds one name per domain.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    identities: DashMap<(String, String), RegisteredIdentity>,
    pubkeys: DashMap<(String, String), String>,
    domains: DashSet<String>,
    admins: DashSet<String>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed accepted domains and admin pubkeys.
    pub fn with_seed<D, A>(domains: D, admins: A) -> Self
    where
        D: IntoIterator<Item = String>,
        A: IntoIterator<Item = String>,
    {
        let registry = Self::new();
        for domain in domains {
            registry.domains.insert(domain);
        }
        for admin in admins {
            registry.admins.insert(admin);
        }
        registry
    }
}

#[async_trait]
impl IdentityRegistry for MemoryRegistry {
    async fn is_domain_accepted(&self, domain: &str) -> Result<bool> {
        Ok(self.domains.contains(domain))
    }

    async fn is_taken(&self, username: &str, domain: &str, hex: &str) -> Result<bool> {
        let domain = domain.to_string();
        Ok(self
            .identities
            .contains_key(&(username.to_string(), domain.clone()))
            || self.pubkeys.contains_key(&(hex.to_string(), domain)))
    }

    async fn insert(&self, identity: NewIdentity) -> Result<(), InsertError> {
        // Claim the pubkey first, release it if the username is gone
        let pubkey_key = (identity.hex.clone(), identity.domain.clone());
        match self.pubkeys.entry(pubkey_key.clone()) {
            Entry::Occupied(_) => return Err(InsertError::AlreadyRegistered),
            Entry::Vacant(slot) => {
                slot.insert(identity.username.clone());
            }
        }

        let key = (identity.username.clone(), identity.domain.clone());
        match self.identities.entry(key) {
            Entry::Occupied(_) => {
                self.pubkeys.remove(&pubkey_key);
                Err(InsertError::AlreadyRegistered)
            }
            Entry::Vacant(slot) => {
                slot.insert(identity.into_record());
                Ok(())
            }
        }
    }
}

#[async_trait]
impl PrivilegeLookup for MemoryRegistry {
    /// Admins come from the seeded list; registrations here are never admins.
    async fn is_privileged(&self, pubkey_hex: &str) -> Result<bool> {
        Ok(self.admins.contains(pubkey_hex))
    }
}
