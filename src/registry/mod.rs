//! Registered Nostr identities (`username@domain` → pubkey).
//!
//! Backs the admin privilege lookup used by NIP-98 admin routes.

pub mod memory;
pub mod models;
pub mod postgres;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use crate::nip98::PrivilegeLookup;

pub use memory::MemoryRegistry;
pub use models::{NewIdentity, RegisteredIdentity};
pub use postgres::PgRegistry;

/// Why an insert did not store the identity.
#[derive(Debug, Error)]
pub enum InsertError {
    /// `(username, domain)` or `(hex, domain)` is already registered
    #[error("username or pubkey already registered for domain")]
    AlreadyRegistered,

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Storage for registered identities and accepted domains.
#[async_trait]
pub trait IdentityRegistry: PrivilegeLookup {
    async fn is_domain_accepted(&self, domain: &str) -> Result<bool>;

    /// Username already used on the domain, or pubkey already registered on it.
    async fn is_taken(&self, username: &str, domain: &str, hex: &str) -> Result<bool>;

    /// Store a new identity. Both uniqueness keys are enforced here, not only
    /// in [`is_taken`](Self::is_taken).
    async fn insert(&self, identity: NewIdentity) -> Result<(), InsertError>;
}
