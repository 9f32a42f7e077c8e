//! PostgreSQL identity registry.
//!
//! Uses runtime queries to avoid sqlx compile-time database connection.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;

use super::models::NewIdentity;
use super::{IdentityRegistry, InsertError};
use crate::db::{Database, SafeRow};
use crate::nip98::PrivilegeLookup;

pub struct PgRegistry {
    db: Arc<Database>,
}

impl PgRegistry {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl IdentityRegistry for PgRegistry {
    async fn is_domain_accepted(&self, domain: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM domains WHERE domain = $1 AND active = TRUE")
            .bind(domain)
            .fetch_optional(self.db.pool())
            .await
            .context("query accepted domains")?;
        Ok(row.is_some())
    }

    async fn is_taken(&self, username: &str, domain: &str, hex: &str) -> Result<bool> {
        let row = sqlx::query(
            r#"
            SELECT 1 FROM registered
            WHERE (username = $1 AND domain = $2) OR (hex = $3 AND domain = $2)
            LIMIT 1
            "#,
        )
        .bind(username)
        .bind(domain)
        .bind(hex)
        .fetch_optional(self.db.pool())
        .await
        .context("query registered identities")?;
        Ok(row.is_some())
    }

    async fn insert(&self, identity: NewIdentity) -> Result<(), InsertError> {
        sqlx::query(
            r#"
            INSERT INTO registered (hex, pubkey, username, domain, active, allowed, created_at)
            VALUES ($1, $2, $3, $4, TRUE, FALSE, $5)
            "#,
        )
        .bind(&identity.hex)
        .bind(&identity.npub)
        .bind(&identity.username)
        .bind(&identity.domain)
        .bind(identity.created_at)
        .execute(self.db.pool())
        .await
        .map_err(map_insert_error)?;
        Ok(())
    }
}

/// UNIQUE (username, domain) / (hex, domain) violations are conflicts,
/// everything else is a storage failure.
fn map_insert_error(e: sqlx::Error) -> InsertError {
    if e
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation())
    {
        return InsertError::AlreadyRegistered;
    }
    InsertError::Storage(anyhow::Error::new(e).context("insert registered identity"))
}

#[async_trait]
impl PrivilegeLookup for PgRegistry {
    async fn is_privileged(&self, pubkey_hex: &str) -> Result<bool> {
        let row = sqlx::query(
            "SELECT COALESCE(bool_or(allowed AND active), FALSE) AS allowed FROM registered WHERE hex = $1",
        )
        .bind(pubkey_hex)
        .fetch_one(self.db.pool())
        .await
        .context("query admin flag")?;
        let allowed: Option<bool> = row.try_get_log("allowed");
        allowed.context("admin flag column unreadable")
    }
}
