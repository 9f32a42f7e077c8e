//! Elevated-privilege lookup used by admin-only endpoints.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;

/// Answers whether an authenticated pubkey holds admin rights.
///
/// Errors are treated as "not privileged" by the caller.
#[async_trait]
pub trait PrivilegeLookup: Send + Sync {
    async fn is_privileged(&self, pubkey_hex: &str) -> Result<bool>;
}

/// Fixed set of admin pubkeys.
#[derive(Debug, Clone, Default)]
pub struct StaticPrivileges {
    admins: HashSet<String>,
}

impl StaticPrivileges {
    pub fn new<I, S>(admins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            admins: admins.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl PrivilegeLookup for StaticPrivileges {
    async fn is_privileged(&self, pubkey_hex: &str) -> Result<bool> {
        Ok(self.admins.contains(pubkey_hex))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_privileges() {
        let lookup = StaticPrivileges::new(["aa"]);
        assert!(lookup.is_privileged("aa").await.unwrap());
        assert!(!lookup.is_privileged("bb").await.unwrap());
    }
}
