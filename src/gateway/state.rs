use anyhow::Context;
use std::sync::Arc;

use crate::config::{AppConfig, ModulesConfig};
use crate::db::Database;
use crate::nip98::{BindingMode, HttpAuthBindingValidator, Nip98State, PrivilegeLookup, UrlPolicy};
use crate::registry::{IdentityRegistry, MemoryRegistry, PgRegistry};

/// Gateway shared state
#[derive(Clone)]
pub struct AppState {
    /// Registered identities and accepted domains
    pub registry: Arc<dyn IdentityRegistry>,
    /// NIP-98 middleware state (validator + URL policy)
    pub nip98: Arc<Nip98State>,
    pub modules: ModulesConfig,
    /// Development relaxes domain checks on register
    pub mode: BindingMode,
    /// PostgreSQL pool, when configured (health checks)
    pub pg_db: Option<Arc<Database>>,
}

impl AppState {
    pub fn new(
        registry: Arc<dyn IdentityRegistry>,
        nip98: Arc<Nip98State>,
        modules: ModulesConfig,
        mode: BindingMode,
    ) -> Self {
        Self {
            registry,
            nip98,
            modules,
            mode,
            pg_db: None,
        }
    }

    pub fn with_database(mut self, db: Arc<Database>) -> Self {
        self.pg_db = Some(db);
        self
    }

    /// Wire registry, validator and middleware state from config.
    ///
    /// Uses PostgreSQL when `postgres_url` is set, otherwise an in-memory
    /// registry seeded from `registry.domains` / `registry.admins`.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let mode = config.binding_mode();
        if mode == BindingMode::Development {
            tracing::warn!("DEVMODE: NIP-98 created_at and u tag checks are relaxed");
        }

        let (registry, privileges, db) = match &config.postgres_url {
            Some(url) => {
                let db = Arc::new(
                    Database::connect(url)
                        .await
                        .context("connect to PostgreSQL")?,
                );
                db.ensure_schema().await.context("create registry schema")?;
                let pg = Arc::new(PgRegistry::new(db.clone()));
                let registry: Arc<dyn IdentityRegistry> = pg.clone();
                let privileges: Arc<dyn PrivilegeLookup> = pg;
                (registry, privileges, Some(db))
            }
            None => {
                tracing::warn!("No postgres_url configured, using in-memory registry");
                let memory = Arc::new(MemoryRegistry::with_seed(
                    config.registry.domains.iter().cloned(),
                    config.registry.admins.iter().cloned(),
                ));
                let registry: Arc<dyn IdentityRegistry> = memory.clone();
                let privileges: Arc<dyn PrivilegeLookup> = memory;
                (registry, privileges, None)
            }
        };

        let validator = HttpAuthBindingValidator::new(privileges).with_mode(mode);
        let nip98 = Nip98State {
            validator: Arc::new(validator),
            url_policy: UrlPolicy {
                scheme: config.gateway.scheme.clone(),
                trust_proxy: config.gateway.trust_proxy,
            },
            max_body_bytes: config.gateway.max_body_bytes,
        };

        let state = Self::new(registry, Arc::new(nip98), config.modules.clone(), mode);
        Ok(match db {
            Some(db) => state.with_database(db),
            None => state,
        })
    }
}
