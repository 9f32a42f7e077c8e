use serde::{Deserialize, Serialize};
use std::fs;
use thiserror::Error;

use crate::nip98::BindingMode;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config yaml {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    /// `development` relaxes NIP-98 freshness/url checks; anything else is strict
    pub environment: String,
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    /// PostgreSQL connection URL for the identity registry
    #[serde(default)]
    pub postgres_url: Option<String>,
    #[serde(default)]
    pub modules: ModulesConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    /// Scheme of the public URL clients sign in the `u` tag
    #[serde(default = "default_scheme")]
    pub scheme: String,
    /// Honor X-Forwarded-Proto / X-Forwarded-Host
    #[serde(default)]
    pub trust_proxy: bool,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_scheme() -> String {
    "http".to_string()
}

fn default_max_body_bytes() -> usize {
    crate::nip98::middleware::DEFAULT_MAX_BODY_BYTES
}

/// Endpoint switches.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ModulesConfig {
    pub verify: bool,
    pub register: bool,
}

impl Default for ModulesConfig {
    fn default() -> Self {
        Self {
            verify: true,
            register: true,
        }
    }
}

/// Seed data for the in-memory registry.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RegistryConfig {
    /// Hex pubkeys with admin privileges
    #[serde(default)]
    pub admins: Vec<String>,
    /// Domains accepting registrations
    #[serde(default)]
    pub domains: Vec<String>,
}

impl AppConfig {
    pub fn load(env: &str) -> Result<Self, ConfigError> {
        let path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|source| ConfigError::Parse { path, source })
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    pub fn binding_mode(&self) -> BindingMode {
        BindingMode::from_environment(&self.environment)
    }
}
