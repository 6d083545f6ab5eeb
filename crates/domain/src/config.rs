//! Configuration management

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_JOIN_TIMEOUT_SECS, DEFAULT_STORE_MAX_RETRIES, DEFAULT_STORE_TIMEOUT_SECS,
};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub store: StoreConfig,
    pub sync: SyncConfig,
}

/// Profile store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub max_retries: usize,
    /// Keychain service name used to resolve the store API token
    pub keychain_service: String,
}

/// Profile sync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub enabled: bool,
    pub join_timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig {
                base_url: "https://api.sprout.app/v1".to_string(),
                timeout_seconds: DEFAULT_STORE_TIMEOUT_SECS,
                max_retries: DEFAULT_STORE_MAX_RETRIES,
                keychain_service: "Sprout.store".to_string(),
            },
            sync: SyncConfig { enabled: true, join_timeout_seconds: DEFAULT_JOIN_TIMEOUT_SECS },
        }
    }
}
