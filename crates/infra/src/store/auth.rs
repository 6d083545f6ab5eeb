//! Access token resolution for the profile store
//!
//! The store client authenticates with a bearer token owned by the embedding
//! application. Token acquisition (sign-in flows, refresh) happens outside
//! this crate; these providers only resolve the current token.

use async_trait::async_trait;
use keyring::Entry;
use tracing::debug;

use crate::errors::InfraError;

use super::errors::StoreError;

/// Trait for providing access tokens
///
/// This trait allows dependency injection and testing with mock providers.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Get a valid access token
    async fn access_token(&self) -> Result<String, StoreError>;
}

/// Fixed token provider for configuration-supplied tokens and tests
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    /// Create a provider that always returns the given token
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String, StoreError> {
        Ok(self.token.clone())
    }
}

/// OS-keychain-backed token provider.
///
/// Stores the token under a service/account pair so it never lands in config
/// files or the process environment.
pub struct KeyringTokenProvider {
    service: String,
    account: String,
}

impl KeyringTokenProvider {
    /// Create a provider reading from the given keychain service/account
    pub fn new(service: impl Into<String>, account: impl Into<String>) -> Self {
        Self { service: service.into(), account: account.into() }
    }

    fn entry(&self) -> Result<Entry, StoreError> {
        Entry::new(&self.service, &self.account)
            .map_err(|err| StoreError::from(InfraError::from(err)))
    }

    /// Store a token in the keychain
    pub fn set_token(&self, token: &str) -> Result<(), StoreError> {
        self.entry()?
            .set_password(token)
            .map_err(|err| StoreError::from(InfraError::from(err)))?;
        debug!(service = %self.service, "stored store API token in keychain");
        Ok(())
    }

    /// Remove the token from the keychain
    pub fn clear_token(&self) -> Result<(), StoreError> {
        self.entry()?
            .delete_credential()
            .map_err(|err| StoreError::from(InfraError::from(err)))
    }
}

#[async_trait]
impl AccessTokenProvider for KeyringTokenProvider {
    async fn access_token(&self) -> Result<String, StoreError> {
        self.entry()?
            .get_password()
            .map_err(|err| StoreError::from(InfraError::from(err)))
    }
}
