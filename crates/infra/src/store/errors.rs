//! Store-specific error types
//!
//! Provides error classification for profile store operations with retry
//! metadata.

use sprout_domain::SproutError;
use thiserror::Error;

/// Categories of store errors for retry logic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreErrorCategory {
    /// Authentication errors (401, 403) - retry after token refresh
    Authentication,
    /// Rate limiting errors (429) - retry with backoff
    RateLimit,
    /// Server errors (5xx) - retryable
    Server,
    /// Client errors (4xx except auth) - non-retryable
    Client,
    /// Network/connection errors - retryable
    Network,
    /// Configuration errors - non-retryable
    Config,
}

/// Profile store operation errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Client error: {0}")]
    Client(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Timeout after {0:?}")]
    Timeout(std::time::Duration),
}

impl StoreError {
    /// Get the error category for this error
    pub fn category(&self) -> StoreErrorCategory {
        match self {
            Self::Auth(_) => StoreErrorCategory::Authentication,
            Self::RateLimit(_) => StoreErrorCategory::RateLimit,
            Self::Server(_) => StoreErrorCategory::Server,
            Self::Client(_) | Self::NotFound(_) => StoreErrorCategory::Client,
            Self::Network(_) | Self::Timeout(_) => StoreErrorCategory::Network,
            Self::Config(_) => StoreErrorCategory::Config,
        }
    }

    /// Check if this error should be retried
    pub fn should_retry(&self) -> bool {
        matches!(
            self.category(),
            StoreErrorCategory::Authentication
                | StoreErrorCategory::RateLimit
                | StoreErrorCategory::Server
                | StoreErrorCategory::Network
        )
    }

    /// Get suggested retry delay in seconds
    pub fn retry_delay_secs(&self) -> u64 {
        match self.category() {
            StoreErrorCategory::Authentication => 5, // Quick retry after token refresh
            StoreErrorCategory::RateLimit => 60,     // Wait for rate limit window
            StoreErrorCategory::Server => 10,        // Moderate delay for server issues
            StoreErrorCategory::Network => 5,        // Quick retry for network
            StoreErrorCategory::Client | StoreErrorCategory::Config => 0, // No retry
        }
    }
}

/// Convert from SproutError to StoreError
impl From<SproutError> for StoreError {
    fn from(err: SproutError) -> Self {
        match err {
            SproutError::Store(message) => Self::Server(message),
            SproutError::Config(message) => Self::Config(message),
            SproutError::Network(message) => Self::Network(message),
            SproutError::Auth(message) => Self::Auth(message),
            SproutError::NotFound(message) => Self::NotFound(message),
            SproutError::InvalidInput(message) => Self::Client(message),
            SproutError::Internal(message) => Self::Server(message),
        }
    }
}

/// Convert infrastructure-side errors through the domain taxonomy
impl From<crate::errors::InfraError> for StoreError {
    fn from(err: crate::errors::InfraError) -> Self {
        SproutError::from(err).into()
    }
}

/// Convert from StoreError back into the domain error at the port boundary
impl From<StoreError> for SproutError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Auth(message) => Self::Auth(message),
            StoreError::RateLimit(message) | StoreError::Network(message) => {
                Self::Network(message)
            }
            StoreError::Server(message) | StoreError::Client(message) => Self::Store(message),
            StoreError::NotFound(message) => Self::NotFound(message),
            StoreError::Config(message) => Self::Config(message),
            StoreError::Timeout(duration) => {
                Self::Network(format!("store call timed out after {duration:?}"))
            }
        }
    }
}
