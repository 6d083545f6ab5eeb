//! Identity listener error types

use sprout_domain::SproutError;
use thiserror::Error;

/// Listener-specific errors
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Listener is already running
    #[error("Identity listener already running")]
    AlreadyRunning,

    /// Listener is not running
    #[error("Identity listener not running")]
    NotRunning,

    /// Operation timed out
    #[error("Operation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Task join failed
    #[error("Task join failed: {0}")]
    TaskJoinFailed(String),
}

impl From<ListenerError> for SproutError {
    fn from(err: ListenerError) -> Self {
        match err {
            ListenerError::AlreadyRunning | ListenerError::NotRunning => {
                SproutError::InvalidInput(err.to_string())
            }
            ListenerError::Timeout { .. } | ListenerError::TaskJoinFailed(_) => {
                SproutError::Internal(err.to_string())
            }
        }
    }
}

/// Convenience type alias for listener operations
pub type ListenerResult<T> = Result<T, ListenerError>;
