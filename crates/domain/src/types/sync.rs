//! Profile sync signal types
//!
//! Derived state published by the reconciler and observed read-only by the
//! presentation layer.

use serde::{Deserialize, Serialize};

/// Which store operation failed during a reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncErrorKind {
    /// Profile lookup could not complete
    ReadFailure,
    /// Initial document could not be persisted
    CreateFailure,
    /// Refresh could not be persisted
    UpdateFailure,
}

/// Snapshot of the derived sync signals.
///
/// `is_new_user` stays `None` until the first reconciliation for the current
/// identity completes, so the UI can distinguish "still determining" from a
/// definite verdict and from a failed sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
    pub is_new_user: Option<bool>,
    pub error: Option<SyncErrorKind>,
    pub in_flight: bool,
}

impl SyncStatus {
    /// Signal state before any reconciliation has run (or after sign-out)
    pub fn unknown() -> Self {
        Self { is_new_user: None, error: None, in_flight: false }
    }

    /// True once a reconciliation has produced a verdict for this identity
    pub fn is_settled(&self) -> bool {
        self.is_new_user.is_some() && self.error.is_none() && !self.in_flight
    }
}

impl Default for SyncStatus {
    fn default() -> Self {
        Self::unknown()
    }
}
