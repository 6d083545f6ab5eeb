//! Port interfaces for profile synchronization
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations for profile store operations.

use async_trait::async_trait;
use sprout_domain::{ProfileUpdate, Result, UserProfile};

/// Trait for the remote profile document store.
///
/// Each operation is an independent asynchronous call with its own
/// success/failure outcome. The store is the sole mutator of documents;
/// callers only issue intents.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Read the profile document for a user id.
    ///
    /// Returns `Ok(None)` when no document exists; `Err` only for
    /// transport or availability failures.
    async fn read_profile(&self, user_id: &str) -> Result<Option<UserProfile>>;

    /// Create the full initial document for a user id
    async fn create_profile(&self, user_id: &str, profile: &UserProfile) -> Result<()>;

    /// Apply a partial update to an existing document
    async fn update_profile(&self, user_id: &str, update: &ProfileUpdate) -> Result<()>;
}
