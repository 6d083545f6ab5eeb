//! User profile types
//!
//! Per-user document persisted in the remote profile store, keyed by the
//! identity id. Combines fields mirrored from the authentication provider
//! with gamification counters owned by the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{INITIAL_HEALTH, INITIAL_PLANT_LEVEL, INITIAL_QUESTIONS_ANSWERED};
use crate::types::identity::Identity;

/// User profile document stored in the remote profile store.
///
/// The identity id is the document address, not a document field.
/// `email`, `full_name` and `last_login_at` mirror the identity at the last
/// successful sync; the remaining fields are written once at creation and
/// never overwritten by a sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub full_name: String,
    pub last_login_at: DateTime<Utc>,
    pub health: u32,
    pub plant_level: u32,
    pub questions_answered: u32,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Build the full first-login document for an identity.
    ///
    /// Gamification counters start at their defaults; `created_at` and
    /// `last_login_at` are both stamped with the reconciliation time.
    pub fn initial(identity: &Identity, now: DateTime<Utc>) -> Self {
        Self {
            email: identity.email_or_default(),
            full_name: identity.full_name(),
            last_login_at: now,
            health: INITIAL_HEALTH,
            plant_level: INITIAL_PLANT_LEVEL,
            questions_answered: INITIAL_QUESTIONS_ANSWERED,
            created_at: now,
        }
    }

    /// Apply a partial refresh to an existing document.
    ///
    /// Only the mirrored identity fields change; counters and `created_at`
    /// are untouched. Used by in-memory store implementations and tests to
    /// model the store-side merge of a partial update.
    pub fn apply(&mut self, update: &ProfileUpdate) {
        self.email = update.email.clone();
        self.full_name = update.full_name.clone();
        self.last_login_at = update.last_login_at;
    }
}

/// Partial update payload for an existing profile document.
///
/// Carries only the mirrored identity fields and the refreshed login
/// timestamp. Gamification counters and `created_at` have no representation
/// here, so a sync can never clobber them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub email: String,
    pub full_name: String,
    pub last_login_at: DateTime<Utc>,
}

impl ProfileUpdate {
    /// Build the refresh payload for an identity at the given sync time
    pub fn from_identity(identity: &Identity, now: DateTime<Utc>) -> Self {
        Self {
            email: identity.email_or_default(),
            full_name: identity.full_name(),
            last_login_at: now,
        }
    }
}
