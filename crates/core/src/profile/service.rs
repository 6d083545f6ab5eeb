//! Profile sync reconciler - core business logic
//!
//! Runs one read-then-branch upsert cycle per identity trigger and owns the
//! derived signals (`is_new_user`, `error`, `in_flight`) observed by the
//! presentation layer. At most one reconciliation is in flight per identity
//! id; results for an identity that changed mid-flight are discarded.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use sprout_domain::{
    Identity, ProfileUpdate, Result, SproutError, SyncErrorKind, SyncStatus, UserProfile,
};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, instrument, warn};

use super::ports::ProfileStore;

/// Outcome of a single reconciliation trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// No document existed; the initial document was created
    Created,
    /// A document existed; the mirrored fields were refreshed
    Updated,
    /// A reconciliation for the same identity was already in flight
    Coalesced,
    /// The identity changed mid-flight; the result was discarded
    Discarded,
}

/// Admission decision for a reconciliation trigger
enum Begin {
    Run(u64),
    Coalesced,
    Stale,
}

/// Trigger-diff and stale-discard bookkeeping
struct SyncState {
    /// Bumped on sign-out and account switch; publications are checked
    /// against the value captured at reconciliation start
    generation: u64,
    /// Identity id the signals currently describe
    current_id: Option<String>,
    /// Identity ids with a reconciliation in flight
    in_flight: HashSet<String>,
}

/// Profile sync reconciler service
pub struct ProfileSyncService {
    store: Arc<dyn ProfileStore>,
    state: Mutex<SyncState>,
    status_tx: watch::Sender<SyncStatus>,
}

impl ProfileSyncService {
    /// Create a new reconciler over the given profile store
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        let (status_tx, _) = watch::channel(SyncStatus::unknown());
        Self {
            store,
            state: Mutex::new(SyncState {
                generation: 0,
                current_id: None,
                in_flight: HashSet::new(),
            }),
            status_tx,
        }
    }

    /// Subscribe to the derived sync signals.
    ///
    /// The receiver observes every published `SyncStatus` snapshot; consumers
    /// never mutate signals through this interface.
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status_tx.subscribe()
    }

    /// Current signal snapshot
    pub fn status(&self) -> SyncStatus {
        self.status_tx.borrow().clone()
    }

    /// Observe the latest identity value from the provider.
    ///
    /// Diffs against the previously seen identity and returns the identity to
    /// reconcile when a cycle should run: first sighting, a distinct account,
    /// or a re-trigger after an attempt that did not settle. Redundant
    /// triggers for an already-settled identity return `None`.
    ///
    /// A `None` identity (signed out) clears the signals and invalidates any
    /// reconciliation still in flight for the previous account.
    pub async fn identity_changed(&self, identity: Option<&Identity>) -> Option<Identity> {
        let mut state = self.state.lock().await;

        let Some(identity) = identity else {
            if state.current_id.take().is_some() {
                state.generation += 1;
                self.status_tx.send_replace(SyncStatus::unknown());
                debug!("identity cleared; sync signals reset");
            }
            return None;
        };

        if state.current_id.as_deref() == Some(identity.id.as_str()) {
            if self.status_tx.borrow().is_settled() {
                debug!(user_id = %identity.id, "identity unchanged; skipping reconcile");
                return None;
            }
            // Unsettled: either a retry after failure, or a duplicate
            // delivery that the in-flight guard will coalesce.
            return Some(identity.clone());
        }

        state.current_id = Some(identity.id.clone());
        state.generation += 1;
        self.status_tx.send_replace(SyncStatus::unknown());
        Some(identity.clone())
    }

    /// Run one reconciliation cycle for an identity.
    ///
    /// Reads the profile document, then issues exactly one of create or
    /// update. Store failures are translated into the matching
    /// [`SyncErrorKind`], published, and returned to the caller; signals for
    /// a stale identity are never touched.
    #[instrument(skip_all, fields(user_id = %identity.id))]
    pub async fn reconcile(&self, identity: &Identity) -> Result<ReconcileOutcome> {
        let generation = match self.begin(identity).await {
            Begin::Run(generation) => generation,
            Begin::Coalesced => return Ok(ReconcileOutcome::Coalesced),
            Begin::Stale => return Ok(ReconcileOutcome::Discarded),
        };

        let cycle = self.run_cycle(identity).await;

        let published = self.complete(identity, generation, &cycle).await;

        match cycle {
            Ok(created) => {
                if !published {
                    return Ok(ReconcileOutcome::Discarded);
                }
                if created {
                    info!("created initial profile document");
                    Ok(ReconcileOutcome::Created)
                } else {
                    debug!("refreshed existing profile document");
                    Ok(ReconcileOutcome::Updated)
                }
            }
            Err((kind, err)) => {
                warn!(error = %err, kind = ?kind, "profile reconciliation failed");
                Err(err)
            }
        }
    }

    /// Register the in-flight guard entry and publish the loading signal.
    ///
    /// Returns the generation captured for this cycle, or the reason the
    /// trigger was dropped: another cycle already running for the same
    /// identity, or the identity no longer being the current one.
    async fn begin(&self, identity: &Identity) -> Begin {
        let mut state = self.state.lock().await;
        if state.current_id.as_deref().is_some_and(|id| id != identity.id) {
            debug!("trigger outlived its identity; dropping");
            return Begin::Stale;
        }
        if !state.in_flight.insert(identity.id.clone()) {
            debug!("reconciliation already in flight; coalescing trigger");
            return Begin::Coalesced;
        }
        self.status_tx.send_modify(|status| {
            status.in_flight = true;
            status.error = None;
        });
        Begin::Run(state.generation)
    }

    /// Read-then-branch against the store.
    ///
    /// Returns `Ok(true)` when the initial document was created, `Ok(false)`
    /// when an existing document was refreshed. Both payloads are constructed
    /// fully before the single write call.
    async fn run_cycle(
        &self,
        identity: &Identity,
    ) -> std::result::Result<bool, (SyncErrorKind, SproutError)> {
        let existing = self
            .store
            .read_profile(&identity.id)
            .await
            .map_err(|err| (SyncErrorKind::ReadFailure, err))?;

        let now = Utc::now();
        if existing.is_none() {
            let profile = UserProfile::initial(identity, now);
            self.store
                .create_profile(&identity.id, &profile)
                .await
                .map_err(|err| (SyncErrorKind::CreateFailure, err))?;
            Ok(true)
        } else {
            let update = ProfileUpdate::from_identity(identity, now);
            self.store
                .update_profile(&identity.id, &update)
                .await
                .map_err(|err| (SyncErrorKind::UpdateFailure, err))?;
            Ok(false)
        }
    }

    /// Release the in-flight guard and publish the outcome.
    ///
    /// Returns `false` when the generation moved on while the cycle ran, in
    /// which case the signals are left untouched.
    async fn complete(
        &self,
        identity: &Identity,
        generation: u64,
        cycle: &std::result::Result<bool, (SyncErrorKind, SproutError)>,
    ) -> bool {
        let mut state = self.state.lock().await;
        state.in_flight.remove(&identity.id);

        if state.generation != generation {
            debug!("identity changed mid-flight; discarding stale result");
            return false;
        }

        self.status_tx.send_modify(|status| {
            status.in_flight = false;
            match cycle {
                Ok(created) => {
                    status.is_new_user = Some(*created);
                    status.error = None;
                }
                Err((kind, _)) => {
                    status.error = Some(*kind);
                }
            }
        });
        true
    }
}
