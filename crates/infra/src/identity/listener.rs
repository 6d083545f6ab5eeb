//! Identity listener driving the profile reconciler.
//!
//! Observes the current-identity watch channel and hands every change to
//! `ProfileSyncService::identity_changed`; accepted triggers spawn one
//! reconciliation task each. The watch channel only retains the latest value,
//! so rapid identity churn collapses to the newest snapshot. Lifecycle is
//! explicit: join handle tracked, cancellation via token, join timeout on
//! stop.

use std::sync::Arc;
use std::time::Duration;

use sprout_core::ProfileSyncService;
use sprout_domain::{Identity, SyncConfig};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use super::error::{ListenerError, ListenerResult};

/// Type alias for task handle to avoid complexity warnings
type TaskHandle = Arc<Mutex<Option<JoinHandle<()>>>>;

/// Create the channel the embedding process publishes identities into.
///
/// The receiver half is handed to [`IdentityListener`]; the sender half stays
/// with whatever owns the session state. The channel starts signed out.
pub fn identity_channel() -> (watch::Sender<Option<Identity>>, watch::Receiver<Option<Identity>>)
{
    watch::channel(None)
}

/// Configuration for the identity listener
#[derive(Debug, Clone)]
pub struct IdentityListenerConfig {
    /// Join timeout when stopping
    pub join_timeout: Duration,
}

impl Default for IdentityListenerConfig {
    fn default() -> Self {
        Self { join_timeout: Duration::from_secs(5) }
    }
}

impl From<&SyncConfig> for IdentityListenerConfig {
    fn from(config: &SyncConfig) -> Self {
        Self { join_timeout: Duration::from_secs(config.join_timeout_seconds) }
    }
}

/// Identity listener with explicit lifecycle management
pub struct IdentityListener {
    service: Arc<ProfileSyncService>,
    identities: watch::Receiver<Option<Identity>>,
    config: IdentityListenerConfig,
    cancellation_token: CancellationToken,
    task_handle: TaskHandle,
}

impl IdentityListener {
    /// Create a new listener with default configuration
    pub fn new(
        service: Arc<ProfileSyncService>,
        identities: watch::Receiver<Option<Identity>>,
    ) -> Self {
        Self::with_config(service, identities, IdentityListenerConfig::default())
    }

    /// Create a new listener with custom configuration
    pub fn with_config(
        service: Arc<ProfileSyncService>,
        identities: watch::Receiver<Option<Identity>>,
        config: IdentityListenerConfig,
    ) -> Self {
        Self {
            service,
            identities,
            config,
            cancellation_token: CancellationToken::new(),
            task_handle: Arc::new(Mutex::new(None)),
        }
    }

    /// Start the listener
    ///
    /// Spawns a background task that reacts to identity changes.
    ///
    /// # Errors
    ///
    /// Returns error if the listener is already running
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> ListenerResult<()> {
        if self.is_running() {
            return Err(ListenerError::AlreadyRunning);
        }

        info!("Starting identity listener");

        // Create a new cancellation token (supports restart after stop)
        self.cancellation_token = CancellationToken::new();

        let service = Arc::clone(&self.service);
        let identities = self.identities.clone();
        let cancel = self.cancellation_token.clone();

        let handle = tokio::spawn(async move {
            Self::listen_loop(service, identities, cancel).await;
        });

        *self.task_handle.lock().await = Some(handle);

        info!("Identity listener started");
        Ok(())
    }

    /// Stop the listener gracefully
    ///
    /// Cancels the background task and awaits completion. Reconciliation
    /// tasks already spawned run to completion on their own; their results
    /// are stale-guarded by the service.
    ///
    /// # Errors
    ///
    /// Returns error if the listener is not running
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> ListenerResult<()> {
        if !self.is_running() {
            return Err(ListenerError::NotRunning);
        }

        info!("Stopping identity listener");

        // Cancel background task
        self.cancellation_token.cancel();

        // Await handle with timeout
        if let Some(handle) = self.task_handle.lock().await.take() {
            tokio::time::timeout(self.config.join_timeout, handle)
                .await
                .map_err(|_| ListenerError::Timeout {
                    seconds: self.config.join_timeout.as_secs(),
                })?
                .map_err(|err| ListenerError::TaskJoinFailed(err.to_string()))?;
        }

        info!("Identity listener stopped");
        Ok(())
    }

    /// Check if the listener is running
    ///
    /// A listener is considered running if it has an active task handle that
    /// hasn't finished.
    pub fn is_running(&self) -> bool {
        self.task_handle
            .try_lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    /// Background listen loop
    async fn listen_loop(
        service: Arc<ProfileSyncService>,
        mut identities: watch::Receiver<Option<Identity>>,
        cancel: CancellationToken,
    ) {
        loop {
            // Latest snapshot only; intermediate values are intentionally lost
            let identity = identities.borrow_and_update().clone();

            if let Some(identity) = service.identity_changed(identity.as_ref()).await {
                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    match service.reconcile(&identity).await {
                        Ok(outcome) => {
                            debug!(user_id = %identity.id, outcome = ?outcome, "reconciliation finished");
                        }
                        Err(err) => {
                            error!(user_id = %identity.id, error = %err, "reconciliation failed");
                        }
                    }
                });
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Identity listen loop cancelled");
                    break;
                }
                changed = identities.changed() => {
                    if changed.is_err() {
                        debug!("Identity channel closed; stopping listener");
                        break;
                    }
                }
            }
        }
    }
}

/// Ensure the listener is stopped when dropped
impl Drop for IdentityListener {
    fn drop(&mut self) {
        // Note: Can't check task_handle (async), so check if token is not cancelled
        // This is best-effort cleanup in Drop
        if !self.cancellation_token.is_cancelled() {
            self.cancellation_token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use sprout_core::ProfileStore;
    use sprout_domain::{ProfileUpdate, Result as DomainResult, UserProfile};

    use super::*;

    /// Store stub that records documents in memory
    #[derive(Default)]
    struct InMemoryStore {
        documents: StdMutex<HashMap<String, UserProfile>>,
    }

    #[async_trait]
    impl ProfileStore for InMemoryStore {
        async fn read_profile(&self, user_id: &str) -> DomainResult<Option<UserProfile>> {
            Ok(self.documents.lock().unwrap().get(user_id).cloned())
        }

        async fn create_profile(
            &self,
            user_id: &str,
            profile: &UserProfile,
        ) -> DomainResult<()> {
            self.documents.lock().unwrap().insert(user_id.to_string(), profile.clone());
            Ok(())
        }

        async fn update_profile(
            &self,
            user_id: &str,
            update: &ProfileUpdate,
        ) -> DomainResult<()> {
            let mut documents = self.documents.lock().unwrap();
            if let Some(profile) = documents.get_mut(user_id) {
                profile.apply(update);
            }
            Ok(())
        }
    }

    fn test_service() -> Arc<ProfileSyncService> {
        Arc::new(ProfileSyncService::new(Arc::new(InMemoryStore::default())))
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_listener_lifecycle() {
        let (_tx, rx) = identity_channel();
        let mut listener = IdentityListener::new(test_service(), rx);

        // Initially not running
        assert!(!listener.is_running());

        // Start succeeds
        listener.start().await.unwrap();
        assert!(listener.is_running());

        // Stop succeeds
        listener.stop().await.unwrap();
        assert!(!listener.is_running());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_double_start_fails() {
        let (_tx, rx) = identity_channel();
        let mut listener = IdentityListener::new(test_service(), rx);

        listener.start().await.unwrap();

        // Second start should fail
        let result = listener.start().await;
        assert!(matches!(result, Err(ListenerError::AlreadyRunning)));

        listener.stop().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_stop_without_start_fails() {
        let (_tx, rx) = identity_channel();
        let mut listener = IdentityListener::new(test_service(), rx);

        let result = listener.stop().await;
        assert!(matches!(result, Err(ListenerError::NotRunning)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_listener_stops_when_channel_closes() {
        let (tx, rx) = identity_channel();
        let mut listener = IdentityListener::new(test_service(), rx);

        listener.start().await.unwrap();
        drop(tx);

        // The loop should observe the closed channel and exit
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!listener.is_running());
    }
}
