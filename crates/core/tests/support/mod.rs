//! Mock profile store for reconciler tests
//!
//! In-memory implementation of the `ProfileStore` port with call recording,
//! per-operation failure injection, and read gating for concurrency tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sprout_core::ProfileStore;
use sprout_domain::{ProfileUpdate, Result as DomainResult, SproutError, UserProfile};
use tokio::sync::Semaphore;

/// One recorded store operation
#[derive(Debug, Clone)]
pub enum StoreCall {
    Read(String),
    Create(String, UserProfile),
    Update(String, ProfileUpdate),
}

/// In-memory mock for `ProfileStore`.
///
/// Records every call in order so tests can assert exactly which intents the
/// reconciler issued. Failure flags are atomic so a test can flip an
/// operation between triggers.
#[derive(Default)]
pub struct MockProfileStore {
    documents: Mutex<HashMap<String, UserProfile>>,
    calls: Mutex<Vec<StoreCall>>,
    fail_reads: AtomicBool,
    fail_creates: AtomicBool,
    fail_updates: AtomicBool,
    read_gate: Mutex<Option<Arc<Semaphore>>>,
}

impl MockProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the mock with an existing document
    pub fn with_profile(self, user_id: &str, profile: UserProfile) -> Self {
        self.documents.lock().unwrap().insert(user_id.to_string(), profile);
        self
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    /// Block every read on a zero-permit semaphore.
    ///
    /// The returned handle releases one read per added permit, letting tests
    /// hold a reconciliation inside its read suspension point.
    pub fn gate_reads(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.read_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    /// All recorded calls, in issue order
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of reads issued so far
    pub fn read_count(&self) -> usize {
        self.calls().iter().filter(|call| matches!(call, StoreCall::Read(_))).count()
    }

    /// Recorded create payloads
    pub fn create_calls(&self) -> Vec<(String, UserProfile)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                StoreCall::Create(id, profile) => Some((id, profile)),
                _ => None,
            })
            .collect()
    }

    /// Recorded update payloads
    pub fn update_calls(&self) -> Vec<(String, ProfileUpdate)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                StoreCall::Update(id, update) => Some((id, update)),
                _ => None,
            })
            .collect()
    }

    /// Current document for a user id
    pub fn document(&self, user_id: &str) -> Option<UserProfile> {
        self.documents.lock().unwrap().get(user_id).cloned()
    }
}

#[async_trait]
impl ProfileStore for MockProfileStore {
    async fn read_profile(&self, user_id: &str) -> DomainResult<Option<UserProfile>> {
        self.calls.lock().unwrap().push(StoreCall::Read(user_id.to_string()));

        let gate = self.read_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|_| SproutError::Internal("read gate closed".into()))?;
            permit.forget();
        }

        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(SproutError::Network("simulated read outage".into()));
        }
        Ok(self.documents.lock().unwrap().get(user_id).cloned())
    }

    async fn create_profile(&self, user_id: &str, profile: &UserProfile) -> DomainResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(StoreCall::Create(user_id.to_string(), profile.clone()));

        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(SproutError::Store("simulated create failure".into()));
        }
        self.documents.lock().unwrap().insert(user_id.to_string(), profile.clone());
        Ok(())
    }

    async fn update_profile(&self, user_id: &str, update: &ProfileUpdate) -> DomainResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(StoreCall::Update(user_id.to_string(), update.clone()));

        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(SproutError::Store("simulated update failure".into()));
        }
        let mut documents = self.documents.lock().unwrap();
        let profile = documents
            .get_mut(user_id)
            .ok_or_else(|| SproutError::NotFound(format!("no document for {user_id}")))?;
        profile.apply(update);
        Ok(())
    }
}
