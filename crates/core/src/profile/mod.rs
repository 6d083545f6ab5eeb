//! Profile synchronization: ports and the reconciler service

pub mod ports;
pub mod service;

pub use ports::ProfileStore;
pub use service::{ProfileSyncService, ReconcileOutcome};
