//! Sync outcome reporting.

use serde::{Deserialize, Serialize};

use nimbus_cloud::SyncScope;
use nimbus_core::{ResourceKind, Vendor};

/// One failed (scope, resource kind) sync unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncFailure {
    pub scope: SyncScope,
    pub kind: ResourceKind,
    pub error: String,
}

/// Outcome of one sync run.
///
/// Partial success is a first-class outcome: a report may carry failures
/// while every other independent unit still ran. Failures appear in
/// iteration order, so `first_failure` is the first error encountered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    pub vendor: Vendor,
    pub account_id: String,
    /// Leaf (scope, kind) pairs attempted.
    pub attempted: usize,
    /// Resource records upserted into the local store.
    pub synced_records: usize,
    pub failures: Vec<SyncFailure>,
}

impl SyncReport {
    pub fn new(vendor: Vendor, account_id: impl Into<String>) -> Self {
        Self {
            vendor,
            account_id: account_id.into(),
            attempted: 0,
            synced_records: 0,
            failures: Vec::new(),
        }
    }

    pub fn record_failure(&mut self, scope: SyncScope, kind: ResourceKind, error: String) {
        self.failures.push(SyncFailure { scope, kind, error });
    }

    /// First leaf error encountered, if any.
    pub fn first_failure(&self) -> Option<&SyncFailure> {
        self.failures.first()
    }

    pub fn fully_synced(&self) -> bool {
        self.failures.is_empty()
    }

    /// Collapse the report into the bare first-error view for callers that
    /// only care whether everything synced.
    pub fn result(&self) -> Result<(), &SyncFailure> {
        match self.first_failure() {
            None => Ok(()),
            Some(failure) => Err(failure),
        }
    }
}
