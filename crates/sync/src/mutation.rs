//! Shared steps of the optimistic write path.
//!
//! Every mutation edits its containers locally, issues the remote call, and
//! then refetches the affected containers whatever the outcome. The refetch
//! restores authoritative state on failure and picks up server-assigned
//! fields on success.

use core::sync::atomic::{AtomicU64, Ordering};

use encore_primitives::api::ApiResult;
use tracing::{debug, warn};

/// Source of sequence numbers for locally minted `pending-` ids.
#[derive(Debug)]
pub struct PendingIds {
    next: AtomicU64,
}

impl PendingIds {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    pub fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for PendingIds {
    fn default() -> Self {
        Self::new()
    }
}

/// Logs a reconciliation fetch that failed. The container already carries the
/// error, so the mutation outcome is not affected.
pub(crate) fn log_reconcile<T>(mutation: &'static str, resource: &'static str, result: &ApiResult<T>) {
    if let Err(err) = result {
        warn!(
            mutation,
            resource,
            kind = %err.kind(),
            %err,
            "Reconciliation fetch failed"
        );
    }
}

/// Logs the remote outcome of a mutation and hands it back unchanged.
pub(crate) fn finish<T>(mutation: &'static str, outcome: ApiResult<T>) -> ApiResult<T> {
    match &outcome {
        Ok(_) => debug!(mutation, "Mutation confirmed"),
        Err(err) => warn!(
            mutation,
            kind = %err.kind(),
            %err,
            "Mutation failed, local state rolled back"
        ),
    }

    outcome
}
