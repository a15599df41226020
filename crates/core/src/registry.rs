//! In-flight request registry
//!
//! Maps each [`RequestIdentity`] to the cancellation handle of the one
//! request currently allowed to settle for it. Per identity the lifecycle is
//! `Idle -> InFlight -> {Settled | Superseded}`:
//!
//! - [`InFlightRegistry::acquire`] supersedes (cancels and drops) any live
//!   entry before registering a fresh handle, so a newer call always wins.
//! - [`InFlightRegistry::release`] is compare-and-remove: a completion that
//!   arrives after its entry was replaced leaves the newer entry in place.
//! - [`InFlightRegistry::cancel_all`] drains everything on teardown.
//!
//! Every critical section is synchronous; the lock is never held across an
//! await point.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use chatwire_domain::CancelReason;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::request::RequestIdentity;

/// Cancellation handle for one dispatched request.
///
/// The registry keeps one clone; the dispatching call holds another (its
/// ticket). Both observe the same token and cancel reason.
#[derive(Debug, Clone)]
pub struct InFlightHandle {
    seq: u64,
    token: CancellationToken,
    reason: Arc<OnceLock<CancelReason>>,
}

impl InFlightHandle {
    fn new(seq: u64) -> Self {
        Self { seq, token: CancellationToken::new(), reason: Arc::new(OnceLock::new()) }
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Reason recorded by the first cancellation, if any.
    pub fn cancel_reason(&self) -> Option<CancelReason> {
        self.reason.get().copied()
    }

    /// Record `reason` (first one wins) and cancel the token.
    pub fn cancel(&self, reason: CancelReason) {
        let _ = self.reason.set(reason);
        self.token.cancel();
    }

    fn same_dispatch(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

/// Process-wide table of in-flight requests, one entry per identity.
///
/// Constructed once at startup and shared by reference (`Arc`), so tests can
/// build isolated instances.
#[derive(Debug, Default)]
pub struct InFlightRegistry {
    entries: Mutex<HashMap<RequestIdentity, InFlightHandle>>,
    next_seq: AtomicU64,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new dispatch for `identity`, superseding any live one.
    pub fn acquire(&self, identity: RequestIdentity) -> InFlightHandle {
        let handle = InFlightHandle::new(self.next_seq.fetch_add(1, Ordering::Relaxed));

        let previous = {
            let mut entries = self.entries.lock();
            entries.insert(identity.clone(), handle.clone())
        };

        if let Some(previous) = previous {
            previous.cancel(CancelReason::Superseded);
            debug!(
                %identity,
                superseded = previous.seq,
                current = handle.seq,
                "cancelled in-flight request: {}",
                CancelReason::Superseded
            );
        }

        handle
    }

    /// Remove `identity` only if it is still registered to `handle`.
    ///
    /// Returns `false` (and changes nothing) for a stale completion.
    pub fn release(&self, identity: &RequestIdentity, handle: &InFlightHandle) -> bool {
        let mut entries = self.entries.lock();
        match entries.get(identity) {
            Some(current) if current.same_dispatch(handle) => {
                entries.remove(identity);
                true
            }
            _ => false,
        }
    }

    /// Cancel every registered request and empty the registry.
    ///
    /// Returns how many requests were cancelled.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<_> = {
            let mut entries = self.entries.lock();
            entries.drain().collect()
        };

        for (_, handle) in &drained {
            handle.cancel(CancelReason::Teardown);
        }
        debug!(count = drained.len(), "cancelled all in-flight requests");
        drained.len()
    }

    pub fn contains(&self, identity: &RequestIdentity) -> bool {
        self.entries.lock().contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
