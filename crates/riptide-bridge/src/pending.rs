//! Correlation table for in-flight capability calls.
//!
//! The table is the only shared mutable state in the bridge. Entries are
//! inserted by the dispatcher and removed by the router (or the expiry
//! sweep); each operation is a single map critical section, so concurrent
//! response deliveries cannot settle the same call twice.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use riptide_core::SequenceId;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::bridge::{CallError, CallOutcome};
use crate::capability::Capability;

/// One in-flight call: the send half of its completion plus bookkeeping.
struct PendingCall {
    tx: oneshot::Sender<CallOutcome>,
    capability: Capability,
    registered_at: Instant,
}

/// Counters kept by a bridge instance for diagnostics.
#[derive(Debug, Default)]
pub struct BridgeStats {
    /// Calls handed to the transport.
    pub dispatched: AtomicU64,
    /// Completions settled with a success payload.
    pub resolved: AtomicU64,
    /// Completions settled with a failure.
    pub rejected: AtomicU64,
    /// Responses dropped because no pending call matched their sequence
    /// number (stray or duplicate delivery).
    pub stray_responses: AtomicU64,
    /// Calls rejected by the expiry sweep.
    pub timed_out: AtomicU64,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub dispatched: u64,
    pub resolved: u64,
    pub rejected: u64,
    pub stray_responses: u64,
    pub timed_out: u64,
    /// Calls currently awaiting a response.
    pub in_flight: usize,
}

/// Maps outstanding sequence numbers to their pending completions.
///
/// Owned by one bridge instance; initialized empty with the counter at
/// zero, never torn down before the instance itself.
pub(crate) struct CorrelationTable {
    entries: DashMap<SequenceId, PendingCall>,
    next_sequence: AtomicU64,
    stats: BridgeStats,
}

impl CorrelationTable {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            next_sequence: AtomicU64::new(0),
            stats: BridgeStats::default(),
        }
    }

    /// Allocate the next sequence id. Strictly increasing; the first id a
    /// table hands out is 1.
    pub fn allocate(&self) -> SequenceId {
        SequenceId(self.next_sequence.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Register a completion under `sequence` and return the receive half.
    pub fn register(
        &self,
        sequence: SequenceId,
        capability: Capability,
    ) -> oneshot::Receiver<CallOutcome> {
        let (tx, rx) = oneshot::channel();
        let previous = self.entries.insert(
            sequence,
            PendingCall {
                tx,
                capability,
                registered_at: Instant::now(),
            },
        );
        debug_assert!(previous.is_none(), "sequence ids are never reused");
        self.stats.dispatched.fetch_add(1, Ordering::Relaxed);
        debug!(sequence = %sequence, capability = %capability, "registered pending call");
        rx
    }

    /// Settle the call registered under `sequence`, if any.
    ///
    /// The entry is removed before the completion is signalled, so a second
    /// response carrying the same sequence number finds nothing and is
    /// counted as stray. Returns whether a pending call was settled.
    pub fn settle(&self, sequence: SequenceId, outcome: CallOutcome) -> bool {
        let Some((_, call)) = self.entries.remove(&sequence) else {
            self.stats.stray_responses.fetch_add(1, Ordering::Relaxed);
            debug!(sequence = %sequence, "response without a pending call, dropped");
            return false;
        };

        match &outcome {
            Ok(_) => self.stats.resolved.fetch_add(1, Ordering::Relaxed),
            Err(_) => self.stats.rejected.fetch_add(1, Ordering::Relaxed),
        };

        if call.tx.send(outcome).is_err() {
            debug!(
                sequence = %sequence,
                capability = %call.capability,
                "caller dropped completion before settlement"
            );
        }
        true
    }

    /// Reject and remove every call that has waited longer than `timeout`.
    /// Returns how many calls expired.
    pub fn sweep_expired(&self, timeout: Duration) -> usize {
        let now = Instant::now();
        let expired: Vec<SequenceId> = self
            .entries
            .iter()
            .filter(|entry| now.duration_since(entry.value().registered_at) > timeout)
            .map(|entry| *entry.key())
            .collect();

        let mut removed = 0;
        for sequence in expired {
            // A response may have raced us here; only count what we remove.
            if let Some((_, call)) = self.entries.remove(&sequence) {
                self.stats.timed_out.fetch_add(1, Ordering::Relaxed);
                warn!(
                    sequence = %sequence,
                    capability = %call.capability,
                    timeout_ms = timeout.as_millis() as u64,
                    "pending call expired without a response"
                );
                let _ = call.tx.send(Err(CallError::TimedOut));
                removed += 1;
            }
        }
        removed
    }

    /// Number of calls awaiting a response.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `sequence` still has a pending call.
    pub fn contains(&self, sequence: SequenceId) -> bool {
        self.entries.contains_key(&sequence)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            dispatched: self.stats.dispatched.load(Ordering::Relaxed),
            resolved: self.stats.resolved.load(Ordering::Relaxed),
            rejected: self.stats.rejected.load(Ordering::Relaxed),
            stray_responses: self.stats.stray_responses.load(Ordering::Relaxed),
            timed_out: self.stats.timed_out.load(Ordering::Relaxed),
            in_flight: self.entries.len(),
        }
    }
}
