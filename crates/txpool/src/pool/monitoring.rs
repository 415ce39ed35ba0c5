//! Monitoring counters and consistency diagnostics.
//!
//! Everything here is telemetry: counters for tuning eviction
//! aggressiveness, trace events around eviction and selection, and an O(n)
//! reconciliation of the atomic aggregates against the index maps. The
//! reconciliation never runs on the hot path and divergence is logged, not
//! surfaced: transient drift is expected under concurrency.

use crate::{
    pool::{eviction::EvictionJournal, PoolInner},
    traits::PoolTransaction,
};
use alloy_primitives::TxHash;
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Instant,
};
use tracing::{trace, warn};

/// Resettable counters around additions and removals.
///
/// The between-selections counters are reset by every selection, the
/// during-eviction counters by every eviction run; both feed trace events
/// used to judge how much traffic the pool absorbs while those operations
/// run.
#[derive(Debug, Default)]
pub(crate) struct PoolStats {
    num_added_between_selections: AtomicU64,
    num_removed_between_selections: AtomicU64,
    num_added_during_eviction: AtomicU64,
    num_removed_during_eviction: AtomicU64,
}

impl PoolStats {
    fn reset_selection_window(&self) -> (u64, u64) {
        (
            self.num_added_between_selections.swap(0, Ordering::Relaxed),
            self.num_removed_between_selections.swap(0, Ordering::Relaxed),
        )
    }

    fn reset_eviction_window(&self) -> (u64, u64) {
        (
            self.num_added_during_eviction.swap(0, Ordering::Relaxed),
            self.num_removed_during_eviction.swap(0, Ordering::Relaxed),
        )
    }
}

// === impl PoolInner ===

impl<T: PoolTransaction> PoolInner<T> {
    pub(crate) fn monitor_tx_addition(&self) {
        self.stats.num_added_between_selections.fetch_add(1, Ordering::Relaxed);
        if self.eviction_in_progress.load(Ordering::Acquire) {
            self.stats.num_added_during_eviction.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn monitor_tx_removal(&self) {
        self.stats.num_removed_between_selections.fetch_add(1, Ordering::Relaxed);
        if self.eviction_in_progress.load(Ordering::Acquire) {
            self.stats.num_removed_during_eviction.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// A removal found its target already gone from the sender index: the
    /// eviction engine purged it concurrently. Informational only.
    pub(crate) fn on_remove_inconsistency(&self, hash: &TxHash) {
        trace!(target: "txpool", %hash, "detected index sync inconsistency on removal");
    }

    pub(crate) fn monitor_eviction_start(&self) -> Instant {
        trace!(
            target: "txpool",
            bytes = self.num_bytes(),
            txs = self.len(),
            senders = self.count_senders(),
            "eviction started"
        );
        self.display_senders_histogram();
        Instant::now()
    }

    pub(crate) fn monitor_eviction_end(&self, started: Instant, journal: &EvictionJournal) {
        let (num_added, num_removed) = self.stats.reset_eviction_window();
        trace!(
            target: "txpool",
            duration = ?started.elapsed(),
            bytes = self.num_bytes(),
            txs = self.len(),
            senders = self.count_senders(),
            num_added_during_eviction = num_added,
            num_removed_during_eviction = num_removed,
            "eviction ended"
        );
        trace!(
            target: "txpool",
            txs = journal.pass_one_num_txs,
            senders = journal.pass_one_num_senders,
            "eviction pass 1"
        );
        trace!(
            target: "txpool",
            txs = journal.pass_two_num_txs,
            senders = journal.pass_two_num_senders,
            steps = journal.pass_two_num_steps,
            "eviction pass 2"
        );
        self.display_senders_histogram();
    }

    pub(crate) fn monitor_selection_start(&self) -> Instant {
        trace!(
            target: "txpool",
            bytes = self.num_bytes(),
            txs = self.len(),
            senders = self.count_senders(),
            "selection started"
        );
        Instant::now()
    }

    pub(crate) fn monitor_selection_end(&self, started: Instant, num_selected: usize) {
        let (num_added, num_removed) = self.stats.reset_selection_window();
        trace!(
            target: "txpool",
            duration = ?started.elapsed(),
            num_selected,
            num_added_between_selections = num_added,
            num_removed_between_selections = num_removed,
            "selection ended"
        );
    }

    fn display_senders_histogram(&self) {
        trace!(
            target: "txpool",
            chunks = ?self.by_sender.chunk_counts(),
            score_buckets = ?self.by_sender.bucket_counts(),
            "senders histogram"
        );
    }

    /// Recounts both indexes and compares them against the atomic
    /// aggregates.
    ///
    /// O(n); reserved for diagnostics and tests, never the hot path.
    /// Divergence under concurrent traffic is expected and only logged at
    /// warn level, the operation itself always succeeds.
    pub(crate) fn diagnose(&self) {
        let started = Instant::now();

        let num_txs_estimate = self.len();
        let num_txs_in_chunks = self.by_hash.count();
        let num_tx_keys = self.by_hash.keys().len();

        let num_senders_estimate = self.count_senders();
        let num_senders_in_chunks = self.by_sender.count();
        let num_senders_in_buckets = self.by_sender.count_sorted();
        let num_sender_keys = self.by_sender.keys().len();
        let num_sender_keys_sorted = self.by_sender.keys_sorted().len();

        let snapshot = self.by_sender.snapshot_ascending();
        let snapshot_len = snapshot.len();
        let num_bytes_estimate = self.num_bytes() as u64;
        let num_bytes_in_lists =
            snapshot.iter().map(|entry| entry.list.lock().bytes()).sum::<u64>();

        let fine = num_senders_estimate == num_senders_in_chunks &&
            num_senders_estimate == num_senders_in_buckets &&
            num_sender_keys == num_sender_keys_sorted &&
            num_sender_keys == snapshot_len &&
            num_senders_estimate == num_sender_keys &&
            num_txs_estimate == num_txs_in_chunks &&
            num_txs_estimate == num_tx_keys &&
            num_bytes_estimate == num_bytes_in_lists;

        macro_rules! report {
            ($level:ident) => {
                $level!(
                    target: "txpool",
                    duration = ?started.elapsed(),
                    fine,
                    num_bytes_estimate,
                    num_bytes_in_lists,
                    max_bytes = self.config.max_bytes,
                    num_txs_estimate,
                    num_txs_in_chunks,
                    num_tx_keys,
                    num_senders_estimate,
                    num_senders_in_chunks,
                    num_senders_in_buckets,
                    num_sender_keys,
                    num_sender_keys_sorted,
                    snapshot_len,
                    "diagnose"
                );
            };
        }
        if fine {
            report!(trace);
        } else {
            report!(warn);
        }
    }
}
