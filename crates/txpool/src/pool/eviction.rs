//! The two-pass eviction engine.
//!
//! Eviction runs inline on the adding thread that pushed the pool over a
//! threshold, gated by a compare-and-swap so at most one run executes
//! cache-wide. Losers of the race return immediately; the winner evicts on
//! behalf of everyone. Both passes are bounded and idempotent, and neither
//! blocks traffic on chunks it is not currently mutating.

use crate::{pool::PoolInner, traits::PoolTransaction, validate::ValidPoolTransaction};
use std::sync::{atomic::Ordering, Arc};
use tracing::warn;

/// A short journal of one eviction run, kept for debugging and for reasoning
/// about eviction aggressiveness.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub(crate) struct EvictionJournal {
    /// Transactions trimmed by the per-sender cap pass.
    pub(crate) pass_one_num_txs: u64,
    /// Senders touched by the per-sender cap pass.
    pub(crate) pass_one_num_senders: u64,
    /// Transactions dropped by the stepped global pass.
    pub(crate) pass_two_num_txs: u64,
    /// Senders dropped by the stepped global pass.
    pub(crate) pass_two_num_senders: u64,
    /// Steps the global pass took before the pool was back under threshold.
    pub(crate) pass_two_num_steps: u64,
}

impl EvictionJournal {
    /// Total number of transactions dropped by the run.
    pub(crate) const fn num_txs(&self) -> u64 {
        self.pass_one_num_txs + self.pass_two_num_txs
    }
}

// === impl PoolInner ===

impl<T: PoolTransaction> PoolInner<T> {
    /// Runs eviction unless another run is already in progress.
    ///
    /// The caller that loses the compare-and-swap proceeds without blocking;
    /// the in-flight run evicts on its behalf. Returns the journal of the
    /// run when this caller performed it.
    pub(crate) fn evict_if_idle(&self) -> Option<EvictionJournal> {
        if self
            .eviction_in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None
        }

        let started = self.monitor_eviction_start();
        let journal = self.evict();
        self.metrics.eviction_runs.increment(1);
        self.metrics.evicted_transactions.increment(journal.num_txs());
        self.monitor_eviction_end(started, &journal);
        self.eviction_in_progress.store(false, Ordering::Release);
        Some(journal)
    }

    /// The eviction algorithm. Requires the eviction gate to be held.
    fn evict(&self) -> EvictionJournal {
        let mut journal = EvictionJournal::default();
        self.evict_oversized_senders(&mut journal);
        if self.is_capacity_exceeded() {
            self.evict_worst_senders_stepwise(&mut journal);
        }
        journal
    }

    /// Pass one: trims every sender holding more than the configured cap
    /// back down to it, dropping from the tail of the nonce order.
    ///
    /// O(oversized senders); bounds per-sender memory even under spam from a
    /// single identity.
    fn evict_oversized_senders(&self, journal: &mut EvictionJournal) {
        let cap = self.config.max_txs_per_sender;
        let mut entries = Vec::new();
        self.by_sender.for_each(|entry| entries.push(entry.clone()));

        for entry in entries {
            let trimmed = {
                let mut list = entry.list.lock();
                if list.is_detached() || list.len() <= cap {
                    continue
                }
                let trimmed = list.truncate_to(cap);
                self.by_sender.update_score(&entry, list.score());
                trimmed
            };
            journal.pass_one_num_senders += 1;
            journal.pass_one_num_txs += trimmed.len() as u64;
            self.discard_evicted(&trimmed);
        }
    }

    /// Pass two: drops whole sender lists in ascending score order, a step
    /// of senders at a time, rechecking the threshold after every step.
    ///
    /// Terminates when the pool is back under threshold or every sender has
    /// been visited; running out of senders leaves the pool above its soft
    /// threshold, which is reported and tolerated.
    fn evict_worst_senders_stepwise(&self, journal: &mut EvictionJournal) {
        let snapshot = self.by_sender.snapshot_ascending();
        for step in snapshot.chunks(self.config.senders_per_eviction_step) {
            if !self.is_capacity_exceeded() {
                return
            }
            journal.pass_two_num_steps += 1;
            for entry in step {
                let (num_txs, _) = self.remove_sender_entry(entry);
                if num_txs > 0 {
                    journal.pass_two_num_senders += 1;
                    journal.pass_two_num_txs += num_txs as u64;
                }
            }
        }
        if self.is_capacity_exceeded() {
            warn!(
                target: "txpool",
                txs = self.len(),
                bytes = self.num_bytes(),
                "eviction exhausted all senders, pool remains above threshold"
            );
        }
    }

    /// Drops evicted transactions from the hash index and the aggregate
    /// counters. List-side accounting already happened under the list lock.
    fn discard_evicted(&self, evicted: &[Arc<ValidPoolTransaction<T>>]) {
        let mut bytes = 0u64;
        for tx in evicted {
            self.by_hash.remove(tx.hash());
            bytes += tx.size() as u64;
        }
        self.tx_count.fetch_sub(evicted.len() as i64, Ordering::Relaxed);
        self.tx_bytes.fetch_sub(bytes as i64, Ordering::Relaxed);
    }
}
