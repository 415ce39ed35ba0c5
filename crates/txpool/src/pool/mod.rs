//! Transaction pool internals.
//!
//! The pool is two sharded indexes over one logical set of transactions:
//!
//!  - by hash, for global lookup and removal,
//!  - by sender, grouping each sender's transactions into a nonce-ordered
//!    list and placing the list into a coarse score bucket.
//!
//! Ingestion (add), finalization (remove) and block building (select) run
//! from independent call sites. There is no global lock: every operation
//! takes at most one chunk lock or one sender-list lock at a time, and the
//! aggregate counters are lock-free atomics that converge at quiescence.
//! Insertions that push the pool over its configured thresholds trigger a
//! bounded, single-flight eviction inline; callers that lose the race to
//! evict proceed without blocking.
//!
//! Consistency between the two indexes is bidirectional at quiescence.
//! Mid-operation staleness (a hash visible before its list slot, a removal
//! racing an eviction) is tolerated and surfaced through diagnostics, never
//! as caller-visible errors.

use crate::{
    config::PoolConfig,
    error::PoolResult,
    metrics::TxPoolMetrics,
    pool::{
        chunks::{ChunkedMap, ScoredSenderMap},
        monitoring::PoolStats,
        sender::{SenderEntry, SenderInsertOutcome},
    },
    traits::PoolTransaction,
    validate::ValidPoolTransaction,
};
use alloy_primitives::TxHash;
use std::sync::{
    atomic::{AtomicBool, AtomicI64, Ordering},
    Arc,
};
use tracing::trace;

pub(crate) mod best;
pub(crate) mod chunks;
pub(crate) mod eviction;
pub(crate) mod monitoring;
pub(crate) mod sender;

/// Transaction pool internals.
///
/// Shared by reference among all collaborators via the [`Pool`](crate::Pool)
/// handle. Records are logically immutable once submitted; the pool hands out
/// `Arc`s and never clones transaction payloads.
pub(crate) struct PoolInner<T: PoolTransaction> {
    /// Pool settings, fixed for the lifetime of the instance.
    config: PoolConfig,
    /// Global content-address index.
    by_hash: ChunkedMap<TxHash, Arc<ValidPoolTransaction<T>>>,
    /// Sender-grouped index with score buckets.
    by_sender: ScoredSenderMap<T>,
    /// Estimated number of pooled transactions.
    tx_count: AtomicI64,
    /// Estimated total byte size of pooled transactions.
    tx_bytes: AtomicI64,
    /// Estimated number of distinct senders.
    sender_count: AtomicI64,
    /// Single-flight gate of the eviction engine.
    eviction_in_progress: AtomicBool,
    /// Monitoring counters.
    stats: PoolStats,
    /// Transaction pool metrics.
    metrics: TxPoolMetrics,
}

// === impl PoolInner ===

impl<T: PoolTransaction> PoolInner<T> {
    /// Creates a new pool instance with the given (sanitized) config.
    pub(crate) fn new(config: PoolConfig) -> Self {
        let config = config.sanitized();
        Self {
            by_hash: ChunkedMap::new(config.num_hash_chunks),
            by_sender: ScoredSenderMap::new(config.num_sender_chunks),
            tx_count: AtomicI64::new(0),
            tx_bytes: AtomicI64::new(0),
            sender_count: AtomicI64::new(0),
            eviction_in_progress: AtomicBool::new(false),
            stats: PoolStats::default(),
            metrics: TxPoolMetrics::default(),
            config,
        }
    }

    /// The config the pool was created with.
    pub(crate) const fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Number of transactions in the pool. Lock-free, eventually consistent.
    pub(crate) fn len(&self) -> usize {
        self.tx_count.load(Ordering::Relaxed).max(0) as usize
    }

    /// Estimated byte size of the pool. Lock-free, eventually consistent.
    pub(crate) fn num_bytes(&self) -> usize {
        self.tx_bytes.load(Ordering::Relaxed).max(0) as usize
    }

    /// Number of senders with pooled transactions. Lock-free, eventually
    /// consistent.
    pub(crate) fn count_senders(&self) -> usize {
        self.sender_count.load(Ordering::Relaxed).max(0) as usize
    }

    pub(crate) fn contains(&self, hash: &TxHash) -> bool {
        self.by_hash.contains(hash)
    }

    pub(crate) fn get(&self, hash: &TxHash) -> Option<Arc<ValidPoolTransaction<T>>> {
        self.by_hash.get(hash)
    }

    /// Adds the transaction to the pool.
    ///
    /// Returns whether the transaction now occupies a slot: `Ok(false)` for
    /// an already-known hash and for a transaction that lost the
    /// replace-by-priority policy to an existing same-nonce entry. Triggers
    /// eviction inline when the insertion pushes the pool over a threshold.
    pub(crate) fn add_transaction(&self, transaction: T) -> PoolResult<bool> {
        let tx = match ValidPoolTransaction::try_new(transaction) {
            Ok(tx) => Arc::new(tx),
            Err(err) => {
                self.metrics.invalid_transactions.increment(1);
                return Err(err.into())
            }
        };
        let hash = *tx.hash();

        // The hash index is authoritative for duplicate detection: a second
        // submission of the same hash is an idempotent no-op.
        if !self.by_hash.insert_if_absent(hash, tx.clone()) {
            trace!(target: "txpool", %hash, "discarding already known transaction");
            return Ok(false)
        }

        let inserted = self.link_transaction(tx);
        if inserted {
            self.metrics.inserted_transactions.increment(1);
        }

        if self.is_capacity_exceeded() {
            self.evict_if_idle();
        }
        Ok(inserted)
    }

    /// Links a hash-indexed transaction into its sender's list.
    ///
    /// Retries when the resolved entry has been detached concurrently by
    /// eviction or a final removal.
    fn link_transaction(&self, tx: Arc<ValidPoolTransaction<T>>) -> bool {
        let sender = tx.sender();
        loop {
            let (entry, created) = self.by_sender.get_or_create(sender);
            if created {
                self.sender_count.fetch_add(1, Ordering::Relaxed);
            }
            let mut list = entry.list.lock();
            if list.is_detached() {
                continue
            }
            return match list.insert(tx.clone()) {
                SenderInsertOutcome::Inserted => {
                    self.tx_count.fetch_add(1, Ordering::Relaxed);
                    self.tx_bytes.fetch_add(tx.size() as i64, Ordering::Relaxed);
                    self.by_sender.update_score(&entry, list.score());
                    drop(list);
                    self.monitor_tx_addition();
                    true
                }
                SenderInsertOutcome::Replaced(replaced) => {
                    self.tx_bytes
                        .fetch_add(tx.size() as i64 - replaced.size() as i64, Ordering::Relaxed);
                    self.by_sender.update_score(&entry, list.score());
                    drop(list);
                    self.by_hash.remove(replaced.hash());
                    trace!(
                        target: "txpool",
                        hash = %tx.hash(),
                        replaced = %replaced.hash(),
                        "replaced same-nonce transaction with better offer"
                    );
                    true
                }
                SenderInsertOutcome::Discarded => {
                    drop(list);
                    // undo the optimistic hash insertion; the existing offer
                    // for this nonce is at least as good
                    self.by_hash.remove(tx.hash());
                    trace!(
                        target: "txpool",
                        hash = %tx.hash(),
                        "discarding worse offer for occupied nonce"
                    );
                    false
                }
            }
        }
    }

    /// Removes the transaction with the given hash.
    ///
    /// Missing entries are a tolerated no-op: the eviction engine may have
    /// purged the transaction after it was selected for processing.
    pub(crate) fn remove_transaction(&self, hash: &TxHash) -> bool {
        let Some(tx) = self.by_hash.remove(hash) else { return false };
        self.unlink_transaction(&tx);
        self.metrics.removed_transactions.increment(1);
        true
    }

    /// Unlinks a transaction from its sender's list, dropping the list
    /// entirely once it is empty.
    fn unlink_transaction(&self, tx: &Arc<ValidPoolTransaction<T>>) {
        let Some(entry) = self.by_sender.get(&tx.sender()) else {
            self.on_remove_inconsistency(tx.hash());
            return
        };
        let mut list = entry.list.lock();
        if list.is_detached() {
            drop(list);
            self.on_remove_inconsistency(tx.hash());
            return
        }
        match list.remove(tx.hash()) {
            Some(removed) => {
                self.tx_count.fetch_sub(1, Ordering::Relaxed);
                self.tx_bytes.fetch_sub(removed.size() as i64, Ordering::Relaxed);
                if list.is_empty() {
                    list.detach();
                    self.by_sender.remove_entry(&entry);
                    self.sender_count.fetch_sub(1, Ordering::Relaxed);
                } else {
                    self.by_sender.update_score(&entry, list.score());
                }
                drop(list);
                self.monitor_tx_removal();
            }
            None => {
                drop(list);
                self.on_remove_inconsistency(tx.hash());
            }
        }
    }

    /// Unlinks a whole sender entry, dropping all of its transactions.
    ///
    /// Returns the number of transactions and bytes dropped.
    pub(crate) fn remove_sender_entry(&self, entry: &Arc<SenderEntry<T>>) -> (usize, u64) {
        let drained = {
            let mut list = entry.list.lock();
            if list.is_detached() {
                return (0, 0)
            }
            let drained = list.drain_all();
            list.detach();
            self.by_sender.remove_entry(entry);
            drained
        };
        self.sender_count.fetch_sub(1, Ordering::Relaxed);

        let mut bytes = 0u64;
        for tx in &drained {
            self.by_hash.remove(tx.hash());
            bytes += tx.size() as u64;
        }
        self.tx_count.fetch_sub(drained.len() as i64, Ordering::Relaxed);
        self.tx_bytes.fetch_sub(bytes as i64, Ordering::Relaxed);
        (drained.len(), bytes)
    }

    /// Whether the pool currently sits above one of its soft thresholds.
    pub(crate) fn is_capacity_exceeded(&self) -> bool {
        self.num_bytes() as u64 > self.config.max_bytes ||
            self.len() as u64 > self.config.max_tx_count
    }

    /// Drops all entries.
    ///
    /// The caller owns quiescence around structural rotation; concurrent
    /// in-flight adds may survive the sweep.
    pub(crate) fn clear(&self) {
        for entry in self.by_sender.snapshot_ascending() {
            self.remove_sender_entry(&entry);
        }
        trace!(target: "txpool", "cleared transaction pool");
    }
}

impl<T: PoolTransaction> std::fmt::Debug for PoolInner<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolInner")
            .field("config", &self.config)
            .field("txs", &self.len())
            .field("bytes", &self.num_bytes())
            .field("senders", &self.count_senders())
            .finish()
    }
}
