//! Lattice transaction pool (mempool).
//!
//! A concurrent, memory-bounded, sender-aware cache of pending transactions.
//! Network ingestion adds transactions, block processing removes finalized
//! ones, and block assembly pulls prioritized, budget-bounded batches, all
//! from independent threads and with no global lock on the pool.
//!
//! ## Design
//!
//! Transactions are indexed twice: by hash for lookup and removal, and by
//! sender for ordering. Both indexes are partitioned into independently
//! lockable chunks, and the by-sender index additionally keeps its entries
//! in coarse score buckets so that iterating senders by priority requires no
//! sorting. Per-sender lists are strictly nonce-ascending; a duplicate nonce
//! is resolved by keeping the higher-fee-rate offer.
//!
//! When an insertion pushes the pool over its configured byte or count
//! threshold, the inserting thread runs a bounded two-pass eviction inline:
//! first every spamming sender is trimmed to a per-sender cap, then whole
//! sender lists are dropped worst-score-first in steps until the pool is
//! back under threshold. A compare-and-swap gate keeps eviction
//! single-flight; threads that lose the race proceed without blocking.
//!
//! ```
//! use lattice_txpool::{Pool, PoolConfig};
//! use lattice_txpool::test_utils::MockTransactionFactory;
//! use alloy_primitives::Address;
//!
//! let pool = Pool::new(PoolConfig::default());
//! let mut factory = MockTransactionFactory::default();
//!
//! pool.add_transaction(factory.create(Address::with_last_byte(1), 0)).unwrap();
//! let batch = pool.select_transactions(u64::MAX, u64::MAX, || true);
//! assert_eq!(batch.len(), 1);
//! ```

#![doc(issue_tracker_base_url = "https://github.com/lattice-chain/lattice/issues/")]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg))]

use alloy_primitives::TxHash;
use std::sync::Arc;

mod config;
mod error;
mod metrics;
mod pool;
mod traits;
mod validate;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{
    PoolConfig, DEFAULT_MAX_BYTES, DEFAULT_MAX_TX_COUNT, DEFAULT_MAX_TXS_PER_SENDER,
    DEFAULT_NUM_CHUNKS, DEFAULT_SENDERS_PER_EVICTION_STEP,
};
pub use error::{InvalidPoolTransactionError, PoolError, PoolResult};
pub use traits::{PoolTransaction, TransactionPool};
pub use validate::ValidPoolTransaction;

use pool::PoolInner;

/// Shareable transaction pool handle.
///
/// This is a cheaply cloneable wrapper around the pool internals; ingestion,
/// block processing and block assembly all hold clones of the same instance.
/// The pool lives for the duration of the node process
/// and is never serialized; [`clear`](Pool::clear) resets it on structural
/// rotation events owned by the caller.
#[derive(Debug)]
pub struct Pool<T: PoolTransaction> {
    /// The internal pool.
    inner: Arc<PoolInner<T>>,
}

// === impl Pool ===

impl<T: PoolTransaction> Pool<T> {
    /// Creates a new pool with the given config.
    ///
    /// Degenerate config values are clamped, see
    /// [`PoolConfig::sanitized`].
    pub fn new(config: PoolConfig) -> Self {
        Self { inner: Arc::new(PoolInner::new(config)) }
    }

    /// The config the pool was created with, after sanitization.
    pub fn config(&self) -> &PoolConfig {
        self.inner.config()
    }

    /// Adds a transaction to the pool.
    ///
    /// See [`TransactionPool::add_transaction`].
    pub fn add_transaction(&self, transaction: T) -> PoolResult<bool> {
        self.inner.add_transaction(transaction)
    }

    /// Adds the given transactions, returning one result per input.
    pub fn add_transactions(
        &self,
        transactions: impl IntoIterator<Item = T>,
    ) -> Vec<PoolResult<bool>> {
        transactions.into_iter().map(|tx| self.add_transaction(tx)).collect()
    }

    /// Removes the transaction with the given hash; a tolerated no-op if it
    /// is not in the pool.
    pub fn remove_transaction(&self, hash: &TxHash) -> bool {
        self.inner.remove_transaction(hash)
    }

    /// Removes all transactions with the given hashes.
    pub fn remove_transactions(&self, hashes: impl IntoIterator<Item = TxHash>) {
        for hash in hashes {
            self.inner.remove_transaction(&hash);
        }
    }

    /// Returns an ordered batch of transactions for block assembly.
    ///
    /// See [`TransactionPool::select_transactions`]. After the batch is
    /// assembled a consistency diagnose is spawned in the background.
    pub fn select_transactions(
        &self,
        max_gas: u64,
        max_bytes: u64,
        have_time: impl FnMut() -> bool,
    ) -> Vec<Arc<ValidPoolTransaction<T>>> {
        let selection = self.inner.select_transactions(max_gas, max_bytes, have_time);
        self.spawn_diagnose();
        selection
    }

    /// Number of transactions in the pool.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the pool holds no transactions.
    pub fn is_empty(&self) -> bool {
        self.inner.len() == 0
    }

    /// Estimated total byte size of pooled transactions.
    pub fn num_bytes(&self) -> usize {
        self.inner.num_bytes()
    }

    /// Number of distinct senders with pooled transactions.
    pub fn count_senders(&self) -> usize {
        self.inner.count_senders()
    }

    /// Returns `true` if the pool contains a transaction with this hash.
    pub fn contains(&self, hash: &TxHash) -> bool {
        self.inner.contains(hash)
    }

    /// Returns the transaction with the given hash, if present.
    pub fn get(&self, hash: &TxHash) -> Option<Arc<ValidPoolTransaction<T>>> {
        self.inner.get(hash)
    }

    /// Drops all entries.
    pub fn clear(&self) {
        self.inner.clear()
    }

    /// Runs the O(n) consistency check synchronously.
    ///
    /// Recounts the index maps and compares them against the atomic
    /// aggregates, logging the outcome. Never fails; divergence under
    /// concurrent traffic is informational.
    pub fn diagnose(&self) {
        self.inner.diagnose()
    }

    /// Spawns a fire-and-forget diagnose on a background thread.
    ///
    /// Telemetry only: neither a failure to spawn nor anything the check
    /// finds ever reaches the caller.
    fn spawn_diagnose(&self) {
        let inner = Arc::clone(&self.inner);
        let _ = std::thread::Builder::new()
            .name("txpool-diagnose".to_string())
            .spawn(move || inner.diagnose());
    }
}

impl<T: PoolTransaction> Clone for Pool<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T: PoolTransaction> TransactionPool for Pool<T> {
    type Transaction = T;

    fn add_transaction(&self, transaction: T) -> PoolResult<bool> {
        Self::add_transaction(self, transaction)
    }

    fn remove_transaction(&self, hash: &TxHash) -> bool {
        Self::remove_transaction(self, hash)
    }

    fn select_transactions(
        &self,
        max_gas: u64,
        max_bytes: u64,
        have_time: &mut dyn FnMut() -> bool,
    ) -> Vec<Arc<ValidPoolTransaction<T>>> {
        Self::select_transactions(self, max_gas, max_bytes, have_time)
    }

    fn len(&self) -> usize {
        Self::len(self)
    }

    fn num_bytes(&self) -> usize {
        Self::num_bytes(self)
    }

    fn count_senders(&self) -> usize {
        Self::count_senders(self)
    }

    fn contains(&self, hash: &TxHash) -> bool {
        Self::contains(self, hash)
    }

    fn get(&self, hash: &TxHash) -> Option<Arc<ValidPoolTransaction<T>>> {
        Self::get(self, hash)
    }

    fn clear(&self) {
        Self::clear(self)
    }
}
