//! Per-sender transaction lists.

use crate::{traits::PoolTransaction, validate::ValidPoolTransaction};
use alloy_primitives::{Address, TxHash};
use parking_lot::Mutex;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

/// A sender's slot in the by-sender index.
///
/// The nonce-ordered list lives behind its own mutex; the current score
/// bucket is tracked alongside so the scored map can migrate the entry when
/// its priority changes. Bucket migration is only performed while holding the
/// list lock, which serializes movers per entry.
#[derive(Debug)]
pub(crate) struct SenderEntry<T: PoolTransaction> {
    /// The sender all transactions of this entry belong to.
    pub(crate) sender: Address,
    /// The nonce-ordered transactions of the sender.
    pub(crate) list: Mutex<SenderTransactions<T>>,
    /// Index of the score bucket currently holding this entry.
    pub(crate) bucket: AtomicUsize,
}

impl<T: PoolTransaction> SenderEntry<T> {
    pub(crate) fn new(sender: Address) -> Self {
        Self { sender, list: Mutex::new(SenderTransactions::new()), bucket: AtomicUsize::new(0) }
    }
}

/// Outcome of inserting into a [`SenderTransactions`] list.
#[derive(Debug)]
pub(crate) enum SenderInsertOutcome<T: PoolTransaction> {
    /// The transaction occupied a net-new slot.
    Inserted,
    /// The transaction replaced a same-nonce entry with a lower fee rate.
    Replaced(Arc<ValidPoolTransaction<T>>),
    /// A same-nonce entry with an equal or higher fee rate already exists;
    /// the incoming transaction was dropped silently.
    Discarded,
}

/// The ordered collection of one sender's pending transactions.
///
/// Strictly ascending by nonce. Aggregate byte size and fee rate are
/// maintained incrementally so the score never requires a scan.
#[derive(Debug)]
pub(crate) struct SenderTransactions<T: PoolTransaction> {
    /// Transactions in ascending nonce order.
    txs: Vec<Arc<ValidPoolTransaction<T>>>,
    /// Total byte size of the transactions.
    total_bytes: u64,
    /// Sum of the transactions' fee rates.
    total_fee_rate: u128,
    /// Set once the entry has been unlinked from the by-sender index.
    ///
    /// An insert that finds the list detached must re-resolve the sender's
    /// entry; the pool no longer references this one.
    detached: bool,
}

// === impl SenderTransactions ===

impl<T: PoolTransaction> SenderTransactions<T> {
    pub(crate) fn new() -> Self {
        Self { txs: Vec::new(), total_bytes: 0, total_fee_rate: 0, detached: false }
    }

    pub(crate) fn len(&self) -> usize {
        self.txs.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.txs.is_empty()
    }

    /// Total byte size of the listed transactions.
    pub(crate) const fn bytes(&self) -> u64 {
        self.total_bytes
    }

    pub(crate) const fn is_detached(&self) -> bool {
        self.detached
    }

    pub(crate) fn detach(&mut self) {
        self.detached = true;
    }

    /// The aggregate priority score of the sender: average fee rate across
    /// its transactions. Recomputed from the incrementally maintained
    /// aggregates, so this is O(1).
    pub(crate) fn score(&self) -> u64 {
        if self.txs.is_empty() {
            return 0
        }
        (self.total_fee_rate / self.txs.len() as u128).min(u64::MAX as u128) as u64
    }

    /// Transactions in ascending nonce order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Arc<ValidPoolTransaction<T>>> {
        self.txs.iter()
    }

    /// Inserts the transaction, keeping the list ascending by nonce.
    ///
    /// A same-nonce entry is replaced only if the incoming fee rate is
    /// strictly greater; otherwise the incoming transaction is discarded and
    /// the better offer stays.
    pub(crate) fn insert(&mut self, tx: Arc<ValidPoolTransaction<T>>) -> SenderInsertOutcome<T> {
        match self.txs.binary_search_by_key(&tx.nonce(), |t| t.nonce()) {
            Ok(pos) => {
                if tx.fee_rate() <= self.txs[pos].fee_rate() {
                    return SenderInsertOutcome::Discarded
                }
                let replaced = std::mem::replace(&mut self.txs[pos], tx);
                self.total_bytes += self.txs[pos].size() as u64;
                self.total_bytes -= replaced.size() as u64;
                self.total_fee_rate += self.txs[pos].fee_rate() as u128;
                self.total_fee_rate -= replaced.fee_rate() as u128;
                SenderInsertOutcome::Replaced(replaced)
            }
            Err(pos) => {
                self.total_bytes += tx.size() as u64;
                self.total_fee_rate += tx.fee_rate() as u128;
                self.txs.insert(pos, tx);
                SenderInsertOutcome::Inserted
            }
        }
    }

    /// Removes the transaction with the given hash.
    ///
    /// Absence is not an error: a concurrent eviction may have dropped the
    /// entry already. The caller logs that as a diagnostic inconsistency.
    pub(crate) fn remove(&mut self, hash: &TxHash) -> Option<Arc<ValidPoolTransaction<T>>> {
        let pos = self.txs.iter().position(|tx| tx.hash() == hash)?;
        let removed = self.txs.remove(pos);
        self.total_bytes -= removed.size() as u64;
        self.total_fee_rate -= removed.fee_rate() as u128;
        Some(removed)
    }

    /// Trims the list down to `cap` entries, dropping from the tail of the
    /// nonce order: the highest nonces are the least likely to become
    /// executable and go first.
    ///
    /// Returns the removed transactions; empty if the list already fits.
    pub(crate) fn truncate_to(&mut self, cap: usize) -> Vec<Arc<ValidPoolTransaction<T>>> {
        if self.txs.len() <= cap {
            return Vec::new()
        }
        let removed: Vec<_> = self.txs.split_off(cap);
        for tx in &removed {
            self.total_bytes -= tx.size() as u64;
            self.total_fee_rate -= tx.fee_rate() as u128;
        }
        removed
    }

    /// Removes and returns every transaction, leaving the aggregates zeroed.
    pub(crate) fn drain_all(&mut self) -> Vec<Arc<ValidPoolTransaction<T>>> {
        self.total_bytes = 0;
        self.total_fee_rate = 0;
        std::mem::take(&mut self.txs)
    }
}
