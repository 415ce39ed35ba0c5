//! Boundary traits of the transaction pool.

use crate::{error::PoolResult, validate::ValidPoolTransaction};
use alloy_primitives::{Address, TxHash};
use std::{fmt, sync::Arc};

/// Trait for transaction types stored in the pool.
///
/// Transactions arrive already deserialized and signature-checked; the pool
/// only relies on this capability surface. All admissible transaction
/// variants of the node implement it, which replaces any runtime inspection
/// of the payload kind.
pub trait PoolTransaction: fmt::Debug + Send + Sync + 'static {
    /// Hash of the transaction, its unique content address.
    fn hash(&self) -> &TxHash;

    /// The sender of the transaction, the unit of nonce ordering.
    fn sender(&self) -> Address;

    /// The per-sender sequence number of the transaction.
    fn nonce(&self) -> u64;

    /// The price the sender is willing to pay per unit of gas.
    fn gas_price(&self) -> u128;

    /// The maximum amount of gas the transaction may consume.
    fn gas_limit(&self) -> u64;

    /// The serialized length of the transaction in bytes.
    ///
    /// Used for the pool's byte-budget accounting.
    fn size(&self) -> usize;
}

/// General purpose abstraction of the transaction pool.
///
/// This is the boundary consumed by network ingestion (adds), block
/// processing (removals) and block assembly (selection). All operations are
/// safe to call from independent threads; none of them blocks for longer
/// than a short per-chunk critical section.
pub trait TransactionPool: Send + Sync {
    /// The transaction type managed by the pool.
    type Transaction: PoolTransaction;

    /// Adds a transaction to the pool.
    ///
    /// Returns whether a new slot was occupied. Submitting a hash already in
    /// the pool is idempotent and yields `Ok(false)`, as does a transaction
    /// losing the replace-by-priority policy against an entry with the same
    /// sender and nonce. Only malformed input produces an error.
    fn add_transaction(&self, transaction: Self::Transaction) -> PoolResult<bool>;

    /// Adds the given transactions, returning one result per input.
    fn add_transactions(
        &self,
        transactions: impl IntoIterator<Item = Self::Transaction>,
    ) -> Vec<PoolResult<bool>>
    where
        Self: Sized,
    {
        transactions.into_iter().map(|tx| self.add_transaction(tx)).collect()
    }

    /// Removes the transaction with the given hash.
    ///
    /// Returns whether an entry was removed. A missing entry is a tolerated
    /// no-op: eviction may have purged it concurrently.
    fn remove_transaction(&self, hash: &TxHash) -> bool;

    /// Removes all transactions with the given hashes, with the same
    /// tolerance as [`remove_transaction`](TransactionPool::remove_transaction).
    fn remove_transactions(&self, hashes: impl IntoIterator<Item = TxHash>)
    where
        Self: Sized,
    {
        for hash in hashes {
            self.remove_transaction(&hash);
        }
    }

    /// Returns an ordered batch of transactions for block assembly.
    ///
    /// Senders are visited in descending score order and each sender's
    /// transactions in ascending nonce order, while the cumulative gas and
    /// byte budgets hold. `have_time` is polled between senders; once it
    /// returns `false` the partial batch accumulated so far is returned.
    /// Selection never errors and does not mutate the pool.
    fn select_transactions(
        &self,
        max_gas: u64,
        max_bytes: u64,
        have_time: &mut dyn FnMut() -> bool,
    ) -> Vec<Arc<ValidPoolTransaction<Self::Transaction>>>;

    /// Returns the number of transactions in the pool.
    ///
    /// Lock-free read of an eventually-consistent counter.
    fn len(&self) -> usize;

    /// Returns `true` if the pool holds no transactions.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the estimated total byte size of pooled transactions.
    fn num_bytes(&self) -> usize;

    /// Returns the number of distinct senders with pending transactions.
    fn count_senders(&self) -> usize;

    /// Returns `true` if the pool contains a transaction with this hash.
    fn contains(&self, hash: &TxHash) -> bool;

    /// Returns the transaction with the given hash, if present.
    fn get(&self, hash: &TxHash) -> Option<Arc<ValidPoolTransaction<Self::Transaction>>>;

    /// Drops all entries.
    ///
    /// Invoked by the owner on structural rotation events, e.g. an epoch or
    /// shard reconfiguration.
    fn clear(&self);
}
