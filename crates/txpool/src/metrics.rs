//! Transaction pool metrics.

use metrics::{register_counter, Counter};

/// Transaction pool metrics.
pub(crate) struct TxPoolMetrics {
    /// Number of transactions inserted in the pool
    pub(crate) inserted_transactions: Counter,
    /// Number of invalid transactions rejected at admission
    pub(crate) invalid_transactions: Counter,
    /// Number of transactions removed from the pool by callers
    pub(crate) removed_transactions: Counter,
    /// Number of transactions dropped by the eviction engine
    pub(crate) evicted_transactions: Counter,
    /// Number of eviction runs performed
    pub(crate) eviction_runs: Counter,
}

impl Default for TxPoolMetrics {
    fn default() -> Self {
        Self {
            inserted_transactions: register_counter!("transaction_pool.inserted_transactions"),
            invalid_transactions: register_counter!("transaction_pool.invalid_transactions"),
            removed_transactions: register_counter!("transaction_pool.removed_transactions"),
            evicted_transactions: register_counter!("transaction_pool.evicted_transactions"),
            eviction_runs: register_counter!("transaction_pool.eviction_runs"),
        }
    }
}
