//! Transaction pool configuration.

/// Soft threshold on the total byte size of pooled transactions.
pub const DEFAULT_MAX_BYTES: u64 = 256 * 1024 * 1024;

/// Soft threshold on the number of pooled transactions.
pub const DEFAULT_MAX_TX_COUNT: u64 = 300_000;

/// Ceiling on the number of transactions kept per sender, enforced by the
/// first eviction pass.
pub const DEFAULT_MAX_TXS_PER_SENDER: usize = 5_000;

/// Number of senders removed per step of the second eviction pass.
pub const DEFAULT_SENDERS_PER_EVICTION_STEP: usize = 250;

/// Default number of independently lockable chunks per sharded index.
pub const DEFAULT_NUM_CHUNKS: usize = 16;

/// Configuration options for the transaction pool.
///
/// The byte and count thresholds are soft: an insertion may push the pool
/// above them, after which the triggering add runs a bounded eviction pass.
/// Bounded overshoot is an accepted trade-off; the pool never stops the
/// world to get back under threshold.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolConfig {
    /// Total byte size above which an add triggers eviction.
    pub max_bytes: u64,
    /// Transaction count above which an add triggers eviction.
    pub max_tx_count: u64,
    /// Per-sender transaction ceiling enforced by eviction pass one.
    pub max_txs_per_sender: usize,
    /// Batch of worst-scored senders dropped per step of eviction pass two.
    pub senders_per_eviction_step: usize,
    /// Number of chunks of the by-hash index.
    pub num_hash_chunks: usize,
    /// Number of chunks of the by-sender index.
    pub num_sender_chunks: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            max_tx_count: DEFAULT_MAX_TX_COUNT,
            max_txs_per_sender: DEFAULT_MAX_TXS_PER_SENDER,
            senders_per_eviction_step: DEFAULT_SENDERS_PER_EVICTION_STEP,
            num_hash_chunks: DEFAULT_NUM_CHUNKS,
            num_sender_chunks: DEFAULT_NUM_CHUNKS,
        }
    }
}

impl PoolConfig {
    /// Returns the config with degenerate values clamped to workable
    /// minimums.
    ///
    /// A zero chunk count, step size or per-sender cap would stall the
    /// eviction algorithm, so they are raised to one instead of being
    /// reported as errors.
    pub fn sanitized(mut self) -> Self {
        self.max_bytes = self.max_bytes.max(1);
        self.max_tx_count = self.max_tx_count.max(1);
        self.max_txs_per_sender = self.max_txs_per_sender.max(1);
        self.senders_per_eviction_step = self.senders_per_eviction_step.max(1);
        self.num_hash_chunks = self.num_hash_chunks.max(1);
        self.num_sender_chunks = self.num_sender_chunks.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_clamps_zeroes() {
        let config = PoolConfig {
            max_bytes: 0,
            max_tx_count: 0,
            max_txs_per_sender: 0,
            senders_per_eviction_step: 0,
            num_hash_chunks: 0,
            num_sender_chunks: 0,
        }
        .sanitized();

        assert_eq!(config.max_bytes, 1);
        assert_eq!(config.max_tx_count, 1);
        assert_eq!(config.max_txs_per_sender, 1);
        assert_eq!(config.senders_per_eviction_step, 1);
        assert_eq!(config.num_hash_chunks, 1);
        assert_eq!(config.num_sender_chunks, 1);
    }

    #[test]
    fn sanitize_keeps_defaults() {
        let config = PoolConfig::default();
        assert_eq!(config.clone().sanitized(), config);
    }
}
