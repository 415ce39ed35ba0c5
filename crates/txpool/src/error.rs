//! Transaction pool errors.

use alloy_primitives::TxHash;

/// Transaction pool result type.
pub type PoolResult<T> = Result<T, PoolError>;

/// All errors the transaction pool can throw.
///
/// Only genuinely malformed input surfaces as an error. Races between
/// removals and eviction, duplicate submissions and soft-threshold overshoot
/// are absorbed internally and reported through diagnostics instead.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum PoolError {
    /// The submitted transaction is malformed and was rejected before any
    /// state was mutated.
    #[error("invalid transaction: {0}")]
    InvalidTransaction(#[from] InvalidPoolTransactionError),
}

/// The ways an incoming transaction can fail admission checks.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum InvalidPoolTransactionError {
    /// The transaction carries no content address.
    #[error("transaction hash is unset")]
    EmptyHash,
    /// The transaction carries no sender identity.
    #[error("transaction sender is unset: {0}")]
    EmptySender(TxHash),
}
