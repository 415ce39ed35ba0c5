//! Admitted transaction records.

use crate::{error::InvalidPoolTransactionError, traits::PoolTransaction};
use alloy_primitives::{Address, TxHash};
use std::fmt;

/// A transaction admitted into the pool, with metadata derived once at
/// admission.
///
/// The pool holds a single logical copy of each record behind an `Arc` and
/// treats it as immutable from then on.
pub struct ValidPoolTransaction<T: PoolTransaction> {
    /// The actual transaction.
    pub transaction: T,
    /// Priority of the transaction: fee paid per byte of pool footprint.
    ///
    /// Higher is more valuable. Immutable once computed.
    fee_rate: u64,
    /// Cached serialized size, used for byte-budget accounting.
    size: usize,
}

// === impl ValidPoolTransaction ===

impl<T: PoolTransaction> ValidPoolTransaction<T> {
    /// Wraps the transaction, deriving its priority and size.
    ///
    /// Fails if the transaction carries no hash or no sender; nothing else is
    /// checked here, signature and structural validity are upstream concerns.
    pub fn try_new(transaction: T) -> Result<Self, InvalidPoolTransactionError> {
        if transaction.hash().is_zero() {
            return Err(InvalidPoolTransactionError::EmptyHash)
        }
        if transaction.sender() == Address::ZERO {
            return Err(InvalidPoolTransactionError::EmptySender(*transaction.hash()))
        }
        let size = transaction.size();
        let fee_rate = compute_fee_rate(&transaction);
        Ok(Self { transaction, fee_rate, size })
    }

    /// Hash of the transaction.
    pub fn hash(&self) -> &TxHash {
        self.transaction.hash()
    }

    /// The sender of the transaction.
    pub fn sender(&self) -> Address {
        self.transaction.sender()
    }

    /// Nonce of the transaction.
    pub fn nonce(&self) -> u64 {
        self.transaction.nonce()
    }

    /// The gas limit of the transaction, counted against the selection gas
    /// budget.
    pub fn gas_limit(&self) -> u64 {
        self.transaction.gas_limit()
    }

    /// The derived priority of the transaction. Higher is more valuable.
    pub const fn fee_rate(&self) -> u64 {
        self.fee_rate
    }

    /// The serialized size of the transaction in bytes.
    pub const fn size(&self) -> usize {
        self.size
    }
}

impl<T: PoolTransaction> fmt::Debug for ValidPoolTransaction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidPoolTransaction")
            .field("hash", self.hash())
            .field("sender", &self.sender())
            .field("nonce", &self.nonce())
            .field("fee_rate", &self.fee_rate)
            .field("size", &self.size)
            .finish()
    }
}

/// Derives the priority of a transaction: the full fee it offers divided by
/// its pool footprint in bytes, saturating at `u64::MAX`.
fn compute_fee_rate<T: PoolTransaction>(transaction: &T) -> u64 {
    let fee = transaction.gas_price().saturating_mul(transaction.gas_limit() as u128);
    let size = transaction.size().max(1) as u128;
    (fee / size).min(u64::MAX as u128) as u64
}
