//! Mock types for pool testing.

use crate::traits::PoolTransaction;
use alloy_primitives::{Address, TxHash, B256, U256};

/// Default gas price of a [`MockTransaction`].
pub const MOCK_GAS_PRICE: u128 = 10;

/// Default gas limit of a [`MockTransaction`].
pub const MOCK_GAS_LIMIT: u64 = 100_000;

/// Default serialized size of a [`MockTransaction`].
pub const MOCK_TX_SIZE: usize = 256;

/// A plain transaction used for pool testing.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MockTransaction {
    hash: TxHash,
    sender: Address,
    nonce: u64,
    gas_price: u128,
    gas_limit: u64,
    size: usize,
}

// === impl MockTransaction ===

impl MockTransaction {
    /// Creates a transaction for the sender and nonce with a random hash and
    /// default fee fields.
    pub fn new(sender: Address, nonce: u64) -> Self {
        Self {
            hash: TxHash::from(rand::random::<[u8; 32]>()),
            sender,
            nonce,
            gas_price: MOCK_GAS_PRICE,
            gas_limit: MOCK_GAS_LIMIT,
            size: MOCK_TX_SIZE,
        }
    }

    /// Sets the hash.
    pub const fn with_hash(mut self, hash: TxHash) -> Self {
        self.hash = hash;
        self
    }

    /// Assigns a fresh random hash.
    pub fn rng_hash(self) -> Self {
        let hash = TxHash::from(rand::random::<[u8; 32]>());
        self.with_hash(hash)
    }

    /// Sets the gas price.
    pub const fn with_gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = gas_price;
        self
    }

    /// Sets the gas limit.
    pub const fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    /// Sets the serialized size.
    pub const fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }
}

impl PoolTransaction for MockTransaction {
    fn hash(&self) -> &TxHash {
        &self.hash
    }

    fn sender(&self) -> Address {
        self.sender
    }

    fn nonce(&self) -> u64 {
        self.nonce
    }

    fn gas_price(&self) -> u128 {
        self.gas_price
    }

    fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    fn size(&self) -> usize {
        self.size
    }
}

/// Creates [`MockTransaction`]s with sequential, collision-free hashes.
#[derive(Debug, Default)]
pub struct MockTransactionFactory {
    id: u64,
}

// === impl MockTransactionFactory ===

impl MockTransactionFactory {
    fn next_hash(&mut self) -> TxHash {
        self.id += 1;
        B256::from(U256::from(self.id))
    }

    /// Creates a transaction for the sender and nonce.
    pub fn create(&mut self, sender: Address, nonce: u64) -> MockTransaction {
        let hash = self.next_hash();
        MockTransaction::new(sender, nonce).with_hash(hash)
    }

    /// Creates a transaction with the given gas price.
    pub fn create_with_price(
        &mut self,
        sender: Address,
        nonce: u64,
        gas_price: u128,
    ) -> MockTransaction {
        self.create(sender, nonce).with_gas_price(gas_price)
    }
}
