//! End-to-end behavior of the public pool surface.

use alloy_primitives::Address;
use lattice_txpool::{
    test_utils::MockTransactionFactory, Pool, PoolConfig, PoolError, PoolTransaction,
    TransactionPool,
};

const NO_LIMIT: u64 = u64::MAX;

fn pool() -> Pool<lattice_txpool::test_utils::MockTransaction> {
    Pool::new(PoolConfig::default())
}

#[test]
fn add_remove_round_trip_restores_aggregates() {
    let pool = pool();
    let mut f = MockTransactionFactory::default();

    let before = (pool.len(), pool.num_bytes(), pool.count_senders());
    let tx = f.create(Address::with_last_byte(1), 0);
    let hash = *tx.hash();

    assert!(pool.add_transaction(tx).unwrap());
    assert!(pool.remove_transaction(&hash));
    assert_eq!((pool.len(), pool.num_bytes(), pool.count_senders()), before);
}

#[test]
fn duplicate_add_leaves_len_unchanged() {
    let pool = pool();
    let mut f = MockTransactionFactory::default();
    let tx = f.create(Address::with_last_byte(1), 0);

    assert!(pool.add_transaction(tx.clone()).unwrap());
    let len = pool.len();
    assert!(!pool.add_transaction(tx).unwrap());
    assert_eq!(pool.len(), len);
}

#[test]
fn replace_by_priority_keeps_one_entry() {
    let pool = pool();
    let mut f = MockTransactionFactory::default();
    let sender = Address::with_last_byte(1);

    pool.add_transaction(f.create_with_price(sender, 5, 10)).unwrap();
    pool.add_transaction(f.create_with_price(sender, 5, 20)).unwrap();

    assert_eq!(pool.len(), 1);
    let batch = pool.select_transactions(NO_LIMIT, NO_LIMIT, || true);
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].nonce(), 5);
    assert_eq!(batch[0].transaction.gas_price(), 20);
}

#[test]
fn malformed_input_is_the_only_error() {
    let pool = pool();
    let tx = lattice_txpool::test_utils::MockTransaction::new(Address::ZERO, 0);
    assert!(matches!(pool.add_transaction(tx), Err(PoolError::InvalidTransaction(_))));
    assert!(pool.is_empty());
}

#[test]
fn bulk_removal_tolerates_unknown_hashes() {
    let pool = pool();
    let mut f = MockTransactionFactory::default();
    let sender = Address::with_last_byte(1);

    let a = f.create(sender, 0);
    let b = f.create(sender, 1);
    let unknown = *f.create(sender, 2).hash();
    let hashes = vec![*a.hash(), *b.hash(), unknown];

    pool.add_transactions([a, b]).into_iter().for_each(|res| assert!(res.unwrap()));
    pool.remove_transactions(hashes);

    assert!(pool.is_empty());
    assert_eq!(pool.count_senders(), 0);
}

#[test]
fn eviction_scenario_three_senders_over_byte_threshold() {
    // three senders submit 1500 bytes total against a 1000 byte threshold;
    // eviction runs inline on the triggering add, so once it returns the
    // pool is back under the threshold
    let pool = Pool::new(PoolConfig {
        max_bytes: 1000,
        senders_per_eviction_step: 1,
        ..Default::default()
    });
    let mut f = MockTransactionFactory::default();

    for i in 0..3u8 {
        let sender = Address::with_last_byte(i + 1);
        let tx = f.create_with_price(sender, 0, (i as u128 + 1) * 100).with_size(500);
        pool.add_transaction(tx).unwrap();
    }

    assert!(pool.num_bytes() <= 1000, "bytes: {}", pool.num_bytes());
    assert!(pool.len() < 3);
}

#[test]
fn selection_scenario_five_txs_across_three_senders() {
    let pool = pool();
    let mut f = MockTransactionFactory::default();

    let low = Address::with_last_byte(1);
    let high = Address::with_last_byte(2);
    let mid = Address::with_last_byte(3);
    pool.add_transaction(f.create_with_price(low, 0, 1)).unwrap();
    pool.add_transaction(f.create_with_price(high, 0, 1_000_000)).unwrap();
    pool.add_transaction(f.create_with_price(high, 1, 1_000_000)).unwrap();
    pool.add_transaction(f.create_with_price(mid, 0, 1_000)).unwrap();
    pool.add_transaction(f.create_with_price(mid, 1, 1_000)).unwrap();

    let batch = pool.select_transactions(NO_LIMIT, NO_LIMIT, || true);
    let got: Vec<_> = batch.iter().map(|tx| (tx.sender(), tx.nonce())).collect();
    assert_eq!(got, vec![(high, 0), (high, 1), (mid, 0), (mid, 1), (low, 0)]);
}

#[test]
fn selection_scenario_deadline_truncates() {
    let pool = pool();
    let mut f = MockTransactionFactory::default();
    for i in 0..4u8 {
        pool.add_transaction(f.create(Address::with_last_byte(i + 1), 0)).unwrap();
    }

    let mut polls = 0;
    let batch = pool.select_transactions(NO_LIMIT, NO_LIMIT, || {
        polls += 1;
        polls <= 1
    });
    assert!(batch.len() <= 1);
}

#[test]
fn selection_scenario_nonce_gap_blocks_tail() {
    let pool = pool();
    let mut f = MockTransactionFactory::default();
    let sender = Address::with_last_byte(1);
    pool.add_transaction(f.create(sender, 3)).unwrap();
    pool.add_transaction(f.create(sender, 5)).unwrap();

    let batch = pool.select_transactions(NO_LIMIT, NO_LIMIT, || true);
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].nonce(), 3);
}

#[test]
fn clear_resets_the_pool() {
    let pool = pool();
    let mut f = MockTransactionFactory::default();
    for i in 0..10u8 {
        pool.add_transaction(f.create(Address::with_last_byte(i + 1), 0)).unwrap();
    }
    assert_eq!(pool.len(), 10);

    pool.clear();
    assert!(pool.is_empty());
    assert_eq!(pool.num_bytes(), 0);
    assert_eq!(pool.count_senders(), 0);
    assert!(pool.select_transactions(NO_LIMIT, NO_LIMIT, || true).is_empty());
}

#[test]
fn lookup_by_hash() {
    let pool = pool();
    let mut f = MockTransactionFactory::default();
    let tx = f.create(Address::with_last_byte(1), 7);
    let hash = *tx.hash();

    pool.add_transaction(tx).unwrap();
    assert!(pool.contains(&hash));
    assert_eq!(pool.get(&hash).unwrap().nonce(), 7);

    pool.remove_transaction(&hash);
    assert!(!pool.contains(&hash));
    assert!(pool.get(&hash).is_none());
}

#[test]
fn pool_is_usable_through_the_trait() {
    fn exercise<P: TransactionPool>(pool: &P, txs: Vec<P::Transaction>) -> usize {
        for tx in txs {
            pool.add_transaction(tx).unwrap();
        }
        pool.select_transactions(NO_LIMIT, NO_LIMIT, &mut || true).len()
    }

    let pool = pool();
    let mut f = MockTransactionFactory::default();
    let sender = Address::with_last_byte(1);
    let txs = vec![f.create(sender, 0), f.create(sender, 1)];
    assert_eq!(exercise(&pool, txs), 2);
}
