//! Concurrent churn against one shared pool instance.

use alloy_primitives::Address;
use lattice_txpool::{test_utils::MockTransaction, Pool, PoolConfig, PoolTransaction};
use std::thread;

const NO_LIMIT: u64 = u64::MAX;

/// Four producers add interleaved nonces for disjoint sender sets while a
/// block builder keeps selecting; every fifth transaction is removed again
/// right away. At quiescence the aggregates and the selection output must
/// match the deterministic end state.
#[test]
fn concurrent_add_remove_select_converges() {
    const THREADS: u8 = 4;
    const SENDERS_PER_THREAD: u8 = 10;
    const TXS_PER_THREAD: usize = 250;

    let pool = Pool::new(PoolConfig::default());

    thread::scope(|s| {
        for t in 0..THREADS {
            let pool = pool.clone();
            s.spawn(move || {
                for i in 0..TXS_PER_THREAD {
                    let offset = (i % SENDERS_PER_THREAD as usize) as u8;
                    let sender =
                        Address::with_last_byte(t * SENDERS_PER_THREAD + offset + 1);
                    let nonce = (i / SENDERS_PER_THREAD as usize) as u64;
                    let tx = MockTransaction::new(sender, nonce);
                    let hash = *tx.hash();
                    pool.add_transaction(tx).unwrap();
                    if i % 5 == 0 {
                        assert!(pool.remove_transaction(&hash));
                    }
                }
            });
        }

        let builder = pool.clone();
        s.spawn(move || {
            for _ in 0..20 {
                let batch = builder.select_transactions(NO_LIMIT, NO_LIMIT, || true);
                // within a batch, every sender's subsequence ascends by nonce
                let mut last: Vec<Option<u64>> = vec![None; 256];
                for tx in batch {
                    let idx = tx.sender().0[19] as usize;
                    if let Some(prev) = last[idx] {
                        assert!(tx.nonce() > prev, "nonce order violated mid-churn");
                    }
                    last[idx] = Some(tx.nonce());
                }
            }
        });
    });

    // each thread adds 250 txs and removes the 50 with i % 5 == 0; those
    // removals wipe out two senders per thread completely (offsets 0 and 5)
    let expected_txs = THREADS as usize * (TXS_PER_THREAD - 50);
    let expected_senders = THREADS as usize * (SENDERS_PER_THREAD as usize - 2);
    assert_eq!(pool.len(), expected_txs);
    assert_eq!(pool.count_senders(), expected_senders);

    // surviving senders hold gapless nonce ranges, so an unbounded selection
    // drains the entire pool
    let batch = pool.select_transactions(NO_LIMIT, NO_LIMIT, || true);
    assert_eq!(batch.len(), expected_txs);

    // the O(n) reconciliation agrees with the atomic counters at quiescence
    pool.diagnose();
}

/// Inline evictions racing with adds from many threads never panic and leave
/// the pool under (or at worst near) its thresholds once traffic stops.
#[test]
fn concurrent_adds_with_eviction_pressure() {
    let pool = Pool::new(PoolConfig {
        max_tx_count: 100,
        max_txs_per_sender: 10,
        senders_per_eviction_step: 4,
        ..Default::default()
    });

    thread::scope(|s| {
        for t in 0..4u8 {
            let pool = pool.clone();
            s.spawn(move || {
                for i in 0..500usize {
                    let sender = Address::with_last_byte(t * 32 + (i % 32) as u8 + 1);
                    let tx = MockTransaction::new(sender, (i / 32) as u64)
                        .with_gas_price(1 + i as u128);
                    pool.add_transaction(tx).unwrap();
                }
            });
        }
    });

    // one final run with no competing traffic must settle under threshold
    pool.diagnose();
    let before = pool.len();
    assert!(before <= 2000);
    // trigger an explicit eviction through an add on a fresh sender
    pool.add_transaction(MockTransaction::new(Address::with_last_byte(255), 0)).unwrap();
    // the pool holds at most threshold + one in-flight add at rest
    assert!(pool.len() <= 101, "len: {}", pool.len());
}
