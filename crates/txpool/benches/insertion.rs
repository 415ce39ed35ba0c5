#![allow(missing_docs)]
use alloy_primitives::Address;
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use lattice_txpool::{
    test_utils::{MockTransaction, MockTransactionFactory},
    Pool, PoolConfig,
};

/// Generates gapless transactions for multiple senders.
fn generate_transactions(num_senders: usize, txs_per_sender: usize) -> Vec<MockTransaction> {
    let mut f = MockTransactionFactory::default();
    let mut txs = Vec::with_capacity(num_senders * txs_per_sender);

    for sender_idx in 0..num_senders {
        let sender_bytes = (sender_idx as u64).to_be_bytes();
        let addr_slice: Vec<u8> = [0u8; 12].into_iter().chain(sender_bytes).collect();
        let sender = Address::from_slice(&addr_slice);

        for nonce in 0..txs_per_sender {
            let tx = f
                .create(sender, nonce as u64)
                .with_gas_price(1 + (sender_idx * txs_per_sender + nonce) as u128);
            txs.push(tx);
        }
    }

    txs
}

fn txpool_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("Txpool insertion");
    let scenarios = [(100, 10), (1000, 10), (5000, 20)];

    for (sender_count, txs_per_sender) in scenarios {
        let group_id =
            format!("senders: {sender_count} | txs per sender: {txs_per_sender}");

        group.bench_function(group_id, |b| {
            b.iter_batched(
                || {
                    let pool = Pool::new(PoolConfig::default());
                    let txs = generate_transactions(sender_count, txs_per_sender);
                    (pool, txs)
                },
                |(pool, txs)| {
                    for tx in txs {
                        let _ = pool.add_transaction(tx);
                    }
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn txpool_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("Txpool selection");
    let scenarios = [(1000, 10), (5000, 20)];

    for (sender_count, txs_per_sender) in scenarios {
        let group_id =
            format!("senders: {sender_count} | txs per sender: {txs_per_sender}");

        let pool = Pool::new(PoolConfig::default());
        for tx in generate_transactions(sender_count, txs_per_sender) {
            let _ = pool.add_transaction(tx);
        }

        group.bench_function(group_id, |b| {
            b.iter(|| pool.select_transactions(u64::MAX, u64::MAX, || true));
        });
    }

    group.finish();
}

criterion_group!(benches, txpool_insertion, txpool_selection);
criterion_main!(benches);
