//! Selection of the best transactions for block assembly.

use crate::{pool::PoolInner, traits::PoolTransaction, validate::ValidPoolTransaction};
use std::sync::Arc;

// === impl PoolInner ===

impl<T: PoolTransaction> PoolInner<T> {
    /// Returns an ordered batch of transactions for inclusion in the next
    /// block.
    ///
    /// Senders are visited in descending score order; within a sender the
    /// list is walked in ascending nonce order. The first transaction of a
    /// sender that would blow the remaining gas or byte budget stops
    /// consumption of that sender only, as does a nonce gap: a transaction
    /// is never selected before its predecessor nonce. `have_time` is polled
    /// before each sender; once it reports `false` the batch accumulated so
    /// far is returned. Truncation is best-effort, never an error.
    ///
    /// Selection is read-only: entries stay in the pool until block
    /// processing removes them explicitly.
    pub(crate) fn select_transactions(
        &self,
        max_gas: u64,
        max_bytes: u64,
        mut have_time: impl FnMut() -> bool,
    ) -> Vec<Arc<ValidPoolTransaction<T>>> {
        let started = self.monitor_selection_start();

        let mut selection = Vec::new();
        let mut gas_left = max_gas;
        let mut bytes_left = max_bytes;

        for entry in self.by_sender.snapshot_descending() {
            if !have_time() {
                break
            }
            let list = entry.list.lock();
            if list.is_detached() {
                continue
            }
            let mut previous_nonce = None;
            for tx in list.iter() {
                if previous_nonce.is_some_and(|nonce| tx.nonce() != nonce + 1) {
                    // nonce gap: the rest of this sender cannot execute yet
                    break
                }
                if tx.gas_limit() > gas_left || tx.size() as u64 > bytes_left {
                    // out of budget for this sender; others may still fit
                    break
                }
                gas_left -= tx.gas_limit();
                bytes_left -= tx.size() as u64;
                previous_nonce = Some(tx.nonce());
                selection.push(tx.clone());
            }
        }

        self.monitor_selection_end(started, selection.len());
        selection
    }
}
