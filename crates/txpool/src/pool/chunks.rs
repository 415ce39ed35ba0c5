//! Sharded index maps.
//!
//! Both indexes of the pool are partitioned into independently lockable
//! chunks so that ingestion, removal and selection contend on a fraction of
//! the key space instead of a single lock. Cross-chunk reads take one chunk
//! lock at a time and therefore observe eventually-consistent snapshots.

use crate::{pool::sender::SenderEntry, traits::PoolTransaction};
use alloy_primitives::Address;
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet, FxHasher};
use std::{
    hash::{Hash, Hasher},
    sync::{atomic::Ordering, Arc},
};

/// Number of score buckets of the by-sender index: one per possible bit
/// length of a score, so a sender's bucket is the base-2 magnitude of its
/// score.
pub(crate) const NUM_SCORE_BUCKETS: usize = (u64::BITS + 1) as usize;

/// Maps a sender score to its bucket: the bit length of the score.
///
/// Coarse on purpose; the buckets only pre-order iteration so neither
/// eviction nor selection needs a full sort.
pub(crate) const fn score_bucket(score: u64) -> usize {
    (u64::BITS - score.leading_zeros()) as usize
}

/// A map partitioned into independently lockable chunks.
///
/// The partition function is pure and stable for the life of the map: the
/// same key always resolves to the same chunk.
#[derive(Debug)]
pub(crate) struct ChunkedMap<K, V> {
    chunks: Box<[RwLock<FxHashMap<K, V>>]>,
}

// === impl ChunkedMap ===

impl<K: Eq + Hash + Clone, V: Clone> ChunkedMap<K, V> {
    pub(crate) fn new(num_chunks: usize) -> Self {
        let chunks = (0..num_chunks.max(1)).map(|_| RwLock::new(FxHashMap::default())).collect();
        Self { chunks }
    }

    /// The index of the chunk responsible for `key`.
    fn chunk_for(&self, key: &K) -> usize {
        let mut hasher = FxHasher::default();
        key.hash(&mut hasher);
        (hasher.finish() % self.chunks.len() as u64) as usize
    }

    /// Inserts the value unless the key is already present.
    ///
    /// Returns whether the value was inserted.
    pub(crate) fn insert_if_absent(&self, key: K, value: V) -> bool {
        let mut chunk = self.chunks[self.chunk_for(&key)].write();
        match chunk.entry(key) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        }
    }

    /// Returns the value for the key, or inserts the one produced by
    /// `create`.
    ///
    /// `on_insert` runs under the chunk lock for a newly created value,
    /// before any other thread can observe it through this map.
    pub(crate) fn get_or_insert_with(
        &self,
        key: K,
        create: impl FnOnce() -> V,
        on_insert: impl FnOnce(&V),
    ) -> (V, bool) {
        let mut chunk = self.chunks[self.chunk_for(&key)].write();
        match chunk.entry(key) {
            std::collections::hash_map::Entry::Occupied(slot) => (slot.get().clone(), false),
            std::collections::hash_map::Entry::Vacant(slot) => {
                let value = slot.insert(create()).clone();
                on_insert(&value);
                (value, true)
            }
        }
    }

    pub(crate) fn get(&self, key: &K) -> Option<V> {
        self.chunks[self.chunk_for(key)].read().get(key).cloned()
    }

    pub(crate) fn contains(&self, key: &K) -> bool {
        self.chunks[self.chunk_for(key)].read().contains_key(key)
    }

    pub(crate) fn remove(&self, key: &K) -> Option<V> {
        self.chunks[self.chunk_for(key)].write().remove(key)
    }

    /// Removes the entry only if `predicate` accepts the stored value.
    pub(crate) fn remove_if(&self, key: &K, predicate: impl FnOnce(&V) -> bool) -> Option<V> {
        let mut chunk = self.chunks[self.chunk_for(key)].write();
        if chunk.get(key).is_some_and(predicate) {
            return chunk.remove(key)
        }
        None
    }

    /// Number of entries, summed chunk by chunk.
    pub(crate) fn count(&self) -> usize {
        self.chunks.iter().map(|chunk| chunk.read().len()).sum()
    }

    /// All keys, collected chunk by chunk. Diagnostic use only.
    pub(crate) fn keys(&self) -> Vec<K> {
        let mut keys = Vec::new();
        for chunk in self.chunks.iter() {
            keys.extend(chunk.read().keys().cloned());
        }
        keys
    }

    /// Entry count per chunk, for the senders histogram.
    pub(crate) fn chunk_counts(&self) -> Vec<usize> {
        self.chunks.iter().map(|chunk| chunk.read().len()).collect()
    }

    /// Visits every entry, one chunk lock at a time.
    pub(crate) fn for_each(&self, mut visitor: impl FnMut(&K, &V)) {
        for chunk in self.chunks.iter() {
            for (key, value) in chunk.read().iter() {
                visitor(key, value);
            }
        }
    }
}

/// The by-sender index: a chunked backing map plus coarse score buckets.
///
/// The buckets pre-order senders by score so eviction (worst first) and
/// selection (best first) iterate without sorting the whole sender set. An
/// entry migrates buckets whenever a mutation changes its score; migration
/// is serialized per entry by the sender list lock, see
/// [`SenderEntry::bucket`].
#[derive(Debug)]
pub(crate) struct ScoredSenderMap<T: PoolTransaction> {
    backing: ChunkedMap<Address, Arc<SenderEntry<T>>>,
    buckets: Box<[RwLock<FxHashMap<Address, Arc<SenderEntry<T>>>>]>,
}

// === impl ScoredSenderMap ===

impl<T: PoolTransaction> ScoredSenderMap<T> {
    pub(crate) fn new(num_chunks: usize) -> Self {
        let buckets = (0..NUM_SCORE_BUCKETS).map(|_| RwLock::new(FxHashMap::default())).collect();
        Self { backing: ChunkedMap::new(num_chunks), buckets }
    }

    /// Returns the entry for the sender, creating it in the backing map and
    /// the lowest score bucket if absent.
    ///
    /// The second value reports whether the entry is new. Callers that find
    /// the entry's list detached must call this again: detachment means the
    /// entry has been unlinked concurrently.
    pub(crate) fn get_or_create(&self, sender: Address) -> (Arc<SenderEntry<T>>, bool) {
        self.backing.get_or_insert_with(
            sender,
            || Arc::new(SenderEntry::new(sender)),
            // Linked into the bucket before the chunk lock is released, so no
            // reachable entry is ever missing from the buckets.
            |entry| {
                self.buckets[0].write().insert(sender, entry.clone());
            },
        )
    }

    pub(crate) fn get(&self, sender: &Address) -> Option<Arc<SenderEntry<T>>> {
        self.backing.get(sender)
    }

    /// Re-places the entry into the bucket matching `score`.
    ///
    /// Caller must hold the entry's list lock, which makes the swap on the
    /// stored bucket index a per-entry serialization point.
    pub(crate) fn update_score(&self, entry: &Arc<SenderEntry<T>>, score: u64) {
        let new = score_bucket(score);
        let old = entry.bucket.swap(new, Ordering::AcqRel);
        if old == new {
            return
        }
        let moved = {
            let mut bucket = self.buckets[old].write();
            if bucket.get(&entry.sender).is_some_and(|stored| Arc::ptr_eq(stored, entry)) {
                bucket.remove(&entry.sender);
                true
            } else {
                // a stale entry no longer linked anywhere must not relink
                // itself under the new bucket
                false
            }
        };
        if moved {
            self.buckets[new].write().insert(entry.sender, entry.clone());
        }
    }

    /// Unlinks a detached entry from the backing map and its score bucket.
    ///
    /// Caller must hold the entry's list lock and have marked the list
    /// detached. Both removals are pointer-guarded: a fresh entry for the
    /// same sender created after this one must not be torn down.
    pub(crate) fn remove_entry(&self, entry: &Arc<SenderEntry<T>>) {
        self.backing.remove_if(&entry.sender, |stored| Arc::ptr_eq(stored, entry));
        let bucket = entry.bucket.load(Ordering::Acquire);
        let mut bucket = self.buckets[bucket].write();
        if bucket.get(&entry.sender).is_some_and(|stored| Arc::ptr_eq(stored, entry)) {
            bucket.remove(&entry.sender);
        }
    }

    /// Senders in ascending score-bucket order, worst first.
    ///
    /// Within a bucket the tie-break is ascending sender address, which keeps
    /// iteration deterministic for a fixed snapshot. Entries caught mid
    /// bucket-migration are deduplicated, first sighting wins.
    pub(crate) fn snapshot_ascending(&self) -> Vec<Arc<SenderEntry<T>>> {
        self.snapshot(self.buckets.iter())
    }

    /// Senders in descending score-bucket order, best first.
    pub(crate) fn snapshot_descending(&self) -> Vec<Arc<SenderEntry<T>>> {
        self.snapshot(self.buckets.iter().rev())
    }

    fn snapshot<'a>(
        &'a self,
        buckets: impl Iterator<Item = &'a RwLock<FxHashMap<Address, Arc<SenderEntry<T>>>>>,
    ) -> Vec<Arc<SenderEntry<T>>> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        for bucket in buckets {
            let mut entries: Vec<_> = bucket.read().values().cloned().collect();
            entries.sort_unstable_by_key(|entry| entry.sender);
            out.extend(entries.into_iter().filter(|entry| seen.insert(entry.sender)));
        }
        out
    }

    /// Number of senders in the backing map.
    pub(crate) fn count(&self) -> usize {
        self.backing.count()
    }

    /// Number of senders across the score buckets. Diagnostic counterpart of
    /// [`count`](Self::count); the two agree at quiescence.
    pub(crate) fn count_sorted(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.read().len()).sum()
    }

    /// All sender keys from the backing map. Diagnostic use only.
    pub(crate) fn keys(&self) -> Vec<Address> {
        self.backing.keys()
    }

    /// All sender keys in score order. Diagnostic use only.
    pub(crate) fn keys_sorted(&self) -> Vec<Address> {
        self.snapshot_ascending().iter().map(|entry| entry.sender).collect()
    }

    /// Entry count per backing chunk.
    pub(crate) fn chunk_counts(&self) -> Vec<usize> {
        self.backing.chunk_counts()
    }

    /// Entry count per score bucket.
    pub(crate) fn bucket_counts(&self) -> Vec<usize> {
        self.buckets.iter().map(|bucket| bucket.read().len()).collect()
    }

    /// Visits every entry of the backing map, one chunk at a time.
    pub(crate) fn for_each(&self, mut visitor: impl FnMut(&Arc<SenderEntry<T>>)) {
        self.backing.for_each(|_, entry| visitor(entry));
    }
}
