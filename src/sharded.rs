// Copyright 2024 Uniquify Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! Fixed array of [`HashSet`] shards, each independently lockable.

use parking_lot::RwLock;

use crate::hashset::HashSet;

/// Shards per worker. Empirical; values between 16 and 256 all keep
/// write-lock contention negligible without materially growing memory.
const SHARDS_PER_WORKER: usize = 64;

/// Coordinates distinctness across worker threads by routing each
/// fingerprint to one of many independently-locked [`HashSet`] shards.
///
/// No fingerprint ever migrates between shards once the set is built: the
/// shard count is fixed for the lifetime of a `ShardedSet`.
pub struct ShardedSet {
    shards: Vec<RwLock<HashSet>>,
}

impl ShardedSet {
    /// Builds a set sized for `worker_count` concurrent workers.
    pub fn new(worker_count: usize) -> Self {
        let shard_count = worker_count.max(1) * SHARDS_PER_WORKER;
        let shards = (0..shard_count).map(|_| RwLock::new(HashSet::new())).collect();
        Self { shards }
    }

    #[inline]
    fn shard_for(&self, hash: u64) -> &RwLock<HashSet> {
        let index = (hash as u32) as usize % self.shards.len();
        &self.shards[index]
    }

    /// Inserts `hash` into its shard. Returns `true` if this call is the
    /// first to observe `hash` (i.e. the record is distinct so far).
    ///
    /// Takes a reader lock first, since steady-state traffic is mostly
    /// duplicates and readers can share a shard; only falls back to a
    /// writer lock when the fingerprint looks new. The writer-locked
    /// `insert` re-probes, so a race between the reader check and the
    /// writer insert can only make this call return `false` when it should
    /// have returned `true` in a single-threaded run — a repeat winner on
    /// the same fingerprint, never a duplicate winner.
    pub fn insert(&self, hash: u64) -> bool {
        let shard = self.shard_for(hash);
        if shard.read().find(hash) {
            return false;
        }
        shard.write().insert(hash)
    }

    /// Issues a prefetch hint for `hash`'s shard without taking any lock.
    ///
    /// Safety: reads the shard's `HashSet` through the lock's raw data
    /// pointer, bypassing `RwLock` entirely, so this can race a concurrent
    /// `grow()` on the same shard and see a torn `capacity`/`slots` pair.
    /// `FastUniq.hpp`'s `Prefetch` takes the identical risk for the same
    /// reason: a hardware prefetch instruction never faults on a bad
    /// address, so the worst case is a wasted or stale hint, never a crash,
    /// and taking the reader lock here would block this thread on whichever
    /// writer holds the shard, defeating the stride lookahead `process` in
    /// `worker.rs` relies on it for.
    pub fn prefetch(&self, hash: u64) {
        let shard = self.shard_for(hash);
        // Safety: see above; `data_ptr` never locks, and `HashSet::prefetch`
        // only reads slots to issue a non-binding hardware hint.
        unsafe { (*shard.data_ptr()).prefetch(hash) };
    }

    /// Sum of all shard sizes. Callers must not call this concurrently with
    /// any `insert`.
    pub fn size(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().size()).sum()
    }
}
