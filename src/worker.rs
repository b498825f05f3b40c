// Copyright 2024 Uniquify Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! Per-worker scan → hash → dedup → stage loop.

use std::io;

use crate::fingerprint;
use crate::sharded::ShardedSet;
use crate::sink::Sink;

/// Records fingerprinted per batch before the dedup pass runs over them.
/// 128-1024 are all reasonable; 500 balances prefetch lookahead against
/// cache pressure from the three parallel arrays.
const BATCH_SIZE: usize = 500;

/// How many batch positions ahead of the current insert to prefetch.
/// Tolerant to values between 8 and 32.
const PREFETCH_STRIDE: usize = 16;

const INITIAL_OUTPUT_CAPACITY: usize = 1024;

/// Walks `range`, deduplicating records against `set` and flushing the
/// survivors to `sink` in one write once the range is exhausted.
///
/// `range` must already be newline-aligned at both ends (the partitioner
/// guarantees this); an empty range returns immediately without touching
/// `sink`.
pub fn process(range: &[u8], set: &ShardedSet, sink: &impl Sink) -> io::Result<()> {
    if range.is_empty() {
        return Ok(());
    }

    let mut output = Vec::with_capacity(INITIAL_OUTPUT_CAPACITY);
    let mut cursor = 0;

    let mut hashes = [0u64; BATCH_SIZE];
    let mut lengths = [0usize; BATCH_SIZE];
    let mut starts = [0usize; BATCH_SIZE];

    while cursor < range.len() {
        let mut batch_len = 0;
        while batch_len < BATCH_SIZE && cursor < range.len() {
            let (length, hash) = fingerprint::scan(&range[cursor..]);
            hashes[batch_len] = hash;
            lengths[batch_len] = length;
            starts[batch_len] = cursor;
            cursor += length + 1;
            batch_len += 1;
        }

        for i in 0..batch_len {
            if i + PREFETCH_STRIDE < batch_len {
                set.prefetch(hashes[i + PREFETCH_STRIDE]);
            }
            if set.insert(hashes[i]) {
                let record_end = (starts[i] + lengths[i] + 1).min(range.len());
                output.extend_from_slice(&range[starts[i]..record_end]);
                // The final record of the file may lack a trailing newline;
                // `OutputBuffer` always terminates each record with one.
                if record_end == range.len() && range[record_end - 1] != b'\n' {
                    output.push(b'\n');
                }
            }
        }
    }

    if output.is_empty() {
        return Ok(());
    }
    sink.write_batch(&output)
}
