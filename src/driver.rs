// Copyright 2024 Uniquify Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! Maps the file, spawns workers, aggregates, unmaps.

use std::fs::File;
use std::num::NonZeroUsize;
use std::path::Path;

use memmap2::MmapOptions;
use tracing::{debug_span, info_span};

use crate::error::UniquifyError;
use crate::partition;
use crate::sharded::ShardedSet;
use crate::sink::{MemorySink, Sink, Stdout};
use crate::worker;

/// Deduplicates the newline-separated records in the file at `path`, writing
/// each distinct record (followed by `0x0A`) to standard output exactly
/// once, and returns the number of distinct records.
///
/// `worker_count` threads are spawned to scan disjoint, newline-aligned
/// ranges of the file in parallel; see the crate docs for the concurrency
/// and ordering guarantees this makes.
pub fn uniquify_path(
    path: impl AsRef<Path>,
    worker_count: NonZeroUsize,
) -> Result<u32, UniquifyError> {
    run(path.as_ref(), worker_count, &Stdout)
}

/// Same contract as [`uniquify_path`], but collects output into memory
/// instead of writing it to the process's standard output. Exists so the
/// engine's correctness properties can be tested without capturing a real
/// file descriptor.
pub fn uniquify_to_memory(
    path: impl AsRef<Path>,
    worker_count: NonZeroUsize,
) -> Result<(u32, Vec<u8>), UniquifyError> {
    let sink = MemorySink::default();
    let count = run(path.as_ref(), worker_count, &sink)?;
    Ok((count, sink.take()))
}

fn run(path: &Path, worker_count: NonZeroUsize, sink: &impl Sink) -> Result<u32, UniquifyError> {
    let worker_count = worker_count.get();

    let file = info_span!("open", path = %path.display()).in_scope(|| {
        File::open(path).map_err(|source| UniquifyError::Open {
            path: path.to_path_buf(),
            source,
        })
    })?;

    let len = info_span!("stat", path = %path.display()).in_scope(|| {
        file.metadata()
            .map(|meta| meta.len())
            .map_err(|source| UniquifyError::Stat {
                path: path.to_path_buf(),
                source,
            })
    })?;

    if len == 0 {
        return Ok(0);
    }

    let mmap = info_span!("map", path = %path.display(), bytes = len).in_scope(|| {
        // Safety: the file is opened read-only above and is not modified by
        // this process for the lifetime of `mmap`; concurrent external
        // modification is the caller's risk to manage, as with any mmap.
        unsafe { MmapOptions::new().populate().map(&file) }.map_err(|source| UniquifyError::Map {
            path: path.to_path_buf(),
            source,
        })
    })?;

    let set = ShardedSet::new(worker_count);
    let ranges = partition::partition(&mmap, worker_count);

    let results = crossbeam_utils::thread::scope(|scope| {
        let handles: Vec<_> = ranges
            .iter()
            .enumerate()
            .map(|(index, range)| {
                let data = &mmap[range.start..range.end];
                let set = &set;
                scope.spawn(move |_| {
                    debug_span!("worker", index, bytes = data.len())
                        .in_scope(|| worker::process(data, set, sink))
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("worker thread panicked"))
            .collect::<Vec<_>>()
    })
    .expect("worker scope panicked");

    for result in results {
        result.map_err(|source| UniquifyError::Write { source })?;
    }

    Ok(set.size() as u32)
}
