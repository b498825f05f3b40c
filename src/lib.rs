// Copyright 2024 Uniquify Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! Parallel deduplication of newline-separated records.
//!
//! [`uniquify_path`] memory-maps a file, fingerprints each record with a
//! SIMD-assisted scanner, and coordinates distinctness across worker
//! threads through a sharded open-addressing hash set. Each distinct
//! record's first occurrence is written to standard output exactly once.
//!
//! Records within one worker's range keep their input order on output;
//! there is no guarantee about the order in which different workers' output
//! interleaves. See the module docs on [`worker`] and [`sharded`] for the
//! concurrency model.

mod driver;
pub mod error;
mod fingerprint;
mod hashset;
mod partition;
mod sharded;
mod sink;
mod worker;

pub mod corpus;

pub use driver::{uniquify_path, uniquify_to_memory};
pub use error::UniquifyError;
pub use sink::{MemorySink, Sink};
