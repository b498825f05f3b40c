// Copyright 2024 Uniquify Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! Where a worker's finished output buffer goes.
//!
//! Production code always uses [`Stdout`]. Tests and the property-test
//! suite use [`MemorySink`] so output can be inspected without redirecting
//! the process's actual standard output.

use std::io::{self, Write};
use std::sync::Mutex;

/// Receives one worker's complete output buffer per call.
///
/// Implementations must serialize calls internally — `uniquify` never
/// interleaves two workers' writes, but it also never serializes workers
/// itself beyond calling this trait, so the guarantee has to live here.
pub trait Sink: Sync {
    fn write_batch(&self, bytes: &[u8]) -> io::Result<()>;
}

/// Writes straight to the process's standard output.
///
/// `Stdout::lock()` already serializes concurrent writers internally, which
/// is exactly the "acquire a process-wide mutex, write once, release" shape
/// the worker loop wants; no separate lock needs to be threaded through.
pub struct Stdout;

impl Sink for Stdout {
    fn write_batch(&self, bytes: &[u8]) -> io::Result<()> {
        io::stdout().lock().write_all(bytes)
    }
}

/// Collects every worker's output into one in-memory buffer, in whatever
/// order workers happen to flush.
#[derive(Default)]
pub struct MemorySink {
    buffer: Mutex<Vec<u8>>,
}

impl MemorySink {
    /// Returns the accumulated bytes, leaving the sink empty.
    pub fn take(&self) -> Vec<u8> {
        std::mem::take(&mut self.buffer.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

impl Sink for MemorySink {
    fn write_batch(&self, bytes: &[u8]) -> io::Result<()> {
        self.buffer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(bytes);
        Ok(())
    }
}
