// Copyright 2024 Uniquify Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! Typed errors surfaced by the driver.
//!
//! The library never aborts the process itself; it returns `Err` and leaves
//! the decision to terminate to its caller (see `uniquify-cli`).

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while running [`crate::uniquify_path`].
#[derive(Debug, Error)]
pub enum UniquifyError {
    #[error("failed to open {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to stat {}", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to map {}", path.display())]
    Map {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write output")]
    Write {
        #[source]
        source: io::Error,
    },
}
