//! Persistence layer for the keytally application.
//!
//! The store is a plain UTF-8 text file with one line per calendar day:
//!
//! ```text
//! 2024-01-09,5120,830,41
//! 2024-01-10,3,1,0
//! ```
//!
//! Field order is fixed (`date,keyboardPresses,leftClicks,rightClicks`) so
//! that external viewers can read the file directly. The whole file is
//! rewritten on every flush; there is no incremental append.
//!
//! ## Access Model
//!
//! - **Single Writer**: an exclusive advisory lock on `<file>.lock` keeps a
//!   second tracker instance from writing the same store
//! - **Atomic Replace**: writes go to `<file>.tmp` and are renamed into place
//! - **Lenient Reads**: malformed lines are skipped instead of failing the load
//!
//! ## Usage
//!
//! ```rust,no_run
//! use keytally::db::days::DayStore;
//!
//! let store = DayStore::open("keytally.txt")?;
//! let records = store.read_all()?;
//! store.write_all(&records)?;
//! # Ok::<(), keytally::db::StoreError>(())
//! ```

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Durable day-record store backed by a text file.
pub mod days;

/// Failures of the durable store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Another process holds the exclusive lock on the store.
    #[error("data file {} is in use by another process", path.display())]
    ResourceLocked { path: PathBuf },

    #[error("failed to write data file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read data file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A single line could not be parsed. Recovered by skipping the line.
    #[error("malformed record on line {line}: {reason}")]
    Malformed { line: u64, reason: String },
}
