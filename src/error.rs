// ===============================
// src/error.rs
// ===============================
/*
=============================================================================
Project : sattrack_rust — satellite position tracker in Rust
Module  : <module_name>.rs
Version : 0.3.0
License : MIT (see LICENSE)

Summary : Streams bulk satellite position dumps into an embedded SQLite
          store in fixed-size batches, and answers two queries: the last
          known position of a satellite, and the satellite closest to a
          point at (or before) a given timestamp.
=============================================================================
*/
use std::path::PathBuf;

use thiserror::Error;

/// Failure taxonomy for the tracker. "Not found" is never an error: queries
/// return `Ok(None)` for an absent result.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The database could not be opened at all.
    #[error("cannot open database at {path:?}: {source}")]
    Connect {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// The store rejected a write or a query failed mid-flight. Batches
    /// already committed before this point stay durable.
    #[error("storage error: {0}")]
    Store(#[from] rusqlite::Error),

    /// The input stream could not be decoded; aborts the ingestion run.
    #[error("malformed input: {0}")]
    MalformedInput(#[from] serde_json::Error),

    #[error("unrecognized timestamp {0:?} (expected RFC 3339 or ISO-8601)")]
    BadTimestamp(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
