// ===============================
// src/config.rs
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
use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;

pub const DEFAULT_BATCH_SIZE: usize = 5000;

/// Where the durable store lives. Explicit struct handed to constructors;
/// no process-wide mutable config state.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub path: PathBuf,
}

#[derive(Clone, Debug)]
pub struct IngestConfig {
    /// Completed records per store transaction.
    pub batch_size: usize,
}

/// Reads configuration from the environment (and `.env` if present):
///   SATTRACK_DB         — database file path (default: sattrack.db)
///   SATTRACK_BATCH_SIZE — records per import transaction (default: 5000)
/// CLI flags override these in main.
pub fn load() -> (StoreConfig, IngestConfig) {
    // Make sure .env is read (SATTRACK_DB, SATTRACK_BATCH_SIZE)
    let _ = dotenv();

    let path = env::var("SATTRACK_DB")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("sattrack.db"));

    let batch_size = env::var("SATTRACK_BATCH_SIZE")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|n: &usize| *n > 0)
        .unwrap_or(DEFAULT_BATCH_SIZE);

    (StoreConfig { path }, IngestConfig { batch_size })
}
