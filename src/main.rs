// ===============================
// src/main.rs
// ===============================
/*
 cd ~/rust/sattrack_rust

 # bulk-import a historical dump
 sattrack_rust import data/starlink_historical_data.json

 # query it
 sattrack_rust last-position STARLINK-30
 sattrack_rust closest --lat 52.5 --lon 13.4 --as-of 2021-01-26T06:26:10Z

*/
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
mod config;
mod domain;
mod error;
mod geo;
mod ingest;
mod service;
mod store;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};

use crate::error::Result;
use crate::ingest::ImportFormat;
use crate::service::QueryService;
use crate::store::PositionStore;

#[derive(Parser)]
#[command(name = "sattrack_rust", version, about = "Satellite position tracker")]
struct Cli {
    /// Database file; overrides SATTRACK_DB.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Bulk-import satellite observations from a historical dump.
    Import {
        /// Input file path.
        input: PathBuf,

        #[arg(long, value_enum, default_value = "json")]
        format: ImportFormat,

        /// Records per store transaction; overrides SATTRACK_BATCH_SIZE.
        #[arg(long)]
        batch_size: Option<usize>,
    },
    /// Last known position of one satellite.
    LastPosition {
        /// Satellite id, e.g. STARLINK-30.
        satellite_id: String,
    },
    /// Satellite closest to a point at (or before) a timestamp.
    Closest {
        #[arg(long)]
        lat: f64,

        #[arg(long)]
        lon: f64,

        /// RFC 3339 or bare ISO-8601, e.g. 2021-01-26T06:26:10Z.
        #[arg(long)]
        as_of: String,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let (mut store_cfg, ingest_cfg) = config::load();
    if let Some(db) = cli.db {
        store_cfg.path = db;
    }

    match cli.command {
        Command::Import {
            input,
            format,
            batch_size,
        } => {
            let batch_size = batch_size.unwrap_or(ingest_cfg.batch_size);
            let mut store = PositionStore::open(&store_cfg)?;
            info!(input = %input.display(), ?format, batch_size, "starting import");
            let file = BufReader::new(File::open(&input)?);
            let summary = ingest::run_import(file, &mut store, batch_size, format)?;
            print_json(&summary)?;
        }
        Command::LastPosition { satellite_id } => {
            let store = PositionStore::open(&store_cfg)?;
            match QueryService::new(&store).last_known_position(&satellite_id)? {
                Some(pos) => print_json(&pos)?,
                None => println!("null"),
            }
        }
        Command::Closest { lat, lon, as_of } => {
            let store = PositionStore::open(&store_cfg)?;
            match QueryService::new(&store).closest_satellite(lat, lon, &as_of)? {
                Some(hit) => print_json(&hit)?,
                None => println!("null"),
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    // ---- Logging ----
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "fatal");
            ExitCode::FAILURE
        }
    }
}
