// ===============================
// src/ingest.rs
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
//
// Streaming bulk importer:
// - `json`  : one large JSON array (the historical dump format); elements
//             are decoded one at a time through a seq visitor, never the
//             whole document.
// - `jsonl` : one JSON object per line, same element shape.
//
// Each element contributes four fields (spaceTrack.OBJECT_ID,
// spaceTrack.EPOCH, longitude, latitude); everything else is ignored.
// Elements missing any of the four, or carrying a null coordinate or an
// unparseable epoch, are dropped and counted as skipped — never merged with
// a neighbouring element. Completed records are flushed to the store in
// fixed-size batches; memory holds at most one batch plus one element.
//
use std::fmt;
use std::io::{BufRead, BufReader, Read};

use clap::ValueEnum;
use serde::de::{self, DeserializeSeed, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::{parse_timestamp, PositionRecord};
use crate::error::{Result, TrackerError};
use crate::store::PositionStore;

// Keep skipped-entry noise out of the log after the first few.
const SKIP_LOG_LIMIT: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ImportFormat {
    /// Single JSON array of observation objects.
    Json,
    /// One JSON observation object per line.
    Jsonl,
}

/// Totals for one import run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub entries_read: u64,
    pub records_inserted: u64,
    pub duplicates: u64,
    pub skipped: u64,
    pub batches: u64,
}

#[derive(Debug, Deserialize)]
struct SpaceTrack {
    #[serde(rename = "OBJECT_ID")]
    object_id: Option<String>,
    #[serde(rename = "EPOCH")]
    epoch: Option<String>,
}

/// One input element as far as the pipeline cares: the four required fields,
/// each optional until proven present.
#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(rename = "spaceTrack")]
    space_track: Option<SpaceTrack>,
    longitude: Option<f64>,
    latitude: Option<f64>,
}

impl RawEntry {
    /// "Entry complete" predicate: all four fields present and the epoch
    /// parseable. Anything less yields `None` and the entry is dropped.
    fn into_record(self) -> Option<PositionRecord> {
        let st = self.space_track?;
        let id = st.object_id?;
        let observed_at = parse_timestamp(&st.epoch?).ok()?;
        let longitude = self.longitude?;
        let latitude = self.latitude?;
        Some(PositionRecord {
            id,
            observed_at,
            longitude,
            latitude,
        })
    }
}

/// Accumulates completed records and flushes them to the store one batch
/// (= one transaction) at a time.
struct BatchSink<'a> {
    store: &'a mut PositionStore,
    batch: Vec<PositionRecord>,
    batch_size: usize,
    summary: ImportSummary,
    // Store failures can't travel through serde's error type intact, so the
    // seq visitor stashes them here and run_import recovers them.
    flush_error: Option<TrackerError>,
}

impl<'a> BatchSink<'a> {
    fn new(store: &'a mut PositionStore, batch_size: usize) -> Self {
        Self {
            store,
            batch: Vec::with_capacity(batch_size),
            batch_size,
            summary: ImportSummary::default(),
            flush_error: None,
        }
    }

    fn accept(&mut self, entry: RawEntry) -> Result<()> {
        self.summary.entries_read += 1;
        match entry.into_record() {
            Some(rec) => {
                self.batch.push(rec);
                if self.batch.len() >= self.batch_size {
                    self.flush()?;
                }
            }
            None => {
                self.summary.skipped += 1;
                if self.summary.skipped <= SKIP_LOG_LIMIT {
                    warn!(
                        entry = self.summary.entries_read,
                        "dropping entry missing id/epoch/coordinates"
                    );
                }
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.batch.is_empty() {
            return Ok(());
        }
        let attempted = self.batch.len() as u64;
        let inserted = self.store.insert_batch(&self.batch)? as u64;
        self.summary.records_inserted += inserted;
        self.summary.duplicates += attempted - inserted;
        self.summary.batches += 1;
        info!(inserted, attempted, "flushed batch into position store");
        self.batch.clear();
        Ok(())
    }

    /// Final partial-batch flush, then hand back the run totals.
    fn finish(mut self) -> Result<ImportSummary> {
        self.flush()?;
        info!(
            entries = self.summary.entries_read,
            inserted = self.summary.records_inserted,
            duplicates = self.summary.duplicates,
            skipped = self.summary.skipped,
            batches = self.summary.batches,
            "import finished"
        );
        Ok(self.summary)
    }
}

/// Drives a top-level JSON array one element at a time into the sink.
struct ObservationArray<'a, 'b> {
    sink: &'a mut BatchSink<'b>,
}

impl<'de> DeserializeSeed<'de> for ObservationArray<'_, '_> {
    type Value = ();

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<(), D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(self)
    }
}

impl<'de> Visitor<'de> for ObservationArray<'_, '_> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array of satellite observation objects")
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<(), A::Error>
    where
        A: SeqAccess<'de>,
    {
        while let Some(entry) = seq.next_element::<RawEntry>()? {
            if let Err(err) = self.sink.accept(entry) {
                self.sink.flush_error = Some(err);
                return Err(de::Error::custom("import aborted by store failure"));
            }
        }
        Ok(())
    }
}

/// Runs one import end to end. Prior flushed batches stay committed if the
/// run aborts; there is no checkpoint/resume.
pub fn run_import<R: Read>(
    reader: R,
    store: &mut PositionStore,
    batch_size: usize,
    format: ImportFormat,
) -> Result<ImportSummary> {
    match format {
        ImportFormat::Json => import_json(reader, store, batch_size),
        ImportFormat::Jsonl => import_jsonl(reader, store, batch_size),
    }
}

fn import_json<R: Read>(
    reader: R,
    store: &mut PositionStore,
    batch_size: usize,
) -> Result<ImportSummary> {
    let mut sink = BatchSink::new(store, batch_size);
    let mut de = serde_json::Deserializer::from_reader(reader);
    if let Err(err) = (ObservationArray { sink: &mut sink }).deserialize(&mut de) {
        if let Some(store_err) = sink.flush_error.take() {
            return Err(store_err);
        }
        return Err(TrackerError::MalformedInput(err));
    }
    de.end().map_err(TrackerError::MalformedInput)?;
    sink.finish()
}

fn import_jsonl<R: Read>(
    reader: R,
    store: &mut PositionStore,
    batch_size: usize,
) -> Result<ImportSummary> {
    let mut sink = BatchSink::new(store, batch_size);
    for line in BufReader::new(reader).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: RawEntry = serde_json::from_str(&line)?;
        sink.accept(entry)?;
    }
    sink.finish()
}
