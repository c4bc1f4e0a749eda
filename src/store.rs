// ===============================
// src/store.rs
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
// Durable position store on SQLite:
// - insert_batch       : one transaction per batch, duplicate (id, time)
//                        rows are silently skipped (ON CONFLICT DO NOTHING).
// - last_known_position: newest row for one satellite, sentinel included.
// - closest_satellite  : per-satellite latest row at/before `as_of`,
//                        (0,0) sentinel rows excluded, linear haversine scan.
//
// Timestamps are stored as integer microseconds since the Unix epoch so
// ordering is total and exact.
//
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use crate::config::StoreConfig;
use crate::domain::{ClosestSatellite, LastPosition, PositionRecord};
use crate::error::{Result, TrackerError};
use crate::geo::haversine_m;

const SCHEMA: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;

CREATE TABLE IF NOT EXISTS positions (
    id            TEXT    NOT NULL,
    creation_date INTEGER NOT NULL,
    longitude     REAL    NOT NULL,
    latitude      REAL    NOT NULL,
    PRIMARY KEY (id, creation_date)
);

CREATE INDEX IF NOT EXISTS idx_positions_date ON positions (creation_date);
"#;

pub struct PositionStore {
    conn: Connection,
}

impl PositionStore {
    /// Opens (creating if needed) the database at the configured path and
    /// ensures the schema exists. The connection is released on drop.
    pub fn open(cfg: &StoreConfig) -> Result<Self> {
        let conn = Connection::open(&cfg.path).map_err(|source| TrackerError::Connect {
            path: cfg.path.clone(),
            source,
        })?;
        conn.execute_batch(SCHEMA)?;
        info!(path = %cfg.path.display(), "position store opened");
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Inserts a batch of records in one transaction (all-or-nothing).
    /// Rows that collide on `(id, creation_date)` are skipped, not
    /// overwritten and not an error. Returns the number actually inserted;
    /// an empty batch is a no-op returning 0.
    pub fn insert_batch(&mut self, records: &[PositionRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut inserted = 0usize;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO positions (id, creation_date, longitude, latitude)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (id, creation_date) DO NOTHING",
            )?;
            for rec in records {
                inserted += stmt.execute(params![
                    rec.id,
                    rec.observed_at.timestamp_micros(),
                    rec.longitude,
                    rec.latitude,
                ])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Most recent known position of one satellite, `None` if the id has no
    /// records. The `(0,0)` sentinel is returned unfiltered here.
    pub fn last_known_position(&self, satellite_id: &str) -> Result<Option<LastPosition>> {
        let row = self
            .conn
            .query_row(
                "SELECT longitude, latitude
                 FROM positions
                 WHERE id = ?1
                 ORDER BY creation_date DESC
                 LIMIT 1",
                params![satellite_id],
                |r| {
                    Ok(LastPosition {
                        longitude: r.get(0)?,
                        latitude: r.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    /// Satellite closest to `(latitude, longitude)` as of `as_of`.
    ///
    /// Candidate snapshot: per satellite, the latest row with
    /// `creation_date <= as_of`, restricted (before taking the per-id max)
    /// to rows that are not the `(0,0)` no-fix sentinel. The snapshot is
    /// recomputed from the database on every call and scanned linearly with
    /// the haversine distance; ties keep the first candidate in id order.
    pub fn closest_satellite(
        &self,
        latitude: f64,
        longitude: f64,
        as_of: DateTime<Utc>,
    ) -> Result<Option<ClosestSatellite>> {
        // Bare columns ride along with MAX(creation_date) per SQLite's
        // min/max group-by guarantee.
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, latitude, longitude, MAX(creation_date)
             FROM positions
             WHERE creation_date <= ?1
               AND NOT (latitude = 0.0 AND longitude = 0.0)
             GROUP BY id
             ORDER BY id",
        )?;
        let mut rows = stmt.query(params![as_of.timestamp_micros()])?;

        let mut best: Option<ClosestSatellite> = None;
        while let Some(row) = rows.next()? {
            let id: String = row.get(0)?;
            let cand_lat: f64 = row.get(1)?;
            let cand_lon: f64 = row.get(2)?;
            let distance_m = haversine_m(latitude, longitude, cand_lat, cand_lon);
            if best.as_ref().map_or(true, |b| distance_m < b.distance_m) {
                best = Some(ClosestSatellite {
                    id,
                    longitude: cand_lon,
                    latitude: cand_lat,
                    distance_m,
                });
            }
        }
        Ok(best)
    }

    #[cfg(test)]
    pub fn record_count(&self) -> Result<i64> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM positions", [], |r| r.get(0))?;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parse_timestamp;

    fn t(s: &str) -> DateTime<Utc> {
        parse_timestamp(s).unwrap()
    }

    fn rec(id: &str, ts: &str, lon: f64, lat: f64) -> PositionRecord {
        PositionRecord {
            id: id.to_string(),
            observed_at: t(ts),
            longitude: lon,
            latitude: lat,
        }
    }

    #[test]
    fn empty_batch_is_a_noop() {
        let mut store = PositionStore::open_in_memory().unwrap();
        assert_eq!(store.insert_batch(&[]).unwrap(), 0);
        assert_eq!(store.record_count().unwrap(), 0);
    }

    #[test]
    fn duplicate_in_same_batch_is_skipped() {
        let mut store = PositionStore::open_in_memory().unwrap();
        let r = rec("STARLINK-1", "2021-01-01T00:00:00Z", 12.0, 34.0);
        let inserted = store.insert_batch(&[r.clone(), r]).unwrap();
        assert_eq!(inserted, 1);
        assert_eq!(store.record_count().unwrap(), 1);
    }

    #[test]
    fn duplicate_across_batches_is_skipped() {
        let mut store = PositionStore::open_in_memory().unwrap();
        let r = rec("STARLINK-1", "2021-01-01T00:00:00Z", 12.0, 34.0);
        assert_eq!(store.insert_batch(&[r.clone()]).unwrap(), 1);
        assert_eq!(store.insert_batch(&[r]).unwrap(), 0);
        assert_eq!(store.record_count().unwrap(), 1);
    }

    #[test]
    fn last_known_picks_newest_observation() {
        let mut store = PositionStore::open_in_memory().unwrap();
        store
            .insert_batch(&[
                rec("D", "2021-01-01T00:00:00Z", 1.0, 1.0),
                rec("D", "2021-03-01T00:00:00Z", 3.0, 3.0),
                rec("D", "2021-02-01T00:00:00Z", 2.0, 2.0),
            ])
            .unwrap();
        let pos = store.last_known_position("D").unwrap().unwrap();
        assert_eq!(pos.longitude, 3.0);
        assert_eq!(pos.latitude, 3.0);
    }

    #[test]
    fn last_known_for_unknown_id_is_none() {
        let store = PositionStore::open_in_memory().unwrap();
        assert!(store.last_known_position("NOPE").unwrap().is_none());
    }

    #[test]
    fn sentinel_visible_to_last_known_but_never_a_candidate() {
        let mut store = PositionStore::open_in_memory().unwrap();
        store
            .insert_batch(&[rec("A", "2021-01-01T00:00:00Z", 0.0, 0.0)])
            .unwrap();
        let pos = store.last_known_position("A").unwrap().unwrap();
        assert_eq!((pos.longitude, pos.latitude), (0.0, 0.0));

        let hit = store
            .closest_satellite(0.0, 0.0, t("2021-06-01T00:00:00Z"))
            .unwrap();
        assert!(hit.is_none());
    }

    #[test]
    fn zero_on_one_axis_only_is_still_a_candidate() {
        let mut store = PositionStore::open_in_memory().unwrap();
        store
            .insert_batch(&[rec("EQ", "2021-01-01T00:00:00Z", 20.0, 0.0)])
            .unwrap();
        let hit = store
            .closest_satellite(0.0, 20.0, t("2021-06-01T00:00:00Z"))
            .unwrap()
            .unwrap();
        assert_eq!(hit.id, "EQ");
        assert!(hit.distance_m < 1.0);
    }

    #[test]
    fn nearest_picks_smaller_offset() {
        let mut store = PositionStore::open_in_memory().unwrap();
        store
            .insert_batch(&[
                rec("A", "2021-01-01T00:00:00Z", 0.0, 0.0), // sentinel, out
                rec("B", "2021-01-01T00:00:00Z", 10.0, 10.0),
                rec("C", "2021-01-01T00:00:00Z", 10.001, 10.001),
            ])
            .unwrap();
        let hit = store
            .closest_satellite(10.0, 10.0, t("2021-01-01T00:00:00Z"))
            .unwrap()
            .unwrap();
        // B sits exactly on the query point; C is ~156 m off
        assert_eq!(hit.id, "B");
        assert_eq!(hit.distance_m, 0.0);

        // from (10.002, 10.002) the smaller offset is C, ~156 m away
        let hit = store
            .closest_satellite(10.002, 10.002, t("2021-01-01T00:00:00Z"))
            .unwrap()
            .unwrap();
        assert_eq!(hit.id, "C");
        assert!(hit.distance_m > 150.0 && hit.distance_m < 160.0);
    }

    #[test]
    fn as_of_uses_latest_at_or_before() {
        let mut store = PositionStore::open_in_memory().unwrap();
        store
            .insert_batch(&[
                rec("D", "2021-01-01T00:00:00Z", 10.0, 10.0),
                rec("D", "2021-03-01T00:00:00Z", 50.0, 50.0),
            ])
            .unwrap();

        // strictly between T1 and T2: the T1 row is the candidate
        let hit = store
            .closest_satellite(10.0, 10.0, t("2021-02-01T00:00:00Z"))
            .unwrap()
            .unwrap();
        assert_eq!(hit.id, "D");
        assert!(hit.distance_m < 1.0);

        // after T2: the T2 row takes over
        let hit = store
            .closest_satellite(10.0, 10.0, t("2021-04-01T00:00:00Z"))
            .unwrap()
            .unwrap();
        assert_eq!(hit.id, "D");
        assert!(hit.distance_m > 4_000_000.0);
    }

    #[test]
    fn as_of_before_everything_is_not_found() {
        let mut store = PositionStore::open_in_memory().unwrap();
        store
            .insert_batch(&[rec("D", "2021-01-01T00:00:00Z", 10.0, 10.0)])
            .unwrap();
        let hit = store
            .closest_satellite(10.0, 10.0, t("2020-01-01T00:00:00Z"))
            .unwrap();
        assert!(hit.is_none());
    }

    #[test]
    fn equidistant_tie_keeps_first_in_id_order() {
        let mut store = PositionStore::open_in_memory().unwrap();
        store
            .insert_batch(&[
                rec("B", "2021-01-01T00:00:00Z", 30.0, 30.0),
                rec("A", "2021-01-01T00:00:00Z", 30.0, 30.0),
            ])
            .unwrap();
        let hit = store
            .closest_satellite(30.0, 30.0, t("2021-06-01T00:00:00Z"))
            .unwrap()
            .unwrap();
        assert_eq!(hit.id, "A");
    }
}
