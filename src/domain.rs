// ===============================
// src/domain.rs
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
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};

/// One timestamped position report for a satellite. Immutable once stored;
/// `(id, observed_at)` is unique in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub id: String,
    pub observed_at: DateTime<Utc>,
    pub longitude: f64,
    pub latitude: f64,
}

/// Response shape for the last-known-position query. The `(0,0)` "no fix"
/// sentinel is returned here as-is; it is only filtered out of
/// nearest-neighbour candidacy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LastPosition {
    pub longitude: f64,
    pub latitude: f64,
}

/// Response shape for the closest-satellite query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosestSatellite {
    pub id: String,
    pub longitude: f64,
    pub latitude: f64,
    pub distance_m: f64,
}

/// Parses the timestamp forms accepted at the boundaries: RFC 3339
/// (`2021-01-26T06:26:10Z`) or the bare ISO-8601 used by space-track EPOCH
/// fields (`2021-01-26T06:26:10.000032`, assumed UTC). A space between date
/// and time is tolerated for CLI convenience.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    Err(TrackerError::BadTimestamp(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339() {
        let dt = parse_timestamp("2021-01-26T06:26:10Z").unwrap();
        assert_eq!(dt.timestamp(), 1611642370);
    }

    #[test]
    fn parses_bare_epoch_with_microseconds() {
        let dt = parse_timestamp("2021-01-26T06:26:10.000032").unwrap();
        assert_eq!(dt.timestamp(), 1611642370);
        assert_eq!(dt.timestamp_subsec_micros(), 32);
    }

    #[test]
    fn parses_space_separated() {
        let dt = parse_timestamp("2021-01-26 06:26:10").unwrap();
        assert_eq!(dt.timestamp(), 1611642370);
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_timestamp("not-a-timestamp").unwrap_err();
        assert!(matches!(err, TrackerError::BadTimestamp(_)));
    }
}
