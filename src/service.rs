// ===============================
// src/service.rs
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
use crate::domain::{parse_timestamp, ClosestSatellite, LastPosition};
use crate::error::Result;
use crate::store::PositionStore;

/// Thin boundary between the presentation layer and the store: translates
/// wire-shaped arguments (id string, floats, timestamp string) into store
/// types and passes typed results straight back. Absent results stay
/// `None`; no business logic lives here.
pub struct QueryService<'a> {
    store: &'a PositionStore,
}

impl<'a> QueryService<'a> {
    pub fn new(store: &'a PositionStore) -> Self {
        Self { store }
    }

    pub fn last_known_position(&self, satellite_id: &str) -> Result<Option<LastPosition>> {
        self.store.last_known_position(satellite_id)
    }

    pub fn closest_satellite(
        &self,
        latitude: f64,
        longitude: f64,
        as_of: &str,
    ) -> Result<Option<ClosestSatellite>> {
        let as_of = parse_timestamp(as_of)?;
        self.store.closest_satellite(latitude, longitude, as_of)
    }
}
