//! Vélo'v station reference data.
//!
//! Trip records only carry station ids. Names and coordinates come from the
//! Métropole de Lyon open data export of Vélo'v stations, a GeoJSON
//! `FeatureCollection` of points.

mod error;
mod index;
mod station;

pub use error::StationError;
pub use index::StationIndex;
pub use station::{Station, StationId};
