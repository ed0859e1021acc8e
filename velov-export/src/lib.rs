//! Vélo'v trip history exporter.
//!
//! Fetches a user's trip history from the Cyclocity private API with browser
//! session cookies, prints each trip and saves the raw response. Exported
//! trips can then be merged into a single map-ready file using the Vélo'v
//! station open data.

pub mod config;
pub mod cyclocity;
pub mod export;
pub mod merge;
pub mod stations;
