//! Merge exported trips into a map-ready file.
//!
//! Raw trips only reference stations by id. Merging resolves both ends
//! against the station index, reshapes each trip for the map (named
//! stations plus a two-point `LineString`), drops trips already seen and
//! writes everything to one JSON array. The previous map file is kept as a
//! backup next to the new one.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cyclocity::TripsResponse;
use crate::stations::{Station, StationIndex};

/// Default map file, relative to the working directory.
pub const DEFAULT_MAP_PATH: &str = "velov-trips.json";

/// Errors from a merge run.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON parse error in {}: {message}", path.display())]
    Json { path: PathBuf, message: String },

    /// File parsed but does not hold trips
    #[error("unexpected content in {}: {reason}", path.display())]
    Format { path: PathBuf, reason: &'static str },

    #[error("failed to serialize trips: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Bike category, as shown on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BikeType {
    Classic,
    Electric,
}

impl BikeType {
    /// The API encodes classic bikes as `1`; anything else is electric.
    fn from_raw(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_f64) {
            Some(n) if n == 1.0 => BikeType::Classic,
            _ => BikeType::Electric,
        }
    }
}

/// A station as embedded in a map trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapStation {
    pub name: String,
    pub lng: f64,
    pub lat: f64,
    pub commune: String,
    pub address: String,
}

impl From<&Station> for MapStation {
    fn from(station: &Station) -> Self {
        Self {
            name: station.name.clone(),
            lng: station.lng,
            lat: station.lat,
            commune: station.commune.clone(),
            address: station.address.clone(),
        }
    }
}

/// GeoJSON geometry of a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    LineString { coordinates: Vec<[f64; 2]> },
}

/// A trip in map format.
///
/// Timing fields are copied from the raw trip as-is; absent ones are left
/// out of the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapTrip {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<Value>,
    pub bike_type: BikeType,
    pub start_station: MapStation,
    pub end_station: MapStation,
    pub geometry: Geometry,
}

/// Convert a raw API trip to map format.
///
/// Returns `None` when either station is unknown.
pub fn convert_trip(raw: &Value, stations: &StationIndex) -> Option<MapTrip> {
    let start = stations.find(raw.get("startStation")?)?;
    let end = stations.find(raw.get("endStation")?)?;

    let field = |name: &str| raw.get(name).filter(|v| !v.is_null()).cloned();

    Some(MapTrip {
        id: field("id"),
        start_time: field("startDateTime"),
        end_time: field("endDateTime"),
        duration: field("duration"),
        bike_type: BikeType::from_raw(raw.get("bikeType")),
        start_station: start.into(),
        end_station: end.into(),
        geometry: Geometry::LineString {
            coordinates: vec![[start.lng, start.lat], [end.lng, end.lat]],
        },
    })
}

/// Read raw trips from a file.
///
/// Accepts a bare array of trips or a full export document with a `trips`
/// field.
pub fn load_raw_trips(path: &Path) -> Result<Vec<Value>, MergeError> {
    match read_json(path)? {
        Value::Array(trips) => Ok(trips),
        value @ Value::Object(_) => Ok(TripsResponse::new(value).trips().to_vec()),
        _ => Err(MergeError::Format {
            path: path.to_path_buf(),
            reason: "expected an array of trips or an export document",
        }),
    }
}

/// Options for a merge run.
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Map file to write
    pub output: PathBuf,
    /// Keep the trips already in `output` and add the new ones after them
    pub append: bool,
}

impl MergeOptions {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            append: false,
        }
    }

    pub fn with_append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }
}

/// Counters for a merge run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Trips in the written file
    pub total: usize,
    /// Trips kept from the previous file (append mode)
    pub kept: usize,
    /// Raw trips converted
    pub converted: usize,
    /// Raw trips dropped because a station was not found
    pub skipped: usize,
    /// Raw trips dropped because their id was already seen
    pub duplicates: usize,
    /// Where the previous map file was copied, if there was one
    pub backup: Option<PathBuf>,
}

/// Convert and merge the trips of `inputs`, in order, into the map file.
///
/// Trips are de-duplicated on their `id`; the first occurrence wins. Trips
/// without an id are all kept: none of them counts as a duplicate of
/// another, where a plain set of ids would drop every id-less trip after
/// the first.
pub fn merge(
    inputs: &[PathBuf],
    stations: &StationIndex,
    options: &MergeOptions,
) -> Result<MergeSummary, MergeError> {
    let mut summary = MergeSummary::default();
    let mut seen = HashSet::new();
    let mut merged = Vec::new();

    if options.append && options.output.exists() {
        let existing = match read_json(&options.output)? {
            Value::Array(trips) => trips,
            _ => {
                return Err(MergeError::Format {
                    path: options.output.clone(),
                    reason: "expected an array of map trips",
                });
            }
        };
        for trip in &existing {
            if let Some(key) = trip_key(trip) {
                seen.insert(key);
            }
        }
        summary.kept = existing.len();
        merged = existing;
    }

    for path in inputs {
        let trips = load_raw_trips(path)?;
        debug!(path = %path.display(), trips = trips.len(), "Loaded raw trips");

        for trip in trips {
            if let Some(key) = trip_key(&trip)
                && !seen.insert(key)
            {
                summary.duplicates += 1;
                continue;
            }

            match convert_trip(&trip, stations) {
                Some(map_trip) => {
                    merged.push(serde_json::to_value(map_trip)?);
                    summary.converted += 1;
                }
                None => {
                    debug!(trip = %trip, "Station not found, skipping trip");
                    summary.skipped += 1;
                }
            }
        }
    }

    if summary.skipped > 0 {
        warn!(skipped = summary.skipped, "Trips skipped (stations not found)");
    }

    summary.backup = backup_existing(&options.output)?;
    write_trips(&merged, &options.output)?;
    summary.total = merged.len();

    info!(
        total = summary.total,
        converted = summary.converted,
        path = %options.output.display(),
        "Map trips written"
    );

    Ok(summary)
}

/// Backup location for a map file: `velov-trips.json` -> `velov-trips.old.json`.
pub fn backup_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output.with_file_name(format!("{stem}.old.json"))
}

/// Copy an existing output file to its backup path.
fn backup_existing(output: &Path) -> Result<Option<PathBuf>, MergeError> {
    let backup = backup_path(output);
    match std::fs::copy(output, &backup) {
        Ok(_) => {
            debug!(backup = %backup.display(), "Previous map file backed up");
            Ok(Some(backup))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(MergeError::Io {
            path: backup,
            source,
        }),
    }
}

/// De-duplication key: the id's JSON text, so `1` and `"1"` stay distinct.
fn trip_key(trip: &Value) -> Option<String> {
    trip.get("id")
        .filter(|id| !id.is_null())
        .map(Value::to_string)
}

fn read_json(path: &Path) -> Result<Value, MergeError> {
    let contents = std::fs::read_to_string(path).map_err(|source| MergeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|e| MergeError::Json {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn write_trips(trips: &[Value], path: &Path) -> Result<(), MergeError> {
    let json = serde_json::to_string_pretty(trips)?;

    std::fs::write(path, json).map_err(|source| MergeError::Io {
        path: path.to_path_buf(),
        source,
    })
}
