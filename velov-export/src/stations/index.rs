//! Station lookup built from the GeoJSON export.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::error::StationError;
use super::station::{Station, StationId};

/// The parts of a GeoJSON feature we read.
#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Properties,
    geometry: Option<Geometry>,
}

#[derive(Debug, Default, Deserialize)]
struct Properties {
    #[serde(default)]
    idstation: Value,
    nom: Option<String>,
    commune: Option<String>,
    adresse1: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(default)]
    coordinates: Vec<f64>,
}

/// Station lookup by id.
#[derive(Debug, Clone, Default)]
pub struct StationIndex {
    stations: HashMap<StationId, Station>,
}

impl StationIndex {
    /// Load the index from a GeoJSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StationError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| StationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let geojson: Value = serde_json::from_str(&contents).map_err(|e| StationError::Json {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let index = Self::from_geojson(&geojson);
        debug!(path = %path.display(), stations = index.len(), "Loaded stations");
        Ok(index)
    }

    /// Build the index from a parsed GeoJSON document.
    ///
    /// A document without `features` gives an empty index. Features missing
    /// an id, a name or a point are skipped. When two features share an id
    /// the first one wins.
    pub fn from_geojson(geojson: &Value) -> Self {
        let mut stations = HashMap::new();

        let features = geojson
            .get("features")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for feature in features {
            match station_from_feature(feature) {
                Some(station) => {
                    stations.entry(station.id.clone()).or_insert(station);
                }
                None => debug!(feature = %feature, "Skipping unusable station feature"),
            }
        }

        Self { stations }
    }

    /// Look up a station by its JSON id (number or string).
    pub fn find(&self, id: &Value) -> Option<&Station> {
        self.stations.get(&StationId::from_json(id)?)
    }

    /// Number of stations in the index.
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

fn station_from_feature(feature: &Value) -> Option<Station> {
    let feature: Feature = serde_json::from_value(feature.clone()).ok()?;
    let props = feature.properties;

    let id = StationId::from_json(&props.idstation)?;
    let name = props.nom?;
    let coordinates = feature.geometry?.coordinates;
    let (lng, lat) = match coordinates.as_slice() {
        [lng, lat, ..] => (*lng, *lat),
        _ => return None,
    };

    Some(Station {
        id,
        name,
        lng,
        lat,
        commune: props.commune.unwrap_or_default(),
        address: props.adresse1.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn sample_geojson() -> Value {
        json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {
                        "idstation": 10021,
                        "nom": "Part-Dieu / Vivier Merle",
                        "commune": "Lyon 3 ème",
                        "adresse1": "Boulevard Vivier Merle"
                    },
                    "geometry": {"type": "Point", "coordinates": [4.8590, 45.7606]}
                },
                {
                    "type": "Feature",
                    "properties": {"idstation": "2010", "nom": "Cordeliers", "commune": null},
                    "geometry": {"type": "Point", "coordinates": [4.8361, 45.7635]}
                }
            ]
        })
    }

    #[test]
    fn builds_stations_from_features() {
        let index = StationIndex::from_geojson(&sample_geojson());
        assert_eq!(index.len(), 2);

        let part_dieu = index.find(&json!(10021)).unwrap();
        assert_eq!(part_dieu.name, "Part-Dieu / Vivier Merle");
        assert_eq!(part_dieu.lng, 4.8590);
        assert_eq!(part_dieu.lat, 45.7606);
        assert_eq!(part_dieu.commune, "Lyon 3 ème");
        assert_eq!(part_dieu.address, "Boulevard Vivier Merle");
    }

    #[test]
    fn missing_optional_fields_default_to_empty() {
        let index = StationIndex::from_geojson(&sample_geojson());
        let cordeliers = index.find(&json!("2010")).unwrap();
        assert_eq!(cordeliers.commune, "");
        assert_eq!(cordeliers.address, "");
    }

    #[test]
    fn lookup_ignores_id_representation() {
        let index = StationIndex::from_geojson(&sample_geojson());
        assert!(index.find(&json!("10021")).is_some());
        assert!(index.find(&json!(2010)).is_some());
        assert!(index.find(&json!(9999)).is_none());
        assert!(index.find(&json!(null)).is_none());
    }

    #[test]
    fn document_without_features_is_empty() {
        assert!(StationIndex::from_geojson(&json!({"type": "FeatureCollection"})).is_empty());
        assert!(StationIndex::from_geojson(&json!([])).is_empty());
    }

    #[test]
    fn skips_unusable_features() {
        let geojson = json!({
            "features": [
                {"properties": {"nom": "No id"}, "geometry": {"coordinates": [4.8, 45.7]}},
                {"properties": {"idstation": 1}, "geometry": {"coordinates": [4.8, 45.7]}},
                {"properties": {"idstation": 2, "nom": "No geometry"}},
                {"properties": {"idstation": 3, "nom": "Short"}, "geometry": {"coordinates": [4.8]}},
                "not a feature",
                {"properties": {"idstation": 4, "nom": "Good"}, "geometry": {"coordinates": [4.8, 45.7]}}
            ]
        });

        let index = StationIndex::from_geojson(&geojson);
        assert_eq!(index.len(), 1);
        assert_eq!(index.find(&json!(4)).unwrap().name, "Good");
    }

    #[test]
    fn first_duplicate_wins() {
        let geojson = json!({
            "features": [
                {"properties": {"idstation": 1, "nom": "First"}, "geometry": {"coordinates": [1.0, 2.0]}},
                {"properties": {"idstation": "1", "nom": "Second"}, "geometry": {"coordinates": [3.0, 4.0]}}
            ]
        });

        let index = StationIndex::from_geojson(&geojson);
        assert_eq!(index.len(), 1);
        assert_eq!(index.find(&json!(1)).unwrap().name, "First");
    }

    #[test]
    fn load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stations.geojson");
        std::fs::write(&path, sample_geojson().to_string()).unwrap();

        let index = StationIndex::load(&path).unwrap();
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn load_reports_missing_and_invalid_files() {
        let dir = tempdir().unwrap();

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            StationIndex::load(&missing),
            Err(StationError::Io { .. })
        ));

        let invalid = dir.path().join("invalid.json");
        std::fs::write(&invalid, "{").unwrap();
        assert!(matches!(
            StationIndex::load(&invalid),
            Err(StationError::Json { .. })
        ));
    }
}
