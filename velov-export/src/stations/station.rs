//! Station types.

use std::fmt;

use serde_json::Value;

/// A station identifier.
///
/// The open data export and the trips API disagree on representation: ids
/// come as JSON numbers on one side and strings on the other. Both are
/// normalised to their decimal text so `10021` and `"10021"` compare equal.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StationId(String);

impl StationId {
    /// Build an id from its text form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Read an id from a JSON value.
    ///
    /// Returns `None` for values that cannot name a station (null, objects,
    /// arrays, booleans).
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self(s.clone())),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    return Some(Self(i.to_string()));
                }
                if let Some(u) = n.as_u64() {
                    return Some(Self(u.to_string()));
                }
                // 10021.0 must still match "10021"
                let f = n.as_f64()?;
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    Some(Self(format!("{}", f as i64)))
                } else {
                    Some(Self(n.to_string()))
                }
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A Vélo'v station.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    /// Longitude (WGS84)
    pub lng: f64,
    /// Latitude (WGS84)
    pub lat: f64,
    /// Empty when the export has none
    pub commune: String,
    /// First address line, empty when the export has none
    pub address: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn number_and_string_ids_match() {
        assert_eq!(
            StationId::from_json(&json!(10021)),
            StationId::from_json(&json!("10021"))
        );
    }

    #[test]
    fn whole_floats_match_integers() {
        assert_eq!(
            StationId::from_json(&json!(10021.0)),
            Some(StationId::new("10021"))
        );
    }

    #[test]
    fn fractional_numbers_keep_their_fraction() {
        assert_eq!(
            StationId::from_json(&json!(1.5)),
            Some(StationId::new("1.5"))
        );
    }

    #[test]
    fn non_scalar_values_are_not_ids() {
        assert!(StationId::from_json(&json!(null)).is_none());
        assert!(StationId::from_json(&json!(true)).is_none());
        assert!(StationId::from_json(&json!({"id": 1})).is_none());
        assert!(StationId::from_json(&json!([1])).is_none());
    }

    #[test]
    fn display_and_debug() {
        let id = StationId::new("7004");
        assert_eq!(format!("{}", id), "7004");
        assert_eq!(format!("{:?}", id), "StationId(7004)");
        assert_eq!(id.as_str(), "7004");
    }
}
