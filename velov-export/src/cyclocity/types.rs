//! Cyclocity API response types.
//!
//! The trip history endpoint returns a document shaped like
//! `{"trips": [{"startStation": .., "endStation": .., ..}, ..], ..}`.
//! Apart from those two station fields the shape belongs to the provider,
//! so the document is kept as raw JSON and written back untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The full trip history document as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TripsResponse(Value);

impl TripsResponse {
    /// Wrap an already-parsed JSON document.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Trip records in the document.
    ///
    /// A missing `trips` field (or one that is not an array) reads as no trips.
    pub fn trips(&self) -> &[Value] {
        self.0
            .get("trips")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The underlying JSON document.
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}
