//! Station data error types.

use std::path::PathBuf;

/// Errors that can occur when loading station reference data.
#[derive(Debug, thiserror::Error)]
pub enum StationError {
    /// Reading the GeoJSON file failed
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// File is not valid JSON
    #[error("JSON parse error in {}: {message}", path.display())]
    Json { path: PathBuf, message: String },
}
