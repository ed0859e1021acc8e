//! Cyclocity client error types.

/// Errors that can occur when fetching trips from the Cyclocity API.
#[derive(Debug, thiserror::Error)]
pub enum CyclocityError {
    /// HTTP request failed (network error, TLS, connection refused)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API answered with something other than 200
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// Body was not valid JSON
    #[error("JSON parse error: {message}")]
    Json { message: String, body: String },

    /// A cookie or identifier cannot be put into a request
    #[error("invalid request parameter: {0}")]
    InvalidParameter(&'static str),
}
