//! Error types for motomap
//!
//! Only failures the pipeline cannot recover from surface here. Keyed
//! elevation failures are handled inside the elevation stage and malformed
//! edge attributes are defaulted, so neither has a caller-facing variant of
//! its own.

use thiserror::Error;

/// Main error type for motomap operations
#[derive(Debug, Error)]
pub enum Error {
    /// The geocoder returned no match for the place name
    #[error("Place '{0}' could not be geocoded")]
    PlaceNotFound(String),

    /// The place resolved but contains no drivable roads
    #[error("No drivable road network found for '{0}'")]
    EmptyNetwork(String),

    /// Connection failure or timeout
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status or protocol error
    #[error("HTTP error: {0}")]
    Http(String),

    /// Response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// An elevation service answered, but not usefully
    #[error("Elevation lookup failed: {0}")]
    Elevation(String),

    /// Invalid configuration or parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Error::Network(err.to_string())
        } else if err.is_decode() {
            Error::Parse(err.to_string())
        } else {
            Error::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(err.to_string())
    }
}

/// Convenience result type for motomap operations
pub type Result<T> = std::result::Result<T, Error>;
