//! Geocoding error types.

use thiserror::Error;

/// Result type for geocoding operations.
pub type GeoResult<T> = Result<T, GeoError>;

/// Errors that can occur while resolving a location.
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("Failed to configure maps client: {0}")]
    ConfigError(String),

    #[error("city not found")]
    CityNotFound,

    #[error("location not found")]
    LocationNotFound,

    #[error("Geocoding request failed: {0}")]
    RequestFailed(String),

    #[error("Geocoding API returned {status}: {message}")]
    Api { status: String, message: String },

    #[error("Invalid geocoding response: {0}")]
    InvalidResponse(String),
}

impl GeoError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    /// True when the provider answered but had no match.
    pub fn is_not_found(&self) -> bool {
        matches!(self, GeoError::CityNotFound | GeoError::LocationNotFound)
    }
}

impl From<reqwest::Error> for GeoError {
    fn from(e: reqwest::Error) -> Self {
        GeoError::RequestFailed(e.to_string())
    }
}
