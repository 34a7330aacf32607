//! Location queries accepted by the weather endpoint.

use std::fmt;

use thiserror::Error;

/// City used when a request carries neither a city nor coordinates.
pub const DEFAULT_CITY: &str = "San Francisco";

/// Invalid location query parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationQueryError {
    #[error("invalid latitude: {0}")]
    InvalidLatitude(String),

    #[error("invalid longitude: {0}")]
    InvalidLongitude(String),
}

/// What the client asked to resolve.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    City(String),
    Coordinates { lat: f64, lng: f64 },
}

impl LocationQuery {
    /// Build a query from raw request parameters.
    ///
    /// Coordinates win when both `lat` and `lng` are present and non-empty;
    /// otherwise the city is used, falling back to [`DEFAULT_CITY`].
    pub fn from_params(
        city: Option<&str>,
        lat: Option<&str>,
        lng: Option<&str>,
    ) -> Result<Self, LocationQueryError> {
        let lat = lat.map(str::trim).filter(|s| !s.is_empty());
        let lng = lng.map(str::trim).filter(|s| !s.is_empty());

        if let (Some(lat), Some(lng)) = (lat, lng) {
            let lat_val: f64 = lat
                .parse()
                .map_err(|_| LocationQueryError::InvalidLatitude(lat.to_string()))?;
            let lng_val: f64 = lng
                .parse()
                .map_err(|_| LocationQueryError::InvalidLongitude(lng.to_string()))?;

            if !lat_val.is_finite() || !(-90.0..=90.0).contains(&lat_val) {
                return Err(LocationQueryError::InvalidLatitude(lat.to_string()));
            }
            if !lng_val.is_finite() || !(-180.0..=180.0).contains(&lng_val) {
                return Err(LocationQueryError::InvalidLongitude(lng.to_string()));
            }

            return Ok(LocationQuery::Coordinates {
                lat: lat_val,
                lng: lng_val,
            });
        }

        let city = city
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_CITY);

        Ok(LocationQuery::City(city.to_string()))
    }

    pub fn is_coordinates(&self) -> bool {
        matches!(self, LocationQuery::Coordinates { .. })
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationQuery::City(city) => write!(f, "{}", city),
            LocationQuery::Coordinates { lat, lng } => write!(f, "{},{}", lat, lng),
        }
    }
}
