//! Location resolution seam used by the weather workflow.

use async_trait::async_trait;

use bw_models::LocationQuery;

use crate::client::GeocodingClient;
use crate::error::{GeoError, GeoResult};

/// Maps a location query to a canonical display name.
///
/// Implementations return either a non-empty name or an error, never both.
#[async_trait]
pub trait LocationResolver: Send + Sync {
    async fn resolve(&self, query: &LocationQuery) -> GeoResult<String>;
}

#[async_trait]
impl LocationResolver for GeocodingClient {
    async fn resolve(&self, query: &LocationQuery) -> GeoResult<String> {
        let name = match query {
            LocationQuery::City(city) => self.geocode_city(city).await?.formatted_address,
            LocationQuery::Coordinates { lat, lng } => self.reverse_geocode(*lat, *lng).await?,
        };

        if name.trim().is_empty() {
            return Err(match query {
                LocationQuery::City(_) => GeoError::CityNotFound,
                LocationQuery::Coordinates { .. } => GeoError::LocationNotFound,
            });
        }

        Ok(name)
    }
}
