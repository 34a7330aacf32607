//! Geocoding API client implementation.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, warn};

use crate::error::{GeoError, GeoResult};
use crate::types::{friendly_name, CityLocation, GeocodeResponse, GeocodeResult};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Configuration for the geocoding client.
#[derive(Debug, Clone)]
pub struct MapsConfig {
    /// Google Maps API key
    pub api_key: String,
    /// Geocoding endpoint (overridable for tests)
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl MapsConfig {
    /// Create config from environment variables.
    pub fn from_env() -> GeoResult<Self> {
        let api_key = std::env::var("GOOGLE_MAPS_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| GeoError::config_error("GOOGLE_MAPS_API_KEY not set"))?;

        Ok(Self {
            api_key,
            base_url: std::env::var("GEOCODING_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_secs(10),
        })
    }

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Google Maps Geocoding API client.
#[derive(Clone)]
pub struct GeocodingClient {
    http: Client,
    config: MapsConfig,
}

impl GeocodingClient {
    /// Create a new geocoding client.
    pub fn new(config: MapsConfig) -> GeoResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("bw-maps/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GeoError::config_error(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> GeoResult<Self> {
        Self::new(MapsConfig::from_env()?)
    }

    /// Resolve a free-form city name to its formatted address and coordinates.
    pub async fn geocode_city(&self, city: &str) -> GeoResult<CityLocation> {
        info!(city = %city, "Geocoding city");

        let results = self.geocode(&[("address", city.to_string())]).await?;
        let first = results.into_iter().next().ok_or_else(|| {
            warn!(city = %city, "Geocoding found no results");
            GeoError::CityNotFound
        })?;

        if first.formatted_address.is_empty() {
            return Err(GeoError::InvalidResponse(
                "result has no formatted address".to_string(),
            ));
        }

        let (lat, lng) = first
            .geometry
            .as_ref()
            .map(|g| (g.location.lat, g.location.lng))
            .unwrap_or_default();

        info!(
            "Geocoding success: {} (lat: {:.6}, lng: {:.6})",
            first.formatted_address, lat, lng
        );

        Ok(CityLocation {
            formatted_address: first.formatted_address,
            lat,
            lng,
        })
    }

    /// Resolve coordinates to a short display name such as `Fort Collins, CO`.
    pub async fn reverse_geocode(&self, lat: f64, lng: f64) -> GeoResult<String> {
        info!("Reverse geocoding lat: {:.6}, lng: {:.6}", lat, lng);

        let results = self
            .geocode(&[("latlng", format!("{},{}", lat, lng))])
            .await?;

        let name = friendly_name(&results).ok_or(GeoError::LocationNotFound)?;
        info!("Reverse geocoding success: {}", name);
        Ok(name)
    }

    async fn geocode(&self, params: &[(&str, String)]) -> GeoResult<Vec<GeocodeResult>> {
        let response = self
            .http
            .get(&self.config.base_url)
            .query(params)
            .query(&[("key", self.config.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeoError::Api {
                status: status.to_string(),
                message: body,
            });
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| GeoError::InvalidResponse(e.to_string()))?;

        debug!(status = %body.status, results = body.results.len(), "Geocoding response");

        match body.status.as_str() {
            "OK" => Ok(body.results),
            "ZERO_RESULTS" => Ok(Vec::new()),
            _ => Err(GeoError::Api {
                message: body.error_message.unwrap_or_default(),
                status: body.status,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> GeocodingClient {
        let config = MapsConfig::new("test-key").with_base_url(format!("{}/geocode/json", server.uri()));
        GeocodingClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_geocode_city() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geocode/json"))
            .and(query_param("address", "Paris"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "OK",
                "results": [{
                    "formatted_address": "Paris, France",
                    "geometry": {"location": {"lat": 48.8566, "lng": 2.3522}},
                    "types": ["locality", "political"]
                }]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let location = client.geocode_city("Paris").await.unwrap();

        assert_eq!(location.formatted_address, "Paris, France");
        assert!((location.lat - 48.8566).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_geocode_city_zero_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geocode/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "ZERO_RESULTS",
                "results": []
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.geocode_city("Atlantis").await.unwrap_err();

        assert!(matches!(err, GeoError::CityNotFound));
        assert_eq!(err.to_string(), "city not found");
    }

    #[tokio::test]
    async fn test_geocode_api_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geocode/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "REQUEST_DENIED",
                "error_message": "The provided API key is invalid."
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.geocode_city("Paris").await.unwrap_err();

        match err {
            GeoError::Api { status, message } => {
                assert_eq!(status, "REQUEST_DENIED");
                assert!(message.contains("invalid"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_reverse_geocode() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geocode/json"))
            .and(query_param("latlng", "40.5853,-105.0844"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "OK",
                "results": [{
                    "formatted_address": "300 Laporte Ave, Fort Collins, CO 80521, USA",
                    "address_components": [
                        {"long_name": "Fort Collins", "short_name": "Fort Collins", "types": ["locality", "political"]},
                        {"long_name": "Colorado", "short_name": "CO", "types": ["administrative_area_level_1", "political"]},
                        {"long_name": "United States", "short_name": "US", "types": ["country", "political"]}
                    ],
                    "types": ["street_address"]
                }]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let name = client.reverse_geocode(40.5853, -105.0844).await.unwrap();

        assert_eq!(name, "Fort Collins, CO");
    }

    #[tokio::test]
    async fn test_reverse_geocode_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "ZERO_RESULTS",
                "results": []
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.reverse_geocode(0.0, 0.0).await.unwrap_err();
        assert_eq!(err.to_string(), "location not found");
    }

    #[tokio::test]
    async fn test_http_failure_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.geocode_city("Paris").await.unwrap_err();
        assert!(matches!(err, GeoError::Api { .. }));
    }
}
