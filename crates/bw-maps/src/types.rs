//! Geocoding API response types.

use serde::Deserialize;

/// Top-level Geocoding API response.
#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResult {
    #[serde(default)]
    pub formatted_address: String,
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// A forward-geocoded city.
#[derive(Debug, Clone, PartialEq)]
pub struct CityLocation {
    pub formatted_address: String,
    pub lat: f64,
    pub lng: f64,
}

impl GeocodeResult {
    fn has_type(&self, wanted: &str) -> bool {
        self.types.iter().any(|t| t == wanted)
    }
}

/// Build a short display name from reverse-geocoding results.
///
/// Uses the first result's components: `locality` long name, then
/// `administrative_area_level_1` short name (or `country` short name when
/// there is no state). Falls back to the first `locality` result's
/// formatted address, then to the first result's formatted address.
pub fn friendly_name(results: &[GeocodeResult]) -> Option<String> {
    let first = results.first()?;

    let mut city = None;
    let mut state = None;
    let mut country = None;
    for component in &first.address_components {
        for t in &component.types {
            match t.as_str() {
                "locality" => city = Some(component.long_name.as_str()),
                "administrative_area_level_1" => state = Some(component.short_name.as_str()),
                "country" => country = Some(component.short_name.as_str()),
                _ => {}
            }
        }
    }

    if let Some(city) = city.filter(|c| !c.is_empty()) {
        let suffix = state
            .filter(|s| !s.is_empty())
            .or(country.filter(|c| !c.is_empty()));
        return Some(match suffix {
            Some(suffix) => format!("{}, {}", city, suffix),
            None => city.to_string(),
        });
    }

    if let Some(locality) = results
        .iter()
        .find(|r| r.has_type("locality") && !r.formatted_address.is_empty())
    {
        return Some(locality.formatted_address.clone());
    }

    Some(first.formatted_address.clone()).filter(|s| !s.is_empty())
}
