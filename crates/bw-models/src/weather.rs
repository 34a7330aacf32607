//! Image stage results.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Output of the image stage: the resolved city and the raw image bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherResult {
    pub city: String,
    pub image_data: Vec<u8>,
}

impl WeatherResult {
    pub fn new(city: impl Into<String>, image_data: Vec<u8>) -> Self {
        Self {
            city: city.into(),
            image_data,
        }
    }

    /// Transportable form used in the `result` event.
    pub fn to_payload(&self) -> WeatherPayload {
        WeatherPayload {
            city: self.city.clone(),
            image_base64: STANDARD.encode(&self.image_data),
        }
    }
}

/// Wire payload of the `result` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct WeatherPayload {
    pub city: String,
    pub image_base64: String,
}

impl WeatherPayload {
    pub fn to_json(&self) -> String {
        // Two string fields always serialize.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Decode the image back into raw bytes.
    pub fn image_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.image_base64)
    }
}
