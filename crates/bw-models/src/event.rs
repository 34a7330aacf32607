//! SSE progress event types.
//!
//! Every event maps to one `event: <kind>` / `data: <payload>` frame.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::weather::WeatherPayload;

/// Event labels sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Human-readable stage update
    Status,
    /// Generated image
    Result,
    /// Public URL of the generated video
    Video,
    /// Terminal or best-effort failure notice
    Error,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Status => "status",
            EventKind::Result => "result",
            EventKind::Video => "video",
            EventKind::Error => "error",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single progress event emitted by the weather workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// Stage update
    Status(String),

    /// Image milestone
    Result(WeatherPayload),

    /// Video URL
    Video(String),

    /// Error message
    Error(String),
}

impl ProgressEvent {
    /// Create a status event.
    pub fn status(message: impl Into<String>) -> Self {
        ProgressEvent::Status(message.into())
    }

    /// Create a result event.
    pub fn result(payload: WeatherPayload) -> Self {
        ProgressEvent::Result(payload)
    }

    /// Create a video event.
    pub fn video(url: impl Into<String>) -> Self {
        ProgressEvent::Video(url.into())
    }

    /// Create an error event.
    pub fn error(message: impl Into<String>) -> Self {
        ProgressEvent::Error(message.into())
    }

    pub fn kind(&self) -> EventKind {
        match self {
            ProgressEvent::Status(_) => EventKind::Status,
            ProgressEvent::Result(_) => EventKind::Result,
            ProgressEvent::Video(_) => EventKind::Video,
            ProgressEvent::Error(_) => EventKind::Error,
        }
    }

    /// Payload as it appears in the SSE `data` field.
    ///
    /// `result` carries compact JSON; every other kind is the plain string.
    pub fn data(&self) -> String {
        match self {
            ProgressEvent::Status(s) | ProgressEvent::Video(s) | ProgressEvent::Error(s) => {
                s.clone()
            }
            ProgressEvent::Result(payload) => payload.to_json(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ProgressEvent::Error(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels() {
        assert_eq!(ProgressEvent::status("x").kind().as_str(), "status");
        assert_eq!(ProgressEvent::video("x").kind().as_str(), "video");
        assert_eq!(ProgressEvent::error("x").kind().as_str(), "error");
        assert_eq!(EventKind::Result.to_string(), "result");
    }

    #[test]
    fn test_result_data_is_json() {
        let event = ProgressEvent::result(WeatherPayload {
            city: "Paris, France".to_string(),
            image_base64: "aGVsbG8=".to_string(),
        });

        let value: serde_json::Value = serde_json::from_str(&event.data()).unwrap();
        assert_eq!(value["city"], "Paris, France");
        assert_eq!(value["image_base64"], "aGVsbG8=");
    }

    #[test]
    fn test_plain_data_is_untouched() {
        let event = ProgressEvent::video("https://storage.googleapis.com/b/videos/1.mp4");
        assert_eq!(event.data(), "https://storage.googleapis.com/b/videos/1.mp4");
    }

    #[test]
    fn test_serialized_envelope() {
        let json = serde_json::to_value(ProgressEvent::status("Identifying location...")).unwrap();
        assert_eq!(json["event"], "status");
        assert_eq!(json["data"], "Identifying location...");
    }
}
