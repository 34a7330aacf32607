//! GenAI client configuration.

use std::time::Duration;

use crate::error::{GenAiError, GenAiResult};

/// Configuration for the Vertex AI client.
#[derive(Debug, Clone)]
pub struct GenAiConfig {
    /// GCP project ID
    pub project_id: String,
    /// Vertex AI location (e.g. `us-central1`, `global`)
    pub location: String,
    /// Bucket receiving generated videos
    pub bucket_name: String,
    /// Image model name
    pub image_model: String,
    /// Video model name
    pub video_model: String,
    /// API root; derived from the location unless overridden
    pub base_url: String,
    /// Interval between video operation status queries
    pub poll_interval: Duration,
    /// Per-request HTTP timeout
    pub timeout: Duration,
}

impl GenAiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> GenAiResult<Self> {
        let project_id = std::env::var("GOOGLE_CLOUD_PROJECT")
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| std::env::var("PROJECT_ID").ok().filter(|s| !s.is_empty()))
            .ok_or_else(|| GenAiError::config_error("PROJECT_ID or GOOGLE_CLOUD_PROJECT not set"))?;

        let bucket_name = std::env::var("GENMEDIA_BUCKET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| GenAiError::config_error("GENMEDIA_BUCKET not set"))?;

        let location = std::env::var("GOOGLE_CLOUD_LOCATION")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "us-central1".to_string());

        let base_url = std::env::var("VERTEX_BASE_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| default_base_url(&location));

        Ok(Self {
            project_id,
            bucket_name,
            base_url,
            image_model: std::env::var("IMAGE_MODEL")
                .unwrap_or_else(|_| "gemini-3-pro-image-preview".to_string()),
            video_model: std::env::var("VIDEO_MODEL")
                .unwrap_or_else(|_| "veo-3.1-fast-generate-preview".to_string()),
            poll_interval: Duration::from_secs(
                std::env::var("VIDEO_POLL_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .filter(|s| *s > 0)
                    .unwrap_or(5),
            ),
            timeout: Duration::from_secs(120),
            location,
        })
    }

    /// Minimal config, mostly for tests.
    pub fn new(
        project_id: impl Into<String>,
        location: impl Into<String>,
        bucket_name: impl Into<String>,
    ) -> Self {
        let location = location.into();
        Self {
            project_id: project_id.into(),
            base_url: default_base_url(&location),
            location,
            bucket_name: bucket_name.into(),
            image_model: "gemini-3-pro-image-preview".to_string(),
            video_model: "veo-3.1-fast-generate-preview".to_string(),
            poll_interval: Duration::from_secs(5),
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Publisher model path prefix for this project and location.
    pub fn model_url(&self, model: &str) -> String {
        format!(
            "{}/v1/projects/{}/locations/{}/publishers/google/models/{}",
            self.base_url.trim_end_matches('/'),
            self.project_id,
            self.location,
            model
        )
    }

    /// Prefix Veo writes generated videos under.
    pub fn video_output_uri(&self) -> String {
        format!("gs://{}/videos/", self.bucket_name)
    }
}

fn default_base_url(location: &str) -> String {
    if location == "global" {
        "https://aiplatform.googleapis.com".to_string()
    } else {
        format!("https://{}-aiplatform.googleapis.com", location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regional_base_url() {
        let config = GenAiConfig::new("proj", "us-central1", "bucket");
        assert_eq!(config.base_url, "https://us-central1-aiplatform.googleapis.com");
        assert_eq!(
            config.model_url("veo-3.1-fast-generate-preview"),
            "https://us-central1-aiplatform.googleapis.com/v1/projects/proj/locations/us-central1/publishers/google/models/veo-3.1-fast-generate-preview"
        );
    }

    #[test]
    fn test_global_base_url() {
        let config = GenAiConfig::new("proj", "global", "bucket");
        assert_eq!(config.base_url, "https://aiplatform.googleapis.com");
    }

    #[test]
    fn test_video_output_uri() {
        let config = GenAiConfig::new("proj", "us-central1", "media");
        assert_eq!(config.video_output_uri(), "gs://media/videos/");
    }
}
