//! Image-to-video generation as a long-running operation.

use async_trait::async_trait;
use bw_models::OperationHandle;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::client::VertexClient;
use crate::error::{VideoError, VideoResult};

/// Motion prompt used for every animation.
pub const VIDEO_PROMPT: &str = "The camera moves in parallax as the elements in the image move naturally, while the forecast data—the bold title remain fixed.";

const SOURCE_MIME_TYPE: &str = "image/png";
const ASPECT_RATIO: &str = "9:16";

/// Status of a submitted video operation.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationStatus {
    /// Still running.
    Pending,
    /// Finished; carries the raw response document.
    Done(Value),
    /// Finished with a provider-reported error.
    Failed(String),
}

impl OperationStatus {
    pub fn label(&self) -> &'static str {
        match self {
            OperationStatus::Pending => "pending",
            OperationStatus::Done(_) => "done",
            OperationStatus::Failed(_) => "failed",
        }
    }
}

/// Provider of long-running video generation jobs.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    /// Submit a job animating the image at `source_image_uri`.
    async fn submit(&self, source_image_uri: &str, prompt: &str) -> VideoResult<OperationHandle>;

    /// Query the current status of a submitted job.
    async fn poll(&self, handle: &OperationHandle) -> VideoResult<OperationStatus>;
}

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    instances: Vec<VideoInstance<'a>>,
    parameters: VideoParameters,
}

#[derive(Debug, Serialize)]
struct VideoInstance<'a> {
    prompt: &'a str,
    image: SourceImage<'a>,
}

#[derive(Debug, Serialize)]
struct SourceImage<'a> {
    #[serde(rename = "gcsUri")]
    gcs_uri: &'a str,
    #[serde(rename = "mimeType")]
    mime_type: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoParameters {
    aspect_ratio: &'static str,
    storage_uri: String,
    sample_count: u32,
}

#[derive(Debug, Deserialize)]
struct OperationName {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FetchOperationRequest<'a> {
    operation_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct OperationDocument {
    #[serde(default)]
    done: bool,
    #[serde(default)]
    response: Option<Value>,
    #[serde(default)]
    error: Option<OperationErrorBody>,
}

#[derive(Debug, Deserialize)]
struct OperationErrorBody {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

impl OperationDocument {
    fn into_status(self) -> OperationStatus {
        if let Some(error) = self.error {
            return OperationStatus::Failed(format!("{} (code {})", error.message, error.code));
        }
        if !self.done {
            return OperationStatus::Pending;
        }
        OperationStatus::Done(self.response.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl VideoProvider for VertexClient {
    async fn submit(&self, source_image_uri: &str, prompt: &str) -> VideoResult<OperationHandle> {
        let config = self.config();
        info!(model = %config.video_model, source = %source_image_uri, "Submitting video job");

        let request = PredictRequest {
            instances: vec![VideoInstance {
                prompt,
                image: SourceImage {
                    gcs_uri: source_image_uri,
                    mime_type: SOURCE_MIME_TYPE,
                },
            }],
            parameters: VideoParameters {
                aspect_ratio: ASPECT_RATIO,
                storage_uri: config.video_output_uri(),
                sample_count: 1,
            },
        };

        let op: OperationName = self
            .call_model(&config.video_model, "predictLongRunning", &request)
            .await
            .map_err(|e| VideoError::Submission(e.to_string()))?;

        if op.name.is_empty() {
            return Err(VideoError::Submission(
                "provider returned no operation name".to_string(),
            ));
        }

        info!(operation = %op.name, "Video job submitted");
        Ok(OperationHandle::from_string(op.name))
    }

    async fn poll(&self, handle: &OperationHandle) -> VideoResult<OperationStatus> {
        let request = FetchOperationRequest {
            operation_name: handle.as_str(),
        };

        let doc: OperationDocument = self
            .call_model(&self.config().video_model, "fetchPredictOperation", &request)
            .await
            .map_err(|e| VideoError::Poll(e.to_string()))?;

        let status = doc.into_status();
        debug!(operation = %handle, status = status.label(), "Polled video job");
        Ok(status)
    }
}
