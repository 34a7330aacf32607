//! The weather workflow: resolve, illustrate, then optionally animate.
//!
//! Each stage announces itself with a `status` event before it starts and
//! only runs if the previous stage succeeded. The `result` event is the
//! deliverable milestone; everything after it is best effort.

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use bw_genai::{ImageSynthesizer, VideoJobRunner, VIDEO_PROMPT};
use bw_maps::LocationResolver;
use bw_models::{LocationQuery, ProgressEvent, WeatherResult};
use bw_storage::{upload_image, ObjectStore};

use crate::sse::ProgressStream;

/// Shown when the best-effort animation stage fails.
pub const VIDEO_FAILED_MESSAGE: &str = "Video generation failed (Beta). Enjoy the image!";

/// Collaborators needed for the animation stage.
#[derive(Clone)]
pub struct VideoPipeline {
    pub store: Arc<dyn ObjectStore>,
    pub runner: Arc<VideoJobRunner>,
}

/// How a workflow run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowOutcome {
    /// Image and video delivered.
    Completed,
    /// Image delivered; no video pipeline in this deployment.
    ImageOnly,
    ResolutionFailed,
    SynthesisFailed,
    /// Image delivered; the upload for animation failed.
    UploadFailed,
    /// Image delivered; the video job failed.
    VideoFailed,
    /// The governing context ended first.
    Cancelled,
}

impl WorkflowOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowOutcome::Completed => "completed",
            WorkflowOutcome::ImageOnly => "image_only",
            WorkflowOutcome::ResolutionFailed => "resolution_failed",
            WorkflowOutcome::SynthesisFailed => "synthesis_failed",
            WorkflowOutcome::UploadFailed => "upload_failed",
            WorkflowOutcome::VideoFailed => "video_failed",
            WorkflowOutcome::Cancelled => "cancelled",
        }
    }

    /// Whether the client received at least the image.
    pub fn delivered_image(&self) -> bool {
        !matches!(
            self,
            WorkflowOutcome::ResolutionFailed
                | WorkflowOutcome::SynthesisFailed
                | WorkflowOutcome::Cancelled
        )
    }
}

/// Orchestrates one weather request.
#[derive(Clone)]
pub struct WeatherWorkflow {
    resolver: Arc<dyn LocationResolver>,
    images: Arc<dyn ImageSynthesizer>,
    video: Option<VideoPipeline>,
}

impl WeatherWorkflow {
    pub fn new(resolver: Arc<dyn LocationResolver>, images: Arc<dyn ImageSynthesizer>) -> Self {
        Self {
            resolver,
            images,
            video: None,
        }
    }

    /// Enable the animation stage.
    pub fn with_video(mut self, pipeline: VideoPipeline) -> Self {
        self.video = Some(pipeline);
        self
    }

    pub fn video_enabled(&self) -> bool {
        self.video.is_some()
    }

    /// Run the workflow for `query`, emitting progress into `stream`.
    ///
    /// Cancellation of `ctx` stops the run at the next await point without
    /// emitting anything further.
    pub async fn run(
        &self,
        ctx: &CancellationToken,
        query: &LocationQuery,
        stream: &mut ProgressStream,
    ) -> WorkflowOutcome {
        stream.emit(ProgressEvent::status("Identifying location...")).await;

        let city = match guarded(ctx, self.resolver.resolve(query)).await {
            None => return WorkflowOutcome::Cancelled,
            Some(Ok(city)) => city,
            Some(Err(e)) => {
                warn!(query = %query, "Error resolving location: {}", e);
                let message = if query.is_coordinates() {
                    format!("Failed to resolve location: {}", e)
                } else {
                    format!("Failed to find city: {}", e)
                };
                stream.emit(ProgressEvent::error(message)).await;
                return WorkflowOutcome::ResolutionFailed;
            }
        };

        info!(city = %city, "Resolved location");
        stream.emit(ProgressEvent::status(format!("Found location: {}", city))).await;
        stream
            .emit(ProgressEvent::status(format!(
                "Getting a banana image of the weather for {}...",
                city
            )))
            .await;

        let image = match guarded(ctx, self.images.synthesize(&city, None)).await {
            None => return WorkflowOutcome::Cancelled,
            Some(Ok(image)) => image,
            Some(Err(e)) => {
                warn!(city = %city, "Error generating image: {}", e);
                stream
                    .emit(ProgressEvent::error(format!("Failed to generate image: {}", e)))
                    .await;
                return WorkflowOutcome::SynthesisFailed;
            }
        };

        let result = WeatherResult::new(city, image);
        stream.emit(ProgressEvent::result(result.to_payload())).await;

        let Some(video) = &self.video else {
            info!("Storage not available, skipping video generation");
            return WorkflowOutcome::ImageOnly;
        };

        self.animate(ctx, video, result, stream).await
    }

    async fn animate(
        &self,
        ctx: &CancellationToken,
        video: &VideoPipeline,
        result: WeatherResult,
        stream: &mut ProgressStream,
    ) -> WorkflowOutcome {
        stream.emit(ProgressEvent::status("Preparing for animation...")).await;

        // The client already has the image, so a failed upload ends the run quietly.
        let stored = match guarded(ctx, upload_image(video.store.as_ref(), result.image_data)).await {
            None => return WorkflowOutcome::Cancelled,
            Some(Ok(stored)) => stored,
            Some(Err(e)) => {
                warn!(city = %result.city, "Failed to upload image for video generation: {}", e);
                return WorkflowOutcome::UploadFailed;
            }
        };

        stream
            .emit(ProgressEvent::status("Animating (Veo 3.1)... this may take a minute."))
            .await;

        let video_uri = match video.runner.run(ctx, &stored.uri, VIDEO_PROMPT).await {
            Ok(uri) => uri,
            Err(e) if e.is_cancelled() => return WorkflowOutcome::Cancelled,
            Err(e) => {
                warn!(city = %result.city, "Video generation failed: {}", e);
                stream.emit(ProgressEvent::error(VIDEO_FAILED_MESSAGE)).await;
                return WorkflowOutcome::VideoFailed;
            }
        };

        if ctx.is_cancelled() {
            return WorkflowOutcome::Cancelled;
        }

        stream.emit(ProgressEvent::status("Finalizing video...")).await;

        match video.store.public_url(&video_uri) {
            Ok(url) => {
                info!(city = %result.city, url = %url, "Video available");
                stream.emit(ProgressEvent::video(url)).await;
                WorkflowOutcome::Completed
            }
            Err(e) => {
                warn!(uri = %video_uri, "Video location is not publishable: {}", e);
                stream.emit(ProgressEvent::error(VIDEO_FAILED_MESSAGE)).await;
                WorkflowOutcome::VideoFailed
            }
        }
    }
}

/// Run `fut` unless `ctx` is cancelled first.
async fn guarded<F: Future>(ctx: &CancellationToken, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = ctx.cancelled() => None,
        output = fut => Some(output),
    }
}
