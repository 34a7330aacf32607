//! Video job submission and polling.

use std::sync::Arc;
use std::time::Duration;

use bw_models::GenerationJob;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{VideoError, VideoResult};
use crate::extract::extract_video_uri;
use crate::metrics;
use crate::video::{OperationStatus, VideoProvider};

/// Fixed delay between operation status queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Drives a video job from submission to a terminal state.
///
/// Status queries run on a fixed interval with no backoff. A failed query is
/// logged and retried on the next tick; only a provider-reported failure, an
/// unusable terminal payload, or cancellation ends the loop early.
#[derive(Clone)]
pub struct VideoJobRunner {
    provider: Arc<dyn VideoProvider>,
    poll_interval: Duration,
}

impl VideoJobRunner {
    pub fn new(provider: Arc<dyn VideoProvider>) -> Self {
        Self {
            provider,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        if !poll_interval.is_zero() {
            self.poll_interval = poll_interval;
        }
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Submit a job. Submission failures are never retried.
    pub async fn submit(
        &self,
        ctx: &CancellationToken,
        source_image_uri: &str,
        prompt: &str,
    ) -> VideoResult<GenerationJob> {
        let submitted = tokio::select! {
            biased;
            _ = ctx.cancelled() => return Err(VideoError::Cancelled),
            result = self.provider.submit(source_image_uri, prompt) => result,
        };

        match submitted {
            Ok(handle) => {
                info!(operation = %handle, "Video job accepted");
                Ok(GenerationJob::submitted(handle))
            }
            Err(e) => {
                warn!("Video submission failed: {}", e);
                metrics::record_job(e.outcome(), 0.0);
                Err(e)
            }
        }
    }

    /// Poll `job` until it reaches a terminal state and return the video
    /// location on success.
    ///
    /// The first status query is issued one interval after the call.
    /// Cancellation is observed both while waiting for a tick and while a
    /// query is in flight; no query is issued after it fires.
    pub async fn await_completion(
        &self,
        ctx: &CancellationToken,
        job: &mut GenerationJob,
    ) -> VideoResult<String> {
        let started = Instant::now();
        let result = self.poll_until_terminal(ctx, job).await;

        let outcome = match &result {
            Ok(_) => "succeeded",
            Err(e) => e.outcome(),
        };
        metrics::record_job(outcome, started.elapsed().as_secs_f64());

        result
    }

    /// Submit then await completion.
    pub async fn run(
        &self,
        ctx: &CancellationToken,
        source_image_uri: &str,
        prompt: &str,
    ) -> VideoResult<String> {
        let mut job = self.submit(ctx, source_image_uri, prompt).await?;
        self.await_completion(ctx, &mut job).await
    }

    async fn poll_until_terminal(
        &self,
        ctx: &CancellationToken,
        job: &mut GenerationJob,
    ) -> VideoResult<String> {
        job.begin_polling();

        let mut ticker = interval_at(Instant::now() + self.poll_interval, self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = ctx.cancelled() => {
                    job.cancel();
                    info!(operation = %job.handle(), "Video polling cancelled");
                    return Err(VideoError::Cancelled);
                }
                _ = ticker.tick() => {}
            }

            let polled = tokio::select! {
                biased;
                _ = ctx.cancelled() => {
                    job.cancel();
                    info!(operation = %job.handle(), "Video polling cancelled");
                    return Err(VideoError::Cancelled);
                }
                result = self.provider.poll(job.handle()) => result,
            };

            match polled {
                Err(e) => {
                    metrics::record_poll("error");
                    warn!(operation = %job.handle(), "Video poll failed, retrying: {}", e);
                }
                Ok(OperationStatus::Pending) => {
                    metrics::record_poll("pending");
                    debug!(operation = %job.handle(), "Video job still running");
                }
                Ok(OperationStatus::Failed(reason)) => {
                    metrics::record_poll("failed");
                    let err = VideoError::Provider(reason);
                    warn!(operation = %job.handle(), "Video job failed: {}", err);
                    job.fail(err.to_string());
                    return Err(err);
                }
                Ok(OperationStatus::Done(response)) => {
                    metrics::record_poll("done");
                    return match extract_video_uri(&response) {
                        Ok(uri) => {
                            info!(operation = %job.handle(), uri = %uri, "Video job succeeded");
                            job.succeed(uri.clone());
                            Ok(uri)
                        }
                        Err(err) => {
                            warn!(operation = %job.handle(), "Video job finished without a video: {}", err);
                            job.fail(err.to_string());
                            Err(err)
                        }
                    };
                }
            }
        }
    }
}
