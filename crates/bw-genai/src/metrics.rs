//! Generation metrics.
//!
//! - Image synthesis counters by outcome
//! - Video status query counters by result
//! - Video job outcomes and durations

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Total image synthesis attempts by outcome.
    pub const IMAGES_TOTAL: &str = "genai_images_total";

    /// Total video operation status queries by result.
    pub const VIDEO_POLLS_TOTAL: &str = "genai_video_polls_total";

    /// Total video jobs by terminal outcome.
    pub const VIDEO_JOBS_TOTAL: &str = "genai_video_jobs_total";

    /// Video job duration in seconds from submission to terminal state.
    pub const VIDEO_JOB_SECONDS: &str = "genai_video_job_seconds";
}

/// Record one image synthesis attempt.
pub fn record_image(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!(names::IMAGES_TOTAL, "outcome" => outcome).increment(1);
}

/// Record one video status query.
pub fn record_poll(result: &'static str) {
    counter!(names::VIDEO_POLLS_TOTAL, "result" => result).increment(1);
}

/// Record a video job reaching a terminal state.
pub fn record_job(outcome: &'static str, elapsed_secs: f64) {
    counter!(names::VIDEO_JOBS_TOTAL, "outcome" => outcome).increment(1);
    histogram!(names::VIDEO_JOB_SECONDS, "outcome" => outcome).record(elapsed_secs);
}
