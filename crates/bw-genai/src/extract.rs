//! Video location extraction from loosely-typed operation payloads.
//!
//! The video provider has shipped several response shapes. Instead of a
//! single fixed decode, each lookup walks an ordered list of JSON pointers
//! and takes the first usable match.

use serde_json::Value;

use crate::error::{VideoError, VideoResult};

/// Where the list of generated videos may live in an operation response.
const GENERATED_VIDEO_RULES: &[&str] = &[
    "/videos/0",
    "/generatedVideos/0",
    "/generateVideoResponse/generatedSamples/0",
];

/// Where the video location may live inside one generated video, in
/// priority order.
const RESULT_URI_RULES: &[&str] = &[
    "/gcsUri",
    "/videoUri",
    "/uri",
    "/video/uri",
    "/video/gcsUri",
    "/video/videoUri",
];

/// First generated video document of a finished operation response.
pub fn first_generated_video(response: &Value) -> Option<&Value> {
    GENERATED_VIDEO_RULES
        .iter()
        .find_map(|rule| response.pointer(rule))
        .filter(|v| v.is_object())
}

/// Extract the video location from one generated video document.
///
/// Empty strings and non-string values are skipped.
pub fn extract_result_uri(video: &Value) -> VideoResult<String> {
    RESULT_URI_RULES
        .iter()
        .filter_map(|rule| video.pointer(rule))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|uri| !uri.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            VideoError::Extraction(format!("video generated but URI is empty (JSON: {})", video))
        })
}

/// Extract the video location from a whole operation response.
pub fn extract_video_uri(response: &Value) -> VideoResult<String> {
    let video = first_generated_video(response).ok_or_else(|| {
        VideoError::Extraction("operation done but no videos found".to_string())
    })?;
    extract_result_uri(video)
}
