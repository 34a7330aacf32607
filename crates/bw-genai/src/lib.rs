//! Vertex AI generation client.
//!
//! This crate provides:
//! - Search-grounded weather image synthesis (Gemini image models)
//! - Image-to-video generation as a long-running operation (Veo)
//! - [`VideoJobRunner`], which submits a video job and polls it to a
//!   terminal state while honouring cancellation
//! - Ordered extraction of the video location from loosely-typed payloads

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod image;
pub mod metrics;
pub mod runner;
pub mod video;

pub use client::VertexClient;
pub use config::GenAiConfig;
pub use error::{GenAiError, GenAiResult, VideoError, VideoResult};
pub use extract::{extract_result_uri, extract_video_uri, first_generated_video};
pub use image::{build_image_prompt, ImageSynthesizer};
pub use runner::{VideoJobRunner, DEFAULT_POLL_INTERVAL};
pub use video::{OperationStatus, VideoProvider, VIDEO_PROMPT};

/// Cancellation handle governing one request.
pub use tokio_util::sync::CancellationToken;
