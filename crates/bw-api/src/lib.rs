//! Axum HTTP API server.
//!
//! This crate provides:
//! - `GET /api/weather`: the weather workflow streamed as Server-Sent Events
//! - `GET /api/presets`: the preset registry
//! - Static frontend serving, security headers, CORS
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod sse;
pub mod state;
pub mod workflow;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use sse::{ProgressStream, StreamError};
pub use state::AppState;
pub use workflow::{VideoPipeline, WeatherWorkflow, WorkflowOutcome};
