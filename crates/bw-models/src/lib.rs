//! Shared data models for the Banana Weather backend.
//!
//! This crate provides Serde-serializable types for:
//! - SSE progress events
//! - Video generation jobs and their lifecycle
//! - Location queries
//! - The preset registry

pub mod event;
pub mod job;
pub mod location;
pub mod preset;
pub mod weather;

// Re-export common types
pub use event::{EventKind, ProgressEvent};
pub use job::{GenerationJob, JobState, OperationHandle};
pub use location::{LocationQuery, LocationQueryError, DEFAULT_CITY};
pub use preset::{fallback_presets, merge_presets, Preset, PRESETS_OBJECT};
pub use weather::{WeatherPayload, WeatherResult};
