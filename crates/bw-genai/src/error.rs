//! Generation error types.

use thiserror::Error;

/// Result type for client and image operations.
pub type GenAiResult<T> = Result<T, GenAiError>;

/// Result type for the video pipeline.
pub type VideoResult<T> = Result<T, VideoError>;

/// Errors raised by the Vertex client and image synthesis.
#[derive(Debug, Error)]
pub enum GenAiError {
    #[error("Failed to configure GenAI client: {0}")]
    ConfigError(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("genai request failed: {0}")]
    Request(String),

    #[error("genai API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    Synthesis(String),

    #[error("Invalid genai response: {0}")]
    InvalidResponse(String),
}

impl GenAiError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn auth_error(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    pub fn synthesis(msg: impl Into<String>) -> Self {
        Self::Synthesis(msg.into())
    }
}

impl From<reqwest::Error> for GenAiError {
    fn from(e: reqwest::Error) -> Self {
        GenAiError::Request(e.to_string())
    }
}

/// Errors raised while producing a video.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VideoError {
    /// The provider rejected or never accepted the job.
    #[error("veo submission failed: {0}")]
    Submission(String),

    /// A status query failed; treated as transient by the runner.
    #[error("veo polling failed: {0}")]
    Poll(String),

    /// The provider reported the operation as failed.
    #[error("operation failed: {0}")]
    Provider(String),

    /// The operation finished but no video location could be found.
    #[error("{0}")]
    Extraction(String),

    /// The governing context ended before the job finished.
    #[error("context cancelled during polling")]
    Cancelled,
}

impl VideoError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, VideoError::Cancelled)
    }

    /// Metric label for the job outcome.
    pub fn outcome(&self) -> &'static str {
        match self {
            VideoError::Submission(_) => "submission_failed",
            VideoError::Poll(_) => "poll_failed",
            VideoError::Provider(_) => "provider_failed",
            VideoError::Extraction(_) => "extraction_failed",
            VideoError::Cancelled => "cancelled",
        }
    }
}
