//! Video generation job lifecycle.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque long-running operation name issued by the video provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct OperationHandle(pub String);

impl OperationHandle {
    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State of a video generation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Accepted by the provider, no status query issued yet
    #[default]
    Submitted,
    /// Waiting on the provider
    Polling,
    /// Video produced and its location extracted
    Succeeded,
    /// Provider failure or unusable terminal payload
    Failed,
    /// Governing context ended while polling
    Cancelled,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Submitted => "submitted",
            JobState::Polling => "polling",
            JobState::Succeeded => "succeeded",
            JobState::Failed => "failed",
            JobState::Cancelled => "cancelled",
        }
    }

    /// Check if this is a terminal state (no more transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Succeeded | JobState::Failed | JobState::Cancelled
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One in-flight video generation.
///
/// Transitions are one-way: once a terminal state is reached every further
/// transition request is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationJob {
    handle: OperationHandle,
    state: JobState,
    result_uri: Option<String>,
    failure_reason: Option<String>,
}

impl GenerationJob {
    /// Create a job for a freshly accepted submission.
    pub fn submitted(handle: OperationHandle) -> Self {
        Self {
            handle,
            state: JobState::Submitted,
            result_uri: None,
            failure_reason: None,
        }
    }

    pub fn handle(&self) -> &OperationHandle {
        &self.handle
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Result location, only set once `Succeeded`.
    pub fn result_uri(&self) -> Option<&str> {
        self.result_uri.as_deref()
    }

    /// Failure reason, only set once `Failed`.
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Submitted -> Polling.
    pub fn begin_polling(&mut self) {
        if self.state == JobState::Submitted {
            self.state = JobState::Polling;
        }
    }

    pub fn succeed(&mut self, uri: impl Into<String>) {
        if !self.is_terminal() {
            self.state = JobState::Succeeded;
            self.result_uri = Some(uri.into());
        }
    }

    pub fn fail(&mut self, reason: impl Into<String>) {
        if !self.is_terminal() {
            self.state = JobState::Failed;
            self.failure_reason = Some(reason.into());
        }
    }

    pub fn cancel(&mut self) {
        if !self.is_terminal() {
            self.state = JobState::Cancelled;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> GenerationJob {
        GenerationJob::submitted(OperationHandle::from_string("projects/p/operations/1"))
    }

    #[test]
    fn test_initial_state() {
        let job = job();
        assert_eq!(job.state(), JobState::Submitted);
        assert!(job.result_uri().is_none());
        assert!(job.failure_reason().is_none());
        assert_eq!(job.handle().as_str(), "projects/p/operations/1");
    }

    #[test]
    fn test_success_path() {
        let mut job = job();
        job.begin_polling();
        assert_eq!(job.state(), JobState::Polling);

        job.succeed("gs://bucket/videos/1/sample_0.mp4");
        assert_eq!(job.state(), JobState::Succeeded);
        assert_eq!(job.result_uri(), Some("gs://bucket/videos/1/sample_0.mp4"));
        assert!(job.failure_reason().is_none());
    }

    #[test]
    fn test_terminal_states_are_final() {
        let mut job = job();
        job.begin_polling();
        job.fail("quota exceeded");
        job.succeed("gs://bucket/late.mp4");
        job.cancel();

        assert_eq!(job.state(), JobState::Failed);
        assert_eq!(job.failure_reason(), Some("quota exceeded"));
        assert!(job.result_uri().is_none());
    }

    #[test]
    fn test_cancel_while_polling() {
        let mut job = job();
        job.begin_polling();
        job.cancel();
        assert_eq!(job.state(), JobState::Cancelled);
        assert!(job.is_terminal());

        job.begin_polling();
        assert_eq!(job.state(), JobState::Cancelled);
    }

    #[test]
    fn test_terminal_classification() {
        assert!(!JobState::Submitted.is_terminal());
        assert!(!JobState::Polling.is_terminal());
        assert!(JobState::Succeeded.is_terminal());
        assert!(JobState::Failed.is_terminal());
        assert!(JobState::Cancelled.is_terminal());
    }
}
