//! Backend trait and configuration.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use arvak_ir::Circuit;

use crate::capability::Capabilities;
use crate::error::HalResult;
use crate::job::{JobId, JobStatus};
use crate::result::ExecutionResult;

/// Configuration for a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Name of the backend.
    pub name: String,
    /// API endpoint URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Authentication token.
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// Additional configuration.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl BackendConfig {
    /// Create a new backend configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: None,
            token: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Set the endpoint URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the authentication token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Add extra configuration.
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Whether a backend can currently accept jobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendAvailability {
    /// Whether jobs can currently be submitted.
    pub is_available: bool,
    /// Number of jobs ahead of a new submission, if the backend exposes
    /// queue depth.
    pub queue_depth: Option<u32>,
    /// Estimated wait time in seconds before a new job would start, if
    /// known.
    pub estimated_wait: Option<f64>,
    /// Human-readable status (maintenance, calibration, provider name).
    pub status_message: Option<String>,
}

impl BackendAvailability {
    /// Always-available shorthand for backends with no external queue
    /// (e.g. the local simulator).
    pub fn always_available() -> Self {
        Self {
            is_available: true,
            queue_depth: None,
            estimated_wait: None,
            status_message: None,
        }
    }

    /// Unavailable, with a reason (maintenance, queue full, calibration
    /// in progress, query failure).
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            is_available: false,
            queue_depth: None,
            estimated_wait: None,
            status_message: Some(reason.into()),
        }
    }

    /// Whether jobs can currently be submitted.
    pub fn is_available(&self) -> bool {
        self.is_available
    }
}

/// Outcome of validating a circuit against a backend's capabilities
/// before submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationResult {
    /// Circuit is valid for this backend.
    Valid,
    /// Circuit violates one or more backend constraints.
    Invalid {
        /// One entry per violated constraint.
        reasons: Vec<String>,
    },
}

impl ValidationResult {
    /// Whether the circuit passed validation.
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

/// Trait for quantum backends.
///
/// This trait defines the interface that all quantum backends must
/// implement: capability introspection, availability, pre-submission
/// validation, job submission and management, and result retrieval.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Get the capabilities of this backend.
    ///
    /// Synchronous and infallible: implementations cache capabilities at
    /// construction time rather than querying them per call.
    fn capabilities(&self) -> &Capabilities;

    /// Check whether the backend can currently accept jobs.
    async fn availability(&self) -> HalResult<BackendAvailability>;

    /// Validate a circuit against this backend's capabilities without
    /// submitting it (qubit count, gate set, topology).
    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult>;

    /// Submit a circuit for execution.
    ///
    /// Returns a job ID that can be used to check status and retrieve results.
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId>;

    /// Get the status of a job.
    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus>;

    /// Get the result of a completed job.
    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult>;

    /// Cancel a running job.
    async fn cancel(&self, job_id: &JobId) -> HalResult<()>;

    /// Wait for a job to complete and return its result.
    ///
    /// This is a convenience method that polls the job status
    /// until it reaches a terminal state.
    async fn wait(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        use crate::error::HalError;
        use std::time::Duration;
        use tokio::time::sleep;

        let poll_interval = Duration::from_millis(500);
        let max_polls = 600; // 5 minutes max

        for _ in 0..max_polls {
            let status = self.status(job_id).await?;

            match status {
                JobStatus::Completed => return self.result(job_id).await,
                JobStatus::Failed(msg) => return Err(HalError::JobFailed(msg)),
                JobStatus::Cancelled => return Err(HalError::JobCancelled),
                JobStatus::Queued | JobStatus::Running => {
                    sleep(poll_interval).await;
                }
            }
        }

        Err(HalError::Timeout(job_id.0.clone()))
    }
}

/// Trait for creating backends from configuration.
pub trait BackendFactory: Backend + Sized {
    /// Create a backend from configuration.
    fn from_config(config: BackendConfig) -> HalResult<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_config() {
        let config = BackendConfig::new("test")
            .with_endpoint("https://api.example.com")
            .with_token("secret-token")
            .with_extra("timeout", serde_json::json!(30));

        assert_eq!(config.name, "test");
        assert_eq!(config.endpoint, Some("https://api.example.com".to_string()));
        assert_eq!(config.token, Some("secret-token".to_string()));
        assert!(config.extra.contains_key("timeout"));
    }

    #[test]
    fn test_availability_helpers() {
        assert!(BackendAvailability::always_available().is_available());
        assert!(!BackendAvailability::unavailable("maintenance").is_available());
    }

    #[test]
    fn test_validation_result() {
        assert!(ValidationResult::Valid.is_valid());
        assert!(!ValidationResult::Invalid {
            reasons: vec!["too many qubits".into()]
        }
        .is_valid());
    }
}
