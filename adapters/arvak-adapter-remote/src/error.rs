//! Error types for the remote execution protocol.

use thiserror::Error;

/// Result type for remote protocol operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors that can occur while submitting to or polling a remote QPU.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Unknown backend name in the remote device database.
    #[error("unknown remote backend: {0}")]
    UnknownBackend(String),

    /// Circuit could not be lowered to the remote's gate vocabulary.
    #[error("circuit conversion error: {0}")]
    CircuitError(String),

    /// Recoverable remote failure (HTTP 300/425/5xx within retry budget).
    ///
    /// Recovered internally by the polling state machine; never observed
    /// by a caller of [`arvak_hal::Backend`].
    #[error("transient remote error: {0}")]
    RemoteTransient(String),

    /// Unrecoverable remote failure (5xx after retry budget exhausted,
    /// malformed JSON, or a permanently failed job).
    #[error("remote execution failed: {0}")]
    RemoteFatal(String),

    /// Job not found in the local job cache.
    #[error("job not found: {0}")]
    JobNotFound(String),

    /// Job was cancelled (SIGINT during HTTP I/O).
    #[error("job cancelled")]
    JobCancelled,

    /// Circuit requires more qubits than the backend has.
    #[error("circuit requires {required} qubits but backend only has {available}")]
    TooManyQubits {
        /// Qubits required by the circuit.
        required: usize,
        /// Qubits available on the backend.
        available: usize,
    },

    /// Invalid configuration or request parameter.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// HTTP transport error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Remote backend database (YAML) parse error.
    #[error("device database error: {0}")]
    DeviceDb(String),
}

impl From<RemoteError> for arvak_hal::HalError {
    fn from(e: RemoteError) -> Self {
        match e {
            RemoteError::UnknownBackend(msg) => arvak_hal::HalError::Configuration(msg),
            RemoteError::CircuitError(msg) => arvak_hal::HalError::InvalidCircuit(msg),
            RemoteError::RemoteTransient(msg) => arvak_hal::HalError::BackendUnavailable(msg),
            RemoteError::RemoteFatal(msg) => arvak_hal::HalError::JobFailed(msg),
            RemoteError::JobNotFound(id) => arvak_hal::HalError::JobNotFound(id),
            RemoteError::JobCancelled => arvak_hal::HalError::JobCancelled,
            RemoteError::TooManyQubits {
                required,
                available,
            } => arvak_hal::HalError::CircuitTooLarge(format!(
                "circuit requires {required} qubits but backend only has {available}"
            )),
            RemoteError::InvalidParameter(msg) => arvak_hal::HalError::Configuration(msg),
            RemoteError::Http(e) => arvak_hal::HalError::Network(e),
            RemoteError::Json(e) => arvak_hal::HalError::Serialization(e),
            RemoteError::DeviceDb(msg) => arvak_hal::HalError::Configuration(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_backend_to_hal_configuration() {
        let hal: arvak_hal::HalError = RemoteError::UnknownBackend("gen2".into()).into();
        assert!(matches!(hal, arvak_hal::HalError::Configuration(_)));
    }

    #[test]
    fn test_remote_transient_to_hal_backend_unavailable() {
        let hal: arvak_hal::HalError = RemoteError::RemoteTransient("not ready".into()).into();
        assert!(matches!(hal, arvak_hal::HalError::BackendUnavailable(_)));
    }

    #[test]
    fn test_remote_fatal_to_hal_job_failed() {
        let hal: arvak_hal::HalError = RemoteError::RemoteFatal("500".into()).into();
        assert!(matches!(hal, arvak_hal::HalError::JobFailed(_)));
    }

    #[test]
    fn test_too_many_qubits_to_hal() {
        let hal: arvak_hal::HalError = RemoteError::TooManyQubits {
            required: 40,
            available: 20,
        }
        .into();
        assert!(matches!(hal, arvak_hal::HalError::CircuitTooLarge(_)));
    }

    #[test]
    fn test_job_cancelled_to_hal() {
        let hal: arvak_hal::HalError = RemoteError::JobCancelled.into();
        assert!(matches!(hal, arvak_hal::HalError::JobCancelled));
    }
}
