//! Wire protocol types and the submit/poll state machine.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Per-job configuration carried through submission and polling.
///
/// Owned entirely by the [`crate::backend::RemoteJob`] it belongs to —
/// headers, endpoint and post path are never shared across jobs.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Base endpoint for the remote backend (e.g. `https://qpu.example.com`).
    pub endpoint: String,
    /// Path segment the returned job id is appended to, forming the poll URL.
    pub post_path: String,
    /// Extra HTTP headers sent with every request (auth, tenant, etc.).
    pub headers: HashMap<String, String>,
    /// Name of the hardware backend as known to the remote service.
    pub hwbackend: String,
    /// Hard per-submission shot ceiling enforced by the remote service.
    pub safe_shot_limit: u32,
    /// Multiplier applied to requested shots to tolerate sample dropout.
    pub over_request_factor: u32,
    /// Seconds between poll attempts.
    pub polling_interval_s: f64,
    /// Maximum number of poll attempts before giving up.
    pub polling_attempts: u32,
    /// POST retry budget for transient failures.
    pub retries_post: u32,
    /// GET retry budget for transient failures.
    pub retries_get: u32,
    /// Whether a shot deficit triggers a recursive top-up request.
    pub recursive_request: bool,
    /// Whether to draw samples with replacement to reach `requested_shots`.
    pub resample: bool,
    /// Fraction of requested shots (0.0-1.0) at or above which a recursive
    /// top-up is forced to resample.
    pub resample_threshold_pct: f64,
    /// Multiplier applied to `over_request_factor` on a forced-resample
    /// recursive top-up.
    pub over_request_multiplier_on_recursive: u32,
    /// RNG seed for resampling; `None` seeds from time.
    pub seed: Option<u64>,
    /// Number of measured qubits (per-qubit initial state vector length).
    pub init: Vec<u32>,
    /// Optional readout-contrast thresholds carried from the device
    /// database entry.
    pub readout_contrast_threshold: Option<ReadoutContrastThreshold>,
}

impl RemoteConfig {
    /// Poll URL formed by appending the remote job id to `post_path`.
    pub fn poll_url(&self, remote_job_id: i64) -> String {
        format!(
            "{}/{}/{}",
            self.endpoint.trim_end_matches('/'),
            self.post_path.trim_matches('/'),
            remote_job_id
        )
    }

    /// Submission URL (`POST /circuit`).
    pub fn submit_url(&self) -> String {
        format!("{}/circuit", self.endpoint.trim_end_matches('/'))
    }
}

/// Optional readout-contrast thresholding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadoutContrastThreshold {
    /// Minimum contrast for the initial calibration pulse.
    pub init: f64,
    /// Per-qubit contrast thresholds.
    pub qubits: Vec<f64>,
}

/// `settings` sub-object of the submission envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Shots requested of the remote service (after over-request scaling
    /// and safe-limit clamping).
    pub shots: u32,
    /// Number of QPU cycles per shot.
    pub cycles: u32,
    /// Result format; always `"normal"`.
    pub results: String,
    /// Optional readout-contrast thresholds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readout_contrast_threshold: Option<ReadoutContrastThreshold>,
}

/// The full submission envelope (spec §6, `POST /circuit`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Always `"circuit"`.
    pub command: String,
    /// Shot/cycle/result-format settings.
    pub settings: Settings,
    /// Name of the hardware backend.
    pub hwbackend: String,
    /// Per-qubit initial basis state.
    pub init: Vec<u32>,
    /// XASM gate sequence, measurements already stripped out.
    pub circuit: Vec<String>,
    /// `(qubit, classical_bit)` pairs in Measure-instruction order.
    pub measure: Vec<(u32, u32)>,
}

/// `POST /circuit` response: `{"id": <int>, ...}`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    /// Remote job id; appended to `post_path` to form the poll URL.
    pub id: i64,
}

/// `GET /circuit/{id}` response body on success.
#[derive(Debug, Clone, Deserialize)]
pub struct PollResponse {
    /// Per-shot bit sequences, one entry per completed shot.
    #[serde(default)]
    pub data: Option<Vec<Vec<u8>>>,
}

/// States of the per-job submit/poll state machine (spec §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Envelope built, not yet POSTed.
    Submitted,
    /// Awaiting a `data` array from the poll URL.
    Polling,
    /// `data` array received; samples are being counted/resampled.
    Accumulating,
    /// Shot deficit and `recursive_request`: a top-up submission is in
    /// flight.
    Recursive,
    /// `requested_shots` reached (or a non-recursive partial result
    /// accepted).
    Succeeded,
    /// Unrecoverable remote failure.
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_url_joins_endpoint_path_and_id() {
        let config = RemoteConfig {
            endpoint: "https://qpu.example.com/".into(),
            post_path: "/circuit/".into(),
            headers: HashMap::new(),
            hwbackend: "gen1_canberra".into(),
            safe_shot_limit: 512,
            over_request_factor: 4,
            polling_interval_s: 1.0,
            polling_attempts: 60,
            retries_post: 1,
            retries_get: 1,
            recursive_request: true,
            resample: false,
            resample_threshold_pct: 0.95,
            over_request_multiplier_on_recursive: 8,
            seed: None,
            init: vec![0, 0],
            readout_contrast_threshold: None,
        };
        assert_eq!(
            config.poll_url(42),
            "https://qpu.example.com/circuit/42"
        );
        assert_eq!(config.submit_url(), "https://qpu.example.com/circuit");
    }
}
