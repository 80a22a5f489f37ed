//! Remote QPU backend implementing the submit/poll state machine (spec
//! §4.5): over-request, poll, accumulate, and — on a shot deficit — a
//! recursive top-up request with a forced-resample rule.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use arvak_hal::{
    Backend, BackendAvailability, Capabilities, Counts, ExecutionResult, GateSet, HalError,
    HalResult, Job, JobId, JobStatus, Topology, ValidationResult,
};
use arvak_ir::Circuit;

use crate::client::{PollOutcome, RemoteClient};
use crate::device_db::RemoteDeviceDb;
use crate::error::RemoteError;
use crate::protocol::{JobState, ReadoutContrastThreshold, RemoteConfig, RequestEnvelope, Settings};
use crate::xasm::{self, LoweredCircuit};

/// Maximum number of cached jobs before terminal entries are evicted.
const MAX_CACHED_JOBS: usize = 10_000;

/// Frozen per spec.md §9 open question (a): at or above this fraction
/// of requested shots, a recursive top-up forces `resample = true`.
const DEFAULT_RESAMPLE_THRESHOLD_PCT: f64 = 0.95;
/// Frozen per spec.md §9 open question (a): over-request multiplier
/// applied to a forced-resample recursive top-up.
const DEFAULT_OVER_REQUEST_MULTIPLIER_ON_RECURSIVE: u32 = 8;

struct RemoteJob {
    job: Job,
    state: JobState,
    result: Option<ExecutionResult>,
    cancelled: Arc<AtomicBool>,
}

/// Remote QPU backend.
///
/// Drives each submission through a background task implementing the
/// full submit/poll/accumulate/recursive state machine; `status()` and
/// `result()` read the job cache the background task updates, matching
/// the teacher's `Arc<Mutex<FxHashMap<..>>>` job-cache pattern.
pub struct RemoteBackend {
    client: Arc<RemoteClient>,
    hwbackend: String,
    config_template: RemoteConfig,
    capabilities: Capabilities,
    jobs: Arc<Mutex<FxHashMap<String, RemoteJob>>>,
}

impl RemoteBackend {
    /// Connect to a named backend looked up in the remote device database.
    pub async fn connect(
        hwbackend: impl Into<String>,
        db: &RemoteDeviceDb,
        headers: HashMap<String, String>,
    ) -> Result<Self, RemoteError> {
        let hwbackend = hwbackend.into();
        let entry = db.get(&hwbackend)?;

        let capabilities = Capabilities {
            name: hwbackend.clone(),
            num_qubits: entry.num_qubits,
            gate_set: native_gate_set(),
            topology: Topology::full(entry.num_qubits),
            max_shots: entry.safe_shot_limit,
            is_simulator: false,
            features: vec![],
            noise_profile: None,
        };

        let readout_contrast_threshold =
            entry
                .init_contrast_threshold
                .map(|init| ReadoutContrastThreshold {
                    init,
                    qubits: entry.qubit_contrast_thresholds.clone(),
                });

        let config_template = RemoteConfig {
            readout_contrast_threshold,
            endpoint: entry.endpoint.clone(),
            post_path: entry.post_path.clone(),
            headers,
            hwbackend: hwbackend.clone(),
            safe_shot_limit: entry.safe_shot_limit,
            over_request_factor: 4,
            polling_interval_s: 1.0,
            polling_attempts: 120,
            retries_post: 1,
            retries_get: 1,
            recursive_request: true,
            resample: false,
            resample_threshold_pct: DEFAULT_RESAMPLE_THRESHOLD_PCT,
            over_request_multiplier_on_recursive: DEFAULT_OVER_REQUEST_MULTIPLIER_ON_RECURSIVE,
            seed: None,
            init: vec![0; entry.num_qubits as usize],
        };

        Ok(Self {
            client: Arc::new(RemoteClient::new()?),
            hwbackend,
            config_template,
            capabilities,
            jobs: Arc::new(Mutex::new(FxHashMap::default())),
        })
    }

    /// Override the default over-request/recursive/resample protocol
    /// parameters (spec §9 open question (a) exposes these as
    /// overridable run-config fields).
    #[must_use]
    pub fn with_protocol_params(
        mut self,
        over_request_factor: u32,
        recursive_request: bool,
        resample: bool,
        resample_threshold_pct: f64,
    ) -> Self {
        self.config_template.over_request_factor = over_request_factor;
        self.config_template.recursive_request = recursive_request;
        self.config_template.resample = resample;
        self.config_template.resample_threshold_pct = resample_threshold_pct;
        self
    }

    /// Seed the resampling RNG (falls back to time-seeded otherwise).
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config_template.seed = Some(seed);
        self
    }
}

fn native_gate_set() -> GateSet {
    GateSet {
        single_qubit: vec![
            "id".into(),
            "x".into(),
            "y".into(),
            "z".into(),
            "h".into(),
            "s".into(),
            "sdg".into(),
            "t".into(),
            "tdg".into(),
            "rx".into(),
            "ry".into(),
            "rz".into(),
            "u".into(),
        ],
        two_qubit: vec!["cx".into(), "cz".into(), "swap".into()],
        native: vec!["rx".into(), "ry".into(), "cz".into()],
    }
}

/// Clamp `requested * over_request_factor` to `safe_shot_limit`,
/// warning on clamp (spec §4.5 step 2 / §8 boundary behaviour).
fn clamp_shots(requested: u32, over_request_factor: u32, safe_shot_limit: u32) -> u32 {
    let scaled = requested.saturating_mul(over_request_factor);
    if scaled > safe_shot_limit {
        warn!(
            requested,
            over_request_factor, safe_shot_limit, "shot request exceeds safe limit; clamping"
        );
        safe_shot_limit
    } else {
        scaled
    }
}

fn build_envelope(config: &RemoteConfig, lowered: &LoweredCircuit, shots: u32) -> RequestEnvelope {
    RequestEnvelope {
        command: "circuit".to_string(),
        settings: Settings {
            shots,
            cycles: 1,
            results: "normal".to_string(),
            readout_contrast_threshold: config.readout_contrast_threshold.clone(),
        },
        hwbackend: config.hwbackend.clone(),
        init: config.init.clone(),
        circuit: lowered.gate_sequence.clone(),
        measure: lowered.measure.clone(),
    }
}

/// Build the measured bitstring for one hardware sample row, ordering
/// bits by classical-bit index so the result is independent of the
/// order measurements were issued in the original circuit.
fn row_to_bitstring(measure: &[(u32, u32)], row: &[u8]) -> String {
    let mut by_clbit: Vec<(u32, u8)> = measure
        .iter()
        .zip(row.iter())
        .map(|(&(_, clbit), &bit)| (clbit, bit))
        .collect();
    by_clbit.sort_by_key(|&(clbit, _)| clbit);
    by_clbit
        .into_iter()
        .map(|(_, bit)| if bit == 0 { '0' } else { '1' })
        .collect()
}

/// Accumulate up to `needed` valid samples from one poll's `data` into
/// `accumulated`, either in order (no resample) or by drawing with
/// replacement (resample), per spec §4.5.
fn accumulate_samples(
    accumulated: &mut Counts,
    measure: &[(u32, u32)],
    data: &[Vec<u8>],
    needed: u32,
    resample: bool,
    seed: Option<u64>,
) {
    if data.is_empty() || needed == 0 {
        return;
    }

    if resample {
        let mut rng = match seed {
            Some(s) => rand::rngs::StdRng::seed_from_u64(s),
            None => rand::rngs::StdRng::from_entropy(),
        };
        for _ in 0..needed {
            let idx = rng.gen_range(0..data.len());
            accumulated.insert(row_to_bitstring(measure, &data[idx]), 1);
        }
    } else {
        for row in data.iter().take(needed as usize) {
            accumulated.insert(row_to_bitstring(measure, row), 1);
        }
    }
}

async fn set_state(
    jobs: &Mutex<FxHashMap<String, RemoteJob>>,
    job_id: &str,
    state: JobState,
    status: JobStatus,
) {
    let mut jobs = jobs.lock().await;
    if let Some(entry) = jobs.get_mut(job_id) {
        entry.state = state;
        entry.job = entry.job.clone().with_status(status);
    }
}

async fn is_cancelled(jobs: &Mutex<FxHashMap<String, RemoteJob>>, job_id: &str) -> bool {
    let jobs = jobs.lock().await;
    jobs.get(job_id)
        .is_some_and(|entry| entry.cancelled.load(Ordering::SeqCst))
}

async fn finish(
    jobs: &Mutex<FxHashMap<String, RemoteJob>>,
    job_id: &str,
    state: JobState,
    status: JobStatus,
    result: Option<ExecutionResult>,
) {
    let mut jobs = jobs.lock().await;
    if let Some(entry) = jobs.get_mut(job_id) {
        entry.state = state;
        entry.job = entry.job.clone().with_status(status);
        entry.result = result;
    }
}

/// One POST attempt with the job's retry budget.
async fn submit_with_retry(
    client: &RemoteClient,
    config: &RemoteConfig,
    envelope: &RequestEnvelope,
) -> Result<i64, RemoteError> {
    let mut last_err = None;
    for attempt in 0..=config.retries_post {
        match client.submit(&config.submit_url(), &config.headers, envelope).await {
            Ok(id) => return Ok(id),
            Err(RemoteError::RemoteTransient(msg)) => {
                debug!(attempt, "submit transient failure: {msg}");
                last_err = Some(RemoteError::RemoteTransient(msg));
            }
            Err(other) => return Err(other),
        }
    }
    Err(last_err.unwrap_or_else(|| RemoteError::RemoteFatal("submit retry budget exhausted".into())))
}

enum PollLoopOutcome {
    Data(Vec<Vec<u8>>),
    Cancelled,
    Failed(String),
}

async fn poll_until_data(
    client: &RemoteClient,
    config: &RemoteConfig,
    remote_job_id: i64,
    jobs: &Mutex<FxHashMap<String, RemoteJob>>,
    job_id: &str,
) -> PollLoopOutcome {
    let url = config.poll_url(remote_job_id);
    let mut transient_failures = 0u32;

    for _ in 0..config.polling_attempts {
        if is_cancelled(jobs, job_id).await {
            return PollLoopOutcome::Cancelled;
        }

        match client.poll(&url, &config.headers).await {
            Ok(PollOutcome::NotReady) => {
                tokio::time::sleep(Duration::from_secs_f64(config.polling_interval_s)).await;
            }
            Ok(PollOutcome::Data(data)) => return PollLoopOutcome::Data(data),
            Ok(PollOutcome::Failed(msg)) => return PollLoopOutcome::Failed(msg),
            Err(RemoteError::RemoteTransient(msg)) => {
                transient_failures += 1;
                if transient_failures > config.retries_get {
                    return PollLoopOutcome::Failed(msg);
                }
                tokio::time::sleep(Duration::from_secs_f64(config.polling_interval_s)).await;
            }
            Err(other) => return PollLoopOutcome::Failed(other.to_string()),
        }
    }

    PollLoopOutcome::Failed("polling attempts exhausted".to_string())
}

#[allow(clippy::too_many_lines)]
async fn drive_job(
    client: Arc<RemoteClient>,
    jobs: Arc<Mutex<FxHashMap<String, RemoteJob>>>,
    job_id: String,
    mut config: RemoteConfig,
    mut envelope: RequestEnvelope,
    requested_shots: u32,
) {
    set_state(&jobs, &job_id, JobState::Submitted, JobStatus::Running).await;

    let mut accumulated = Counts::new();

    loop {
        if is_cancelled(&jobs, &job_id).await {
            finish(&jobs, &job_id, JobState::Failed, JobStatus::Cancelled, None).await;
            return;
        }

        let remote_job_id = match submit_with_retry(&client, &config, &envelope).await {
            Ok(id) => id,
            Err(e) => {
                finish(&jobs, &job_id, JobState::Failed, JobStatus::Failed(e.to_string()), None)
                    .await;
                return;
            }
        };

        set_state(&jobs, &job_id, JobState::Polling, JobStatus::Running).await;

        let data = match poll_until_data(&client, &config, remote_job_id, &jobs, &job_id).await {
            PollLoopOutcome::Data(data) => data,
            PollLoopOutcome::Cancelled => {
                finish(&jobs, &job_id, JobState::Failed, JobStatus::Cancelled, None).await;
                return;
            }
            PollLoopOutcome::Failed(msg) => {
                finish(&jobs, &job_id, JobState::Failed, JobStatus::Failed(msg), None).await;
                return;
            }
        };

        set_state(&jobs, &job_id, JobState::Accumulating, JobStatus::Running).await;

        let needed = requested_shots - accumulated.total_shots() as u32;
        accumulate_samples(
            &mut accumulated,
            &envelope.measure,
            &data,
            needed,
            config.resample,
            config.seed,
        );

        let acc_valid = u32::try_from(accumulated.total_shots()).unwrap_or(u32::MAX);
        if acc_valid >= requested_shots {
            let result = ExecutionResult::new(accumulated, requested_shots);
            finish(&jobs, &job_id, JobState::Succeeded, JobStatus::Completed, Some(result)).await;
            return;
        }

        if !config.recursive_request {
            let result = ExecutionResult::new(accumulated, acc_valid);
            finish(&jobs, &job_id, JobState::Succeeded, JobStatus::Completed, Some(result)).await;
            return;
        }

        set_state(&jobs, &job_id, JobState::Recursive, JobStatus::Running).await;

        let deficit = requested_shots - acc_valid;
        let ratio = f64::from(acc_valid) / f64::from(requested_shots);
        if ratio >= config.resample_threshold_pct {
            config.resample = true;
            config.over_request_factor = config
                .over_request_factor
                .saturating_mul(config.over_request_multiplier_on_recursive);
        }
        let next_shots = clamp_shots(deficit, config.over_request_factor, config.safe_shot_limit);
        envelope.settings.shots = next_shots;
    }
}

#[async_trait]
impl Backend for RemoteBackend {
    fn name(&self) -> &str {
        &self.hwbackend
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        let mut reasons = Vec::new();

        if circuit.num_qubits() > self.capabilities.num_qubits as usize {
            reasons.push(format!(
                "circuit requires {} qubits but backend only has {}",
                circuit.num_qubits(),
                self.capabilities.num_qubits
            ));
        }

        if let Err(e) = xasm::lower(circuit) {
            reasons.push(e.to_string());
        }

        if reasons.is_empty() {
            Ok(ValidationResult::Valid)
        } else {
            Ok(ValidationResult::Invalid { reasons })
        }
    }

    #[instrument(skip(self, circuit))]
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        if circuit.num_qubits() > self.capabilities.num_qubits as usize {
            return Err(HalError::CircuitTooLarge(format!(
                "circuit requires {} qubits but backend only has {}",
                circuit.num_qubits(),
                self.capabilities.num_qubits
            )));
        }

        let lowered = xasm::lower(circuit).map_err(arvak_hal::HalError::from)?;

        let job_id = JobId::new(Uuid::new_v4().to_string());
        let job = Job::new(job_id.clone(), shots).with_backend(self.hwbackend.clone());

        {
            let mut jobs = self.jobs.lock().await;
            if jobs.len() >= MAX_CACHED_JOBS {
                jobs.retain(|_, j| !j.job.status.is_terminal());
            }
            jobs.insert(
                job_id.0.clone(),
                RemoteJob {
                    job,
                    state: JobState::Submitted,
                    result: None,
                    cancelled: Arc::new(AtomicBool::new(false)),
                },
            );
        }

        // Remote execution with shots=0 returns immediately without POST
        // (spec §8 boundary behaviour).
        if shots == 0 {
            finish(
                &self.jobs,
                &job_id.0,
                JobState::Succeeded,
                JobStatus::Completed,
                Some(ExecutionResult::new(Counts::new(), 0)),
            )
            .await;
            return Ok(job_id);
        }

        let mut config = self.config_template.clone();
        if config.init.len() != circuit.num_qubits() {
            config.init = vec![0; circuit.num_qubits()];
        }

        let effective_shots =
            clamp_shots(shots, config.over_request_factor, config.safe_shot_limit);
        let envelope = build_envelope(&config, &lowered, effective_shots);

        let client = self.client.clone();
        let jobs = self.jobs.clone();
        let job_id_str = job_id.0.clone();
        tokio::spawn(async move {
            drive_job(client, jobs, job_id_str, config, envelope, shots).await;
        });

        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let jobs = self.jobs.lock().await;
        jobs.get(&job_id.0)
            .map(|j| j.job.status.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let jobs = self.jobs.lock().await;
        let entry = jobs
            .get(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;

        match &entry.job.status {
            JobStatus::Completed => entry
                .result
                .clone()
                .ok_or_else(|| HalError::Backend("completed job has no result".to_string())),
            JobStatus::Failed(msg) => Err(HalError::JobFailed(msg.clone())),
            JobStatus::Cancelled => Err(HalError::JobCancelled),
            JobStatus::Queued | JobStatus::Running => Err(HalError::Backend(format!(
                "job {} not yet completed",
                job_id.0
            ))),
        }
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        let jobs = self.jobs.lock().await;
        let entry = jobs
            .get(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        entry.cancelled.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_shots_passes_through_under_limit() {
        assert_eq!(clamp_shots(100, 4, 10_000), 400);
    }

    #[test]
    fn test_clamp_shots_clamps_over_limit() {
        assert_eq!(clamp_shots(1000, 4, 512), 512);
    }

    #[test]
    fn test_row_to_bitstring_orders_by_classical_bit() {
        let measure = vec![(2, 1), (0, 0)];
        let row = vec![1u8, 0u8]; // row[0] -> clbit 1, row[1] -> clbit 0
        assert_eq!(row_to_bitstring(&measure, &row), "01");
    }

    #[test]
    fn test_accumulate_samples_without_resample_stops_at_needed() {
        let mut counts = Counts::new();
        let measure = vec![(0, 0)];
        let data = vec![vec![0u8], vec![1u8], vec![0u8]];
        accumulate_samples(&mut counts, &measure, &data, 2, false, None);
        assert_eq!(counts.total_shots(), 2);
    }

    #[test]
    fn test_accumulate_samples_with_resample_reaches_needed() {
        let mut counts = Counts::new();
        let measure = vec![(0, 0)];
        let data = vec![vec![1u8]];
        accumulate_samples(&mut counts, &measure, &data, 5, true, Some(42));
        assert_eq!(counts.total_shots(), 5);
    }
}
