//! Run configuration: the recognized options for a single cell.

use std::path::PathBuf;
use std::sync::Arc;

use arvak_compile::Placement;
use arvak_ir::Circuit;

use crate::error::{SessionError, SessionResult};

/// Maximum `num_qubits` accepted by [`RunConfig::validate`].
pub const MAX_NUM_QUBITS: u32 = 10_000;
/// Maximum `shots` accepted by [`RunConfig::validate`]; `0` means
/// deterministic/exact (statevector) execution.
pub const MAX_SHOTS: u64 = 1_000_000;

/// Where a cell's circuit comes from.
#[derive(Debug, Clone)]
pub enum Source {
    /// Read and parse a file at this path.
    FilePath(PathBuf),
    /// Parse this string directly (the contents of a source file).
    Text(String),
    /// Synthesise a random test circuit over `num_qubits` qubits,
    /// bypassing the input-format parser entirely.
    Random { num_qubits: u32 },
    /// Use this IR directly; no parsing step runs.
    Ir(Arc<Circuit>),
}

/// Which front-end parses [`Source::Text`]/[`Source::FilePath`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    #[default]
    OpenQasm,
    Xasm,
    Quil,
}

/// Post-processing error-mitigation selection for a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMitigation {
    #[default]
    None,
    /// Readout-error mitigation via a [`crate::SpamMatrix`] confusion matrix.
    RoError,
    /// Richardson (zero-noise) extrapolation over gate-folded circuits.
    RichExtrap,
    /// Assignment-matrix mitigation (IBM-style measurement-error kernel).
    ///
    /// Built on the same [`crate::SpamMatrix`] plumbing as `RoError`; see
    /// DESIGN.md for the open-question decision to treat the two as the
    /// same correction with different matrix-estimation conventions.
    AssignmentKernel,
}

/// The recognized options for one cell's run, per spec §3.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub num_qubits: u32,
    /// `0` means deterministic/exact execution (statevector, no sampling).
    pub shots: u64,
    pub backend: String,
    pub noise_enabled: bool,
    pub noise_model: Option<String>,
    pub placement: Placement,
    /// Ordered list of optimisation pass names; empty runs the backend's
    /// default optimisation level.
    pub optimisation_passes: Vec<String>,
    pub seed: Option<u64>,
    pub input_format: InputFormat,
    pub source: Source,
    /// Expected amplitudes (bitstring -> complex) for Jensen-Shannon
    /// divergence comparison.
    pub output_amplitudes: Option<std::collections::HashMap<String, num_complex::Complex64>>,
    pub error_mitigation: ErrorMitigation,

    // Remote-backend protocol parameters; ignored by local simulators.
    pub over_request_factor: u32,
    pub recursive_request: bool,
    pub resample: bool,
    pub resample_threshold_pct: f64,
    pub retries_post: u32,
    pub retries_get: u32,
    pub polling_interval_s: f64,
    pub polling_attempts: u32,
    pub safe_shot_limit: u32,
}

impl RunConfig {
    /// A config with every field at its spec-default value.
    pub fn new(source: Source, backend: impl Into<String>) -> Self {
        Self {
            num_qubits: 1,
            shots: 1024,
            backend: backend.into(),
            noise_enabled: false,
            noise_model: None,
            placement: Placement::default(),
            optimisation_passes: Vec::new(),
            seed: None,
            input_format: InputFormat::default(),
            source,
            output_amplitudes: None,
            error_mitigation: ErrorMitigation::default(),
            over_request_factor: 1,
            recursive_request: false,
            resample: false,
            resample_threshold_pct: 0.95,
            retries_post: 3,
            retries_get: 3,
            polling_interval_s: 1.0,
            polling_attempts: 60,
            safe_shot_limit: u32::MAX,
        }
    }

    /// Validate field bounds and enumerated values (spec §4.6 step 1).
    pub fn validate(&self) -> SessionResult<()> {
        if self.num_qubits < 1 || self.num_qubits > MAX_NUM_QUBITS {
            return Err(SessionError::Validation(format!(
                "num_qubits {} out of range 1..={MAX_NUM_QUBITS}",
                self.num_qubits
            )));
        }
        if self.shots > MAX_SHOTS {
            return Err(SessionError::Validation(format!(
                "shots {} exceeds maximum {MAX_SHOTS}",
                self.shots
            )));
        }
        if self.backend.is_empty() {
            return Err(SessionError::Validation("backend name is empty".into()));
        }
        if !(0.0..=1.0).contains(&self.resample_threshold_pct) {
            return Err(SessionError::Validation(format!(
                "resample_threshold_pct {} out of range 0.0..=1.0",
                self.resample_threshold_pct
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = RunConfig::new(Source::Text(String::new()), "dense");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_qubits_rejected() {
        let mut config = RunConfig::new(Source::Text(String::new()), "dense");
        config.num_qubits = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_excessive_shots_rejected() {
        let mut config = RunConfig::new(Source::Text(String::new()), "dense");
        config.shots = MAX_SHOTS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_backend_rejected() {
        let mut config = RunConfig::new(Source::Text(String::new()), "dense");
        config.backend = String::new();
        assert!(config.validate().is_err());
    }
}
