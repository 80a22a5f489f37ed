//! A single cell in the session's 2-D run table: a configuration plus,
//! once executed, its result record (spec §3 "Session state").

use arvak_hal::Counts;

use crate::config::RunConfig;

/// One cell of the session table: a run configuration and, after
/// `run(i, j)`, its result.
#[derive(Debug, Clone)]
pub struct Cell {
    pub config: RunConfig,
    pub result: Option<CellResult>,
}

impl Cell {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            result: None,
        }
    }
}

/// The result record filled in on `run(i, j)`: raw counts, bitstring to
/// integer counts, expectation values, the transpiled circuit, timing
/// estimates, and an optional state vector.
#[derive(Debug, Clone)]
pub struct CellResult {
    pub counts: Counts,
    /// `<Z>` expectation for each measured qubit, in register order.
    pub expectation_z: Vec<f64>,
    /// OpenQASM 3 text of the circuit after placement/optimisation
    /// passes — `Circuit` itself is neither `Clone` nor serialisable,
    /// so the transpiled form is recorded as emitted text.
    pub transpiled_circuit: String,
    pub execution_time_ms: Option<f64>,
    pub queue_time_ms: Option<f64>,
    pub statevector: Option<Vec<(f64, f64)>>,
    /// Jensen-Shannon divergence against `output_amplitudes`, if configured.
    pub jensen_shannon_divergence: Option<f64>,
    /// `true` if fewer than `requested_shots` were accumulated (a
    /// `PartialResult`, not a failure — see [`crate::SessionError`]).
    pub partial: bool,
    /// Bitstring probabilities after SPAM-matrix correction, indexed by
    /// integer bitstring value. Set only when `error_mitigation` is
    /// `RoError` or `AssignmentKernel`.
    pub mitigated_probabilities: Option<Vec<f64>>,
}
