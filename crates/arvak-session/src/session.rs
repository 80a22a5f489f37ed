//! The session dispatcher: a 2-D table of [`Cell`]s and the seven-step
//! pipeline that turns a [`RunConfig`] into a [`CellResult`] (spec
//! §4.6, §4.6a).

use std::sync::{Arc, Mutex as StdMutex};

use rustc_hash::FxHashMap;
use tracing::{instrument, warn};

use arvak_compile::passes::{CancelCX, CommutativeCancellation, MeasurementBarrierVerification, Optimize1qGates};
use arvak_compile::{NoiseInjectionPass, PassManagerBuilder, PropertySet};
use arvak_hal::Backend;
use arvak_ir::noise::NoiseProfile;
use arvak_ir::Circuit;

use crate::cell::{Cell, CellResult};
use crate::config::{ErrorMitigation, InputFormat, RunConfig, Source};
use crate::error::{SessionError, SessionResult};
use crate::executor::Executor;
use crate::fold::fold_circuit;
use crate::postprocess::{build_counts, jensen_shannon_divergence, richardson_extrapolate};
use crate::spam::SpamMatrix;

/// Fold levels sampled for Richardson (zero-noise) extrapolation.
const RICHARDSON_LEVELS: [u32; 3] = [1, 3, 5];

/// Dispatches runs across a 2-D table of cells against a fixed backend
/// pool. The table is guarded by a plain [`std::sync::Mutex`]: cells
/// are cloned out before any `.await` point, never held across one
/// (spec §4.6a).
pub struct Session {
    cells: StdMutex<FxHashMap<(usize, usize), Cell>>,
    executor: Executor,
}

impl Session {
    pub fn new(backends: Vec<Arc<dyn Backend>>) -> Self {
        Self {
            cells: StdMutex::new(FxHashMap::default()),
            executor: Executor::new(backends),
        }
    }

    /// Place or replace a cell's configuration. Clears any previous result.
    pub fn set(&self, row: usize, col: usize, config: RunConfig) {
        let mut cells = self.cells.lock().expect("session cell table poisoned");
        cells.insert((row, col), Cell::new(config));
    }

    /// Snapshot a cell (config and, if run, result).
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        let cells = self.cells.lock().expect("session cell table poisoned");
        cells.get(&(row, col)).cloned()
    }

    /// Run every cell in the table, row-major. Returns as soon as one
    /// cell errors; completed cells' results remain visible via `get`.
    pub async fn run(&self) -> SessionResult<()> {
        let mut coords: Vec<(usize, usize)> = {
            let cells = self.cells.lock().expect("session cell table poisoned");
            cells.keys().copied().collect()
        };
        coords.sort_unstable();

        for (row, col) in coords {
            self.run_cell(row, col).await?;
        }
        Ok(())
    }

    /// Run a single cell: validate, resolve source, compile, place and
    /// optimise, acquire a backend, execute, post-process.
    #[instrument(skip(self), fields(row, col))]
    pub async fn run_cell(&self, row: usize, col: usize) -> SessionResult<()> {
        let config = {
            let cells = self.cells.lock().expect("session cell table poisoned");
            cells
                .get(&(row, col))
                .map(|cell| cell.config.clone())
                .ok_or_else(|| SessionError::Validation(format!("no cell at ({row}, {col})")))?
        };

        config.validate()?;

        let circuit = resolve_source(&config)?;
        let (compiled, _properties) = compile_circuit(&circuit, &config)?;

        let (index, backend) = self.executor.get_next_available(&config.backend).await?;
        let run_result = self.execute(&compiled, &config, &backend).await;
        self.executor.release(index).await;

        let result = run_result?;

        let mut cells = self.cells.lock().expect("session cell table poisoned");
        if let Some(cell) = cells.get_mut(&(row, col)) {
            cell.result = Some(result);
        }
        Ok(())
    }

    async fn execute(
        &self,
        compiled: &Circuit,
        config: &RunConfig,
        backend: &Arc<dyn Backend>,
    ) -> SessionResult<CellResult> {
        let shots = u32::try_from(config.shots).unwrap_or(u32::MAX);
        let job_id = backend.submit(compiled, shots).await?;
        let execution = backend.wait(&job_id).await?;

        let counts = build_counts(execution.counts.raw(), false);
        let num_qubits = compiled.num_qubits();
        let expectation_z = (0..num_qubits)
            .map(|qubit| counts.expectation_z(qubit))
            .collect::<Vec<_>>();

        let jsd = config
            .output_amplitudes
            .as_ref()
            .map(|amplitudes| jensen_shannon_divergence(amplitudes, &counts));

        let transpiled_circuit = arvak_qasm3::emit(compiled).unwrap_or_default();
        let partial = counts.total_shots() < config.shots;

        let mut result = CellResult {
            counts,
            expectation_z,
            transpiled_circuit,
            execution_time_ms: execution.execution_time_ms,
            queue_time_ms: execution.queue_time_ms,
            statevector: execution.statevector.clone(),
            jensen_shannon_divergence: jsd,
            partial,
            mitigated_probabilities: None,
        };

        match config.error_mitigation {
            ErrorMitigation::None => {}
            ErrorMitigation::RoError | ErrorMitigation::AssignmentKernel => {
                self.apply_readout_mitigation(&mut result, config, backend, num_qubits)
                    .await?;
            }
            ErrorMitigation::RichExtrap => {
                self.apply_richardson_extrapolation(&mut result, compiled, config, backend)
                    .await?;
            }
        }

        Ok(result)
    }

    async fn apply_readout_mitigation(
        &self,
        result: &mut CellResult,
        config: &RunConfig,
        backend: &Arc<dyn Backend>,
        num_qubits: usize,
    ) -> SessionResult<()> {
        let shots = u32::try_from(config.shots.max(1)).unwrap_or(u32::MAX);
        let spam = SpamMatrix::estimate(backend, num_qubits as u32, shots).await?;

        let dim = 1usize << num_qubits;
        let total = result.counts.total_shots() as f64;
        let measured: Vec<f64> = (0..dim)
            .map(|value| {
                if total == 0.0 {
                    0.0
                } else {
                    let bitstring = format!("{value:0width$b}", width = num_qubits as usize);
                    result.counts.get(&bitstring) as f64 / total
                }
            })
            .collect();

        result.mitigated_probabilities = Some(spam.mitigate(&measured)?);
        Ok(())
    }

    async fn apply_richardson_extrapolation(
        &self,
        result: &mut CellResult,
        compiled: &Circuit,
        config: &RunConfig,
        backend: &Arc<dyn Backend>,
    ) -> SessionResult<()> {
        let num_qubits = compiled.num_qubits();
        let shots = u32::try_from(config.shots).unwrap_or(u32::MAX);

        let mut per_qubit_samples: Vec<Vec<(u32, f64)>> = vec![Vec::new(); num_qubits as usize];

        for &level in &RICHARDSON_LEVELS {
            let Some(folded) = fold_circuit(compiled, level) else {
                warn!(level, "circuit contains a gate with no known inverse; skipping Richardson extrapolation");
                return Ok(());
            };
            let mut dag = folded.into_dag();
            let mut properties = PropertySet::new();
            if config.noise_enabled {
                properties.insert(default_noise_profile(config.noise_model.as_deref()));
            }
            run_named_passes(&mut dag, &config.optimisation_passes, &mut properties)?;
            let folded = Circuit::from_dag(dag);

            let job_id = backend.submit(&folded, shots).await?;
            let execution = backend.wait(&job_id).await?;
            let counts = build_counts(execution.counts.raw(), false);

            for qubit in 0..num_qubits as usize {
                per_qubit_samples[qubit].push((level, counts.expectation_z(qubit)));
            }
        }

        result.expectation_z = per_qubit_samples
            .into_iter()
            .map(|samples| richardson_extrapolate(&samples))
            .collect();

        Ok(())
    }
}

/// Step 2: resolve a cell's [`Source`] into a [`Circuit`] via the
/// configured [`InputFormat`] front-end.
fn resolve_source(config: &RunConfig) -> SessionResult<Circuit> {
    match &config.source {
        Source::Ir(circuit) => Ok((**circuit).clone()),
        Source::Random { num_qubits } => Ok(Circuit::ghz(*num_qubits)?),
        Source::Text(text) => parse_text(text, config.input_format),
        Source::FilePath(path) => {
            let text = std::fs::read_to_string(path).map_err(|source| SessionError::Io {
                path: path.clone(),
                source,
            })?;
            parse_text(&text, config.input_format)
        }
    }
}

fn parse_text(text: &str, format: InputFormat) -> SessionResult<Circuit> {
    match format {
        InputFormat::OpenQasm => Ok(arvak_qasm3::parse(text)?),
        InputFormat::Xasm => Ok(arvak_qasm3::parse_xasm(text)?),
        InputFormat::Quil => Ok(arvak_qasm3::parse_quil(text)?),
    }
}

/// Steps 3-4: run placement/optimisation passes named in
/// `config.optimisation_passes`, plus noise injection when
/// `config.noise_enabled`.
fn compile_circuit(circuit: &Circuit, config: &RunConfig) -> SessionResult<(Circuit, PropertySet)> {
    let mut properties = PropertySet::new();
    if config.noise_enabled {
        properties.insert(default_noise_profile(config.noise_model.as_deref()));
    }

    let (placement_manager, mut properties) = PassManagerBuilder::new()
        .with_placement(config.placement)
        .with_properties(properties)
        .build();

    let mut dag = circuit.dag().clone();
    placement_manager.run(&mut dag, &mut properties)?;
    run_named_passes(&mut dag, &config.optimisation_passes, &mut properties)?;

    Ok((Circuit::from_dag(dag), properties))
}

fn run_named_passes(
    dag: &mut arvak_ir::CircuitDag,
    names: &[String],
    properties: &mut PropertySet,
) -> SessionResult<()> {
    let mut manager = arvak_compile::PassManager::new();
    for name in names {
        match name.as_str() {
            "optimize_1q" => manager.add_pass(Optimize1qGates::new()),
            "cancel_cx" => manager.add_pass(CancelCX::new()),
            "commutative_cancellation" => manager.add_pass(CommutativeCancellation::new()),
            "measurement_barrier_verification" => manager.add_pass(MeasurementBarrierVerification),
            "noise_injection" => manager.add_pass(NoiseInjectionPass::new()),
            other => {
                return Err(SessionError::Validation(format!(
                    "unknown optimisation pass '{other}'"
                )))
            }
        }
    }
    manager.run(dag, properties)?;
    Ok(())
}

/// A representative, conservative noise profile used when a cell
/// enables noise without a calibration file to draw from — the
/// session layer has no hardware-calibration source of truth of its
/// own; see DESIGN.md for the open-question decision.
fn default_noise_profile(_noise_model: Option<&str>) -> NoiseProfile {
    let mut profile = NoiseProfile::new();
    profile.gate_errors.insert("cx".into(), 0.01);
    profile.gate_errors.insert("h".into(), 0.001);
    profile.readout_errors = Some(vec![0.02; 64]);
    profile
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_has_no_cells() {
        let session = Session::new(Vec::new());
        assert!(session.get(0, 0).is_none());
    }

    #[test]
    fn test_set_then_get_round_trips_config() {
        let session = Session::new(Vec::new());
        let config = RunConfig::new(Source::Text(String::new()), "dense");
        session.set(0, 0, config);
        let cell = session.get(0, 0).unwrap();
        assert!(cell.result.is_none());
        assert_eq!(cell.config.backend, "dense");
    }

    #[test]
    fn test_unknown_pass_name_rejected() {
        let mut dag = arvak_ir::CircuitDag::new();
        let mut properties = PropertySet::new();
        let result = run_named_passes(&mut dag, &["not_a_real_pass".to_string()], &mut properties);
        assert!(result.is_err());
    }
}
