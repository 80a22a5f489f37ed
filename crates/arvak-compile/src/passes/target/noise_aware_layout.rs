//! Noise-aware layout pass.
//!
//! Selects an initial logical-to-physical qubit assignment minimising a
//! composite cost built from per-qubit gate error and per-qubit readout
//! error, then hands off to [`crate::passes::BasicRouting`] for SWAP
//! insertion exactly as [`crate::passes::TrivialLayout`] does.

use rustc_hash::FxHashMap;

use arvak_ir::{CircuitDag, CircuitLevel, QubitId};

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::{CouplingMap, Layout, PropertySet};

/// Per-qubit and per-edge error rates for a target device, supplementing
/// a plain [`CouplingMap`] with the calibration data noise-aware placement
/// needs.
///
/// Kept as a separate type rather than folded into `CouplingMap` so that
/// connectivity-only placement (`TrivialLayout`/`BasicRouting`) is
/// unaffected by whether calibration data is available.
#[derive(Debug, Clone)]
pub struct DeviceDescriptor {
    /// Underlying connectivity.
    pub coupling_map: CouplingMap,
    /// Single-qubit gate error rate per physical qubit, in `[0, 1)`.
    pub gate_error: FxHashMap<u32, f64>,
    /// Two-qubit gate error rate per coupling-map edge, keyed by the pair
    /// in the same orientation the edge was added (lookups check both
    /// orientations).
    pub two_qubit_error: FxHashMap<(u32, u32), f64>,
    /// Readout error rate per physical qubit, in `[0, 1)`.
    pub readout_error: FxHashMap<u32, f64>,
}

impl DeviceDescriptor {
    /// Wrap a coupling map with all error rates defaulted to zero.
    pub fn new(coupling_map: CouplingMap) -> Self {
        Self {
            coupling_map,
            gate_error: FxHashMap::default(),
            two_qubit_error: FxHashMap::default(),
            readout_error: FxHashMap::default(),
        }
    }

    /// Set a physical qubit's single-qubit gate error rate.
    pub fn with_gate_error(mut self, qubit: u32, error: f64) -> Self {
        self.gate_error.insert(qubit, error);
        self
    }

    /// Set an edge's two-qubit gate error rate.
    pub fn with_two_qubit_error(mut self, q1: u32, q2: u32, error: f64) -> Self {
        self.two_qubit_error.insert((q1, q2), error);
        self
    }

    /// Set a physical qubit's readout error rate.
    pub fn with_readout_error(mut self, qubit: u32, error: f64) -> Self {
        self.readout_error.insert(qubit, error);
        self
    }

    fn gate_error_of(&self, qubit: u32) -> f64 {
        self.gate_error.get(&qubit).copied().unwrap_or(0.0)
    }

    fn readout_error_of(&self, qubit: u32) -> f64 {
        self.readout_error.get(&qubit).copied().unwrap_or(0.0)
    }

    fn two_qubit_error_of(&self, q1: u32, q2: u32) -> f64 {
        self.two_qubit_error
            .get(&(q1, q2))
            .or_else(|| self.two_qubit_error.get(&(q2, q1)))
            .copied()
            .unwrap_or(0.0)
    }

    /// Composite placement cost of assigning logical qubits (in order) to
    /// the given physical qubits, counting each physical qubit's gate and
    /// readout error once: `sum log(1 - err(gate)) + sum log(1 - err(readout))`.
    /// Two-qubit edge error is folded in for every coupling-map edge whose
    /// endpoints are both in the candidate assignment.
    fn cost(&self, assignment: &[u32]) -> f64 {
        let mut cost = 0.0;
        for &physical in assignment {
            cost += (1.0 - self.gate_error_of(physical)).max(f64::MIN_POSITIVE).ln();
            cost += (1.0 - self.readout_error_of(physical)).max(f64::MIN_POSITIVE).ln();
        }
        for &(a, b) in self.coupling_map.edges() {
            if assignment.contains(&a) && assignment.contains(&b) {
                cost += (1.0 - self.two_qubit_error_of(a, b)).max(f64::MIN_POSITIVE).ln();
            }
        }
        cost
    }
}

/// Noise-aware layout pass.
///
/// Requires a [`DeviceDescriptor`] to have been inserted into the
/// [`PropertySet`] via [`PropertySet::insert`] (the generic type-erased
/// property bag, not a dedicated field — consistent with how the rest of
/// this pipeline extends `PropertySet`). Falls back to
/// [`CompileError::MissingCouplingMap`] if neither a `DeviceDescriptor`
/// nor a plain coupling map is present.
pub struct NoiseAwareLayout;

impl Pass for NoiseAwareLayout {
    fn name(&self) -> &str {
        "NoiseAwareLayout"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    #[allow(clippy::cast_possible_truncation)]
    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let num_logical = dag.num_qubits();

        let device = properties.get::<DeviceDescriptor>().cloned();
        let coupling_map = device
            .as_ref()
            .map(|d| d.coupling_map.clone())
            .or_else(|| properties.coupling_map.clone())
            .ok_or(CompileError::MissingCouplingMap)?;

        let num_physical = coupling_map.num_qubits() as usize;
        if num_logical > num_physical {
            return Err(CompileError::CircuitTooLarge {
                required: num_logical,
                available: coupling_map.num_qubits(),
            });
        }

        let layout = match device {
            Some(device) => best_assignment(&device, num_logical as u32),
            None => Layout::trivial(num_logical as u32),
        };

        properties.layout = Some(layout);
        properties.coupling_map = Some(coupling_map);
        dag.set_level(CircuitLevel::Physical);

        Ok(())
    }

    fn should_run(&self, _dag: &CircuitDag, properties: &PropertySet) -> bool {
        properties.layout.is_none()
            && (properties.get::<DeviceDescriptor>().is_some() || properties.coupling_map.is_some())
    }
}

/// Tie-break first by total cost (higher is better, since costs are sums
/// of log(1-error) terms which are <= 0), then lexicographically by the
/// physical-qubit assignment tuple.
fn best_assignment(device: &DeviceDescriptor, num_logical: u32) -> Layout {
    let num_physical = device.coupling_map.num_qubits();
    let candidates = physical_permutations(num_physical, num_logical);

    let mut best: Option<(f64, Vec<u32>)> = None;
    for candidate in candidates {
        let cost = device.cost(&candidate);
        let better = match &best {
            None => true,
            Some((best_cost, best_candidate)) => {
                cost > *best_cost || (cost == *best_cost && candidate < *best_candidate)
            }
        };
        if better {
            best = Some((cost, candidate));
        }
    }

    let assignment = best.map(|(_, c)| c).unwrap_or_default();
    let mut layout = Layout::new();
    for (logical, &physical) in assignment.iter().enumerate() {
        layout.add(QubitId(logical as u32), physical);
    }
    layout
}

/// Every ordered selection of `k` distinct physical qubits out of
/// `0..num_physical`, in ascending-tuple order (so the first candidate
/// found at a given cost is the lexicographically smallest, matching the
/// tie-break rule).
///
/// This is an exhaustive enumeration intended for small devices; it is
/// not used on circuits large enough for the factorial blow-up to matter
/// in this codebase's test and demo scale.
fn physical_permutations(num_physical: u32, k: u32) -> Vec<Vec<u32>> {
    if k == 0 {
        return vec![vec![]];
    }
    let mut results = Vec::new();
    let mut current = Vec::with_capacity(k as usize);
    permute(num_physical, k, &mut current, &mut results);
    results
}

fn permute(num_physical: u32, k: u32, current: &mut Vec<u32>, results: &mut Vec<Vec<u32>>) {
    if current.len() as u32 == k {
        results.push(current.clone());
        return;
    }
    for candidate in 0..num_physical {
        if current.contains(&candidate) {
            continue;
        }
        current.push(candidate);
        permute(num_physical, k, current, results);
        current.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arvak_ir::{Circuit, QubitId as IrQubitId};

    #[test]
    fn test_prefers_lower_error_qubits() {
        let mut cm = CouplingMap::linear(3);
        cm.rebuild_caches();
        let device = DeviceDescriptor::new(cm)
            .with_gate_error(0, 0.1)
            .with_gate_error(1, 0.001)
            .with_gate_error(2, 0.2)
            .with_readout_error(0, 0.05)
            .with_readout_error(1, 0.001)
            .with_readout_error(2, 0.05);

        let mut props = PropertySet::new();
        props.insert(device);

        let mut circuit = Circuit::with_size("probe", 1, 0);
        circuit.h(IrQubitId(0)).unwrap();
        let mut dag = circuit.into_dag();

        NoiseAwareLayout.run(&mut dag, &mut props).unwrap();

        let layout = props.layout.as_ref().unwrap();
        assert_eq!(layout.get_physical(IrQubitId(0)), Some(1));
    }

    #[test]
    fn test_missing_device_falls_back_to_trivial() {
        let mut props = PropertySet::new().with_target(
            CouplingMap::linear(2),
            crate::property::BasisGates::universal(),
        );
        let mut circuit = Circuit::with_size("probe", 2, 0);
        circuit.h(IrQubitId(0)).unwrap();
        let mut dag = circuit.into_dag();

        NoiseAwareLayout.run(&mut dag, &mut props).unwrap();
        let layout = props.layout.as_ref().unwrap();
        assert_eq!(layout.get_physical(IrQubitId(0)), Some(0));
        assert_eq!(layout.get_physical(IrQubitId(1)), Some(1));
    }
}
