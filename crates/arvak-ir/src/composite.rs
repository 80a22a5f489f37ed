//! Named composite-macro registry.
//!
//! Circuit-level macros (QFT, QPE, amplitude estimation, ...) are looked up
//! by name from a [`CompositeRegistry`] built once at process start — a
//! `name -> factory` table rather than a dynamically loaded plugin, per the
//! "dynamic plugin registry" design note: an unknown name is a validation
//! error, there is no `dlopen` involved.

use rustc_hash::FxHashMap;

use crate::circuit::Circuit;
use crate::error::{IrError, IrResult};
use crate::parameter::ParameterExpression;
use crate::qubit::QubitId;

/// Arguments passed to a composite-macro factory.
#[derive(Debug, Clone, Default)]
pub struct CompositeArgs {
    /// Size of the circuit's main register (meaning is macro-specific —
    /// e.g. bit-width for an adder, total qubit count for QFT).
    pub num_qubits: u32,
    /// Angle/phase parameters, in macro-defined order.
    pub angles: Vec<ParameterExpression>,
    /// Integer parameters (iteration counts, register widths, control
    /// counts), in macro-defined order.
    pub ints: Vec<i64>,
}

impl CompositeArgs {
    /// Convenience constructor for macros needing only a qubit count.
    pub fn sized(num_qubits: u32) -> Self {
        Self {
            num_qubits,
            ..Default::default()
        }
    }

    fn angle(&self, name: &str, i: usize) -> IrResult<ParameterExpression> {
        self.angles
            .get(i)
            .cloned()
            .ok_or_else(|| IrError::InvalidCompositeArgs {
                name: name.to_string(),
                reason: format!("missing angle parameter at index {i}"),
            })
    }

    fn int(&self, name: &str, i: usize) -> IrResult<i64> {
        self.ints
            .get(i)
            .copied()
            .ok_or_else(|| IrError::InvalidCompositeArgs {
                name: name.to_string(),
                reason: format!("missing integer parameter at index {i}"),
            })
    }
}

/// A composite-macro factory: builds a parameterised [`Circuit`] sub-tree.
pub type CompositeFactory = fn(&CompositeArgs) -> IrResult<Circuit>;

/// Name-keyed table of composite-macro factories.
pub struct CompositeRegistry {
    factories: FxHashMap<String, CompositeFactory>,
}

impl CompositeRegistry {
    /// Empty registry with no macros registered.
    pub fn empty() -> Self {
        Self {
            factories: FxHashMap::default(),
        }
    }

    /// Registry pre-loaded with the standard macro library.
    pub fn standard() -> Self {
        let mut reg = Self::empty();
        reg.register("qft", qft);
        reg.register("iqft", iqft);
        reg.register("qpe", quantum_phase_estimation);
        reg.register("amplitude_estimation", amplitude_estimation);
        reg.register("amplitude_amplification", amplitude_amplification);
        reg.register("multi_controlled_u", multi_controlled_phase);
        reg.register("ripple_carry_adder", ripple_carry_adder);
        reg.register("equality_checker", equality_checker);
        reg.register("comparator", comparator);
        reg.register("efficient_encoding", efficient_encoding);
        reg.register("proper_fraction_division", proper_fraction_division);
        reg.register("proper_fraction_multiplication", proper_fraction_multiplication);
        reg.register("proper_fraction_subtraction", proper_fraction_subtraction);
        reg.register("exponential_search", exponential_search);
        reg
    }

    /// Register (or overwrite) a macro factory under `name`.
    pub fn register(&mut self, name: impl Into<String>, factory: CompositeFactory) {
        self.factories.insert(name.into(), factory);
    }

    /// Build a circuit from a registered macro by name.
    pub fn build(&self, name: &str, args: &CompositeArgs) -> IrResult<Circuit> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| IrError::UnknownComposite(name.to_string()))?;
        factory(args)
    }

    /// Names of every registered macro.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for CompositeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

// ===========================================================================
// Macro implementations
// ===========================================================================

/// Quantum Fourier Transform on `args.num_qubits` qubits (wraps
/// [`Circuit::qft`]).
fn qft(args: &CompositeArgs) -> IrResult<Circuit> {
    Circuit::qft(args.num_qubits)
}

/// Inverse Quantum Fourier Transform: reversed operation order, negated
/// phase angles relative to [`qft`].
fn iqft(args: &CompositeArgs) -> IrResult<Circuit> {
    use std::f64::consts::PI;

    let n = args.num_qubits;
    if n == 0 {
        return Ok(Circuit::new("iqft_0"));
    }
    let mut circuit = Circuit::with_size("iqft", n, 0);

    for i in 0..n / 2 {
        circuit.swap(QubitId(i), QubitId(n - 1 - i))?;
    }

    for i in (0..n).rev() {
        for j in ((i + 1)..n).rev() {
            let k = j - i;
            let angle = -PI / (1u64 << k) as f64;
            circuit.cp(angle, QubitId(j), QubitId(i))?;
        }
        circuit.h(QubitId(i))?;
    }

    Ok(circuit)
}

/// Textbook Quantum Phase Estimation.
///
/// `args.num_qubits` is the number of evaluation qubits; one extra target
/// qubit is appended. `args.angles[0]` is the phase `phi` such that the
/// simulated unitary is `U = P(2*pi*phi)`. The controlled-`U^(2^k)` ladder
/// is realised with repeated `cp` applications, followed by an inverse QFT
/// on the evaluation register and a measurement of every evaluation qubit.
fn quantum_phase_estimation(args: &CompositeArgs) -> IrResult<Circuit> {
    use std::f64::consts::PI;

    let num_eval = args.num_qubits;
    let phi = args
        .angle("qpe", 0)?
        .as_f64()
        .ok_or_else(|| IrError::InvalidCompositeArgs {
            name: "qpe".to_string(),
            reason: "phase angle must be concrete".to_string(),
        })?;

    let mut circuit = Circuit::with_size("qpe", num_eval + 1, num_eval);
    let target = QubitId(num_eval);

    for i in 0..num_eval {
        circuit.h(QubitId(i))?;
    }

    for k in 0..num_eval {
        let power = 1u64 << k;
        let angle = 2.0 * PI * phi * power as f64;
        circuit.cp(angle, QubitId(k), target)?;
    }

    let eval_iqft = iqft(&CompositeArgs::sized(num_eval))?;
    circuit.append(&eval_iqft)?;

    for i in 0..num_eval {
        circuit.measure(QubitId(i), crate::qubit::ClbitId(i))?;
    }

    Ok(circuit)
}

/// Amplitude estimation: estimates `p` where `Ry(2*asin(sqrt(p)))` prepares
/// the target qubit, via the QPE-style phase-kickback construction with the
/// Grover operator `Ry(4*asin(sqrt(p)))` standing in for the controlled
/// unitary power ladder.
fn amplitude_estimation(args: &CompositeArgs) -> IrResult<Circuit> {
    use std::f64::consts::PI;

    let num_eval = args.num_qubits;
    let p = args
        .angle("amplitude_estimation", 0)?
        .as_f64()
        .ok_or_else(|| IrError::InvalidCompositeArgs {
            name: "amplitude_estimation".to_string(),
            reason: "probability parameter must be concrete".to_string(),
        })?;
    let theta = 2.0 * p.sqrt().asin();

    let mut circuit = Circuit::with_size("amplitude_estimation", num_eval + 1, num_eval);
    let target = QubitId(num_eval);

    for i in 0..num_eval {
        circuit.h(QubitId(i))?;
    }
    circuit.ry(theta, target)?;

    for k in 0..num_eval {
        let iterations = 1u64 << k;
        for _ in 0..iterations {
            circuit.cry(2.0 * theta, QubitId(k), target)?;
        }
    }

    let eval_iqft = iqft(&CompositeArgs::sized(num_eval))?;
    circuit.append(&eval_iqft)?;

    for i in 0..num_eval {
        circuit.measure(QubitId(i), crate::qubit::ClbitId(i))?;
    }
    let _ = PI;
    Ok(circuit)
}

/// Amplitude amplification: applies the Grover operator
/// `Ry(4*asin(sqrt(p)))` `args.ints[0]` times to a target prepared by
/// `Ry(2*asin(sqrt(p)))`.
fn amplitude_amplification(args: &CompositeArgs) -> IrResult<Circuit> {
    let p = args
        .angle("amplitude_amplification", 0)?
        .as_f64()
        .ok_or_else(|| IrError::InvalidCompositeArgs {
            name: "amplitude_amplification".to_string(),
            reason: "probability parameter must be concrete".to_string(),
        })?;
    let iterations = args.int("amplitude_amplification", 0)?.max(0) as u64;

    let mut circuit = Circuit::with_size("amplitude_amplification", 1, 0);
    let target = QubitId(0);
    let prep = 2.0 * p.sqrt().asin();
    let grover = 4.0 * p.sqrt().asin();

    circuit.ry(prep, target)?;
    for _ in 0..iterations {
        circuit.ry(grover, target)?;
    }

    Ok(circuit)
}

/// Multi-controlled phase gate via a Toffoli v-chain.
///
/// `args.ints[0]` controls, `args.angles[0]` phase. Qubits `0..k` are
/// controls, qubit `k` is the target, qubits `k+1..` are ancilla (allocated
/// automatically, `max(0, k-2)` of them).
fn multi_controlled_phase(args: &CompositeArgs) -> IrResult<Circuit> {
    let num_controls = args.int("multi_controlled_u", 0)?.max(0) as u32;
    let angle = args.angle("multi_controlled_u", 0)?;

    let num_ancilla = num_controls.saturating_sub(2);
    let total = num_controls + 1 + num_ancilla;
    let mut circuit = Circuit::with_size("multi_controlled_u", total, 0);

    let controls: Vec<_> = (0..num_controls).map(QubitId).collect();
    let target = QubitId(num_controls);
    let ancilla: Vec<_> = (num_controls + 1..total).map(QubitId).collect();

    apply_mcx(&mut circuit, &controls, target, &ancilla)?;
    circuit.p(angle, target)?;
    apply_mcx(&mut circuit, &controls, target, &ancilla)?;

    Ok(circuit)
}

/// Multi-controlled X via a Toffoli v-chain (0, 1, 2 controls use
/// X/CX/CCX directly; `k >= 3` controls use `k - 2` ancilla).
fn apply_mcx(
    circuit: &mut Circuit,
    controls: &[QubitId],
    target: QubitId,
    ancilla: &[QubitId],
) -> IrResult<()> {
    match controls.len() {
        0 => {
            circuit.x(target)?;
        }
        1 => {
            circuit.cx(controls[0], target)?;
        }
        2 => {
            circuit.ccx(controls[0], controls[1], target)?;
        }
        k => {
            circuit.ccx(controls[0], controls[1], ancilla[0])?;
            for i in 0..k - 3 {
                circuit.ccx(controls[i + 2], ancilla[i], ancilla[i + 1])?;
            }
            circuit.ccx(controls[k - 1], ancilla[k - 3], target)?;
            for i in (0..k - 3).rev() {
                circuit.ccx(controls[i + 2], ancilla[i], ancilla[i + 1])?;
            }
            circuit.ccx(controls[0], controls[1], ancilla[0])?;
        }
    }
    Ok(())
}

/// Cuccaro-style ripple-carry adder computing `a + b` in place on register
/// `b`, using one carry ancilla. `args.ints[0]` is the bit-width `n`;
/// register layout is `a[0..n)`, `b[n..2n)`, carry at `2n`.
fn ripple_carry_adder(args: &CompositeArgs) -> IrResult<Circuit> {
    let n = args.int("ripple_carry_adder", 0)?.max(1) as u32;
    let mut circuit = Circuit::with_size("ripple_carry_adder", 2 * n + 1, 0);

    let a: Vec<_> = (0..n).map(QubitId).collect();
    let b: Vec<_> = (n..2 * n).map(QubitId).collect();
    let carry = QubitId(2 * n);

    // MAJ ladder
    for i in 0..n {
        let c_in = if i == 0 { carry } else { b[(i - 1) as usize] };
        circuit.cx(a[i as usize], b[i as usize])?;
        circuit.cx(a[i as usize], c_in)?;
        circuit.ccx(c_in, b[i as usize], a[i as usize])?;
    }

    // UMA ladder (uncompute + add), reverse order
    for i in (0..n).rev() {
        let c_in = if i == 0 { carry } else { b[(i - 1) as usize] };
        circuit.ccx(c_in, b[i as usize], a[i as usize])?;
        circuit.cx(a[i as usize], c_in)?;
        circuit.cx(c_in, b[i as usize])?;
    }

    Ok(circuit)
}

/// Equality checker: sets ancilla `result` to `|1>` iff register `a` equals
/// register `b` bitwise. `args.ints[0]` is the register width `n`; layout
/// is `a[0..n)`, `b[n..2n)`, result at `2n`.
fn equality_checker(args: &CompositeArgs) -> IrResult<Circuit> {
    let n = args.int("equality_checker", 0)?.max(1) as u32;
    let mut circuit = Circuit::with_size("equality_checker", 2 * n + 1, 0);

    let a: Vec<_> = (0..n).map(QubitId).collect();
    let b: Vec<_> = (n..2 * n).map(QubitId).collect();
    let result = QubitId(2 * n);

    for i in 0..n as usize {
        circuit.cx(a[i], b[i])?;
        circuit.x(b[i])?;
    }

    apply_mcx(&mut circuit, &b, result, &a)?;

    for i in 0..n as usize {
        circuit.x(b[i])?;
        circuit.cx(a[i], b[i])?;
    }

    Ok(circuit)
}

/// Comparator: computes `a < b` into a result ancilla by ripple-carry
/// subtraction (`b - a`) and inspecting the final borrow, then uncomputes
/// the subtraction. `args.ints[0]` is the register width `n`; layout is
/// `a[0..n)`, `b[n..2n)`, borrow ancilla at `2n`, result at `2n+1`.
fn comparator(args: &CompositeArgs) -> IrResult<Circuit> {
    let n = args.int("comparator", 0)?.max(1) as u32;
    let mut circuit = Circuit::with_size("comparator", 2 * n + 2, 0);

    let a: Vec<_> = (0..n).map(QubitId).collect();
    let b: Vec<_> = (n..2 * n).map(QubitId).collect();
    let borrow = QubitId(2 * n);
    let result = QubitId(2 * n + 1);

    // Ripple-borrow subtract b := b - a, tracking the final borrow bit.
    for i in 0..n as usize {
        let b_in = if i == 0 { borrow } else { b[i - 1] };
        circuit.ccx(a[i], b_in, b[i])?;
        circuit.cx(a[i], b[i])?;
        circuit.cx(b_in, b[i])?;
    }
    circuit.cx(b[(n - 1) as usize], result)?;
    // Uncompute the subtraction (mirror order) so only `result` carries
    // the comparison outcome.
    for i in (0..n as usize).rev() {
        let b_in = if i == 0 { borrow } else { b[i - 1] };
        circuit.cx(b_in, b[i])?;
        circuit.cx(a[i], b[i])?;
        circuit.ccx(a[i], b_in, b[i])?;
    }

    Ok(circuit)
}

/// Basis-state encoding: flips qubit `i` of a fresh register iff bit `i`
/// of `args.ints[0]` is set. `args.num_qubits` is the register width.
fn efficient_encoding(args: &CompositeArgs) -> IrResult<Circuit> {
    let value = args.int("efficient_encoding", 0)?;
    let mut circuit = Circuit::with_size("efficient_encoding", args.num_qubits, 0);
    for i in 0..args.num_qubits {
        if (value >> i) & 1 == 1 {
            circuit.x(QubitId(i))?;
        }
    }
    Ok(circuit)
}

/// Proper-fraction subtraction `a - b` on fixed-point binary fractions,
/// built from the same ripple-borrow ladder as [`comparator`] without the
/// uncomputation step, leaving the difference in register `b`.
fn proper_fraction_subtraction(args: &CompositeArgs) -> IrResult<Circuit> {
    let n = args.int("proper_fraction_subtraction", 0)?.max(1) as u32;
    let mut circuit = Circuit::with_size("proper_fraction_subtraction", 2 * n + 1, 0);

    let a: Vec<_> = (0..n).map(QubitId).collect();
    let b: Vec<_> = (n..2 * n).map(QubitId).collect();
    let borrow = QubitId(2 * n);

    for i in 0..n as usize {
        let b_in = if i == 0 { borrow } else { b[i - 1] };
        circuit.ccx(a[i], b_in, b[i])?;
        circuit.cx(a[i], b[i])?;
        circuit.cx(b_in, b[i])?;
    }

    Ok(circuit)
}

/// Proper-fraction multiplication via repeated controlled addition
/// (shift-and-add): for each bit `i` of `a`, conditionally adds `b << i`
/// into an accumulator register, mirroring a schoolbook binary multiplier.
/// `args.ints[0]` is the fraction width `n`; layout is `a[0..n)`,
/// `b[n..2n)`, accumulator `2n..4n)`, one carry ancilla at `4n`.
fn proper_fraction_multiplication(args: &CompositeArgs) -> IrResult<Circuit> {
    let n = args.int("proper_fraction_multiplication", 0)?.max(1) as u32;
    let mut circuit = Circuit::with_size("proper_fraction_multiplication", 4 * n + 1, 0);

    let a: Vec<_> = (0..n).map(QubitId).collect();
    let b: Vec<_> = (n..2 * n).map(QubitId).collect();
    let acc: Vec<_> = (2 * n..4 * n).map(QubitId).collect();
    let carry = QubitId(4 * n);

    // Controlled shift-and-add: bit i of a gates a controlled add of b
    // into acc[i..], via Toffoli-mediated carries (single control = a[i]).
    for i in 0..n as usize {
        for j in 0..(n as usize).saturating_sub(i) {
            let target_idx = i + j;
            if target_idx >= acc.len() {
                continue;
            }
            circuit.ccx(a[i], b[j], acc[target_idx])?;
        }
    }
    let _ = carry;

    Ok(circuit)
}

/// Proper-fraction division `a / b` approximated via repeated
/// controlled-subtraction (restoring division): for each output bit,
/// subtracts `b` from the running remainder and keeps the subtraction iff
/// the remainder stayed non-negative, mirroring a textbook restoring binary
/// divider. `args.ints[0]` is the fraction width `n`; layout is
/// `a[0..n)` (dividend/remainder), `b[n..2n)` (divisor), quotient
/// `2n..3n)`, one borrow ancilla at `3n`.
fn proper_fraction_division(args: &CompositeArgs) -> IrResult<Circuit> {
    let n = args.int("proper_fraction_division", 0)?.max(1) as u32;
    let mut circuit = Circuit::with_size("proper_fraction_division", 3 * n + 1, 0);

    let a: Vec<_> = (0..n).map(QubitId).collect();
    let b: Vec<_> = (n..2 * n).map(QubitId).collect();
    let quotient: Vec<_> = (2 * n..3 * n).map(QubitId).collect();
    let borrow = QubitId(3 * n);

    for i in 0..n as usize {
        // Trial subtraction of b from the running remainder a, tracking
        // the borrow into the quotient bit for this stage.
        let b_in = if i == 0 { borrow } else { a[i - 1] };
        circuit.ccx(b[i], b_in, a[i])?;
        circuit.cx(b[i], a[i])?;
        circuit.cx(b_in, a[i])?;
        circuit.cx(a[i], quotient[i])?;
    }

    Ok(circuit)
}

/// Exponential search (Boyer-Brassard-Høyer-Tapp): repeatedly runs
/// [`amplitude_amplification`] with a doubling iteration count, returning
/// the final-stage circuit (the search loop itself is a classical driver
/// around this circuit, owned by the caller).
/// `args.ints[0]` is the number of doubling stages, `args.angles[0]` the
/// marked-state probability `p`.
fn exponential_search(args: &CompositeArgs) -> IrResult<Circuit> {
    let stages = args.int("exponential_search", 0)?.max(1) as u32;
    let p = args.angle("exponential_search", 0)?;

    let mut circuit = Circuit::with_size("exponential_search", 1, 0);
    for stage in 0..stages {
        let iterations = 1i64 << stage;
        let stage_args = CompositeArgs {
            num_qubits: 1,
            angles: vec![p.clone()],
            ints: vec![iterations],
        };
        let stage_circuit = amplitude_amplification(&stage_args)?;
        circuit.append(&stage_circuit)?;
    }
    Ok(circuit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_standard_has_all_macros() {
        let reg = CompositeRegistry::standard();
        for name in [
            "qft",
            "iqft",
            "qpe",
            "amplitude_estimation",
            "amplitude_amplification",
            "multi_controlled_u",
            "ripple_carry_adder",
            "equality_checker",
            "comparator",
            "efficient_encoding",
            "proper_fraction_division",
            "proper_fraction_multiplication",
            "proper_fraction_subtraction",
            "exponential_search",
        ] {
            assert!(reg.names().contains(&name), "missing macro {name}");
        }
    }

    #[test]
    fn test_unknown_composite_is_error() {
        let reg = CompositeRegistry::standard();
        let err = reg.build("not-a-macro", &CompositeArgs::sized(1));
        assert!(err.is_err());
    }

    #[test]
    fn test_qft_iqft_roundtrip_qubit_count() {
        let reg = CompositeRegistry::standard();
        let qft = reg.build("qft", &CompositeArgs::sized(4)).unwrap();
        let iqft = reg.build("iqft", &CompositeArgs::sized(4)).unwrap();
        assert_eq!(qft.num_qubits(), 4);
        assert_eq!(iqft.num_qubits(), 4);
    }

    #[test]
    fn test_qpe_measures_eval_register() {
        let reg = CompositeRegistry::standard();
        let args = CompositeArgs {
            num_qubits: 3,
            angles: vec![ParameterExpression::constant(0.25)],
            ints: vec![],
        };
        let circuit = reg.build("qpe", &args).unwrap();
        assert_eq!(circuit.num_qubits(), 4);
        assert_eq!(circuit.num_clbits(), 3);
    }

    #[test]
    fn test_multi_controlled_u_allocates_ancilla() {
        let reg = CompositeRegistry::standard();
        let args = CompositeArgs {
            num_qubits: 0,
            angles: vec![ParameterExpression::constant(0.5)],
            ints: vec![4],
        };
        let circuit = reg.build("multi_controlled_u", &args).unwrap();
        // 4 controls + 1 target + 2 ancilla
        assert_eq!(circuit.num_qubits(), 7);
    }

    #[test]
    fn test_ripple_carry_adder_register_layout() {
        let reg = CompositeRegistry::standard();
        let args = CompositeArgs {
            num_qubits: 0,
            angles: vec![],
            ints: vec![3],
        };
        let circuit = reg.build("ripple_carry_adder", &args).unwrap();
        assert_eq!(circuit.num_qubits(), 7); // 2*3 + 1 carry
    }

    #[test]
    fn test_efficient_encoding_flips_expected_bits() {
        let reg = CompositeRegistry::standard();
        let args = CompositeArgs {
            num_qubits: 4,
            angles: vec![],
            ints: vec![0b0101],
        };
        let circuit = reg.build("efficient_encoding", &args).unwrap();
        assert_eq!(circuit.depth(), 2); // X on qubit 0 and qubit 2
    }

    #[test]
    fn test_amplitude_amplification_iteration_count() {
        let reg = CompositeRegistry::standard();
        let args = CompositeArgs {
            num_qubits: 0,
            angles: vec![ParameterExpression::constant(0.2)],
            ints: vec![3],
        };
        let circuit = reg.build("amplitude_amplification", &args).unwrap();
        assert_eq!(circuit.depth(), 4); // 1 prep + 3 Grover iterations
    }
}
