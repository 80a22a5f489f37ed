//! Gate-folding for Richardson (zero-noise) extrapolation.
//!
//! Folds every gate `G` into `G (G^-1 G)^repeats`, scaling the circuit's
//! effective noise by `2*repeats + 1` while leaving its ideal action
//! unchanged. Used by [`crate::session::Session`] to produce the
//! `{1, 3, 5}`-level sample needed by `richardson_extrapolate`.

use arvak_ir::{Circuit, CircuitDag, Gate, GateKind, Instruction, InstructionKind, StandardGate};

fn inverse_standard_gate(gate: &StandardGate) -> Option<StandardGate> {
    use StandardGate::*;
    Some(match gate {
        I => I,
        X => X,
        Y => Y,
        Z => Z,
        H => H,
        S => Sdg,
        Sdg => S,
        T => Tdg,
        Tdg => T,
        SX => SXdg,
        SXdg => SX,
        Rx(theta) => Rx(-theta.clone()),
        Ry(theta) => Ry(-theta.clone()),
        Rz(theta) => Rz(-theta.clone()),
        P(theta) => P(-theta.clone()),
        U(theta, phi, lambda) => U(-theta.clone(), -lambda.clone(), -phi.clone()),
        CX => CX,
        CY => CY,
        CZ => CZ,
        CH => CH,
        Swap => Swap,
        CRx(theta) => CRx(-theta.clone()),
        CRy(theta) => CRy(-theta.clone()),
        CRz(theta) => CRz(-theta.clone()),
        CP(theta) => CP(-theta.clone()),
        RXX(theta) => RXX(-theta.clone()),
        RYY(theta) => RYY(-theta.clone()),
        RZZ(theta) => RZZ(-theta.clone()),
        CCX => CCX,
        CSwap => CSwap,
        PRX(theta, phi) => PRX(-theta.clone(), phi.clone()),
        // iSWAP's inverse isn't expressible as another `StandardGate`
        // variant; folding bails out rather than approximate it.
        ISwap => return None,
    })
}

fn inverse_gate(gate: &Gate) -> Option<Gate> {
    match &gate.kind {
        GateKind::Standard(standard) => inverse_standard_gate(standard).map(Gate::standard),
        GateKind::Custom(_) => None,
    }
}

/// Fold `source` to the given noise level (`1` returns an unfolded
/// copy). Returns `None` if any gate present has no known inverse —
/// the caller should skip Richardson extrapolation for that circuit
/// rather than fold it incorrectly.
pub fn fold_circuit(source: &Circuit, level: u32) -> Option<Circuit> {
    let repeats = level.saturating_sub(1) / 2;

    let mut dag = CircuitDag::new();
    for qubit in source.qubits() {
        dag.add_qubit(qubit.id);
    }
    for clbit in source.clbits() {
        dag.add_clbit(clbit.id);
    }

    for (_, instruction) in source.dag().topological_ops() {
        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                let inverse = if repeats > 0 { inverse_gate(gate)? } else { gate.clone() };
                dag.apply(instruction.clone()).ok()?;
                for _ in 0..repeats {
                    dag.apply(Instruction::gate(inverse.clone(), instruction.qubits.clone()))
                        .ok()?;
                    dag.apply(instruction.clone()).ok()?;
                }
            }
            _ => {
                dag.apply(instruction.clone()).ok()?;
            }
        }
    }

    Some(Circuit::from_dag(dag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arvak_ir::QubitId;

    #[test]
    fn test_fold_level_one_preserves_gate_count() {
        let mut circuit = Circuit::with_size("test", 1, 0);
        circuit.h(QubitId(0)).unwrap();
        let folded = fold_circuit(&circuit, 1).unwrap();
        assert_eq!(folded.dag().num_ops(), 1);
    }

    #[test]
    fn test_fold_level_three_triples_folded_gate_count() {
        let mut circuit = Circuit::with_size("test", 1, 0);
        circuit.h(QubitId(0)).unwrap();
        circuit.rx(0.3, QubitId(0)).unwrap();
        let folded = fold_circuit(&circuit, 3).unwrap();
        assert_eq!(folded.dag().num_ops(), 6);
    }

    #[test]
    fn test_fold_bails_out_on_iswap() {
        let mut circuit = Circuit::with_size("test", 2, 0);
        circuit.iswap(QubitId(0), QubitId(1)).unwrap();
        assert!(fold_circuit(&circuit, 3).is_none());
    }
}
