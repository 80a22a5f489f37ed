//! Lowering of the gate IR to the remote QPU's XASM dialect.
//!
//! Only a small native gate set (`Rx`, `Ry`, `CZ`) is accepted by the
//! remote hardware; every other standard gate is decomposed into a
//! sequence of those three. Measurement instructions are never emitted
//! into the gate sequence — they are stripped out and recorded as
//! `(qubit, classical_bit)` pairs in the order the `Measure` instructions
//! appear in the circuit.

use std::f64::consts::PI;

use arvak_ir::gate::{GateKind, StandardGate};
use arvak_ir::instruction::InstructionKind;
use arvak_ir::Circuit;

use crate::error::{RemoteError, RemoteResult};

/// One native gate applied to a qubit or qubit pair, ready to format as
/// an XASM string.
enum NativeOp {
    Rx(u32, f64),
    Ry(u32, f64),
    Cz(u32, u32),
}

impl NativeOp {
    fn to_xasm(&self) -> String {
        match self {
            NativeOp::Rx(q, theta) => format!("Rx(q[{q}],{theta:.6})"),
            NativeOp::Ry(q, theta) => format!("Ry(q[{q}],{theta:.6})"),
            NativeOp::Cz(c, t) => format!("CZ(q[{c}],q[{t}])"),
        }
    }
}

/// Normalise an angle to `(-pi, pi]`, matching the remote hardware's
/// fixed-point XASM grammar convention.
fn norm(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped <= -PI {
        wrapped + 2.0 * PI
    } else {
        wrapped
    }
}

fn eval_param(p: &arvak_ir::parameter::ParameterExpression) -> RemoteResult<f64> {
    p.as_f64().ok_or_else(|| {
        RemoteError::CircuitError(format!("unbound symbolic parameter in gate: {p:?}"))
    })
}

/// Decompose one standard gate into native `Rx`/`Ry`/`CZ` ops.
fn decompose(gate: &StandardGate, qubits: &[u32]) -> RemoteResult<Vec<NativeOp>> {
    let q0 = qubits[0];
    let ops = match gate {
        StandardGate::I => vec![],
        StandardGate::X => vec![NativeOp::Rx(q0, norm(PI))],
        StandardGate::Y => vec![NativeOp::Ry(q0, norm(PI))],
        StandardGate::Z => vec![NativeOp::Rx(q0, norm(PI)), NativeOp::Ry(q0, norm(PI))],
        StandardGate::H => vec![
            NativeOp::Ry(q0, norm(0.5 * PI)),
            NativeOp::Rx(q0, norm(PI)),
        ],
        StandardGate::S => vec![
            NativeOp::Ry(q0, norm(0.5 * PI)),
            NativeOp::Rx(q0, norm(PI)),
            NativeOp::Rx(q0, norm(0.5 * PI)),
            NativeOp::Ry(q0, norm(0.5 * PI)),
            NativeOp::Rx(q0, norm(PI)),
        ],
        StandardGate::Sdg => vec![
            NativeOp::Ry(q0, norm(0.5 * PI)),
            NativeOp::Rx(q0, norm(PI)),
            NativeOp::Rx(q0, norm(-0.5 * PI)),
            NativeOp::Ry(q0, norm(0.5 * PI)),
            NativeOp::Rx(q0, norm(PI)),
        ],
        StandardGate::T => vec![
            NativeOp::Ry(q0, norm(0.5 * PI)),
            NativeOp::Rx(q0, norm(PI)),
            NativeOp::Rx(q0, norm(0.25 * PI)),
            NativeOp::Ry(q0, norm(0.5 * PI)),
            NativeOp::Rx(q0, norm(PI)),
        ],
        StandardGate::Tdg => vec![
            NativeOp::Ry(q0, norm(0.5 * PI)),
            NativeOp::Rx(q0, norm(PI)),
            NativeOp::Rx(q0, norm(-0.25 * PI)),
            NativeOp::Ry(q0, norm(0.5 * PI)),
            NativeOp::Rx(q0, norm(PI)),
        ],
        StandardGate::Rx(p) => vec![NativeOp::Rx(q0, norm(eval_param(p)?))],
        StandardGate::Ry(p) => vec![NativeOp::Ry(q0, norm(eval_param(p)?))],
        StandardGate::Rz(p) => {
            let theta = norm(eval_param(p)?);
            vec![
                NativeOp::Ry(q0, norm(0.5 * PI)),
                NativeOp::Rx(q0, theta),
                NativeOp::Ry(q0, norm(-0.5 * PI)),
            ]
        }
        StandardGate::U(theta, phi, lambda) => {
            let theta = norm(eval_param(theta)?);
            let phi = norm(eval_param(phi)?);
            let lambda = norm(eval_param(lambda)?);
            let tol = 1e-5;
            if (lambda + phi).abs() < tol && (lambda - 0.5 * PI).abs() < tol {
                vec![NativeOp::Rx(q0, norm(theta))]
            } else {
                let mut ops = vec![];
                if phi != 0.0 || lambda != 0.0 {
                    ops.push(NativeOp::Ry(q0, norm(0.5 * PI)));
                }
                if lambda != 0.0 {
                    ops.push(NativeOp::Rx(q0, lambda));
                }
                if theta != 0.0 {
                    ops.push(NativeOp::Ry(q0, theta));
                }
                if phi != 0.0 {
                    ops.push(NativeOp::Rx(q0, phi));
                }
                if phi != 0.0 || lambda != 0.0 {
                    ops.push(NativeOp::Ry(q0, norm(-0.5 * PI)));
                }
                ops
            }
        }
        StandardGate::CZ => vec![NativeOp::Cz(q0, qubits[1])],
        StandardGate::CX => {
            let t = qubits[1];
            vec![
                NativeOp::Ry(t, norm(0.5 * PI)),
                NativeOp::Rx(t, norm(PI)),
                NativeOp::Cz(q0, t),
                NativeOp::Ry(t, norm(0.5 * PI)),
                NativeOp::Rx(t, norm(PI)),
            ]
        }
        StandardGate::Swap => {
            let (a, b) = (q0, qubits[1]);
            let mut ops = decompose(&StandardGate::CX, &[a, b])?;
            ops.extend(decompose(&StandardGate::CX, &[b, a])?);
            ops.extend(decompose(&StandardGate::CX, &[a, b])?);
            ops
        }
        other => {
            return Err(RemoteError::CircuitError(format!(
                "gate '{}' has no native lowering for this remote backend",
                other.name()
            )))
        }
    };
    Ok(ops)
}

/// Lowered circuit: the native gate sequence plus the measured
/// qubit/classical-bit pairs, in Measure-instruction order.
pub struct LoweredCircuit {
    /// XASM gate strings, in execution order.
    pub gate_sequence: Vec<String>,
    /// `(qubit, classical_bit)` pairs, ordered by the position of the
    /// originating `Measure` instruction.
    pub measure: Vec<(u32, u32)>,
}

/// Lower a circuit's gate sequence to XASM, stripping `Measure`
/// instructions out into a separate ordered list.
pub fn lower(circuit: &Circuit) -> RemoteResult<LoweredCircuit> {
    let mut gate_sequence = Vec::new();
    let mut measure = Vec::new();

    for (_, inst) in circuit.dag().topological_ops() {
        match &inst.kind {
            InstructionKind::Gate(gate) => {
                let qubits: Vec<u32> = inst.qubits.iter().map(|q| q.0).collect();
                let standard = match &gate.kind {
                    GateKind::Standard(g) => g,
                    GateKind::Custom(g) => {
                        return Err(RemoteError::CircuitError(format!(
                            "custom gate '{}' cannot be lowered to XASM",
                            g.name
                        )))
                    }
                };
                for op in decompose(standard, &qubits)? {
                    gate_sequence.push(op.to_xasm());
                }
            }
            InstructionKind::Measure => {
                let qubit = inst.qubits[0].0;
                let clbit = inst.clbits[0].0;
                measure.push((qubit, clbit));
            }
            InstructionKind::Barrier | InstructionKind::Delay { .. } => {
                // No-op on the remote wire format: hardware scheduling is
                // opaque past the submitted gate sequence.
            }
            other => {
                return Err(RemoteError::CircuitError(format!(
                    "instruction {other:?} cannot be lowered to XASM"
                )))
            }
        }
    }

    Ok(LoweredCircuit {
        gate_sequence,
        measure,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arvak_ir::Circuit;

    #[test]
    fn test_lower_bell_strips_measure_into_ordered_pairs() {
        let circuit = Circuit::bell().unwrap();
        let lowered = lower(&circuit).unwrap();

        assert!(lowered
            .gate_sequence
            .iter()
            .any(|g| g.starts_with("CZ(")));
        assert_eq!(lowered.measure, vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn test_lower_x_gate_is_single_rx_pi() {
        let mut circuit = Circuit::with_size("t", 1, 0);
        let q0 = circuit.qubits()[0].id;
        circuit.x(q0).unwrap();
        let lowered = lower(&circuit).unwrap();
        assert_eq!(lowered.gate_sequence, vec!["Rx(q[0],3.141593)"]);
    }

    #[test]
    fn test_norm_wraps_into_pmpi() {
        assert!((norm(3.0 * PI) - PI).abs() < 1e-9);
        assert!((norm(-3.0 * PI) - PI).abs() < 1e-9);
    }

    #[test]
    fn test_custom_gate_rejected() {
        let mut circuit = Circuit::with_size("t", 1, 0);
        let q0 = circuit.qubits()[0].id;
        circuit
            .gate(
                arvak_ir::gate::CustomGate::new("mystery", 1),
                [q0],
            )
            .unwrap();
        assert!(lower(&circuit).is_err());
    }
}
