//! Channel factories for the standard noise-model building blocks.

use ndarray::Array2;
use num_complex::Complex64;

use crate::error::{ChannelError, ChannelResult};
use crate::kraus::KrausSet;
use crate::matrix::CMatrix;

fn re(x: f64) -> Complex64 {
    Complex64::new(x, 0.0)
}

fn check_unit_interval(name: &str, value: f64) -> ChannelResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ChannelError::InvalidParameter {
            name: name.to_string(),
            value,
            reason: "must lie in [0, 1]".to_string(),
        });
    }
    Ok(())
}

/// Amplitude damping channel with decay parameter `gamma in [0, 1]`:
/// `K0 = [[1, 0], [0, sqrt(1-gamma)]]`, `K1 = [[0, sqrt(gamma)], [0, 0]]`.
pub fn amplitude_damping(gamma: f64) -> ChannelResult<KrausSet> {
    check_unit_interval("gamma", gamma)?;
    let k0 = Array2::from_shape_vec(
        (2, 2),
        vec![re(1.0), re(0.0), re(0.0), re((1.0 - gamma).sqrt())],
    )
    .unwrap();
    let k1 = Array2::from_shape_vec((2, 2), vec![re(0.0), re(gamma.sqrt()), re(0.0), re(0.0)]).unwrap();
    KrausSet::new(1, vec![k0, k1])
}

/// Phase damping channel with parameter `gamma in [0, 1]`:
/// `K0 = [[1, 0], [0, sqrt(1-gamma)]]`, `K1 = [[0, 0], [0, sqrt(gamma)]]`.
pub fn phase_damping(gamma: f64) -> ChannelResult<KrausSet> {
    check_unit_interval("gamma", gamma)?;
    let k0 = Array2::from_shape_vec(
        (2, 2),
        vec![re(1.0), re(0.0), re(0.0), re((1.0 - gamma).sqrt())],
    )
    .unwrap();
    let k1 = Array2::from_shape_vec((2, 2), vec![re(0.0), re(0.0), re(0.0), re(gamma.sqrt())]).unwrap();
    KrausSet::new(1, vec![k0, k1])
}

/// Generalized amplitude damping: parameterised by the excited-state
/// population `p in [0, 1]` and decay rate `gamma in [0, 1]`. Reduces to
/// [`amplitude_damping`] at `p = 0`.
pub fn generalized_amplitude_damping(p: f64, gamma: f64) -> ChannelResult<KrausSet> {
    check_unit_interval("p", p)?;
    check_unit_interval("gamma", gamma)?;

    let sqrt_p = p.sqrt();
    let sqrt_1mp = (1.0 - p).sqrt();
    let sqrt_1mg = (1.0 - gamma).sqrt();
    let sqrt_g = gamma.sqrt();

    let k0 = Array2::from_shape_vec(
        (2, 2),
        vec![re(sqrt_p), re(0.0), re(0.0), re(sqrt_p * sqrt_1mg)],
    )
    .unwrap();
    let k1 = Array2::from_shape_vec(
        (2, 2),
        vec![re(0.0), re(sqrt_p * sqrt_g), re(0.0), re(0.0)],
    )
    .unwrap();
    let k2 = Array2::from_shape_vec(
        (2, 2),
        vec![re(sqrt_1mp * sqrt_1mg), re(0.0), re(0.0), re(sqrt_1mp)],
    )
    .unwrap();
    let k3 = Array2::from_shape_vec(
        (2, 2),
        vec![re(0.0), re(0.0), re(sqrt_1mp * sqrt_g), re(0.0)],
    )
    .unwrap();

    KrausSet::new(1, vec![k0, k1, k2, k3])
}

fn pauli_x() -> CMatrix {
    Array2::from_shape_vec((2, 2), vec![re(0.0), re(1.0), re(1.0), re(0.0)]).unwrap()
}

fn pauli_y() -> CMatrix {
    let i = Complex64::new(0.0, 1.0);
    Array2::from_shape_vec((2, 2), vec![re(0.0), -i, i, re(0.0)]).unwrap()
}

fn pauli_z() -> CMatrix {
    Array2::from_shape_vec((2, 2), vec![re(1.0), re(0.0), re(0.0), re(-1.0)]).unwrap()
}

fn identity2() -> CMatrix {
    Array2::from_shape_vec((2, 2), vec![re(1.0), re(0.0), re(0.0), re(1.0)]).unwrap()
}

/// Single-qubit symmetric depolarizing channel: mixes `I` with `X, Y, Z`
/// each weighted `p/4`.
pub fn depolarizing_1q(p: f64) -> ChannelResult<KrausSet> {
    check_unit_interval("p", p)?;
    let w_i = (1.0 - p).sqrt();
    let w_pauli = (p / 4.0).sqrt();

    let operators = vec![
        identity2().mapv(|c| c * re(w_i)),
        pauli_x().mapv(|c| c * re(w_pauli)),
        pauli_y().mapv(|c| c * re(w_pauli)),
        pauli_z().mapv(|c| c * re(w_pauli)),
    ];
    KrausSet::new(1, operators)
}

/// Two-qubit symmetric depolarizing channel: mixes the identity with each
/// of the 15 non-identity two-qubit Pauli strings, each weighted `p/16`.
pub fn depolarizing_2q(p: f64) -> ChannelResult<KrausSet> {
    check_unit_interval("p", p)?;
    let w_i = (1.0 - p).sqrt();
    let w_pauli = (p / 16.0).sqrt();

    let singles = [identity2(), pauli_x(), pauli_y(), pauli_z()];
    let mut operators = Vec::with_capacity(16);
    for (a_idx, a) in singles.iter().enumerate() {
        for (b_idx, b) in singles.iter().enumerate() {
            let weight = if a_idx == 0 && b_idx == 0 { w_i } else { w_pauli };
            operators.push(crate::matrix::kron(a, b).mapv(|c| c * re(weight)));
        }
    }

    KrausSet::new(2, operators)
}

/// Wrap user-supplied Kraus matrices as a channel, with optional
/// per-operator probabilities accepted as a hint to state-vector backends
/// (not validated against the operator norms — purely advisory).
pub fn custom_kraus(
    n: u32,
    operators: Vec<CMatrix>,
    probabilities: Option<Vec<f64>>,
) -> ChannelResult<KrausSet> {
    if let Some(probs) = &probabilities {
        if probs.len() != operators.len() {
            return Err(ChannelError::InvalidParameter {
                name: "probabilities".to_string(),
                value: probs.len() as f64,
                reason: format!("length must match operator count {}", operators.len()),
            });
        }
    }
    KrausSet::new(n, operators)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amplitude_damping_is_trace_preserving() {
        let channel = amplitude_damping(0.1).unwrap();
        assert!(channel.trace_preserving_residual() < 1e-10);
    }

    #[test]
    fn test_phase_damping_is_trace_preserving() {
        let channel = phase_damping(0.3).unwrap();
        assert!(channel.trace_preserving_residual() < 1e-10);
    }

    #[test]
    fn test_depolarizing_1q_is_trace_preserving() {
        let channel = depolarizing_1q(0.2).unwrap();
        assert!(channel.trace_preserving_residual() < 1e-8);
    }

    #[test]
    fn test_depolarizing_2q_is_trace_preserving() {
        let channel = depolarizing_2q(0.1).unwrap();
        assert!(channel.trace_preserving_residual() < 1e-8);
    }

    #[test]
    fn test_generalized_amplitude_damping_reduces_to_amplitude_damping_at_p0() {
        let gad = generalized_amplitude_damping(0.0, 0.2).unwrap();
        assert!(gad.trace_preserving_residual() < 1e-10);
    }

    #[test]
    fn test_out_of_range_gamma_rejected() {
        assert!(amplitude_damping(1.5).is_err());
    }

    #[test]
    fn test_custom_kraus_probability_length_mismatch() {
        let ops = vec![identity2()];
        let err = custom_kraus(1, ops, Some(vec![0.5, 0.5]));
        assert!(err.is_err());
    }
}
