//! Kraus-operator representation of a quantum channel.

use num_complex::Complex64;

use crate::error::{ChannelError, ChannelResult};
use crate::matrix::{dagger, identity, matmul, vec_row, CMatrix};

/// Trace-preservation residual tolerance, per the testable property
/// `sum Ki^dagger Ki = I within 1e-10`.
pub const TRACE_PRESERVING_TOLERANCE: f64 = 1e-10;

/// An ordered set of Kraus operators `{Ki}` for an `n`-qubit channel.
#[derive(Debug, Clone)]
pub struct KrausSet {
    n: u32,
    operators: Vec<CMatrix>,
}

impl KrausSet {
    /// Build a Kraus set from explicit operators, checking every matrix has
    /// dimension `2^n x 2^n`.
    pub fn new(n: u32, operators: Vec<CMatrix>) -> ChannelResult<Self> {
        let d = 1usize << n;
        for op in &operators {
            if op.dim() != (d, d) {
                return Err(ChannelError::DimensionMismatch {
                    n,
                    expected: d,
                    got: op.nrows().max(op.ncols()),
                });
            }
        }
        Ok(Self { n, operators })
    }

    /// Number of qubits this channel acts on.
    pub fn num_qubits(&self) -> u32 {
        self.n
    }

    /// Hilbert space dimension `2^n`.
    pub fn dim(&self) -> usize {
        1usize << self.n
    }

    /// The Kraus operators, in order.
    pub fn operators(&self) -> &[CMatrix] {
        &self.operators
    }

    /// Residual `|| sum Ki^dagger Ki - I ||_F` measuring how far this set
    /// is from trace-preserving.
    pub fn trace_preserving_residual(&self) -> f64 {
        let d = self.dim();
        let mut sum = CMatrix::zeros((d, d));
        for k in &self.operators {
            sum = sum + matmul(&dagger(k), k);
        }
        let diff = sum - identity(d);
        crate::matrix::frobenius_norm(&diff)
    }

    /// Assert this Kraus set is trace-preserving within
    /// [`TRACE_PRESERVING_TOLERANCE`].
    pub fn check_trace_preserving(&self) -> ChannelResult<()> {
        let residual = self.trace_preserving_residual();
        if residual > TRACE_PRESERVING_TOLERANCE {
            return Err(ChannelError::NotTracePreserving(residual));
        }
        Ok(())
    }

    /// Apply the channel to a density matrix: `rho -> sum Ki rho Ki^dagger`.
    pub fn apply(&self, rho: &CMatrix) -> CMatrix {
        let d = self.dim();
        let mut out = CMatrix::zeros((d, d));
        for k in &self.operators {
            out = out + matmul(&matmul(k, rho), &dagger(k));
        }
        out
    }

    /// `kraus_to_choi`: `choi = sum_i vec_row(Ki) (x) vec_row(Ki)^*`, the
    /// row-major convention fixed for this implementation (see
    /// `choi_to_superoperator` for the convention boundary).
    pub fn to_choi(&self) -> crate::choi::ChoiMatrix {
        let d = self.dim();
        let d2 = d * d;
        let mut choi = CMatrix::zeros((d2, d2));
        for k in &self.operators {
            let v = vec_row(k);
            for a in 0..d2 {
                for b in 0..d2 {
                    choi[(a, b)] += v[a] * v[b].conj();
                }
            }
        }
        crate::choi::ChoiMatrix::from_raw(self.n, choi)
    }

    /// Tensor product of two independent channels: every Kraus operator of
    /// `self` combined with every Kraus operator of `other` via Kronecker
    /// product, acting on `self.num_qubits() + other.num_qubits()` qubits.
    pub fn tensor(&self, other: &KrausSet) -> KrausSet {
        let mut operators = Vec::with_capacity(self.operators.len() * other.operators.len());
        for a in &self.operators {
            for b in &other.operators {
                operators.push(crate::matrix::kron(a, b));
            }
        }
        KrausSet {
            n: self.n + other.n,
            operators,
        }
    }

    /// The identity channel on `n` qubits (single Kraus operator `I`).
    pub fn identity_channel(n: u32) -> Self {
        let d = 1usize << n;
        Self {
            n,
            operators: vec![identity(d)],
        }
    }
}

/// `Complex64` zero shorthand, used when building custom Kraus sets inline.
pub fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_trace_preserving() {
        let id = KrausSet::identity_channel(1);
        assert!(id.trace_preserving_residual() < TRACE_PRESERVING_TOLERANCE);
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let bad = CMatrix::zeros((3, 3));
        let err = KrausSet::new(1, vec![bad]);
        assert!(err.is_err());
    }
}
