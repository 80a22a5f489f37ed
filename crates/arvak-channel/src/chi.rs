//! Process matrix (chi): the Choi matrix expressed in the Pauli basis.

use crate::choi::{pauli_basis_change, ChoiMatrix};
use crate::error::{ChannelError, ChannelResult};
use crate::matrix::{dagger, matmul, CMatrix};

/// A process matrix (chi-matrix) for an `n`-qubit channel, in the Pauli
/// basis ordering used by [`pauli_basis_change`].
#[derive(Debug, Clone)]
pub struct ProcessMatrix {
    n: u32,
    matrix: CMatrix,
}

impl ProcessMatrix {
    pub(crate) fn from_raw(n: u32, matrix: CMatrix) -> Self {
        Self { n, matrix }
    }

    /// Wrap a raw chi matrix, validating its dimension.
    pub fn new(n: u32, matrix: CMatrix) -> ChannelResult<Self> {
        let d = 1usize << n;
        let d2 = d * d;
        if matrix.dim() != (d2, d2) {
            return Err(ChannelError::DimensionMismatch {
                n,
                expected: d2,
                got: matrix.nrows().max(matrix.ncols()),
            });
        }
        Ok(Self { n, matrix })
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.n
    }

    /// The underlying dense matrix, in Pauli-basis order.
    pub fn matrix(&self) -> &CMatrix {
        &self.matrix
    }

    /// `choi_to_process` inverse: `Choi = P^dagger chi P`.
    pub fn to_choi(&self) -> ChoiMatrix {
        let p = pauli_basis_change(self.n);
        let choi = matmul(&matmul(&dagger(&p), &self.matrix), &p);
        ChoiMatrix::from_raw(self.n, choi)
    }

    /// Frobenius distance between two process matrices of equal size, used
    /// as the residual for the Levenberg-Marquardt fit.
    pub fn frobenius_distance(&self, other: &ProcessMatrix) -> f64 {
        let diff = &self.matrix - &other.matrix;
        crate::matrix::frobenius_norm(&diff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choi_process_roundtrip() {
        let choi = ChoiMatrix::identity_channel(1);
        let chi = choi.to_process_matrix();
        let back = chi.to_choi();
        let diff = choi.matrix() - back.matrix();
        assert!(crate::matrix::frobenius_norm(&diff) < 1e-10);
    }
}
