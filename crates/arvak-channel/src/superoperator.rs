//! Superoperator representation: a `d^2 x d^2` matrix acting by left
//! multiplication on `vec(rho)` in the column-major convention.

use num_complex::Complex64;

use crate::choi::ChoiMatrix;
use crate::error::{ChannelError, ChannelResult};
use crate::matrix::{unvec_col, vec_col, CMatrix};

/// A superoperator for an `n`-qubit channel.
#[derive(Debug, Clone)]
pub struct Superoperator {
    n: u32,
    matrix: CMatrix,
}

impl Superoperator {
    /// Wrap a raw `d^2 x d^2` matrix, validating its dimension.
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

    /// The underlying dense matrix.
    pub fn matrix(&self) -> &CMatrix {
        &self.matrix
    }

    /// Apply the channel to a density matrix via `vec(rho) -> S vec(rho)`.
    pub fn apply(&self, rho: &CMatrix) -> CMatrix {
        let d = 1usize << self.n;
        let v = vec_col(rho);
        let mut out = vec![Complex64::new(0.0, 0.0); v.len()];
        for (row, out_elem) in out.iter_mut().enumerate() {
            let mut acc = Complex64::new(0.0, 0.0);
            for (col, value) in v.iter().enumerate() {
                acc += self.matrix[(row, col)] * value;
            }
            *out_elem = acc;
        }
        unvec_col(&out, d)
    }

    /// `choi_to_superoperator`: a reshuffle re-indexing
    /// `(i, j, k, l) <-> (i, k, j, l)` over the `d x d x d x d`-indexed
    /// flattening of the Choi matrix. This is the single place the
    /// row-major Choi convention and the column-major superoperator
    /// convention meet (Open Question (b)).
    pub fn from_choi(choi: &ChoiMatrix) -> Self {
        let d = choi.dim();
        let choi_m = choi.matrix();
        let mut sup = CMatrix::zeros((d * d, d * d));
        for i in 0..d {
            for j in 0..d {
                for k in 0..d {
                    for l in 0..d {
                        // Choi is indexed row-major over (row=(i,k), col=(j,l)).
                        let choi_row = i * d + k;
                        let choi_col = j * d + l;
                        // Superoperator is indexed column-major over
                        // (row=(k,i), col=(l,j)) so that S vec_col(rho) reproduces
                        // sum_{i,j} E(|i><j|) rho_{ji}.
                        let sup_row = k * d + i;
                        let sup_col = l * d + j;
                        sup[(sup_row, sup_col)] = choi_m[(choi_row, choi_col)];
                    }
                }
            }
        }
        Self { n: choi.num_qubits(), matrix: sup }
    }

    /// `superoperator_to_choi`: inverse reshuffle of [`Superoperator::from_choi`].
    pub fn to_choi(&self) -> ChoiMatrix {
        let d = 1usize << self.n;
        let mut choi_m = CMatrix::zeros((d * d, d * d));
        for i in 0..d {
            for j in 0..d {
                for k in 0..d {
                    for l in 0..d {
                        let choi_row = i * d + k;
                        let choi_col = j * d + l;
                        let sup_row = k * d + i;
                        let sup_col = l * d + j;
                        choi_m[(choi_row, choi_col)] = self.matrix[(sup_row, sup_col)];
                    }
                }
            }
        }
        ChoiMatrix::new(self.n, choi_m).expect("reshuffle of a valid Choi matrix stays Hermitian")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choi_superoperator_roundtrip() {
        let choi = ChoiMatrix::identity_channel(1);
        let sup = Superoperator::from_choi(&choi);
        let back = sup.to_choi();
        let diff = choi.matrix() - back.matrix();
        assert!(crate::matrix::frobenius_norm(&diff) < 1e-10);
    }
}
