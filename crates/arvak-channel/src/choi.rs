//! Choi-matrix representation and its conversions to/from Kraus and the
//! Pauli-basis process matrix (chi).

use std::sync::{Mutex, OnceLock};

use ndarray::Array2;
use num_complex::Complex64;
use rustc_hash::FxHashMap;

use crate::error::{ChannelError, ChannelResult};
use crate::kraus::KrausSet;
use crate::matrix::{dagger, kron, matmul, trace, unvec_row, CMatrix};

/// Eigenvalues with `|lambda| <= EIGENVALUE_FLOOR` are dropped when building
/// a Kraus set from a Choi matrix.
pub const EIGENVALUE_FLOOR: f64 = 1e-14;

/// Hermiticity residual tolerance for an input Choi matrix.
pub const HERMITIAN_TOLERANCE: f64 = 1e-10;

/// A `d^2 x d^2` Choi matrix for an `n`-qubit channel, indexed
/// lexicographically over `|row><col|` (Open Question (b): row-major
/// `vec_row` convention, fixed for the whole crate).
#[derive(Debug, Clone)]
pub struct ChoiMatrix {
    n: u32,
    matrix: CMatrix,
}

impl ChoiMatrix {
    /// Wrap a raw `d^2 x d^2` matrix without validation — used internally
    /// by conversions that already guarantee the right shape.
    pub(crate) fn from_raw(n: u32, matrix: CMatrix) -> Self {
        Self { n, matrix }
    }

    /// Wrap a raw matrix, validating dimension and (within tolerance)
    /// Hermiticity.
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
        let choi = Self { n, matrix };
        let residual = choi.hermiticity_residual();
        if residual > HERMITIAN_TOLERANCE {
            return Err(ChannelError::NotHermitian(residual));
        }
        Ok(choi)
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.n
    }

    /// Hilbert space dimension `2^n`.
    pub fn dim(&self) -> usize {
        1usize << self.n
    }

    /// The underlying dense matrix.
    pub fn matrix(&self) -> &CMatrix {
        &self.matrix
    }

    /// `|| M - M^dagger ||_F`.
    pub fn hermiticity_residual(&self) -> f64 {
        let diff = &self.matrix - &dagger(&self.matrix);
        crate::matrix::frobenius_norm(&diff)
    }

    /// Identity channel's Choi matrix on `n` qubits.
    pub fn identity_channel(n: u32) -> Self {
        KrausSet::identity_channel(n).to_choi()
    }

    /// `choi_to_kraus`: eigendecompose the (Hermitian, PSD) Choi matrix;
    /// for each eigenvalue `lambda` with `|lambda| > 1e-14`, emit
    /// `sqrt(lambda) * unvec_row(eigenvector)`. Returned in descending
    /// eigenvalue order.
    pub fn to_kraus(&self) -> ChannelResult<KrausSet> {
        let d2 = self.matrix.nrows();
        let d = self.dim();

        let na_matrix = to_nalgebra(&self.matrix);
        let eig = nalgebra::linalg::SymmetricEigen::new(na_matrix);

        let mut pairs: Vec<(f64, Vec<Complex64>)> = (0..d2)
            .map(|col| {
                let lambda = eig.eigenvalues[col];
                let vector: Vec<Complex64> = (0..d2).map(|row| eig.eigenvectors[(row, col)]).collect();
                (lambda, vector)
            })
            .collect();
        pairs.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut operators = Vec::new();
        for (lambda, vector) in pairs {
            if lambda.abs() <= EIGENVALUE_FLOOR {
                continue;
            }
            let scale = Complex64::new(lambda.max(0.0).sqrt(), 0.0);
            let scaled: Vec<Complex64> = vector.iter().map(|c| c * scale).collect();
            operators.push(unvec_row(&scaled, d));
        }
        KrausSet::new(self.n, operators)
    }

    /// Process fidelity against the identity channel:
    /// `F = Tr(Choi_E * Choi_I) / d^2`.
    pub fn process_fidelity_to_identity(&self) -> f64 {
        let id = Self::identity_channel(self.n);
        self.process_fidelity(&id)
    }

    /// `F = Tr(Choi_self * Choi_other) / d^2` for two same-size channels.
    pub fn process_fidelity(&self, other: &ChoiMatrix) -> f64 {
        let product = matmul(&self.matrix, &other.matrix);
        let d = self.dim() as f64;
        (trace(&product).re) / (d * d)
    }

    /// Transform into the Pauli-basis process matrix (chi) via `chi = P
    /// Choi P^dagger`, where `P` is the lexicographic-to-Pauli basis
    /// change (cached thread-locally per qubit count).
    pub fn to_process_matrix(&self) -> crate::chi::ProcessMatrix {
        let p = pauli_basis_change(self.n);
        let chi = matmul(&matmul(&p, &self.matrix), &dagger(&p));
        crate::chi::ProcessMatrix::from_raw(self.n, chi)
    }
}

fn to_nalgebra(m: &CMatrix) -> nalgebra::DMatrix<Complex64> {
    let (r, c) = m.dim();
    nalgebra::DMatrix::from_fn(r, c, |i, j| m[(i, j)])
}

/// Single-qubit Pauli basis `{I, X, Y, Z}` normalised as `sigma / sqrt(2)`
/// so the basis-change matrix `P` is unitary.
fn single_qubit_pauli_basis() -> [CMatrix; 4] {
    let s = std::f64::consts::FRAC_1_SQRT_2;
    let i = Complex64::new(0.0, 1.0);
    let one = Complex64::new(1.0, 0.0);
    let zero = Complex64::new(0.0, 0.0);

    let scale = Complex64::new(s, 0.0);
    let id = Array2::from_shape_vec((2, 2), vec![one, zero, zero, one])
        .unwrap()
        .mapv(|c| c * scale);
    let x = Array2::from_shape_vec((2, 2), vec![zero, one, one, zero])
        .unwrap()
        .mapv(|c| c * scale);
    let y = Array2::from_shape_vec((2, 2), vec![zero, -i, i, zero])
        .unwrap()
        .mapv(|c| c * scale);
    let z = Array2::from_shape_vec((2, 2), vec![one, zero, zero, -one])
        .unwrap()
        .mapv(|c| c * scale);
    [id, x, y, z]
}

/// The lexicographic-basis -> Pauli-basis change matrix `P` for `n`
/// qubits, built once per `n` and cached for the process lifetime.
pub fn pauli_basis_change(n: u32) -> CMatrix {
    static CACHE: OnceLock<Mutex<FxHashMap<u32, CMatrix>>> = OnceLock::new();
    let cache = CACHE.get_or_init(|| Mutex::new(FxHashMap::default()));

    if let Some(p) = cache.lock().unwrap().get(&n) {
        return p.clone();
    }

    let basis = single_qubit_pauli_basis();
    let d = 1usize << n;
    let d2 = d * d;

    // Build P by stacking, for each n-qubit Pauli string, the row-major
    // vectorisation of that string's tensor product as a row of P.
    let mut rows = Vec::with_capacity(d2);
    for idx in 0..d2 {
        let mut pauli = CMatrix::from_shape_fn((1, 1), |_| Complex64::new(1.0, 0.0));
        let mut rem = idx;
        for _ in 0..n {
            let which = rem % 4;
            rem /= 4;
            pauli = kron(&pauli, &basis[which]);
        }
        rows.push(crate::matrix::vec_row(&pauli));
    }

    let mut p = CMatrix::zeros((d2, d2));
    for (row_idx, row) in rows.into_iter().enumerate() {
        for (col_idx, value) in row.into_iter().enumerate() {
            p[(row_idx, col_idx)] = value.conj();
        }
    }

    cache.lock().unwrap().insert(n, p.clone());
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_channel_process_fidelity_is_one() {
        let choi = ChoiMatrix::identity_channel(1);
        let fidelity = choi.process_fidelity_to_identity();
        assert!((fidelity - 1.0).abs() < 1e-8, "fidelity = {fidelity}");
    }

    #[test]
    fn test_identity_choi_is_hermitian() {
        let choi = ChoiMatrix::identity_channel(1);
        assert!(choi.hermiticity_residual() < HERMITIAN_TOLERANCE);
    }

    #[test]
    fn test_choi_to_kraus_recovers_identity() {
        let choi = ChoiMatrix::identity_channel(1);
        let kraus = choi.to_kraus().unwrap();
        assert!(kraus.trace_preserving_residual() < 1e-8);
    }
}
