//! Dense complex matrix helpers shared by the Kraus/Choi/superoperator/chi
//! representations.

use ndarray::Array2;
use num_complex::Complex64;

/// A dense `d x d` complex matrix.
pub type CMatrix = Array2<Complex64>;

/// `d x d` identity matrix.
pub fn identity(d: usize) -> CMatrix {
    CMatrix::from_shape_fn((d, d), |(i, j)| {
        if i == j {
            Complex64::new(1.0, 0.0)
        } else {
            Complex64::new(0.0, 0.0)
        }
    })
}

/// Conjugate transpose.
pub fn dagger(m: &CMatrix) -> CMatrix {
    m.t().mapv(|c| c.conj())
}

/// Matrix product `a * b`.
pub fn matmul(a: &CMatrix, b: &CMatrix) -> CMatrix {
    a.dot(b)
}

/// Kronecker product.
pub fn kron(a: &CMatrix, b: &CMatrix) -> CMatrix {
    let (ra, ca) = a.dim();
    let (rb, cb) = b.dim();
    let mut out = CMatrix::zeros((ra * rb, ca * cb));
    for i in 0..ra {
        for j in 0..ca {
            let block = a[(i, j)];
            for k in 0..rb {
                for l in 0..cb {
                    out[(i * rb + k, j * cb + l)] = block * b[(k, l)];
                }
            }
        }
    }
    out
}

/// Frobenius norm of a matrix, `sqrt(sum |m_ij|^2)`.
pub fn frobenius_norm(m: &CMatrix) -> f64 {
    m.iter().map(|c| c.norm_sqr()).sum::<f64>().sqrt()
}

/// Trace of a square matrix.
pub fn trace(m: &CMatrix) -> Complex64 {
    (0..m.nrows()).map(|i| m[(i, i)]).sum()
}

/// Row-major vectorisation: `vec_row(M)[d*r + c] = M[r, c]`.
///
/// Used for the Choi-matrix construction convention (Open Question (b)):
/// `choi = sum_i vec_row(Ki) (x) vec_row(Ki)^*`.
pub fn vec_row(m: &CMatrix) -> Vec<Complex64> {
    let (d, _) = m.dim();
    let mut out = Vec::with_capacity(d * d);
    for r in 0..d {
        for c in 0..d {
            out.push(m[(r, c)]);
        }
    }
    out
}

/// Inverse of [`vec_row`]: reshape a length-`d^2` vector into a `d x d`
/// matrix, row-major.
pub fn unvec_row(v: &[Complex64], d: usize) -> CMatrix {
    CMatrix::from_shape_fn((d, d), |(r, c)| v[r * d + c])
}

/// Column-major vectorisation: `vec_col(M)[d*c + r] = M[r, c]`.
///
/// Used for the superoperator's `vec(rho)` convention, distinct from
/// [`vec_row`] (Open Question (b)).
pub fn vec_col(m: &CMatrix) -> Vec<Complex64> {
    let (d, _) = m.dim();
    let mut out = Vec::with_capacity(d * d);
    for c in 0..d {
        for r in 0..d {
            out.push(m[(r, c)]);
        }
    }
    out
}

/// Inverse of [`vec_col`].
pub fn unvec_col(v: &[Complex64], d: usize) -> CMatrix {
    CMatrix::from_shape_fn((d, d), |(r, c)| v[c * d + r])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_row_roundtrip() {
        let m = CMatrix::from_shape_fn((2, 2), |(r, c)| Complex64::new((r * 2 + c) as f64, 0.0));
        let v = vec_row(&m);
        let back = unvec_row(&v, 2);
        assert_eq!(m, back);
    }

    #[test]
    fn test_vec_col_roundtrip() {
        let m = CMatrix::from_shape_fn((2, 2), |(r, c)| Complex64::new((r * 2 + c) as f64, 0.0));
        let v = vec_col(&m);
        let back = unvec_col(&v, 2);
        assert_eq!(m, back);
    }

    #[test]
    fn test_kron_identity() {
        let i2 = identity(2);
        let k = kron(&i2, &i2);
        assert_eq!(k, identity(4));
    }
}
