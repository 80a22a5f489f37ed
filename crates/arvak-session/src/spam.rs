//! Readout confusion matrix for SPAM-based error mitigation (spec §4.7).
//!
//! Grounded on `SPAMBenchmark`'s state-preparation-and-measurement
//! workflow: prepare each of the `2^n` computational basis states by
//! bit-flipping the corresponding qubits, measure, and assemble a
//! confusion matrix from the resulting count tables.

use std::sync::Arc;

use arvak_hal::{Backend, Counts};
use arvak_ir::{Circuit, QubitId};
use nalgebra::DMatrix;

use crate::error::{SessionError, SessionResult};

/// Confusion matrix `M` with `M[i][j] = P(measured i | prepared j)`,
/// built from a `2^n`-circuit SPAM benchmark.
#[derive(Debug, Clone)]
pub struct SpamMatrix {
    num_qubits: u32,
    matrix: DMatrix<f64>,
}

impl SpamMatrix {
    /// Build the confusion matrix from one [`Counts`] table per prepared
    /// basis state, ordered `0..2^num_qubits` (`counts[j]` is the result
    /// of preparing and measuring basis state `j`).
    pub fn from_counts(num_qubits: u32, counts: &[Counts]) -> SessionResult<Self> {
        let dim = 1usize << num_qubits;
        if counts.len() != dim {
            return Err(SessionError::Validation(format!(
                "SPAM benchmark needs {dim} basis-state count tables, got {}",
                counts.len()
            )));
        }

        let mut matrix = DMatrix::<f64>::zeros(dim, dim);
        for (prepared, table) in counts.iter().enumerate() {
            let total = table.total_shots() as f64;
            if total == 0.0 {
                continue;
            }
            for measured in 0..dim {
                let bitstring = format!("{measured:0width$b}", width = num_qubits as usize);
                matrix[(measured, prepared)] = table.get(&bitstring) as f64 / total;
            }
        }

        Ok(Self { num_qubits, matrix })
    }

    /// Run the `2^n`-circuit SPAM benchmark against `backend`: prepare
    /// each basis state by flipping the corresponding qubits with `X`
    /// gates, measure all qubits, and assemble the confusion matrix.
    pub async fn estimate(
        backend: &Arc<dyn Backend>,
        num_qubits: u32,
        shots: u32,
    ) -> SessionResult<Self> {
        let dim = 1usize << num_qubits;
        let mut tables = Vec::with_capacity(dim);

        for prepared in 0..dim {
            let mut circuit = Circuit::with_size(format!("spam_{prepared}"), num_qubits, num_qubits);
            for qubit in 0..num_qubits {
                if (prepared >> qubit) & 1 == 1 {
                    circuit.x(QubitId(qubit))?;
                }
            }
            circuit.measure_all()?;

            let job_id = backend.submit(&circuit, shots).await?;
            let result = backend.wait(&job_id).await?;
            tables.push(result.counts);
        }

        Self::from_counts(num_qubits, &tables)
    }

    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Mitigate a measured probability vector `q` (indexed by integer
    /// bitstring value): `mitigated = clip(M^-1 . q, 0)`, renormalised.
    pub fn mitigate(&self, q: &[f64]) -> SessionResult<Vec<f64>> {
        let dim = self.matrix.nrows();
        if q.len() != dim {
            return Err(SessionError::Validation(format!(
                "probability vector has length {}, expected {dim}",
                q.len()
            )));
        }

        let inverse = self.matrix.clone().try_inverse().ok_or_else(|| {
            SessionError::Validation("SPAM confusion matrix is singular".into())
        })?;
        let q_vec = nalgebra::DVector::from_row_slice(q);
        let raw = inverse * q_vec;

        let clipped: Vec<f64> = raw.iter().map(|v| v.max(0.0)).collect();
        let sum: f64 = clipped.iter().sum();
        if sum <= 0.0 {
            return Ok(vec![0.0; dim]);
        }
        Ok(clipped.iter().map(|v| v / sum).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn counts_from(pairs: &[(&str, u64)]) -> Counts {
        let mut raw = HashMap::new();
        for (bitstring, count) in pairs {
            raw.insert((*bitstring).to_string(), *count);
        }
        Counts::from_raw(raw)
    }

    #[test]
    fn test_from_counts_identity_for_perfect_readout() {
        // Perfect single-qubit readout: |0> always reads 0, |1> always reads 1.
        let counts = vec![
            counts_from(&[("0", 1000)]),
            counts_from(&[("1", 1000)]),
        ];
        let spam = SpamMatrix::from_counts(1, &counts).unwrap();
        let mitigated = spam.mitigate(&[0.6, 0.4]).unwrap();
        assert!((mitigated[0] - 0.6).abs() < 1e-9);
        assert!((mitigated[1] - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_mitigate_corrects_symmetric_bit_flip_error() {
        // 10% symmetric bit-flip readout error on a single qubit.
        let counts = vec![
            counts_from(&[("0", 900), ("1", 100)]),
            counts_from(&[("0", 100), ("1", 900)]),
        ];
        let spam = SpamMatrix::from_counts(1, &counts).unwrap();
        // Measured q reflects the same 10% flip applied to a true p=[0.5,0.5].
        let mitigated = spam.mitigate(&[0.5, 0.5]).unwrap();
        assert!((mitigated[0] - 0.5).abs() < 1e-6);
        assert!((mitigated[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_from_counts_wrong_table_count_is_rejected() {
        let counts = vec![counts_from(&[("0", 10)])];
        assert!(SpamMatrix::from_counts(1, &counts).is_err());
    }
}
