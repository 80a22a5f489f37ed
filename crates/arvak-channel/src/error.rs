//! Error types for the noise channel algebra crate.

use thiserror::Error;

/// Errors that can occur during channel construction or conversion.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChannelError {
    /// A matrix did not have the expected dimension for the declared qubit
    /// count.
    #[error("matrix has dimension {got}, expected {expected} for {n} qubit(s)")]
    DimensionMismatch {
        /// Number of qubits the channel claims to act on.
        n: u32,
        /// Expected matrix dimension (2^n).
        expected: usize,
        /// Actual matrix dimension.
        got: usize,
    },

    /// A Choi matrix used as input was not (numerically) Hermitian.
    #[error("Choi matrix is not Hermitian: max |M - M^dagger| = {0:e}")]
    NotHermitian(f64),

    /// A Kraus set failed the trace-preserving check outside tolerance.
    #[error("Kraus set is not trace-preserving: |sum Ki^dagger Ki - I| = {0:e}")]
    NotTracePreserving(f64),

    /// A channel factory received a parameter outside its valid domain.
    #[error("invalid channel parameter '{name}' = {value}: {reason}")]
    InvalidParameter {
        /// Name of the out-of-range parameter.
        name: String,
        /// The supplied value.
        value: f64,
        /// Why it is invalid.
        reason: String,
    },

    /// Interpolation was asked to fit with too few sample points for the
    /// requested model (e.g. degree-3 polynomial with 2 points).
    #[error("insufficient sample points for {model}: need at least {need}, got {got}")]
    InsufficientSamples {
        /// Name of the interpolation model.
        model: String,
        /// Minimum number of points the model needs.
        need: usize,
        /// Number of points supplied.
        got: usize,
    },

    /// The Levenberg-Marquardt solver did not converge within the
    /// configured iteration budget.
    #[error("process-matrix solver did not converge after {iterations} iterations (final residual {residual:e})")]
    SolverDidNotConverge {
        /// Iterations actually run.
        iterations: usize,
        /// Final residual norm.
        residual: f64,
    },
}

/// Result type for channel-algebra operations.
pub type ChannelResult<T> = Result<T, ChannelError>;
