//! Error types for the compilation pipeline.

use arvak_ir::IrError;
use thiserror::Error;

/// Errors that can occur while running the pass pipeline.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// A pass required a coupling map in the [`PropertySet`](crate::property::PropertySet)
    /// but none was set.
    #[error("no coupling map set in property set")]
    MissingCouplingMap,

    /// A pass required a basis gate set but none was set.
    #[error("no basis gate set set in property set")]
    MissingBasisGates,

    /// A pass required a layout (produced by an earlier layout pass) but
    /// none was set.
    #[error("no layout set in property set")]
    MissingLayout,

    /// The circuit has more logical qubits than the target device has
    /// physical qubits.
    #[error("circuit requires {required} qubits, device has {available}")]
    CircuitTooLarge {
        /// Logical qubits the circuit needs.
        required: usize,
        /// Physical qubits the device provides.
        available: u32,
    },

    /// Routing could not find a path between two physical qubits under
    /// the current coupling map.
    #[error("no route found between physical qubits {qubit1} and {qubit2}")]
    RoutingFailed {
        /// First physical qubit.
        qubit1: u32,
        /// Second physical qubit.
        qubit2: u32,
    },

    /// A gate has no translation into the target basis gate set.
    #[error("gate '{0}' has no translation into the target basis")]
    GateNotInBasis(String),

    /// A verification pass found that measurement ordering on some wire
    /// was violated by an earlier transformation.
    #[error("measurement ordering violated by '{gate_name}' on qubit {qubit}: {detail}")]
    MeasurementViolation {
        /// Name of the offending gate.
        gate_name: String,
        /// Qubit index on which the violation was observed.
        qubit: u32,
        /// Human-readable description of the violation.
        detail: String,
    },

    /// A pass's validation of circuit structure or parameters failed
    /// outside any of the more specific cases above.
    #[error("validation failed: {0}")]
    ValidationError(String),

    /// A placement pass (layout or noise-aware layout) failed to find any
    /// valid qubit assignment.
    #[error("placement failed: {0}")]
    PlacementError(String),

    /// An underlying IR operation failed.
    #[error(transparent)]
    Ir(#[from] IrError),
}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;
