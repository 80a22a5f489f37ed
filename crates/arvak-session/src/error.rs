//! Session-level error taxonomy (spec §7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// Out-of-range option, unknown backend name, or unknown gate in input.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("failed to read source file {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] arvak_qasm3::ParseError),

    #[error(transparent)]
    Ir(#[from] arvak_ir::IrError),

    #[error(transparent)]
    Compile(#[from] arvak_compile::CompileError),

    #[error(transparent)]
    Channel(#[from] arvak_channel::ChannelError),

    /// Covers `BackendUnavailable`, `RemoteTransient`/`RemoteFatal` (already
    /// folded into `HalError` by the adapter's `Backend` impl), and all
    /// other HAL-surfaced failures.
    #[error(transparent)]
    Backend(#[from] arvak_hal::HalError),

    #[error("unknown backend '{0}' in pool")]
    UnknownBackend(String),

    /// Not a failure: the cell completed with fewer than `requested`
    /// shots. Callers test `accumulated == requested` explicitly rather
    /// than treating this variant as fatal.
    #[error("cell ({row}, {col}) partial result: {accumulated}/{requested} shots")]
    PartialResult {
        row: usize,
        col: usize,
        accumulated: u64,
        requested: u64,
    },

    /// SIGINT during HTTP I/O; partial accumulated counts were discarded.
    #[error("cell ({row}, {col}) cancelled")]
    Cancelled { row: usize, col: usize },
}

pub type SessionResult<T> = Result<T, SessionError>;
