//! Session/dispatcher layer: run configurations, a 2-D cell table, a
//! pooled-backend executor, and the post-processing functions applied
//! to raw shot counts.
//!
//! # Overview
//!
//! A [`Session`] owns a 2-D table of [`Cell`]s indexed by
//! `(experiment_row, condition_col)`. Each cell holds a [`RunConfig`]
//! and, once executed, a [`CellResult`]. `Session::run` drives every
//! cell through the seven-step pipeline: validate, resolve source,
//! compile, place/optimise, select a backend, execute, post-process.
//!
//! Backends are borrowed from a fixed pool for the duration of one
//! execution and returned afterwards; see [`Executor`].
//!
//! # Example
//!
//! ```ignore
//! use arvak_session::{RunConfig, Session, Source};
//! use arvak_adapter_sim::SimulatorBackend;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> arvak_session::SessionResult<()> {
//!     let session = Session::new(vec![Arc::new(SimulatorBackend::dense())]);
//!     session.set(0, 0, RunConfig::new(Source::Text(qasm_source()), "dense".into()));
//!     session.run().await?;
//!     Ok(())
//! }
//! # fn qasm_source() -> String { String::new() }
//! ```

mod cell;
mod config;
mod error;
mod executor;
mod fold;
mod postprocess;
mod session;
mod spam;

pub use cell::{Cell, CellResult};
pub use config::{ErrorMitigation, InputFormat, RunConfig, Source};
pub use error::{SessionError, SessionResult};
pub use executor::Executor;
pub use postprocess::{bitstring_to_int, jensen_shannon_divergence, richardson_extrapolate};
pub use session::Session;
pub use spam::SpamMatrix;

pub use arvak_compile::Placement;
