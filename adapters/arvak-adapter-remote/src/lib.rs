//! Arvak Adapter for Remote QPU Execution
//!
//! This crate implements the submit/poll protocol for dispatching
//! circuits to a remote hardware backend over HTTP: a gate sequence is
//! lowered to the backend's native XASM dialect, over-requested to
//! tolerate sample dropout, and polled until enough valid shots have
//! accumulated.
//!
//! # Protocol
//!
//! `POST {endpoint}/circuit` submits a circuit and returns a job id;
//! `GET {endpoint}/{post_path}/{id}` polls for results. HTTP 300 and
//! 425 mean "not ready yet"; HTTP 500 is a fatal remote failure. A shot
//! deficit after polling triggers a recursive top-up request, forcing
//! resampling once the accumulated fraction crosses a threshold.
//!
//! # Backend Database
//!
//! Known backends (endpoint, qubit count, shot limits, contrast
//! thresholds) are looked up from a [`RemoteDeviceDb`], loadable from a
//! YAML file or the built-in defaults.
//!
//! # Example
//!
//! ```ignore
//! use arvak_adapter_remote::{RemoteBackend, RemoteDeviceDb};
//! use arvak_hal::Backend;
//! use std::collections::HashMap;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let db = RemoteDeviceDb::built_in();
//!     let backend = RemoteBackend::connect("gen1_canberra", &db, HashMap::new()).await?;
//!
//!     let circuit = arvak_ir::Circuit::bell()?;
//!     let job_id = backend.submit(&circuit, 1000).await?;
//!     let result = backend.wait(&job_id).await?;
//!     println!("{:?}", result.counts);
//!
//!     Ok(())
//! }
//! ```

mod backend;
mod client;
mod device_db;
mod error;
mod protocol;
mod xasm;

pub use backend::RemoteBackend;
pub use device_db::{RemoteDeviceDb, RemoteDeviceEntry};
pub use error::{RemoteError, RemoteResult};
pub use protocol::RemoteConfig;

pub use arvak_hal::Backend;
