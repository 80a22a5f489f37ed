//! A fixed pool of backend instances shared across cells (spec §4.6,
//! §4.6a, §5).
//!
//! Acquire/release is the only operation the pool's mutex guards;
//! `get_next_available` polls every 100ms rather than using a condvar
//! — explicitly prototype-grade.

use std::sync::Arc;
use std::time::Duration;

use arvak_hal::Backend;
use tokio::sync::Mutex;

use crate::error::{SessionError, SessionResult};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Owns the backend instances and the free-index list guarding them.
pub struct Executor {
    backends: Vec<Arc<dyn Backend>>,
    free: Mutex<Vec<usize>>,
}

impl Executor {
    /// Build a pool from a fixed set of backend instances, all
    /// initially available.
    pub fn new(backends: Vec<Arc<dyn Backend>>) -> Self {
        let free = (0..backends.len()).collect();
        Self {
            backends,
            free: Mutex::new(free),
        }
    }

    /// All backends in the pool, regardless of availability.
    pub fn backends(&self) -> &[Arc<dyn Backend>] {
        &self.backends
    }

    /// Acquire a backend by name, blocking (100ms poll) until one with
    /// a free slot is available. Errors immediately if no pool member
    /// has that name — an unknown backend name is a validation error,
    /// not something more instances could fix.
    pub async fn get_next_available(&self, name: &str) -> SessionResult<(usize, Arc<dyn Backend>)> {
        if !self.backends.iter().any(|b| b.name() == name) {
            return Err(SessionError::UnknownBackend(name.to_string()));
        }

        loop {
            {
                let mut free = self.free.lock().await;
                if let Some(position) = free
                    .iter()
                    .position(|&index| self.backends[index].name() == name)
                {
                    let index = free.remove(position);
                    return Ok((index, Arc::clone(&self.backends[index])));
                }
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Return a backend to the pool.
    pub async fn release(&self, index: usize) {
        let mut free = self.free.lock().await;
        free.push(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arvak_hal::{
        BackendAvailability, ExecutionResult, HalResult, JobId, JobStatus, ValidationResult,
    };
    use arvak_ir::Circuit;
    use async_trait::async_trait;

    struct StubBackend {
        name: String,
        capabilities: arvak_hal::Capabilities,
    }

    #[async_trait]
    impl Backend for StubBackend {
        fn name(&self) -> &str {
            &self.name
        }

        fn capabilities(&self) -> &arvak_hal::Capabilities {
            &self.capabilities
        }

        async fn availability(&self) -> HalResult<BackendAvailability> {
            Ok(BackendAvailability::always_available())
        }

        async fn validate(&self, _circuit: &Circuit) -> HalResult<ValidationResult> {
            Ok(ValidationResult::Valid)
        }

        async fn submit(&self, _circuit: &Circuit, _shots: u32) -> HalResult<JobId> {
            Ok(JobId::new("stub-job"))
        }

        async fn status(&self, _job_id: &JobId) -> HalResult<JobStatus> {
            Ok(JobStatus::Completed)
        }

        async fn result(&self, _job_id: &JobId) -> HalResult<ExecutionResult> {
            Ok(ExecutionResult::new(arvak_hal::Counts::new(), 0))
        }

        async fn cancel(&self, _job_id: &JobId) -> HalResult<()> {
            Ok(())
        }
    }

    fn stub(name: &str) -> Arc<dyn Backend> {
        Arc::new(StubBackend {
            name: name.into(),
            capabilities: arvak_hal::Capabilities::simulator(64),
        })
    }

    #[tokio::test]
    async fn test_acquire_and_release_round_trips() {
        let executor = Executor::new(vec![stub("dense")]);
        let (index, backend) = executor.get_next_available("dense").await.unwrap();
        assert_eq!(backend.name(), "dense");
        executor.release(index).await;
        let (index2, _) = executor.get_next_available("dense").await.unwrap();
        assert_eq!(index, index2);
    }

    #[tokio::test]
    async fn test_unknown_backend_name_errors_immediately() {
        let executor = Executor::new(vec![stub("dense")]);
        let result = executor.get_next_available("nosuchbackend").await;
        assert!(matches!(result, Err(SessionError::UnknownBackend(_))));
    }

    #[tokio::test]
    async fn test_blocks_until_release_when_pool_exhausted() {
        let executor = Arc::new(Executor::new(vec![stub("dense")]));
        let (index, _backend) = executor.get_next_available("dense").await.unwrap();

        let waiter = {
            let executor = Arc::clone(&executor);
            tokio::spawn(async move { executor.get_next_available("dense").await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        executor.release(index).await;

        let (reacquired, backend) = waiter.await.unwrap().unwrap();
        assert_eq!(reacquired, index);
        assert_eq!(backend.name(), "dense");
    }
}
