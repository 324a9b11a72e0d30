mod inmemory;
mod postgres;

pub use inmemory::InMemoryJobLock;
pub use postgres::PostgresJobLock;
use std::time::Duration;

/// Held while a reminder run is in progress. Dropping it releases the lock.
pub struct JobLockGuard {
    _held: Box<dyn Send>,
}

impl JobLockGuard {
    fn new(held: impl Send + 'static) -> Self {
        Self {
            _held: Box::new(held),
        }
    }
}

impl std::fmt::Debug for JobLockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("JobLockGuard")
    }
}

#[derive(Debug)]
pub enum LockAcquisition {
    Acquired(JobLockGuard),
    /// Another run holds the lock
    Busy,
    Error(anyhow::Error),
}

/// At most one reminder run may be active across all processes sharing the
/// same store
#[async_trait::async_trait]
pub trait IJobLock: Send + Sync {
    /// Waits at most `timeout` for the lock. A zero timeout makes a single
    /// attempt.
    async fn try_acquire(&self, timeout: Duration) -> LockAcquisition;
}
