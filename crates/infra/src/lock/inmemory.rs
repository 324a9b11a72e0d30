use super::{IJobLock, JobLockGuard, LockAcquisition};
use std::{sync::Arc, time::Duration};
use tokio::sync::Mutex;

/// Single process job lock
pub struct InMemoryJobLock {
    mutex: Arc<Mutex<()>>,
}

impl InMemoryJobLock {
    pub fn new() -> Self {
        Self {
            mutex: Arc::new(Mutex::new(())),
        }
    }
}

#[async_trait::async_trait]
impl IJobLock for InMemoryJobLock {
    async fn try_acquire(&self, timeout: Duration) -> LockAcquisition {
        if let Ok(guard) = self.mutex.clone().try_lock_owned() {
            return LockAcquisition::Acquired(JobLockGuard::new(guard));
        }
        if timeout.is_zero() {
            return LockAcquisition::Busy;
        }
        match tokio::time::timeout(timeout, self.mutex.clone().lock_owned()).await {
            Ok(guard) => LockAcquisition::Acquired(JobLockGuard::new(guard)),
            Err(_) => LockAcquisition::Busy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_acquisition_is_busy_until_release() {
        let lock = InMemoryJobLock::new();
        let guard = match lock.try_acquire(Duration::from_millis(0)).await {
            LockAcquisition::Acquired(guard) => guard,
            other => panic!("Expected to acquire lock, got {:?}", other),
        };
        assert!(matches!(
            lock.try_acquire(Duration::from_millis(0)).await,
            LockAcquisition::Busy
        ));
        assert!(matches!(
            lock.try_acquire(Duration::from_millis(50)).await,
            LockAcquisition::Busy
        ));

        drop(guard);
        assert!(matches!(
            lock.try_acquire(Duration::from_millis(0)).await,
            LockAcquisition::Acquired(_)
        ));
    }

    #[tokio::test]
    async fn waits_for_release_within_timeout() {
        let lock = Arc::new(InMemoryJobLock::new());
        let guard = match lock.try_acquire(Duration::from_millis(0)).await {
            LockAcquisition::Acquired(guard) => guard,
            other => panic!("Expected to acquire lock, got {:?}", other),
        };
        let releaser = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            drop(guard);
        });
        assert!(matches!(
            lock.try_acquire(Duration::from_secs(5)).await,
            LockAcquisition::Acquired(_)
        ));
        releaser.await.unwrap();
    }
}
