use super::{IJobLock, JobLockGuard, LockAcquisition};
use sqlx::{pool::PoolConnection, PgPool, Postgres};
use std::time::Duration;
use tokio::time::Instant;
use tracing::warn;

/// Advisory lock key of the reminder job
const JOB_LOCK_KEY: i64 = 0x5245_454c_4d4e;
const RETRY_INTERVAL: Duration = Duration::from_millis(25);

/// Job lock shared by every process using the same database. Backed by a
/// session level advisory lock held on a connection taken out of the pool.
pub struct PostgresJobLock {
    pool: PgPool,
}

impl PostgresJobLock {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Owns the session holding the advisory lock. The connection is closed
/// instead of returned to the pool, which ends the session and with it the
/// lock.
struct AdvisorySession {
    conn: Option<PoolConnection<Postgres>>,
}

impl Drop for AdvisorySession {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            drop(conn.detach());
        }
    }
}

#[async_trait::async_trait]
impl IJobLock for PostgresJobLock {
    async fn try_acquire(&self, timeout: Duration) -> LockAcquisition {
        let mut conn = match self.pool.acquire().await {
            Ok(conn) => conn,
            Err(e) => return LockAcquisition::Error(e.into()),
        };
        let deadline = Instant::now() + timeout;
        loop {
            let acquired = sqlx::query_scalar::<_, bool>("SELECT pg_try_advisory_lock($1)")
                .bind(JOB_LOCK_KEY)
                .fetch_one(&mut *conn)
                .await;
            match acquired {
                Ok(true) => {
                    return LockAcquisition::Acquired(JobLockGuard::new(AdvisorySession {
                        conn: Some(conn),
                    }))
                }
                Ok(false) => {}
                Err(e) => {
                    warn!("Unable to query the job lock: {:?}", e);
                    return LockAcquisition::Error(e.into());
                }
            }
            let now = Instant::now();
            if now >= deadline {
                return LockAcquisition::Busy;
            }
            tokio::time::sleep(RETRY_INTERVAL.min(deadline - now)).await;
        }
    }
}
