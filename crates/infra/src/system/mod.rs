use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

// Mocking out time so that it is possible to run tests that depend on time.
pub trait ISys: Send + Sync {
    /// The current time
    fn now(&self) -> DateTime<Utc>;
}

/// System that gets the real time and is used when not testing
pub struct RealSys {}
impl ISys for RealSys {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// System with a clock that only moves when told to. Used for testing.
pub struct StaticTimeSys {
    now: Mutex<DateTime<Utc>>,
}

impl StaticTimeSys {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now = *now + by;
    }
}

impl ISys for StaticTimeSys {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
