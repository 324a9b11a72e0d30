use reelminder_domain::LogLevel;
use std::sync::Mutex;

/// Reads and changes the log verbosity of the running process
pub trait ILogControl: Send + Sync {
    fn level(&self) -> LogLevel;
    fn set_level(&self, level: LogLevel) -> anyhow::Result<()>;
}

/// Remembers the chosen level without touching any subscriber. Used until
/// the binary installs its own control, and in tests.
pub struct InMemoryLogControl {
    level: Mutex<LogLevel>,
}

impl InMemoryLogControl {
    pub fn new(level: LogLevel) -> Self {
        Self {
            level: Mutex::new(level),
        }
    }
}

impl ILogControl for InMemoryLogControl {
    fn level(&self) -> LogLevel {
        *self.level.lock().unwrap()
    }

    fn set_level(&self, level: LogLevel) -> anyhow::Result<()> {
        *self.level.lock().unwrap() = level;
        Ok(())
    }
}
