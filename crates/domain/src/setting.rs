use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Keys of the persisted scheduler flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    SchedulerDisabled,
    LastWatchStatusCheck,
}

impl SettingKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SchedulerDisabled => "scheduler_disabled",
            Self::LastWatchStatusCheck => "last_watch_status_check",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: serde_json::Value,
}

impl Setting {
    pub fn new(key: SettingKey, value: serde_json::Value) -> Self {
        Self {
            key: key.as_str().to_string(),
            value,
        }
    }
}

/// Watch status of delivered reminders is rechecked at most this often
pub fn watch_status_check_interval() -> Duration {
    Duration::hours(24)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchedulerSettings {
    pub scheduler_disabled: bool,
    pub last_watch_status_check: Option<DateTime<Utc>>,
}

impl SchedulerSettings {
    pub fn watch_status_check_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_watch_status_check {
            Some(last) => now - last >= watch_status_check_interval(),
            None => true,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn watch_check_runs_once_a_day() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap();
        let mut settings = SchedulerSettings::default();
        assert!(settings.watch_status_check_due(now));

        settings.last_watch_status_check = Some(now - Duration::hours(23));
        assert!(!settings.watch_status_check_due(now));

        settings.last_watch_status_check = Some(now - Duration::hours(24));
        assert!(settings.watch_status_check_due(now));
    }
}
