use chrono::{DateTime, Utc};
use reelminder_domain::{LogLevel, SchedulerSettings, WatchStatusStats};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsDTO {
    pub scheduler_enabled: bool,
    pub last_watch_status_check: Option<DateTime<Utc>>,
}

impl SettingsDTO {
    pub fn new(settings: SchedulerSettings) -> Self {
        Self {
            scheduler_enabled: !settings.scheduler_disabled,
            last_watch_status_check: settings.last_watch_status_check,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchStatusStatsDTO {
    pub checked: usize,
    pub watched: usize,
    pub failed: usize,
}

impl WatchStatusStatsDTO {
    pub fn new(stats: WatchStatusStats) -> Self {
        Self {
            checked: stats.checked,
            watched: stats.watched,
            failed: stats.failed,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogLevelDTO {
    pub level: String,
    pub available_levels: Vec<String>,
}

impl LogLevelDTO {
    pub fn new(level: LogLevel) -> Self {
        Self {
            level: level.as_str().to_string(),
            available_levels: LogLevel::ALL
                .iter()
                .map(|level| level.as_str().to_string())
                .collect(),
        }
    }
}
