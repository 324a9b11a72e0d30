use crate::dtos::{LogLevelDTO, SettingsDTO, WatchStatusStatsDTO};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    pub settings: SettingsDTO,
}

pub mod get_settings {
    use super::*;

    pub type APIResponse = SettingsResponse;
}

pub mod set_scheduler_enabled {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub enabled: bool,
    }

    pub type APIResponse = SettingsResponse;
}

pub mod check_watch_status {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub stats: WatchStatusStatsDTO,
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogLevelResponse {
    pub log_level: LogLevelDTO,
}

pub mod get_log_level {
    use super::*;

    pub type APIResponse = LogLevelResponse;
}

pub mod set_log_level {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub level: String,
    }

    pub type APIResponse = LogLevelResponse;
}
