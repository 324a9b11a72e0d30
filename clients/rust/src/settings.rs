use crate::{APIResponse, BaseClient};
use reelminder_api_structs::*;
use reqwest::StatusCode;
use std::sync::Arc;

#[derive(Clone)]
pub struct SettingsClient {
    base: Arc<BaseClient>,
}

impl SettingsClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn get(&self) -> APIResponse<get_settings::APIResponse> {
        self.base.get("settings".into(), StatusCode::OK).await
    }

    pub async fn set_scheduler_enabled(
        &self,
        enabled: bool,
    ) -> APIResponse<set_scheduler_enabled::APIResponse> {
        let body = set_scheduler_enabled::RequestBody { enabled };
        self.base
            .put(body, "settings/scheduler".into(), StatusCode::OK)
            .await
    }

    /// Rechecks the watch status of every delivered reminder now
    pub async fn check_watch_status(&self) -> APIResponse<check_watch_status::APIResponse> {
        self.base
            .post((), "settings/watch-status".into(), StatusCode::OK)
            .await
    }

    pub async fn log_level(&self) -> APIResponse<get_log_level::APIResponse> {
        self.base
            .get("settings/log-level".into(), StatusCode::OK)
            .await
    }

    /// Changes the log verbosity of the running server until it restarts
    pub async fn set_log_level(&self, level: &str) -> APIResponse<set_log_level::APIResponse> {
        let body = set_log_level::RequestBody {
            level: level.to_string(),
        };
        self.base
            .put(body, "settings/log-level".into(), StatusCode::OK)
            .await
    }
}
