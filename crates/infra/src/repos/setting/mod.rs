mod inmemory;
mod postgres;

use chrono::{DateTime, Utc};
pub use inmemory::InMemorySettingRepo;
pub use postgres::PostgresSettingRepo;
use reelminder_domain::{parse_timestamp, SchedulerSettings, Setting, SettingKey};
use serde_json::Value;

#[async_trait::async_trait]
pub trait ISettingRepo: Send + Sync {
    async fn get(&self, key: SettingKey) -> anyhow::Result<Option<Setting>>;
    async fn set(&self, setting: &Setting) -> anyhow::Result<()>;
    /// Returns false when the key already has a value
    async fn insert_if_absent(&self, setting: &Setting) -> anyhow::Result<bool>;

    async fn scheduler_settings(&self) -> anyhow::Result<SchedulerSettings> {
        let scheduler_disabled = self
            .get(SettingKey::SchedulerDisabled)
            .await?
            .and_then(|s| s.value.as_bool())
            .unwrap_or(false);
        let last_watch_status_check = self
            .get(SettingKey::LastWatchStatusCheck)
            .await?
            .and_then(|s| s.value.as_str().and_then(parse_timestamp));
        Ok(SchedulerSettings {
            scheduler_disabled,
            last_watch_status_check,
        })
    }

    async fn set_scheduler_disabled(&self, disabled: bool) -> anyhow::Result<()> {
        self.set(&Setting::new(
            SettingKey::SchedulerDisabled,
            Value::Bool(disabled),
        ))
        .await
    }

    async fn set_last_watch_status_check(&self, at: DateTime<Utc>) -> anyhow::Result<()> {
        self.set(&Setting::new(
            SettingKey::LastWatchStatusCheck,
            Value::String(at.to_rfc3339()),
        ))
        .await
    }
}
