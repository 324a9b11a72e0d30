use super::ISettingRepo;
use reelminder_domain::{Setting, SettingKey};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use tracing::error;

pub struct PostgresSettingRepo {
    pool: PgPool,
}

impl PostgresSettingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct SettingRaw {
    key: String,
    value: Value,
}

impl From<SettingRaw> for Setting {
    fn from(e: SettingRaw) -> Self {
        Self {
            key: e.key,
            value: e.value,
        }
    }
}

#[async_trait::async_trait]
impl ISettingRepo for PostgresSettingRepo {
    async fn get(&self, key: SettingKey) -> anyhow::Result<Option<Setting>> {
        let raw: Option<SettingRaw> = sqlx::query_as(
            r#"
            SELECT * FROM settings
            WHERE key = $1
            "#,
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(raw.map(|r| r.into()))
    }

    async fn set(&self, setting: &Setting) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO settings(key, value)
            VALUES($1, $2)
            ON CONFLICT (key) DO UPDATE
            SET value = EXCLUDED.value
            "#,
        )
        .bind(&setting.key)
        .bind(&setting.value)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to store setting: {:?}. DB returned error: {:?}",
                setting, e
            );
            e
        })?;
        Ok(())
    }

    async fn insert_if_absent(&self, setting: &Setting) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            INSERT INTO settings(key, value)
            VALUES($1, $2)
            ON CONFLICT (key) DO NOTHING
            "#,
        )
        .bind(&setting.key)
        .bind(&setting.value)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() == 1)
    }
}
