use super::IEmailUserRepo;
use chrono::{DateTime, Utc};
use reelminder_domain::EmailUserRecord;
use sqlx::{FromRow, PgPool};
use tracing::error;

pub struct PostgresEmailUserRepo {
    pool: PgPool,
}

impl PostgresEmailUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct EmailUserRaw {
    email: String,
    last_email_at: Option<DateTime<Utc>>,
    next_email_at: Option<DateTime<Utc>>,
    unsubscribed_at: Option<DateTime<Utc>>,
}

impl From<EmailUserRaw> for EmailUserRecord {
    fn from(e: EmailUserRaw) -> Self {
        Self {
            email: e.email,
            last_email_at: e.last_email_at,
            next_email_at: e.next_email_at,
            unsubscribed_at: e.unsubscribed_at,
        }
    }
}

#[async_trait::async_trait]
impl IEmailUserRepo for PostgresEmailUserRepo {
    async fn insert(&self, user: &EmailUserRecord) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            INSERT INTO email_users(email, last_email_at, next_email_at, unsubscribed_at)
            VALUES($1, $2, $3, $4)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(&user.email)
        .bind(user.last_email_at)
        .bind(user.next_email_at)
        .bind(user.unsubscribed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to insert email user: {:?}. DB returned error: {:?}",
                user, e
            );
            e
        })?;
        Ok(res.rows_affected() == 1)
    }

    async fn save(&self, user: &EmailUserRecord) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE email_users
            SET last_email_at = $2,
            next_email_at = $3,
            unsubscribed_at = $4
            WHERE email = $1
            "#,
        )
        .bind(&user.email)
        .bind(user.last_email_at)
        .bind(user.next_email_at)
        .bind(user.unsubscribed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to save email user: {:?}. DB returned error: {:?}",
                user, e
            );
            e
        })?;
        Ok(())
    }

    async fn find(&self, email: &str) -> anyhow::Result<Option<EmailUserRecord>> {
        let raw: Option<EmailUserRaw> = sqlx::query_as(
            r#"
            SELECT * FROM email_users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(raw.map(|r| r.into()))
    }

    async fn find_all(&self) -> anyhow::Result<Vec<EmailUserRecord>> {
        let raws: Vec<EmailUserRaw> = sqlx::query_as(
            r#"
            SELECT * FROM email_users
            ORDER BY email
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(raws.into_iter().map(|r| r.into()).collect())
    }

    async fn find_unsubscribed(&self) -> anyhow::Result<Vec<EmailUserRecord>> {
        let raws: Vec<EmailUserRaw> = sqlx::query_as(
            r#"
            SELECT * FROM email_users
            WHERE unsubscribed_at IS NOT NULL
            ORDER BY email
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(raws.into_iter().map(|r| r.into()).collect())
    }
}
