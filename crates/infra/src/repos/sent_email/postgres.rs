use super::ISentEmailRepo;
use chrono::{DateTime, Utc};
use reelminder_domain::{MediaType, SentEmailRecord};
use sqlx::{FromRow, PgPool};
use tracing::error;

pub struct PostgresSentEmailRepo {
    pool: PgPool,
}

impl PostgresSentEmailRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct SentEmailRaw {
    email: String,
    tmdb_id: i64,
    requester_username: String,
    rating_key: String,
    title: String,
    poster_url: String,
    media_type: String,
    media_added_at: DateTime<Utc>,
    sent_at: DateTime<Utc>,
    watched_at: Option<DateTime<Utc>>,
}

impl From<SentEmailRaw> for SentEmailRecord {
    fn from(e: SentEmailRaw) -> Self {
        Self {
            email: e.email,
            tmdb_id: e.tmdb_id,
            requester_username: e.requester_username,
            rating_key: e.rating_key,
            title: e.title,
            poster_url: e.poster_url,
            media_type: MediaType::from(e.media_type.as_str()),
            media_added_at: e.media_added_at,
            sent_at: e.sent_at,
            watched_at: e.watched_at,
        }
    }
}

#[async_trait::async_trait]
impl ISentEmailRepo for PostgresSentEmailRepo {
    async fn upsert(&self, record: &SentEmailRecord) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sent_emails(
                email, tmdb_id, requester_username, rating_key, title,
                poster_url, media_type, media_added_at, sent_at, watched_at
            )
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (email, tmdb_id) DO UPDATE
            SET requester_username = EXCLUDED.requester_username,
            rating_key = EXCLUDED.rating_key,
            title = EXCLUDED.title,
            poster_url = EXCLUDED.poster_url,
            media_type = EXCLUDED.media_type,
            media_added_at = EXCLUDED.media_added_at,
            sent_at = EXCLUDED.sent_at,
            watched_at = EXCLUDED.watched_at
            "#,
        )
        .bind(&record.email)
        .bind(record.tmdb_id)
        .bind(&record.requester_username)
        .bind(&record.rating_key)
        .bind(&record.title)
        .bind(&record.poster_url)
        .bind(record.media_type.as_str())
        .bind(record.media_added_at)
        .bind(record.sent_at)
        .bind(record.watched_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to upsert sent email: {:?}. DB returned error: {:?}",
                record, e
            );
            e
        })?;
        Ok(())
    }

    async fn find(&self, email: &str, tmdb_id: i64) -> anyhow::Result<Option<SentEmailRecord>> {
        let raw: Option<SentEmailRaw> = sqlx::query_as(
            r#"
            SELECT * FROM sent_emails
            WHERE email = $1 AND tmdb_id = $2
            "#,
        )
        .bind(email)
        .bind(tmdb_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(raw.map(|r| r.into()))
    }

    async fn find_latest_for_email(&self, email: &str) -> anyhow::Result<Option<SentEmailRecord>> {
        let raw: Option<SentEmailRaw> = sqlx::query_as(
            r#"
            SELECT * FROM sent_emails
            WHERE email = $1
            ORDER BY sent_at DESC
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(raw.map(|r| r.into()))
    }

    async fn find_unwatched(&self) -> anyhow::Result<Vec<SentEmailRecord>> {
        let raws: Vec<SentEmailRaw> = sqlx::query_as(
            r#"
            SELECT * FROM sent_emails
            WHERE watched_at IS NULL
            ORDER BY sent_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Find unwatched sent emails failed. DB returned error: {:?}", e);
            e
        })?;
        Ok(raws.into_iter().map(|r| r.into()).collect())
    }

    async fn find_recent(&self, limit: usize) -> anyhow::Result<Vec<SentEmailRecord>> {
        let raws: Vec<SentEmailRaw> = sqlx::query_as(
            r#"
            SELECT * FROM sent_emails
            ORDER BY sent_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(raws.into_iter().map(|r| r.into()).collect())
    }

    async fn set_watched(
        &self,
        email: &str,
        tmdb_id: i64,
        watched_at: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE sent_emails
            SET watched_at = $3
            WHERE email = $1 AND tmdb_id = $2
            "#,
        )
        .bind(email)
        .bind(tmdb_id)
        .bind(watched_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to mark sent email for {} / {} as watched. DB returned error: {:?}",
                email, tmdb_id, e
            );
            e
        })?;
        Ok(res.rows_affected() > 0)
    }
}
