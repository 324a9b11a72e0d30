use super::IRequestRepo;
use chrono::{DateTime, Utc};
use reelminder_domain::{MediaType, RequestRecord, RequestUpdate};
use sqlx::{FromRow, PgPool};
use tracing::error;

pub struct PostgresRequestRepo {
    pool: PgPool,
}

impl PostgresRequestRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RequestRaw {
    request_id: i64,
    media_added_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    tmdb_id: i64,
    rating_key: String,
    media_type: String,
    requester_username: String,
    requester_email: String,
    browser_url: Option<String>,
    mobile_url: Option<String>,
    poster_url: String,
    watched_at: Option<DateTime<Utc>>,
    email_sent: bool,
    skip_email: bool,
    eligible_for_email: bool,
    title: String,
}

impl From<RequestRaw> for RequestRecord {
    fn from(e: RequestRaw) -> Self {
        Self {
            id: e.request_id,
            media_added_at: e.media_added_at,
            created_at: e.created_at,
            tmdb_id: e.tmdb_id,
            rating_key: e.rating_key,
            media_type: MediaType::from(e.media_type.as_str()),
            requester_username: e.requester_username,
            requester_email: e.requester_email,
            browser_url: e.browser_url,
            mobile_url: e.mobile_url,
            poster_url: e.poster_url,
            watched_at: e.watched_at,
            email_sent: e.email_sent,
            skip_email: e.skip_email,
            eligible_for_email: e.eligible_for_email,
            title: e.title,
        }
    }
}

#[async_trait::async_trait]
impl IRequestRepo for PostgresRequestRepo {
    async fn insert(&self, request: &RequestRecord) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            INSERT INTO requests(
                request_id, media_added_at, created_at, tmdb_id, rating_key,
                media_type, requester_username, requester_email, browser_url,
                mobile_url, poster_url, watched_at, email_sent, skip_email,
                eligible_for_email, title
            )
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            ON CONFLICT (request_id) DO NOTHING
            "#,
        )
        .bind(request.id)
        .bind(request.media_added_at)
        .bind(request.created_at)
        .bind(request.tmdb_id)
        .bind(&request.rating_key)
        .bind(request.media_type.as_str())
        .bind(&request.requester_username)
        .bind(&request.requester_email)
        .bind(&request.browser_url)
        .bind(&request.mobile_url)
        .bind(&request.poster_url)
        .bind(request.watched_at)
        .bind(request.email_sent)
        .bind(request.skip_email)
        .bind(request.eligible_for_email)
        .bind(&request.title)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to insert request: {:?}. DB returned error: {:?}",
                request, e
            );
            e
        })?;
        Ok(res.rows_affected() == 1)
    }

    async fn find(&self, request_id: i64) -> anyhow::Result<Option<RequestRecord>> {
        let raw: Option<RequestRaw> = sqlx::query_as(
            r#"
            SELECT * FROM requests
            WHERE request_id = $1
            "#,
        )
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Find request with id: {} failed. DB returned error: {:?}",
                request_id, e
            );
            e
        })?;
        Ok(raw.map(|r| r.into()))
    }

    async fn find_all(&self) -> anyhow::Result<Vec<RequestRecord>> {
        let raws: Vec<RequestRaw> = sqlx::query_as(
            r#"
            SELECT * FROM requests
            ORDER BY request_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(raws.into_iter().map(|r| r.into()).collect())
    }

    async fn find_unresolved(&self) -> anyhow::Result<Vec<RequestRecord>> {
        let raws: Vec<RequestRaw> = sqlx::query_as(
            r#"
            SELECT * FROM requests
            WHERE watched_at IS NULL
            AND NOT email_sent
            AND NOT skip_email
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Find unresolved requests failed. DB returned error: {:?}", e);
            e
        })?;
        Ok(raws.into_iter().map(|r| r.into()).collect())
    }

    async fn update(&self, request_id: i64, update: &RequestUpdate) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE requests
            SET title = COALESCE($2, title),
            watched_at = COALESCE($3, watched_at),
            email_sent = COALESCE($4, email_sent),
            skip_email = COALESCE($5, skip_email),
            eligible_for_email = COALESCE($6, eligible_for_email)
            WHERE request_id = $1
            "#,
        )
        .bind(request_id)
        .bind(&update.title)
        .bind(update.watched_at)
        .bind(update.email_sent)
        .bind(update.skip_email)
        .bind(update.eligible_for_email)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to update request: {} with {:?}. DB returned error: {:?}",
                request_id, update, e
            );
            e
        })?;
        Ok(res.rows_affected() > 0)
    }
}
