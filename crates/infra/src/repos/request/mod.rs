mod inmemory;
mod postgres;

pub use inmemory::InMemoryRequestRepo;
pub use postgres::PostgresRequestRepo;
use reelminder_domain::{RequestRecord, RequestUpdate};

#[async_trait::async_trait]
pub trait IRequestRepo: Send + Sync {
    /// Returns false when a request with the same id already exists
    async fn insert(&self, request: &RequestRecord) -> anyhow::Result<bool>;
    async fn find(&self, request_id: i64) -> anyhow::Result<Option<RequestRecord>>;
    async fn find_all(&self) -> anyhow::Result<Vec<RequestRecord>>;
    /// Requests that are neither watched, reminded nor skipped
    async fn find_unresolved(&self) -> anyhow::Result<Vec<RequestRecord>>;
    /// Applies the fields named by `update`. Returns false when no request
    /// has the given id.
    async fn update(&self, request_id: i64, update: &RequestUpdate) -> anyhow::Result<bool>;
}

#[cfg(test)]
mod tests {
    use crate::repos::tests::create_repos;
    use chrono::{Duration, TimeZone, Utc};
    use reelminder_domain::{MediaType, RequestRecord, RequestUpdate, UNKNOWN_TITLE};

    fn request(id: i64) -> RequestRecord {
        let added = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        RequestRecord {
            id,
            media_added_at: added,
            created_at: added + Duration::hours(1),
            tmdb_id: 1000 + id,
            rating_key: format!("rk-{}", id),
            media_type: MediaType::TvShow,
            requester_username: "morpheus".into(),
            requester_email: "m@x.com".into(),
            browser_url: Some("https://plex.example.com".into()),
            mobile_url: None,
            poster_url: String::new(),
            watched_at: None,
            email_sent: false,
            skip_email: false,
            eligible_for_email: false,
            title: UNKNOWN_TITLE.into(),
        }
    }

    #[tokio::test]
    async fn insert_is_idempotent_per_id() {
        for repos in create_repos().await {
            let id = 9_000_001;
            let req = request(id);
            repos.requests.insert(&req).await.unwrap();
            let mut duplicate = req.clone();
            duplicate.title = "Other".into();
            assert!(!repos.requests.insert(&duplicate).await.unwrap());

            let stored = repos.requests.find(id).await.unwrap().expect("To find request");
            assert_eq!(stored.title, UNKNOWN_TITLE);
            assert_eq!(stored.media_type, MediaType::TvShow);
        }
    }

    #[tokio::test]
    async fn update_touches_only_named_fields() {
        for repos in create_repos().await {
            let id = 9_000_002;
            repos.requests.insert(&request(id)).await.unwrap();

            let found = repos
                .requests
                .update(id, &RequestUpdate::eligible_for_email())
                .await
                .unwrap();
            assert!(found);
            repos
                .requests
                .update(id, &RequestUpdate::title("Severance"))
                .await
                .unwrap();

            let stored = repos.requests.find(id).await.unwrap().unwrap();
            assert!(stored.eligible_for_email);
            assert_eq!(stored.title, "Severance");
            assert!(!stored.email_sent);
            assert!(stored.watched_at.is_none());

            assert!(!repos
                .requests
                .update(-1, &RequestUpdate::skip_email())
                .await
                .unwrap());
        }
    }

    #[tokio::test]
    async fn unresolved_excludes_watched_sent_and_skipped() {
        for repos in create_repos().await {
            let ids = [9_000_010, 9_000_011, 9_000_012, 9_000_013];
            for id in ids {
                repos.requests.insert(&request(id)).await.unwrap();
            }
            let watched_at = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
            repos
                .requests
                .update(ids[1], &RequestUpdate::watched(watched_at))
                .await
                .unwrap();
            repos
                .requests
                .update(ids[2], &RequestUpdate::email_sent())
                .await
                .unwrap();
            repos
                .requests
                .update(ids[3], &RequestUpdate::skip_email())
                .await
                .unwrap();

            let unresolved = repos.requests.find_unresolved().await.unwrap();
            assert!(unresolved.iter().any(|r| r.id == ids[0]));
            for id in &ids[1..] {
                assert!(!unresolved.iter().any(|r| r.id == *id));
            }
        }
    }
}
