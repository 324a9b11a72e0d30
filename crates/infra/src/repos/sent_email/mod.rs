mod inmemory;
mod postgres;

use chrono::{DateTime, Utc};
pub use inmemory::InMemorySentEmailRepo;
pub use postgres::PostgresSentEmailRepo;
use reelminder_domain::SentEmailRecord;

#[async_trait::async_trait]
pub trait ISentEmailRepo: Send + Sync {
    /// Stores the record, replacing any earlier one for the same recipient
    /// and title
    async fn upsert(&self, record: &SentEmailRecord) -> anyhow::Result<()>;
    async fn find(&self, email: &str, tmdb_id: i64) -> anyhow::Result<Option<SentEmailRecord>>;
    /// The most recent delivery to `email`
    async fn find_latest_for_email(&self, email: &str) -> anyhow::Result<Option<SentEmailRecord>>;
    async fn find_unwatched(&self) -> anyhow::Result<Vec<SentEmailRecord>>;
    /// Newest first
    async fn find_recent(&self, limit: usize) -> anyhow::Result<Vec<SentEmailRecord>>;
    /// Returns false when no record exists for the recipient and title
    async fn set_watched(
        &self,
        email: &str,
        tmdb_id: i64,
        watched_at: DateTime<Utc>,
    ) -> anyhow::Result<bool>;
}

#[cfg(test)]
mod tests {
    use crate::repos::tests::create_repos;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use reelminder_domain::{MediaType, SentEmailRecord};

    fn sent(email: &str, tmdb_id: i64, sent_at: DateTime<Utc>) -> SentEmailRecord {
        SentEmailRecord {
            email: email.into(),
            tmdb_id,
            requester_username: "trinity".into(),
            rating_key: format!("{}", tmdb_id),
            title: "The Matrix".into(),
            poster_url: String::new(),
            media_type: MediaType::Movie,
            media_added_at: sent_at - Duration::days(100),
            sent_at,
            watched_at: None,
        }
    }

    #[tokio::test]
    async fn upsert_keeps_one_record_per_recipient_and_title() {
        for repos in create_repos().await {
            let email = "upsert@x.com";
            let first = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
            repos.sent_emails.upsert(&sent(email, 603, first)).await.unwrap();
            let mut again = sent(email, 603, first + Duration::days(1));
            again.title = "The Matrix Reloaded".into();
            repos.sent_emails.upsert(&again).await.unwrap();

            let stored = repos
                .sent_emails
                .find(email, 603)
                .await
                .unwrap()
                .expect("To find sent email");
            assert_eq!(stored.title, "The Matrix Reloaded");
            let recent = repos.sent_emails.find_recent(1000).await.unwrap();
            assert_eq!(
                recent
                    .iter()
                    .filter(|r| r.email == email && r.tmdb_id == 603)
                    .count(),
                1
            );
        }
    }

    #[tokio::test]
    async fn latest_for_email_and_watched_marking() {
        for repos in create_repos().await {
            let email = "latest@x.com";
            let base = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
            repos.sent_emails.upsert(&sent(email, 1, base)).await.unwrap();
            repos
                .sent_emails
                .upsert(&sent(email, 2, base + Duration::hours(5)))
                .await
                .unwrap();

            let latest = repos
                .sent_emails
                .find_latest_for_email(email)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(latest.tmdb_id, 2);

            let watched_at = base + Duration::days(2);
            assert!(repos
                .sent_emails
                .set_watched(email, 1, watched_at)
                .await
                .unwrap());
            let unwatched = repos.sent_emails.find_unwatched().await.unwrap();
            assert!(!unwatched.iter().any(|r| r.email == email && r.tmdb_id == 1));
            assert!(unwatched.iter().any(|r| r.email == email && r.tmdb_id == 2));
            assert!(!repos
                .sent_emails
                .set_watched("nobody@x.com", 1, watched_at)
                .await
                .unwrap());
        }
    }
}
