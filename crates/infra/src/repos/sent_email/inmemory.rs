use super::ISentEmailRepo;
use crate::repos::shared::inmemory_repo::*;
use chrono::{DateTime, Utc};
use reelminder_domain::SentEmailRecord;

pub struct InMemorySentEmailRepo {
    sent_emails: std::sync::Mutex<Vec<SentEmailRecord>>,
}

impl InMemorySentEmailRepo {
    pub fn new() -> Self {
        Self {
            sent_emails: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl ISentEmailRepo for InMemorySentEmailRepo {
    async fn upsert(&self, record: &SentEmailRecord) -> anyhow::Result<()> {
        upsert(record, &self.sent_emails);
        Ok(())
    }

    async fn find(&self, email: &str, tmdb_id: i64) -> anyhow::Result<Option<SentEmailRecord>> {
        Ok(find(&(email.to_string(), tmdb_id), &self.sent_emails))
    }

    async fn find_latest_for_email(&self, email: &str) -> anyhow::Result<Option<SentEmailRecord>> {
        Ok(find_by(&self.sent_emails, |r| r.email == email)
            .into_iter()
            .max_by_key(|r| r.sent_at))
    }

    async fn find_unwatched(&self) -> anyhow::Result<Vec<SentEmailRecord>> {
        Ok(find_by(&self.sent_emails, |r| r.watched_at.is_none()))
    }

    async fn find_recent(&self, limit: usize) -> anyhow::Result<Vec<SentEmailRecord>> {
        let mut records = find_by(&self.sent_emails, |_| true);
        records.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
        records.truncate(limit);
        Ok(records)
    }

    async fn set_watched(
        &self,
        email: &str,
        tmdb_id: i64,
        watched_at: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        let updated = update_many(
            &self.sent_emails,
            |r| r.email == email && r.tmdb_id == tmdb_id,
            |r| r.watched_at = Some(watched_at),
        );
        Ok(updated > 0)
    }
}
