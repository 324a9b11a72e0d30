use crate::repos::IEmailUserRepo;
use chrono::{DateTime, Duration, Utc};
use reelminder_domain::{normalize_email, EmailUserRecord};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Access layer for recipient state. Every read-modify-write of an
/// [`EmailUserRecord`] happens while holding a single process wide lock so
/// operator actions and a running job never overwrite each other.
/// Addresses are normalized before they reach the store.
#[derive(Clone)]
pub struct EmailUsers {
    repo: Arc<dyn IEmailUserRepo>,
    lock: Arc<Mutex<()>>,
}

impl EmailUsers {
    pub fn new(repo: Arc<dyn IEmailUserRepo>) -> Self {
        Self {
            repo,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Must only be called while holding `self.lock`
    async fn ensure_locked(&self, email: &str) -> anyhow::Result<EmailUserRecord> {
        if let Some(user) = self.repo.find(email).await? {
            return Ok(user);
        }
        let user = EmailUserRecord::new(email.to_string());
        if self.repo.insert(&user).await? {
            info!("Created email user record for {}", email);
            return Ok(user);
        }
        // Another process inserted it in between
        Ok(self.repo.find(email).await?.unwrap_or(user))
    }

    /// Returns the record for the address, creating it on first reference.
    /// `None` for empty addresses.
    pub async fn ensure(&self, raw_email: &str) -> anyhow::Result<Option<EmailUserRecord>> {
        let email = match normalize_email(raw_email) {
            Some(email) => email,
            None => return Ok(None),
        };
        let _guard = self.lock.lock().await;
        self.ensure_locked(&email).await.map(Some)
    }

    pub async fn get(&self, raw_email: &str) -> anyhow::Result<Option<EmailUserRecord>> {
        match normalize_email(raw_email) {
            Some(email) => self.repo.find(&email).await,
            None => Ok(None),
        }
    }

    pub async fn is_unsubscribed(&self, raw_email: &str) -> anyhow::Result<bool> {
        Ok(self
            .ensure(raw_email)
            .await?
            .map(|user| user.is_unsubscribed())
            .unwrap_or(false))
    }

    /// Marks the address as unsubscribed. An address that already is keeps
    /// its original unsubscribe time.
    pub async fn unsubscribe(
        &self,
        raw_email: &str,
        at: DateTime<Utc>,
    ) -> anyhow::Result<Option<EmailUserRecord>> {
        let email = match normalize_email(raw_email) {
            Some(email) => email,
            None => return Ok(None),
        };
        let _guard = self.lock.lock().await;
        let mut user = self.ensure_locked(&email).await?;
        if user.unsubscribed_at.is_none() {
            user.unsubscribed_at = Some(at);
            self.repo.save(&user).await?;
            info!("Unsubscribed {}", email);
        }
        Ok(Some(user))
    }

    /// Returns whether the address was unsubscribed before
    pub async fn resubscribe(&self, raw_email: &str) -> anyhow::Result<bool> {
        let email = match normalize_email(raw_email) {
            Some(email) => email,
            None => return Ok(false),
        };
        let _guard = self.lock.lock().await;
        let mut user = self.ensure_locked(&email).await?;
        if user.unsubscribed_at.is_none() {
            return Ok(false);
        }
        user.unsubscribed_at = None;
        self.repo.save(&user).await?;
        info!("Resubscribed {}", email);
        Ok(true)
    }

    /// Stamps a delivery and starts the cooldown for the address
    pub async fn record_send(
        &self,
        raw_email: &str,
        sent_at: DateTime<Utc>,
        cooldown: Duration,
    ) -> anyhow::Result<Option<EmailUserRecord>> {
        let email = match normalize_email(raw_email) {
            Some(email) => email,
            None => return Ok(None),
        };
        let _guard = self.lock.lock().await;
        let mut user = self.ensure_locked(&email).await?;
        user.record_send(sent_at, cooldown);
        self.repo.save(&user).await?;
        Ok(Some(user))
    }

    pub async fn list_unsubscribed(&self) -> anyhow::Result<Vec<EmailUserRecord>> {
        self.repo.find_unsubscribed().await
    }

    pub async fn list_all(&self) -> anyhow::Result<Vec<EmailUserRecord>> {
        self.repo.find_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::Repos;
    use chrono::TimeZone;

    fn ledger() -> EmailUsers {
        EmailUsers::new(Repos::create_inmemory().email_users)
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn ensure_normalizes_and_creates_once() {
        let users = ledger();
        let first = users.ensure(" Alice@X.com ").await.unwrap().unwrap();
        let second = users.ensure("alice@x.com").await.unwrap().unwrap();
        assert_eq!(first.email, "alice@x.com");
        assert_eq!(first, second);
        assert_eq!(users.list_all().await.unwrap().len(), 1);
        assert!(users.ensure("   ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unsubscribe_and_resubscribe() {
        let users = ledger();
        users.unsubscribe("Bob@x.com", at()).await.unwrap();
        assert!(users.is_unsubscribed("bob@X.com").await.unwrap());

        let again = users
            .unsubscribe("bob@x.com", at() + Duration::days(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(again.unsubscribed_at, Some(at()));

        let listed = users.list_unsubscribed().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].email, "bob@x.com");

        assert!(users.resubscribe("bob@x.com").await.unwrap());
        assert!(!users.resubscribe("bob@x.com").await.unwrap());
        assert!(!users.is_unsubscribed("bob@x.com").await.unwrap());
        assert!(users.list_unsubscribed().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn record_send_sets_cooldown() {
        let users = ledger();
        let user = users
            .record_send("carol@x.com", at(), Duration::hours(24))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.last_email_at, Some(at()));
        assert_eq!(user.next_email_at, Some(at() + Duration::hours(24)));
        assert_eq!(users.get("CAROL@x.com").await.unwrap(), Some(user));
    }

    #[tokio::test]
    async fn concurrent_updates_are_not_lost() {
        let users = ledger();
        let unsubscribe = users.unsubscribe("dave@x.com", at());
        let send = users.record_send("dave@x.com", at(), Duration::hours(24));
        let (unsubscribed, sent) = tokio::join!(unsubscribe, send);
        unsubscribed.unwrap();
        sent.unwrap();

        let user = users.get("dave@x.com").await.unwrap().unwrap();
        assert_eq!(user.unsubscribed_at, Some(at()));
        assert_eq!(user.last_email_at, Some(at()));
    }
}
