mod inmemory;
mod postgres;

pub use inmemory::InMemoryEmailUserRepo;
pub use postgres::PostgresEmailUserRepo;
use reelminder_domain::EmailUserRecord;

/// Raw storage of recipient state. Read-modify-write sequences go through
/// [`crate::EmailUsers`] which serializes them.
#[async_trait::async_trait]
pub trait IEmailUserRepo: Send + Sync {
    /// Returns false when a record for the address already exists
    async fn insert(&self, user: &EmailUserRecord) -> anyhow::Result<bool>;
    async fn save(&self, user: &EmailUserRecord) -> anyhow::Result<()>;
    async fn find(&self, email: &str) -> anyhow::Result<Option<EmailUserRecord>>;
    /// Ordered by address
    async fn find_all(&self) -> anyhow::Result<Vec<EmailUserRecord>>;
    /// Ordered by address
    async fn find_unsubscribed(&self) -> anyhow::Result<Vec<EmailUserRecord>>;
}
