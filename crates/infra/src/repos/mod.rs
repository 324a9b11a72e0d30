mod email_user;
mod request;
mod sent_email;
mod setting;
mod shared;

use email_user::{InMemoryEmailUserRepo, PostgresEmailUserRepo};
use request::{InMemoryRequestRepo, PostgresRequestRepo};
use sent_email::{InMemorySentEmailRepo, PostgresSentEmailRepo};
use setting::{InMemorySettingRepo, PostgresSettingRepo};
use sqlx::PgPool;
use std::sync::Arc;

pub use email_user::IEmailUserRepo;
pub use request::IRequestRepo;
pub use sent_email::ISentEmailRepo;
pub use setting::ISettingRepo;

#[derive(Clone)]
pub struct Repos {
    pub requests: Arc<dyn IRequestRepo>,
    pub sent_emails: Arc<dyn ISentEmailRepo>,
    pub email_users: Arc<dyn IEmailUserRepo>,
    pub settings: Arc<dyn ISettingRepo>,
}

impl Repos {
    pub fn create_postgres(pool: PgPool) -> Self {
        Self {
            requests: Arc::new(PostgresRequestRepo::new(pool.clone())),
            sent_emails: Arc::new(PostgresSentEmailRepo::new(pool.clone())),
            email_users: Arc::new(PostgresEmailUserRepo::new(pool.clone())),
            settings: Arc::new(PostgresSettingRepo::new(pool)),
        }
    }

    pub fn create_inmemory() -> Self {
        Self {
            requests: Arc::new(InMemoryRequestRepo::new()),
            sent_emails: Arc::new(InMemorySentEmailRepo::new()),
            email_users: Arc::new(InMemoryEmailUserRepo::new()),
            settings: Arc::new(InMemorySettingRepo::new()),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::Repos;
    use crate::connect_postgres;

    /// Creates inmemory repos and, when `DATABASE_URL` is set, postgres repos
    pub async fn create_repos() -> Vec<Repos> {
        let mut repos = vec![Repos::create_inmemory()];
        if std::env::var("DATABASE_URL").is_ok() {
            let pool = connect_postgres()
                .await
                .expect("To connect to postgres when DATABASE_URL is set");
            repos.push(Repos::create_postgres(pool));
        }
        repos
    }
}
