use super::IEmailUserRepo;
use crate::repos::shared::inmemory_repo::*;
use reelminder_domain::EmailUserRecord;

pub struct InMemoryEmailUserRepo {
    users: std::sync::Mutex<Vec<EmailUserRecord>>,
}

impl InMemoryEmailUserRepo {
    pub fn new() -> Self {
        Self {
            users: std::sync::Mutex::new(vec![]),
        }
    }
}

fn sorted(mut users: Vec<EmailUserRecord>) -> Vec<EmailUserRecord> {
    users.sort_by(|a, b| a.email.cmp(&b.email));
    users
}

#[async_trait::async_trait]
impl IEmailUserRepo for InMemoryEmailUserRepo {
    async fn insert(&self, user: &EmailUserRecord) -> anyhow::Result<bool> {
        Ok(insert_if_absent(user, &self.users))
    }

    async fn save(&self, user: &EmailUserRecord) -> anyhow::Result<()> {
        save(user, &self.users);
        Ok(())
    }

    async fn find(&self, email: &str) -> anyhow::Result<Option<EmailUserRecord>> {
        Ok(find(&email.to_string(), &self.users))
    }

    async fn find_all(&self) -> anyhow::Result<Vec<EmailUserRecord>> {
        Ok(sorted(find_by(&self.users, |_| true)))
    }

    async fn find_unsubscribed(&self) -> anyhow::Result<Vec<EmailUserRecord>> {
        Ok(sorted(find_by(&self.users, |u| u.is_unsubscribed())))
    }
}
