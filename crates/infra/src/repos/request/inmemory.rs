use super::IRequestRepo;
use crate::repos::shared::inmemory_repo::*;
use reelminder_domain::{RequestRecord, RequestUpdate};

pub struct InMemoryRequestRepo {
    requests: std::sync::Mutex<Vec<RequestRecord>>,
}

impl InMemoryRequestRepo {
    pub fn new() -> Self {
        Self {
            requests: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl IRequestRepo for InMemoryRequestRepo {
    async fn insert(&self, request: &RequestRecord) -> anyhow::Result<bool> {
        Ok(insert_if_absent(request, &self.requests))
    }

    async fn find(&self, request_id: i64) -> anyhow::Result<Option<RequestRecord>> {
        Ok(find(&request_id, &self.requests))
    }

    async fn find_all(&self) -> anyhow::Result<Vec<RequestRecord>> {
        Ok(find_by(&self.requests, |_| true))
    }

    async fn find_unresolved(&self) -> anyhow::Result<Vec<RequestRecord>> {
        Ok(find_by(&self.requests, |r| r.is_unresolved()))
    }

    async fn update(&self, request_id: i64, update: &RequestUpdate) -> anyhow::Result<bool> {
        let updated = update_many(&self.requests, |r| r.id == request_id, |r| r.apply(update));
        Ok(updated > 0)
    }
}
