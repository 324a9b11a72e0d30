use crate::{APIResponse, BaseClient};
use reelminder_api_structs::*;
use reqwest::StatusCode;
use std::sync::Arc;

#[derive(Clone)]
pub struct RunClient {
    base: Arc<BaseClient>,
}

impl RunClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    /// Starts a reminder run in the background. The response tells whether
    /// another run was already in progress.
    pub async fn trigger(&self) -> APIResponse<trigger_run::APIResponse> {
        self.base.post((), "run".into(), StatusCode::OK).await
    }
}
