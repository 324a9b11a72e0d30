use crate::{APIResponse, BaseClient};
use reelminder_api_structs::*;
use reqwest::StatusCode;
use std::sync::Arc;

#[derive(Clone)]
pub struct ReminderClient {
    base: Arc<BaseClient>,
}

impl ReminderClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn pending(&self) -> APIResponse<get_pending_reminders::APIResponse> {
        self.base
            .get("reminders/pending".into(), StatusCode::OK)
            .await
    }

    pub async fn sent(&self, limit: Option<usize>) -> APIResponse<get_sent_emails::APIResponse> {
        let path = match limit {
            Some(limit) => format!("emails/sent?limit={}", limit),
            None => "emails/sent".into(),
        };
        self.base.get(path, StatusCode::OK).await
    }

    /// Sends the reminder for a request now, skipping the scheduling
    /// controls but not the suppressions
    pub async fn send_now(&self, request_id: i64) -> APIResponse<send_reminder_now::APIResponse> {
        self.base
            .post(
                (),
                format!("requests/{}/send", request_id),
                StatusCode::OK,
            )
            .await
    }

    pub async fn skip(&self, request_id: i64) -> APIResponse<skip_request::APIResponse> {
        self.base
            .post(
                (),
                format!("requests/{}/skip", request_id),
                StatusCode::OK,
            )
            .await
    }
}
