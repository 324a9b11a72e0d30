use crate::{APIResponse, BaseClient};
use reelminder_api_structs::*;
use reqwest::StatusCode;
use std::sync::Arc;

#[derive(Clone)]
pub struct EmailUserClient {
    base: Arc<BaseClient>,
}

impl EmailUserClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn unsubscribed(&self) -> APIResponse<get_unsubscribed_email_users::APIResponse> {
        self.base
            .get("email-users/unsubscribed".into(), StatusCode::OK)
            .await
    }

    pub async fn unsubscribe(
        &self,
        email: &str,
    ) -> APIResponse<unsubscribe_email_user::APIResponse> {
        let body = unsubscribe_email_user::RequestBody {
            email: email.to_string(),
        };
        self.base
            .post(body, "email-users/unsubscribe".into(), StatusCode::OK)
            .await
    }

    pub async fn resubscribe(
        &self,
        email: &str,
    ) -> APIResponse<resubscribe_email_user::APIResponse> {
        let body = resubscribe_email_user::RequestBody {
            email: email.to_string(),
        };
        self.base
            .post(body, "email-users/resubscribe".into(), StatusCode::OK)
            .await
    }
}
