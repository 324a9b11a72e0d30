use crate::dtos::{PendingReminderDTO, RequestDTO, SendOutcomeDTO, SentEmailDTO};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct RequestPathParams {
    pub request_id: i64,
}

pub mod get_pending_reminders {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub reminders: Vec<PendingReminderDTO>,
    }
}

pub mod get_sent_emails {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    pub struct QueryParams {
        #[serde(default)]
        pub limit: Option<usize>,
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub emails: Vec<SentEmailDTO>,
    }
}

pub mod send_reminder_now {
    use super::*;

    pub type PathParams = RequestPathParams;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub outcome: SendOutcomeDTO,
    }
}

pub mod skip_request {
    use super::*;

    pub type PathParams = RequestPathParams;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub request: RequestDTO,
        pub message: String,
    }
}
