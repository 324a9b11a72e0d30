use crate::dtos::EmailUserDTO;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailBody {
    pub email: String,
}

pub mod get_unsubscribed_email_users {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub email_users: Vec<EmailUserDTO>,
    }
}

pub mod unsubscribe_email_user {
    use super::*;

    pub type RequestBody = EmailBody;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub email_user: EmailUserDTO,
    }
}

pub mod resubscribe_email_user {
    use super::*;

    pub type RequestBody = EmailBody;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub email: String,
        /// False when the address was not unsubscribed to begin with
        pub was_unsubscribed: bool,
    }
}
