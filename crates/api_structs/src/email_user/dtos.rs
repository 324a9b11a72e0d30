use chrono::{DateTime, Utc};
use reelminder_domain::EmailUserRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailUserDTO {
    pub email: String,
    pub last_email_at: Option<DateTime<Utc>>,
    pub next_email_at: Option<DateTime<Utc>>,
    pub unsubscribed_at: Option<DateTime<Utc>>,
}

impl EmailUserDTO {
    pub fn new(user: EmailUserRecord) -> Self {
        Self {
            email: user.email,
            last_email_at: user.last_email_at,
            next_email_at: user.next_email_at,
            unsubscribed_at: user.unsubscribed_at,
        }
    }
}
