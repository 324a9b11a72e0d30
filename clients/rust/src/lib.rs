mod base;
mod email_user;
mod reminder;
mod run;
mod settings;
mod status;

pub(crate) use base::BaseClient;
pub use base::{APIError, APIErrorVariant, APIResponse};
use email_user::EmailUserClient;
pub use reelminder_api_structs::dtos::*;
pub use reelminder_domain::MediaType;
use reminder::ReminderClient;
use run::RunClient;
use settings::SettingsClient;
use status::StatusClient;
use std::sync::Arc;

// Domain
pub use reelminder_api_structs::dtos::EmailUserDTO as EmailUser;
pub use reelminder_api_structs::dtos::LogLevelDTO as LogLevel;
pub use reelminder_api_structs::dtos::PendingReminderDTO as PendingReminder;
pub use reelminder_api_structs::dtos::RequestDTO as Request;
pub use reelminder_api_structs::dtos::SendOutcomeDTO as SendOutcome;
pub use reelminder_api_structs::dtos::SentEmailDTO as SentEmail;
pub use reelminder_api_structs::dtos::SettingsDTO as Settings;
pub use reelminder_api_structs::dtos::WatchStatusStatsDTO as WatchStatusStats;

/// Reelminder Server SDK
///
/// The SDK contains methods for interacting with the Reelminder operator
/// API. `address` is the api root, e.g. `http://localhost:8741/api/v1`.
#[derive(Clone)]
pub struct ReelminderSDK {
    pub email_user: EmailUserClient,
    pub reminder: ReminderClient,
    pub run: RunClient,
    pub settings: SettingsClient,
    pub status: StatusClient,
}

impl ReelminderSDK {
    pub fn new(address: String) -> Self {
        let base = Arc::new(BaseClient::new(address));
        let email_user = EmailUserClient::new(base.clone());
        let reminder = ReminderClient::new(base.clone());
        let run = RunClient::new(base.clone());
        let settings = SettingsClient::new(base.clone());
        let status = StatusClient::new(base);

        Self {
            email_user,
            reminder,
            run,
            settings,
            status,
        }
    }
}
