mod eligibility;
mod email_user;
mod log_level;
mod media;
mod plex_url;
mod request;
mod sent_email;
mod setting;
mod shared;
mod timestamp;
mod upstream;
mod watch;

pub use eligibility::{
    cooldown_check, needs_legacy_lookup, pre_lookup_checks, Eligibility, SendOutcome, SendPolicy,
};
pub use email_user::{normalize_email, EmailUserRecord};
pub use log_level::LogLevel;
pub use media::MediaType;
pub use plex_url::{plex_links, PlexLinks};
pub use request::{is_unknown_title, RequestRecord, RequestUpdate, UNKNOWN_TITLE};
pub use sent_email::SentEmailRecord;
pub use setting::{watch_status_check_interval, SchedulerSettings, Setting, SettingKey};
pub use shared::entity::Entity;
pub use timestamp::{from_unix_seconds, parse_timestamp, resolve_timestamp, ResolvedTimestamp};
pub use upstream::{AvailableRequest, DataError, MEDIA_ADDED_FIELDS};
pub use watch::{DisplayMetadata, WatchEvent, WatchStatusStats};
