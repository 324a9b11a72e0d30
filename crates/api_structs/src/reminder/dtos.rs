use chrono::{DateTime, Utc};
use reelminder_domain::{EmailUserRecord, MediaType, RequestRecord, SendOutcome, SentEmailRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDTO {
    pub id: i64,
    pub title: String,
    pub media_type: MediaType,
    pub tmdb_id: i64,
    pub rating_key: String,
    pub requester_username: String,
    pub requester_email: String,
    pub media_added_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub browser_url: Option<String>,
    pub mobile_url: Option<String>,
    pub poster_url: String,
    pub watched_at: Option<DateTime<Utc>>,
    pub email_sent: bool,
    pub skip_email: bool,
    pub eligible_for_email: bool,
}

impl RequestDTO {
    pub fn new(request: RequestRecord) -> Self {
        Self {
            id: request.id,
            title: request.title,
            media_type: request.media_type,
            tmdb_id: request.tmdb_id,
            rating_key: request.rating_key,
            requester_username: request.requester_username,
            requester_email: request.requester_email,
            media_added_at: request.media_added_at,
            created_at: request.created_at,
            browser_url: request.browser_url,
            mobile_url: request.mobile_url,
            poster_url: request.poster_url,
            watched_at: request.watched_at,
            email_sent: request.email_sent,
            skip_email: request.skip_email,
            eligible_for_email: request.eligible_for_email,
        }
    }
}

/// An overdue request waiting for its reminder
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingReminderDTO {
    pub id: i64,
    pub title: String,
    pub media_type: MediaType,
    pub plex_username: String,
    pub email: String,
    pub media_added_at: DateTime<Utc>,
    pub poster_url: String,
    /// Not looked at by a run yet
    pub awaiting_cycle: bool,
    pub cooldown_until: Option<DateTime<Utc>>,
}

impl PendingReminderDTO {
    pub fn new(request: RequestRecord, user: Option<&EmailUserRecord>, now: DateTime<Utc>) -> Self {
        Self {
            id: request.id,
            awaiting_cycle: !request.eligible_for_email,
            cooldown_until: user.and_then(|u| u.cooldown_until(now)),
            title: request.title,
            media_type: request.media_type,
            plex_username: request.requester_username,
            email: request.requester_email,
            media_added_at: request.media_added_at,
            poster_url: request.poster_url,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentEmailDTO {
    pub email: String,
    pub tmdb_id: i64,
    pub title: String,
    pub plex_username: String,
    pub media_type: MediaType,
    pub poster_url: String,
    pub media_added_at: DateTime<Utc>,
    pub sent_at: DateTime<Utc>,
    pub watched_at: Option<DateTime<Utc>>,
}

impl SentEmailDTO {
    pub fn new(record: SentEmailRecord) -> Self {
        Self {
            email: record.email,
            tmdb_id: record.tmdb_id,
            title: record.title,
            plex_username: record.requester_username,
            media_type: record.media_type,
            poster_url: record.poster_url,
            media_added_at: record.media_added_at,
            sent_at: record.sent_at,
            watched_at: record.watched_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOutcomeDTO {
    pub sent: bool,
    pub remove_candidate: bool,
    pub message: String,
    pub title: String,
    pub recipient: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    /// False for dry runs: the delivery happened but nothing was recorded
    pub persisted: bool,
}

impl SendOutcomeDTO {
    pub fn new(outcome: SendOutcome) -> Self {
        Self {
            sent: outcome.sent,
            remove_candidate: outcome.remove_candidate,
            message: outcome.message,
            title: outcome.title,
            recipient: outcome.recipient,
            sent_at: outcome.sent_at,
            persisted: outcome.persisted,
        }
    }
}
