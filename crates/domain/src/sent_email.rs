use crate::{media::MediaType, request::RequestRecord, shared::entity::Entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A delivered reminder. There is at most one per recipient and title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentEmailRecord {
    /// Normalized recipient address
    pub email: String,
    pub tmdb_id: i64,
    pub requester_username: String,
    pub rating_key: String,
    pub title: String,
    pub poster_url: String,
    pub media_type: MediaType,
    pub media_added_at: DateTime<Utc>,
    pub sent_at: DateTime<Utc>,
    pub watched_at: Option<DateTime<Utc>>,
}

impl SentEmailRecord {
    pub fn new(email: String, request: &RequestRecord, title: &str, sent_at: DateTime<Utc>) -> Self {
        Self {
            email,
            tmdb_id: request.tmdb_id,
            requester_username: request.requester_username.clone(),
            rating_key: request.rating_key.clone(),
            title: title.to_string(),
            poster_url: request.poster_url.clone(),
            media_type: request.media_type,
            media_added_at: request.media_added_at,
            sent_at,
            watched_at: None,
        }
    }
}

/// Keyed on recipient and title
impl Entity<(String, i64)> for SentEmailRecord {
    fn id(&self) -> (String, i64) {
        (self.email.clone(), self.tmdb_id)
    }
}
