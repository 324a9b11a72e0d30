use crate::{
    email_user::normalize_email, media::MediaType, plex_url::PlexLinks,
    shared::entity::Entity, upstream::AvailableRequest,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Title used until the real one has been looked up
pub const UNKNOWN_TITLE: &str = "Unknown";

/// A fulfilled media request as seen by the reminder job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestRecord {
    /// Identifier assigned by the request source
    pub id: i64,
    pub media_added_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub tmdb_id: i64,
    pub rating_key: String,
    pub media_type: MediaType,
    pub requester_username: String,
    /// May be empty when the requester has no address on file
    pub requester_email: String,
    pub browser_url: Option<String>,
    pub mobile_url: Option<String>,
    pub poster_url: String,
    pub watched_at: Option<DateTime<Utc>>,
    pub email_sent: bool,
    /// Operator override, never send for this record
    pub skip_email: bool,
    /// Set once the record has survived one run without being sent
    pub eligible_for_email: bool,
    pub title: String,
}

impl RequestRecord {
    pub fn from_upstream(
        request: &AvailableRequest,
        links: PlexLinks,
        poster_url: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: request.id,
            media_added_at: request
                .media_added_at
                .as_ref()
                .map(|resolved| resolved.at)
                .unwrap_or(now),
            created_at: now,
            tmdb_id: request.tmdb_id,
            rating_key: request.rating_key.clone(),
            media_type: request.media_type,
            requester_username: request.requester_username.clone(),
            requester_email: request.requester_email.trim().to_string(),
            browser_url: links.browser,
            mobile_url: request.ios_plex_url.clone().or(links.mobile),
            poster_url,
            watched_at: None,
            email_sent: false,
            skip_email: false,
            eligible_for_email: false,
            title: UNKNOWN_TITLE.to_string(),
        }
    }

    pub fn has_known_title(&self) -> bool {
        !is_unknown_title(&self.title)
    }

    pub fn normalized_email(&self) -> Option<String> {
        normalize_email(&self.requester_email)
    }

    /// Media became available longer than `grace` ago
    pub fn is_overdue(&self, now: DateTime<Utc>, grace: Duration) -> bool {
        match now.checked_sub_signed(grace) {
            Some(cutoff) => self.media_added_at <= cutoff,
            None => false,
        }
    }

    /// Not watched, not reminded and not skipped by the operator
    pub fn is_unresolved(&self) -> bool {
        self.watched_at.is_none() && !self.email_sent && !self.skip_email
    }

    /// Whether a run should queue this record for its requester
    pub fn is_reminder_candidate(&self, now: DateTime<Utc>, grace: Duration) -> bool {
        self.is_unresolved()
            && self.is_overdue(now, grace)
            && self.normalized_email().is_some()
            && self.has_known_title()
    }

    pub fn apply(&mut self, update: &RequestUpdate) {
        if let Some(title) = &update.title {
            self.title = title.clone();
        }
        if let Some(watched_at) = update.watched_at {
            self.watched_at = Some(watched_at);
        }
        if let Some(email_sent) = update.email_sent {
            self.email_sent = email_sent;
        }
        if let Some(skip_email) = update.skip_email {
            self.skip_email = skip_email;
        }
        if let Some(eligible) = update.eligible_for_email {
            self.eligible_for_email = eligible;
        }
    }
}

impl Entity<i64> for RequestRecord {
    fn id(&self) -> i64 {
        self.id
    }
}

pub fn is_unknown_title(title: &str) -> bool {
    let title = title.trim();
    title.is_empty() || title == UNKNOWN_TITLE
}

/// The fields of a [`RequestRecord`] a single store update changes. Unset
/// fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestUpdate {
    pub title: Option<String>,
    pub watched_at: Option<DateTime<Utc>>,
    pub email_sent: Option<bool>,
    pub skip_email: Option<bool>,
    pub eligible_for_email: Option<bool>,
}

impl RequestUpdate {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn watched(at: DateTime<Utc>) -> Self {
        Self {
            watched_at: Some(at),
            ..Default::default()
        }
    }

    pub fn email_sent() -> Self {
        Self {
            email_sent: Some(true),
            ..Default::default()
        }
    }

    pub fn skip_email() -> Self {
        Self {
            skip_email: Some(true),
            ..Default::default()
        }
    }

    pub fn eligible_for_email() -> Self {
        Self {
            eligible_for_email: Some(true),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    pub fn record(id: i64, email: &str, added: DateTime<Utc>) -> RequestRecord {
        RequestRecord {
            id,
            media_added_at: added,
            created_at: added,
            tmdb_id: id * 10,
            rating_key: format!("{}", id * 100),
            media_type: MediaType::Movie,
            requester_username: "neo".into(),
            requester_email: email.into(),
            browser_url: None,
            mobile_url: None,
            poster_url: String::new(),
            watched_at: None,
            email_sent: false,
            skip_email: false,
            eligible_for_email: true,
            title: "Inception".into(),
        }
    }

    #[test]
    fn overdue_after_grace_period() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let grace = Duration::days(90);
        assert!(record(1, "a@x.com", now - Duration::days(91)).is_overdue(now, grace));
        assert!(record(1, "a@x.com", now - Duration::days(90)).is_overdue(now, grace));
        assert!(!record(1, "a@x.com", now - Duration::days(89)).is_overdue(now, grace));
    }

    #[test]
    fn oversized_grace_period_is_never_overdue() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let old = record(1, "a@x.com", now - Duration::days(3650));
        assert!(!old.is_overdue(now, Duration::MAX));
    }

    #[test]
    fn candidate_requires_everything() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let grace = Duration::days(90);
        let base = record(1, "a@x.com", now - Duration::days(91));
        assert!(base.is_reminder_candidate(now, grace));

        let mut watched = base.clone();
        watched.watched_at = Some(now);
        assert!(!watched.is_reminder_candidate(now, grace));

        let mut skipped = base.clone();
        skipped.skip_email = true;
        assert!(!skipped.is_reminder_candidate(now, grace));

        let mut unknown = base.clone();
        unknown.title = UNKNOWN_TITLE.into();
        assert!(!unknown.is_reminder_candidate(now, grace));

        let mut no_email = base;
        no_email.requester_email = " ".into();
        assert!(!no_email.is_reminder_candidate(now, grace));
    }

    #[test]
    fn update_only_touches_named_fields() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let mut rec = record(1, "a@x.com", now);
        rec.eligible_for_email = false;
        rec.apply(&RequestUpdate::email_sent().with_title("Matrix"));
        assert!(rec.email_sent);
        assert_eq!(rec.title, "Matrix");
        assert!(!rec.eligible_for_email);
        assert!(rec.watched_at.is_none());
        assert!(RequestUpdate::default().is_empty());
    }
}
