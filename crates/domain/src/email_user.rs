use crate::shared::entity::Entity;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Canonical form of a recipient address: trimmed and lower-cased. Empty
/// addresses have no canonical form.
pub fn normalize_email(raw: &str) -> Option<String> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        None
    } else {
        Some(email)
    }
}

/// Delivery state for a single recipient address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailUserRecord {
    /// Normalized address, see [`normalize_email`]
    pub email: String,
    pub last_email_at: Option<DateTime<Utc>>,
    /// Cooldown expiry. No reminder goes out to this address before it.
    pub next_email_at: Option<DateTime<Utc>>,
    pub unsubscribed_at: Option<DateTime<Utc>>,
}

impl EmailUserRecord {
    pub fn new(email: String) -> Self {
        Self {
            email,
            last_email_at: None,
            next_email_at: None,
            unsubscribed_at: None,
        }
    }

    pub fn is_unsubscribed(&self) -> bool {
        self.unsubscribed_at.is_some()
    }

    /// The cooldown expiry if it lies after `now`
    pub fn cooldown_until(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.next_email_at.filter(|next| *next > now)
    }

    pub fn record_send(&mut self, sent_at: DateTime<Utc>, cooldown: Duration) {
        self.last_email_at = Some(sent_at);
        self.next_email_at = Some(cooldown_end(sent_at, cooldown));
    }
}

/// End of the cooldown started by a delivery at `sent_at`. Saturates at the
/// latest representable time.
pub fn cooldown_end(sent_at: DateTime<Utc>, cooldown: Duration) -> DateTime<Utc> {
    sent_at
        .checked_add_signed(cooldown)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

impl Entity<String> for EmailUserRecord {
    fn id(&self) -> String {
        self.email.clone()
    }
}
