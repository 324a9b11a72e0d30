use crate::{
    email_user::{cooldown_end, EmailUserRecord},
    request::RequestRecord,
};
use chrono::{DateTime, Duration, Utc};

/// Verdict on a single reminder candidate
#[derive(Debug, Clone, PartialEq)]
pub enum Eligibility {
    Send,
    /// First time the candidate is looked at. It becomes eligible next run.
    DeferCycle,
    DeferCooldown {
        until: DateTime<Utc>,
    },
    SuppressUnsubscribed,
    SuppressAlreadySent,
    SuppressAlreadyWatched {
        watched_title: String,
    },
    SuppressMissingData,
}

impl Eligibility {
    /// Whether the candidate is retired from the user's queue. Deferred and
    /// unsubscribed candidates stay so they are looked at again next run.
    pub fn removes_candidate(&self) -> bool {
        match self {
            Self::Send
            | Self::SuppressAlreadySent
            | Self::SuppressAlreadyWatched { .. }
            | Self::SuppressMissingData => true,
            Self::DeferCycle | Self::DeferCooldown { .. } | Self::SuppressUnsubscribed => false,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Send => "Ready to send.".into(),
            Self::DeferCycle => "Waiting one scheduler cycle before emailing.".into(),
            Self::DeferCooldown { until } => format!(
                "Cooldown active until {}.",
                until.format("%Y-%m-%d %H:%M")
            ),
            Self::SuppressUnsubscribed => "Address is unsubscribed; reminder not sent.".into(),
            Self::SuppressAlreadySent => "Reminder already sent for this title.".into(),
            Self::SuppressAlreadyWatched { watched_title } => format!(
                "{} already appears watched; reminder not sent.",
                watched_title
            ),
            Self::SuppressMissingData => "Missing email address for request.".into(),
        }
    }
}

/// Which of the send controls apply to an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendPolicy {
    pub respect_cycle: bool,
    pub respect_cooldown: bool,
    pub perform_db_updates: bool,
    pub allow_throttle_delay: bool,
}

impl SendPolicy {
    /// Attempts made by a reminder run
    pub fn scheduled(debug_mode: bool) -> Self {
        Self {
            respect_cycle: true,
            respect_cooldown: true,
            perform_db_updates: !debug_mode,
            allow_throttle_delay: !debug_mode,
        }
    }

    /// Attempts made on operator request. These skip the cycle and cooldown
    /// controls but still honour every suppression.
    pub fn manual(debug_mode: bool) -> Self {
        Self {
            respect_cycle: false,
            respect_cooldown: false,
            perform_db_updates: !debug_mode,
            allow_throttle_delay: false,
        }
    }
}

/// Checks that need nothing but the stored records: a recipient must be
/// present, the candidate must have waited one cycle and the recipient must
/// not be unsubscribed. `user` is the freshly read record of the recipient.
pub fn pre_lookup_checks(
    request: &RequestRecord,
    user: Option<&EmailUserRecord>,
    policy: &SendPolicy,
) -> Option<Eligibility> {
    if request.normalized_email().is_none() {
        return Some(Eligibility::SuppressMissingData);
    }
    if policy.respect_cycle && !request.eligible_for_email {
        return Some(Eligibility::DeferCycle);
    }
    if user.map(|u| u.is_unsubscribed()).unwrap_or(false) {
        return Some(Eligibility::SuppressUnsubscribed);
    }
    None
}

/// The legacy fallback only applies to recipients without cooldown state
pub fn needs_legacy_lookup(user: Option<&EmailUserRecord>, policy: &SendPolicy) -> bool {
    policy.respect_cooldown && user.map(|u| u.last_email_at.is_none()).unwrap_or(true)
}

/// Per-recipient spacing between reminders. `legacy_last_sent` is the most
/// recent delivery to the recipient found in the sent log and is only
/// consulted when the recipient has no cooldown state of its own.
pub fn cooldown_check(
    user: Option<&EmailUserRecord>,
    legacy_last_sent: Option<DateTime<Utc>>,
    policy: &SendPolicy,
    cooldown: Duration,
    now: DateTime<Utc>,
) -> Option<Eligibility> {
    if !policy.respect_cooldown {
        return None;
    }
    if let Some(until) = user.and_then(|u| u.cooldown_until(now)) {
        return Some(Eligibility::DeferCooldown { until });
    }
    if needs_legacy_lookup(user, policy) {
        if let Some(last_sent) = legacy_last_sent {
            let until = cooldown_end(last_sent, cooldown);
            if until > now {
                return Some(Eligibility::DeferCooldown { until });
            }
        }
    }
    None
}

/// What a send attempt amounted to
#[derive(Debug, Clone, PartialEq)]
pub struct SendOutcome {
    pub sent: bool,
    pub remove_candidate: bool,
    pub message: String,
    pub title: String,
    /// Address the message was actually handed to
    pub recipient: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    /// False when a delivery happened but bookkeeping was skipped
    pub persisted: bool,
}

impl SendOutcome {
    pub fn not_sent(eligibility: &Eligibility, title: String) -> Self {
        Self {
            sent: false,
            remove_candidate: eligibility.removes_candidate(),
            message: eligibility.message(),
            title,
            recipient: None,
            sent_at: None,
            persisted: false,
        }
    }

    pub fn delivered(
        title: String,
        recipient: String,
        sent_at: DateTime<Utc>,
        persisted: bool,
    ) -> Self {
        Self {
            sent: true,
            remove_candidate: true,
            message: format!("Sent reminder for {} to {}.", title, recipient),
            title,
            recipient: Some(recipient),
            sent_at: Some(sent_at),
            persisted,
        }
    }
}
