use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single playback found in the watch history
#[derive(Debug, Clone, PartialEq)]
pub struct WatchEvent {
    pub title: Option<String>,
    /// When playback stopped, or started if the stop time is unknown.
    /// `None` when the history entry carried no parseable time.
    pub watched_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayMetadata {
    pub title: Option<String>,
}

/// Counters reported by a watch status reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchStatusStats {
    pub checked: usize,
    pub watched: usize,
    pub failed: usize,
}
