use chrono::{DateTime, Duration, TimeZone, Utc};
use reelminder_domain::{MediaType, RequestRecord};
use reelminder_infra::InMemoryServices;
use serde_json::{json, Value};
use std::time::Duration as StdDuration;

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn upstream_request(id: i64, email: &str, username: &str) -> Value {
    let added = start_time() - Duration::days(100) + Duration::minutes(id);
    json!({
        "id": id,
        "requestedBy": { "email": email, "plexUsername": username },
        "media": {
            "tmdbId": id * 10,
            "ratingKey": format!("{}", id * 100),
            "mediaType": "movie",
            "mediaAddedAt": added.to_rfc3339(),
            "plexUrl": format!("https://app.plex.tv/desktop#!/server/abc/details?key=%2Flibrary%2Fmetadata%2F{}", id * 100),
        }
    })
}

pub fn stored_request(id: i64, email: &str, username: &str) -> RequestRecord {
    let added = start_time() - Duration::days(100) + Duration::minutes(id);
    RequestRecord {
        id,
        media_added_at: added,
        created_at: added,
        tmdb_id: id * 10,
        rating_key: format!("{}", id * 100),
        media_type: MediaType::Movie,
        requester_username: username.into(),
        requester_email: email.into(),
        browser_url: Some("https://plex.example.com/web".into()),
        mobile_url: None,
        poster_url: String::new(),
        watched_at: None,
        email_sent: false,
        skip_email: false,
        eligible_for_email: true,
        title: format!("Title {}", id),
    }
}

/// Waits for a background run to hand `count` reminders to the mailer
pub async fn wait_for_deliveries(services: &InMemoryServices, count: usize) -> bool {
    for _ in 0..100 {
        if services.mailer.deliveries().len() >= count {
            return true;
        }
        actix_web::rt::time::sleep(StdDuration::from_millis(20)).await;
    }
    false
}
