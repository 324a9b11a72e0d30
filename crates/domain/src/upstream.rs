use crate::{
    media::MediaType,
    timestamp::{resolve_timestamp, ResolvedTimestamp},
};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Fields of an upstream media document that may carry the availability
/// time, in priority order
pub const MEDIA_ADDED_FIELDS: [&str; 2] = ["mediaAddedAt", "mediaAddedDate"];

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Malformed request document: {0}")]
    Malformed(String),
    #[error("Request {0} has no rating key yet")]
    MissingRatingKey(i64),
}

/// A fulfilled request as listed by the request source
#[derive(Debug, Clone, PartialEq)]
pub struct AvailableRequest {
    pub id: i64,
    pub requester_email: String,
    pub requester_username: String,
    pub tmdb_id: i64,
    pub rating_key: String,
    pub media_type: MediaType,
    /// `None` when no candidate field held a parseable timestamp
    pub media_added_at: Option<ResolvedTimestamp>,
    pub plex_url: Option<String>,
    pub ios_plex_url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRequest {
    id: i64,
    requested_by: RawRequester,
    media: Map<String, Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRequester {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    plex_username: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMedia {
    tmdb_id: i64,
    #[serde(default)]
    rating_key: Option<Value>,
    media_type: String,
    #[serde(default)]
    plex_url: Option<String>,
    #[serde(default)]
    media_url: Option<String>,
    #[serde(default, rename = "iOSPlexUrl")]
    ios_plex_url: Option<String>,
}

fn rating_key(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(key) if !key.trim().is_empty() => Some(key.trim().to_string()),
        Value::Number(key) => Some(key.to_string()),
        _ => None,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl TryFrom<&Value> for AvailableRequest {
    type Error = DataError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let raw: RawRequest = serde_json::from_value(value.clone())
            .map_err(|e| DataError::Malformed(e.to_string()))?;
        let media: RawMedia = serde_json::from_value(Value::Object(raw.media.clone()))
            .map_err(|e| DataError::Malformed(format!("request {}: {}", raw.id, e)))?;
        let rating_key =
            rating_key(media.rating_key).ok_or(DataError::MissingRatingKey(raw.id))?;
        let requester_username = raw
            .requested_by
            .plex_username
            .or(raw.requested_by.display_name)
            .unwrap_or_default();

        Ok(Self {
            id: raw.id,
            requester_email: raw.requested_by.email.unwrap_or_default().trim().to_string(),
            requester_username,
            tmdb_id: media.tmdb_id,
            rating_key,
            media_type: MediaType::from(media.media_type.as_str()),
            media_added_at: resolve_timestamp(&raw.media, &MEDIA_ADDED_FIELDS),
            plex_url: non_empty(media.plex_url).or_else(|| non_empty(media.media_url)),
            ios_plex_url: non_empty(media.ios_plex_url),
        })
    }
}
