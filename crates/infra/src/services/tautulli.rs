use super::IWatchHistory;
use anyhow::bail;
use reelminder_domain::{from_unix_seconds, DisplayMetadata, MediaType, WatchEvent};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use tracing::{error, warn};

pub struct TautulliClient {
    client: Client,
    url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    response: ResponseBody<T>,
}

#[derive(Debug, Deserialize)]
struct ResponseBody<T> {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct HistoryPage {
    #[serde(default)]
    data: Vec<HistoryRow>,
}

#[derive(Debug, Deserialize)]
struct HistoryRow {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    full_title: Option<String>,
    #[serde(default)]
    stopped: Option<Value>,
    #[serde(default)]
    date: Option<Value>,
}

impl From<HistoryRow> for WatchEvent {
    fn from(row: HistoryRow) -> Self {
        let watched_at = row
            .stopped
            .as_ref()
            .and_then(from_unix_seconds)
            .or_else(|| row.date.as_ref().and_then(from_unix_seconds));
        if watched_at.is_none() {
            warn!(
                "Watch history entry has no usable time (stopped: {:?}, date: {:?})",
                row.stopped, row.date
            );
        }
        Self {
            title: row.title.or(row.full_title),
            watched_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Metadata {
    #[serde(default)]
    title: Option<String>,
}

impl TautulliClient {
    pub fn new(client: Client, url: &str, api_key: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
            api_key: api_key.to_string(),
        }
    }

    async fn command<T: DeserializeOwned>(
        &self,
        cmd: &str,
        params: &[(&str, &str)],
    ) -> anyhow::Result<ResponseBody<T>> {
        let res = self
            .client
            .get(&self.url)
            .query(&[("apikey", self.api_key.as_str()), ("cmd", cmd)])
            .query(params)
            .send()
            .await
            .map_err(|e| {
                error!("[Network Error] Tautulli {} failed: {:?}", cmd, e);
                e
            })?
            .error_for_status()?;
        let envelope = res.json::<Envelope<T>>().await.map_err(|e| {
            error!("[Unexpected Response] Tautulli {}: {:?}", cmd, e);
            e
        })?;
        Ok(envelope.response)
    }
}

#[async_trait::async_trait]
impl IWatchHistory for TautulliClient {
    async fn has_watched(
        &self,
        user: &str,
        rating_key: &str,
        media_type: MediaType,
    ) -> anyhow::Result<Vec<WatchEvent>> {
        let body = self
            .command::<HistoryPage>(
                "get_history",
                &[
                    ("user", user),
                    ("length", "1"),
                    (media_type.history_key_param(), rating_key),
                ],
            )
            .await?;
        Ok(body
            .data
            .map(|page| page.data.into_iter().map(WatchEvent::from).collect())
            .unwrap_or_default())
    }

    async fn fetch_display_metadata(&self, rating_key: &str) -> anyhow::Result<DisplayMetadata> {
        let body = self
            .command::<Metadata>("get_metadata", &[("rating_key", rating_key)])
            .await?;
        Ok(DisplayMetadata {
            title: body
                .data
                .and_then(|m| m.title)
                .filter(|t| !t.trim().is_empty()),
        })
    }

    async fn check_connection(&self) -> anyhow::Result<()> {
        let body = self.command::<Value>("get_server_info", &[]).await?;
        if body.result.as_deref() != Some("success") {
            bail!(
                "Tautulli answered get_server_info with {:?}: {:?}",
                body.result,
                body.message
            );
        }
        Ok(())
    }
}
