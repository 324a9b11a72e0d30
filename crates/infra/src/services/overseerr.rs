use super::IRequestSource;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::error;

const API_KEY_HEADER: &str = "X-Api-Key";

pub struct OverseerrClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OverseerrClient {
    pub fn new(client: Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    async fn available_requests(&self, take: usize) -> anyhow::Result<reqwest::Response> {
        let res = self
            .client
            .get(&format!("{}/request", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .query(&[
                ("take", take.to_string()),
                ("filter", "available".to_string()),
                ("sort", "added".to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                error!("[Network Error] Overseerr request listing failed: {:?}", e);
                e
            })?;
        Ok(res.error_for_status()?)
    }
}

#[derive(Debug, Deserialize)]
struct RequestPage {
    results: Vec<Value>,
}

#[async_trait::async_trait]
impl IRequestSource for OverseerrClient {
    async fn list_available_requests(&self, limit: usize) -> anyhow::Result<Vec<Value>> {
        let page = self
            .available_requests(limit)
            .await?
            .json::<RequestPage>()
            .await
            .map_err(|e| {
                error!("[Unexpected Response] Overseerr request listing: {:?}", e);
                e
            })?;
        Ok(page.results)
    }

    async fn check_connection(&self) -> anyhow::Result<()> {
        self.available_requests(1).await.map(|_| ())
    }
}
