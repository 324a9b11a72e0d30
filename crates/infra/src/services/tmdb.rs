use super::IPosterProvider;
use reelminder_domain::MediaType;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

const TMDB_API_BASE_URL: &str = "https://api.themoviedb.org/3";
const TMDB_POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

pub struct TmdbClient {
    client: Client,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbDetails {
    #[serde(default)]
    poster_path: Option<String>,
}

impl TmdbClient {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self { client, api_key }
    }
}

fn poster_url(details: TmdbDetails) -> String {
    match details.poster_path {
        Some(path) if !path.is_empty() => format!("{}{}", TMDB_POSTER_BASE_URL, path),
        _ => String::new(),
    }
}

#[async_trait::async_trait]
impl IPosterProvider for TmdbClient {
    async fn fetch_poster_url(&self, tmdb_id: i64, media_type: MediaType) -> String {
        let api_key = match &self.api_key {
            Some(key) => key,
            None => return String::new(),
        };
        let res = self
            .client
            .get(&format!(
                "{}/{}/{}",
                TMDB_API_BASE_URL,
                media_type.tmdb_path(),
                tmdb_id
            ))
            .query(&[("api_key", api_key)])
            .send()
            .await
            .and_then(|res| res.error_for_status());
        let res = match res {
            Ok(res) => res,
            Err(e) => {
                warn!("TMDB request failed for {} ({}): {:?}", tmdb_id, media_type, e);
                return String::new();
            }
        };
        match res.json::<TmdbDetails>().await {
            Ok(details) => poster_url(details),
            Err(e) => {
                warn!("TMDB returned an unexpected body for {}: {:?}", tmdb_id, e);
                String::new()
            }
        }
    }
}
