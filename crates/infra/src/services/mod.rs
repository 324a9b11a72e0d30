mod inmemory;
mod overseerr;
mod smtp;
mod tautulli;
mod template;
mod tmdb;

use crate::Config;
pub use inmemory::{
    Delivery, InMemoryMailer, InMemoryPosterProvider, InMemoryRequestSource,
    InMemoryServices, InMemoryWatchHistory,
};
pub use overseerr::OverseerrClient;
use reelminder_domain::{DisplayMetadata, MediaType, WatchEvent};
use reqwest::Client;
use serde_json::Value;
pub use smtp::SmtpMailer;
use std::{sync::Arc, time::Duration};
pub use tautulli::TautulliClient;
pub use template::{ReminderMessage, TemplateRenderer};
pub use tmdb::TmdbClient;

/// Lists fulfilled media requests
#[async_trait::async_trait]
pub trait IRequestSource: Send + Sync {
    /// Raw request documents, newest first. Documents are parsed one by
    /// one by the caller so a single malformed entry stays contained.
    async fn list_available_requests(&self, limit: usize) -> anyhow::Result<Vec<Value>>;
    async fn check_connection(&self) -> anyhow::Result<()>;
}

/// Playback history of the media server
#[async_trait::async_trait]
pub trait IWatchHistory: Send + Sync {
    /// Playbacks of the title by `user`, most recent first. Empty when the
    /// user never watched it.
    async fn has_watched(
        &self,
        user: &str,
        rating_key: &str,
        media_type: MediaType,
    ) -> anyhow::Result<Vec<WatchEvent>>;
    async fn fetch_display_metadata(&self, rating_key: &str) -> anyhow::Result<DisplayMetadata>;
    async fn check_connection(&self) -> anyhow::Result<()>;
}

#[async_trait::async_trait]
pub trait IPosterProvider: Send + Sync {
    /// Empty when no poster could be found
    async fn fetch_poster_url(&self, tmdb_id: i64, media_type: MediaType) -> String;
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub is_html: bool,
}

#[async_trait::async_trait]
pub trait IMailer: Send + Sync {
    /// Returns the address the message was actually handed to
    async fn deliver(&self, mail: &OutgoingMail) -> anyhow::Result<String>;
}

pub trait IMessageRenderer: Send + Sync {
    fn render(&self, message: &ReminderMessage) -> anyhow::Result<String>;
}

#[derive(Clone)]
pub struct Services {
    pub requests: Arc<dyn IRequestSource>,
    pub watch_history: Arc<dyn IWatchHistory>,
    pub posters: Arc<dyn IPosterProvider>,
    pub mailer: Arc<dyn IMailer>,
    pub renderer: Arc<dyn IMessageRenderer>,
}

/// Outbound calls never wait on a collaborator for longer than this
pub(crate) fn http_client() -> reqwest::Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(5))
        .timeout(Duration::from_secs(15))
        .build()
}

impl Services {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = http_client()?;
        Ok(Self {
            requests: Arc::new(OverseerrClient::new(
                client.clone(),
                &config.overseerr_url,
                &config.overseerr_api_key,
            )),
            watch_history: Arc::new(TautulliClient::new(
                client.clone(),
                &config.tautulli_url,
                &config.tautulli_api_key,
            )),
            posters: Arc::new(TmdbClient::new(client, config.tmdb_api_key.clone())),
            mailer: Arc::new(SmtpMailer::new(config.smtp.clone(), config.debug.clone())),
            renderer: Arc::new(TemplateRenderer::new(config.email_template_path.clone())),
        })
    }
}
