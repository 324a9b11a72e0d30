use super::{
    IMailer, IPosterProvider, IRequestSource, IWatchHistory, OutgoingMail, Services,
    TemplateRenderer,
};
use anyhow::bail;
use reelminder_domain::{DisplayMetadata, MediaType, WatchEvent};
use serde_json::Value;
use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

/// Collaborators that keep everything in memory. Used for testing.
pub struct InMemoryServices {
    pub requests: Arc<InMemoryRequestSource>,
    pub watch_history: Arc<InMemoryWatchHistory>,
    pub posters: Arc<InMemoryPosterProvider>,
    pub mailer: Arc<InMemoryMailer>,
}

impl InMemoryServices {
    pub fn new() -> Self {
        Self {
            requests: Arc::new(InMemoryRequestSource::new()),
            watch_history: Arc::new(InMemoryWatchHistory::new()),
            posters: Arc::new(InMemoryPosterProvider::new()),
            mailer: Arc::new(InMemoryMailer::new()),
        }
    }

    pub fn services(&self) -> Services {
        Services {
            requests: self.requests.clone(),
            watch_history: self.watch_history.clone(),
            posters: self.posters.clone(),
            mailer: self.mailer.clone(),
            renderer: Arc::new(TemplateRenderer::new(None)),
        }
    }
}

impl Default for InMemoryServices {
    fn default() -> Self {
        Self::new()
    }
}

pub struct InMemoryRequestSource {
    requests: Mutex<Vec<Value>>,
    unreachable: AtomicBool,
}

impl InMemoryRequestSource {
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(vec![]),
            unreachable: AtomicBool::new(false),
        }
    }

    pub fn push(&self, request: Value) {
        self.requests.lock().unwrap().push(request);
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    fn ensure_reachable(&self) -> anyhow::Result<()> {
        if self.unreachable.load(Ordering::SeqCst) {
            bail!("Request source is unreachable");
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl IRequestSource for InMemoryRequestSource {
    async fn list_available_requests(&self, limit: usize) -> anyhow::Result<Vec<Value>> {
        self.ensure_reachable()?;
        let requests = self.requests.lock().unwrap();
        Ok(requests.iter().rev().take(limit).cloned().collect())
    }

    async fn check_connection(&self) -> anyhow::Result<()> {
        self.ensure_reachable()
    }
}

pub struct InMemoryWatchHistory {
    watches: Mutex<Vec<(String, String, WatchEvent)>>,
    titles: Mutex<HashMap<String, String>>,
    failing_keys: Mutex<HashSet<String>>,
    unreachable: AtomicBool,
    lookups: AtomicUsize,
}

impl InMemoryWatchHistory {
    pub fn new() -> Self {
        Self {
            watches: Mutex::new(vec![]),
            titles: Mutex::new(HashMap::new()),
            failing_keys: Mutex::new(HashSet::new()),
            unreachable: AtomicBool::new(false),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn add_watch(&self, user: &str, rating_key: &str, event: WatchEvent) {
        self.watches
            .lock()
            .unwrap()
            .push((user.to_string(), rating_key.to_string(), event));
    }

    pub fn set_title(&self, rating_key: &str, title: &str) {
        self.titles
            .lock()
            .unwrap()
            .insert(rating_key.to_string(), title.to_string());
    }

    /// History lookups for `rating_key` fail from now on
    pub fn fail_for(&self, rating_key: &str) {
        self.failing_keys
            .lock()
            .unwrap()
            .insert(rating_key.to_string());
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Number of history lookups served so far
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IWatchHistory for InMemoryWatchHistory {
    async fn has_watched(
        &self,
        user: &str,
        rating_key: &str,
        _media_type: MediaType,
    ) -> anyhow::Result<Vec<WatchEvent>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.unreachable.load(Ordering::SeqCst)
            || self.failing_keys.lock().unwrap().contains(rating_key)
        {
            bail!("Watch history lookup for {} failed", rating_key);
        }
        let watches = self.watches.lock().unwrap();
        Ok(watches
            .iter()
            .filter(|(u, key, _)| u == user && key == rating_key)
            .map(|(_, _, event)| event.clone())
            .collect())
    }

    async fn fetch_display_metadata(&self, rating_key: &str) -> anyhow::Result<DisplayMetadata> {
        if self.failing_keys.lock().unwrap().contains(rating_key) {
            bail!("Metadata lookup for {} failed", rating_key);
        }
        Ok(DisplayMetadata {
            title: self.titles.lock().unwrap().get(rating_key).cloned(),
        })
    }

    async fn check_connection(&self) -> anyhow::Result<()> {
        if self.unreachable.load(Ordering::SeqCst) {
            bail!("Watch history is unreachable");
        }
        Ok(())
    }
}

pub struct InMemoryPosterProvider {
    posters: Mutex<HashMap<i64, String>>,
}

impl InMemoryPosterProvider {
    pub fn new() -> Self {
        Self {
            posters: Mutex::new(HashMap::new()),
        }
    }

    pub fn set_poster(&self, tmdb_id: i64, url: &str) {
        self.posters.lock().unwrap().insert(tmdb_id, url.to_string());
    }
}

#[async_trait::async_trait]
impl IPosterProvider for InMemoryPosterProvider {
    async fn fetch_poster_url(&self, tmdb_id: i64, _media_type: MediaType) -> String {
        self.posters
            .lock()
            .unwrap()
            .get(&tmdb_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub mail: OutgoingMail,
    pub recipient: String,
}

pub struct InMemoryMailer {
    deliveries: Mutex<Vec<Delivery>>,
    failing: AtomicBool,
}

impl InMemoryMailer {
    pub fn new() -> Self {
        Self {
            deliveries: Mutex::new(vec![]),
            failing: AtomicBool::new(false),
        }
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl IMailer for InMemoryMailer {
    async fn deliver(&self, mail: &OutgoingMail) -> anyhow::Result<String> {
        if self.failing.load(Ordering::SeqCst) {
            bail!("Mail relay refused the message for {}", mail.to);
        }
        self.deliveries.lock().unwrap().push(Delivery {
            mail: mail.clone(),
            recipient: mail.to.clone(),
        });
        Ok(mail.to.clone())
    }
}
