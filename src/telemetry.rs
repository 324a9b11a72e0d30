use reelminder_domain::LogLevel;
use reelminder_infra::ILogControl;
use std::sync::Mutex;
use tracing::subscriber::set_global_default;
use tracing::Subscriber;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{layer::SubscriberExt, reload, EnvFilter, Registry};

pub type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Compose multiple layers into a `tracing`'s subscriber.
///
/// `RUST_LOG` takes precedence over `env_filter`. The returned handle swaps
/// the filter while the process runs.
pub fn get_subscriber(
    name: String,
    env_filter: String,
) -> (impl Subscriber + Send + Sync, FilterHandle) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    let formatting_layer = BunyanFormattingLayer::new(name, std::io::stdout);
    let subscriber = Registry::default()
        .with(filter_layer)
        .with(JsonStorageLayer)
        .with(formatting_layer);
    (subscriber, handle)
}

/// Register a subscriber as global default to process span data.
///
/// It should only be called once!
pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) -> anyhow::Result<()> {
    LogTracer::init()?;
    set_global_default(subscriber)?;
    Ok(())
}

/// Log control backed by the reloadable filter of the global subscriber
pub struct ReloadLogControl {
    handle: FilterHandle,
    level: Mutex<LogLevel>,
}

impl ReloadLogControl {
    pub fn new(handle: FilterHandle, level: LogLevel) -> Self {
        Self {
            handle,
            level: Mutex::new(level),
        }
    }
}

impl ILogControl for ReloadLogControl {
    fn level(&self) -> LogLevel {
        *self.level.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_level(&self, level: LogLevel) -> anyhow::Result<()> {
        self.handle
            .reload(EnvFilter::new(level.filter_directive()))?;
        *self.level.lock().unwrap_or_else(|e| e.into_inner()) = level;
        Ok(())
    }
}
