mod config;
mod email_users;
mod lock;
mod log_control;
mod repos;
mod services;
mod system;

pub use config::{Config, DebugConfig, SmtpConfig, SmtpEncryption};
pub use email_users::EmailUsers;
pub use lock::{IJobLock, InMemoryJobLock, JobLockGuard, LockAcquisition, PostgresJobLock};
pub use log_control::{ILogControl, InMemoryLogControl};
pub use repos::{IEmailUserRepo, IRequestRepo, ISentEmailRepo, ISettingRepo, Repos};
pub use services::*;
use sqlx::migrate::MigrateError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::Arc;
pub use system::{ISys, RealSys, StaticTimeSys};
use reelminder_domain::{Setting, SettingKey};
use tracing::info;

#[derive(Clone)]
pub struct ReelminderContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub services: Services,
    /// Serialized access to recipient state
    pub email_users: EmailUsers,
    pub job_lock: Arc<dyn IJobLock>,
    pub log_control: Arc<dyn ILogControl>,
}

struct ContextParams {
    pub postgres_connection_string: String,
}

impl ReelminderContext {
    async fn create(params: ContextParams) -> anyhow::Result<Self> {
        let config = Config::new()?;
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&params.postgres_connection_string)
            .await?;
        run_migration(&pool).await?;
        info!("Database migrations are up to date");

        let repos = Repos::create_postgres(pool.clone());
        let services = Services::from_config(&config)?;
        let ctx = Self {
            email_users: EmailUsers::new(repos.email_users.clone()),
            job_lock: Arc::new(PostgresJobLock::new(pool)),
            log_control: Arc::new(InMemoryLogControl::new(config.log_level)),
            repos,
            config,
            sys: Arc::new(RealSys {}),
            services,
        };
        ctx.seed_settings().await?;
        Ok(ctx)
    }

    /// Context backed by inmemory repos and the given collaborators
    pub fn create_inmemory(config: Config, services: Services, sys: Arc<dyn ISys>) -> Self {
        let repos = Repos::create_inmemory();
        Self {
            email_users: EmailUsers::new(repos.email_users.clone()),
            job_lock: Arc::new(InMemoryJobLock::new()),
            log_control: Arc::new(InMemoryLogControl::new(config.log_level)),
            repos,
            config,
            sys,
            services,
        }
    }

    /// Stores the initial scheduler flag on a fresh store. Later restarts
    /// keep whatever the operator chose.
    pub async fn seed_settings(&self) -> anyhow::Result<()> {
        let inserted = self
            .repos
            .settings
            .insert_if_absent(&Setting::new(
                SettingKey::SchedulerDisabled,
                serde_json::Value::Bool(self.config.disable_scheduler),
            ))
            .await?;
        if inserted {
            info!(
                "Initialized scheduler setting, scheduler disabled: {}",
                self.config.disable_scheduler
            );
        }
        Ok(())
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> anyhow::Result<ReelminderContext> {
    ReelminderContext::create(ContextParams {
        postgres_connection_string: get_psql_connection_string()?,
    })
    .await
}

fn get_psql_connection_string() -> anyhow::Result<String> {
    const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

    std::env::var(PSQL_CONNECTION_STRING)
        .map_err(|_| anyhow::anyhow!("{} env var to be present.", PSQL_CONNECTION_STRING))
}

pub async fn connect_postgres() -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&get_psql_connection_string()?)
        .await?;
    run_migration(&pool).await?;
    Ok(pool)
}

pub async fn run_migration(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!().run(pool).await
}
