use anyhow::bail;
use reelminder_domain::LogLevel;
use std::{ops::RangeInclusive, path::PathBuf, str::FromStr, time::Duration};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpEncryption {
    StartTls,
    Ssl,
    None,
}

impl SmtpEncryption {
    fn from_env(raw: Option<String>, port: u16) -> Self {
        match raw.map(|v| v.trim().to_uppercase()).as_deref() {
            Some("SSL") | Some("TLS") => Self::Ssl,
            Some("STARTTLS") => Self::StartTls,
            Some("NONE") => Self::None,
            Some(other) if !other.is_empty() => {
                warn!(
                    "The given SMTP_ENCRYPTION: {} is not valid, choosing based on SMTP_PORT.",
                    other
                );
                Self::for_port(port)
            }
            _ => Self::for_port(port),
        }
    }

    fn for_port(port: u16) -> Self {
        if port == 465 {
            Self::Ssl
        } else {
            Self::StartTls
        }
    }
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// Mail relay host. Reminders cannot be delivered without it.
    pub server: Option<String>,
    pub port: u16,
    pub encryption: SmtpEncryption,
    /// Also used as the login name on the relay
    pub from_address: String,
    pub from_name: String,
    pub password: Option<String>,
    /// Blind copy of every reminder outside of debug mode
    pub bcc_address: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DebugConfig {
    /// Dry run: reminders go to `email` and nothing is persisted
    pub enabled: bool,
    pub email: Option<String>,
    /// Upper bound on reminders sent by a single dry run
    pub max_emails: usize,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    pub overseerr_url: String,
    pub overseerr_api_key: String,
    /// Number of fulfilled requests fetched on each ingestion
    pub overseerr_take: usize,
    pub tautulli_url: String,
    pub tautulli_api_key: String,
    /// Poster lookups are skipped without it
    pub tmdb_api_key: Option<String>,
    pub smtp: SmtpConfig,
    pub debug: DebugConfig,
    /// Name signing the reminders
    pub admin_name: String,
    /// Link to the request site shown in reminders
    pub request_url: String,
    /// Days after availability before a title counts as overdue
    pub days_since_request: i64,
    /// Human readable form of the grace period used in reminders
    pub days_since_request_text: String,
    /// Minimum spacing between two reminders to the same address
    pub hours_between_emails: i64,
    pub email_template_path: Option<PathBuf>,
    /// Initial log verbosity, changeable at runtime
    pub log_level: LogLevel,
    /// Pause after each real delivery
    pub send_throttle: Duration,
    pub job_interval: Duration,
    pub initial_delay: Duration,
    /// How long the scheduler waits for a busy job lock before giving up
    pub job_lock_timeout: Duration,
    /// Initial value of the scheduler flag on a fresh store
    pub disable_scheduler: bool,
}

const REQUIRED_ENV_VARS: [&str; 4] = [
    "OVERSEERR_URL",
    "OVERSEERR_API_KEY",
    "TAUTULLI_URL",
    "TAUTULLI_API_KEY",
];

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: FromStr + ToString>(name: &str, default: T) -> T {
    match optional_env(name) {
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default: {}.",
                    name,
                    raw,
                    default.to_string()
                );
                default
            }
        },
        None => default,
    }
}

fn bool_env(name: &str) -> bool {
    matches!(
        optional_env(name).map(|v| v.trim().to_lowercase()).as_deref(),
        Some("1") | Some("true") | Some("yes") | Some("on")
    )
}

fn bounded_env<T>(name: &str, default: T, bounds: RangeInclusive<T>) -> T
where
    T: FromStr + ToString + PartialOrd + Copy,
{
    let value = parse_env(name, default);
    if bounds.contains(&value) {
        value
    } else {
        warn!(
            "{} must be between {} and {}, falling back to the default: {}.",
            name,
            bounds.start().to_string(),
            bounds.end().to_string(),
            default.to_string()
        );
        default
    }
}

const MAX_DAYS: i64 = 36_500;
const MAX_HOURS: i64 = 87_600;
const MAX_SECONDS: f64 = 1e9;

fn seconds_env(name: &str, default: f64) -> Duration {
    let seconds = parse_env(name, default);
    if seconds.is_finite() && (0.0..=MAX_SECONDS).contains(&seconds) {
        Duration::from_secs_f64(seconds)
    } else {
        warn!(
            "{} must be between 0 and {} seconds, using {}.",
            name, MAX_SECONDS, default
        );
        Duration::from_secs_f64(default)
    }
}

impl Config {
    pub fn new() -> anyhow::Result<Self> {
        let missing = REQUIRED_ENV_VARS
            .iter()
            .filter(|name| optional_env(name).is_none())
            .copied()
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            bail!(
                "Missing required environment variables: {}",
                missing.join(", ")
            );
        }

        let smtp_port = parse_env("SMTP_PORT", 587u16);
        let from_address = optional_env("FROM_EMAIL_ADDRESS").unwrap_or_default();
        let smtp = SmtpConfig {
            server: optional_env("SMTP_SERVER"),
            port: smtp_port,
            encryption: SmtpEncryption::from_env(optional_env("SMTP_ENCRYPTION"), smtp_port),
            from_name: optional_env("FROM_NAME").unwrap_or_else(|| from_address.clone()),
            from_address,
            password: optional_env("EMAIL_PASSWORD"),
            bcc_address: optional_env("BCC_EMAIL_ADDRESS"),
        };
        if smtp.server.is_none() {
            warn!("SMTP_SERVER is not set. Reminders will fail to deliver until it is.");
        }

        let debug_config = DebugConfig {
            enabled: bool_env("DEBUG_MODE"),
            email: optional_env("DEBUG_EMAIL"),
            max_emails: parse_env("DEBUG_MAX_EMAILS", 2usize),
        };
        if debug_config.enabled {
            info!(
                "Debug mode is on. Reminders are redirected and at most {} are sent per run.",
                debug_config.max_emails
            );
        }

        let email_template_path = optional_env("EMAIL_TEMPLATE_PATH").map(PathBuf::from);
        if let Some(path) = &email_template_path {
            info!("Using email template at: {}", path.display());
        }

        let log_level = match optional_env("LOG_LEVEL") {
            Some(raw) => LogLevel::parse(&raw).unwrap_or_else(|| {
                warn!("The given LOG_LEVEL: {} is not valid, falling back to INFO.", raw);
                LogLevel::Info
            }),
            None => LogLevel::Info,
        };

        Ok(Self {
            port: parse_env("PORT", 8741usize),
            overseerr_url: optional_env("OVERSEERR_URL").unwrap_or_default(),
            overseerr_api_key: optional_env("OVERSEERR_API_KEY").unwrap_or_default(),
            overseerr_take: parse_env("OVERSEERR_NUM_OF_HISTORY_RECORDS", 10usize),
            tautulli_url: optional_env("TAUTULLI_URL").unwrap_or_default(),
            tautulli_api_key: optional_env("TAUTULLI_API_KEY").unwrap_or_default(),
            tmdb_api_key: optional_env("THEMOVIEDB_API_KEY"),
            smtp,
            debug: debug_config,
            admin_name: optional_env("ADMIN_NAME").unwrap_or_default(),
            request_url: optional_env("REQUEST_URL").unwrap_or_default(),
            days_since_request: bounded_env("DAYS_SINCE_REQUEST", 90i64, 0..=MAX_DAYS),
            days_since_request_text: optional_env("DAYS_SINCE_REQUEST_EMAIL_TEXT")
                .unwrap_or_else(|| "3 months".into()),
            hours_between_emails: bounded_env("HOURS_BETWEEN_EMAILS", 24i64, 0..=MAX_HOURS),
            email_template_path,
            log_level,
            send_throttle: seconds_env("SEND_THROTTLE_SECONDS", 3.0),
            job_interval: seconds_env("JOB_INTERVAL_SECONDS", 600.0),
            initial_delay: seconds_env("INITIAL_DELAY_SECONDS", 600.0),
            job_lock_timeout: seconds_env("JOB_LOCK_TIMEOUT", 0.1),
            disable_scheduler: bool_env("DISABLE_SCHEDULER"),
        })
    }

    /// Time after availability before a title counts as overdue
    pub fn grace_period(&self) -> chrono::Duration {
        chrono::Duration::try_days(self.days_since_request).unwrap_or(chrono::Duration::MAX)
    }

    pub fn cooldown(&self) -> chrono::Duration {
        chrono::Duration::try_hours(self.hours_between_emails).unwrap_or(chrono::Duration::MAX)
    }
}

impl Default for Config {
    /// Settings for running against local fakes
    fn default() -> Self {
        Self {
            port: 8741,
            overseerr_url: "http://localhost:5055/api/v1".into(),
            overseerr_api_key: "overseerr".into(),
            overseerr_take: 10,
            tautulli_url: "http://localhost:8181/api/v2".into(),
            tautulli_api_key: "tautulli".into(),
            tmdb_api_key: None,
            smtp: SmtpConfig {
                server: None,
                port: 587,
                encryption: SmtpEncryption::StartTls,
                from_address: "reminders@example.com".into(),
                from_name: "Reminders".into(),
                password: None,
                bcc_address: None,
            },
            debug: DebugConfig {
                enabled: false,
                email: None,
                max_emails: 2,
            },
            admin_name: "Admin".into(),
            request_url: String::new(),
            days_since_request: 90,
            days_since_request_text: "3 months".into(),
            hours_between_emails: 24,
            email_template_path: None,
            log_level: LogLevel::Info,
            send_throttle: Duration::from_secs(0),
            job_interval: Duration::from_secs(600),
            initial_delay: Duration::from_secs(600),
            job_lock_timeout: Duration::from_millis(100),
            disable_scheduler: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn encryption_follows_port_unless_set() {
        assert_eq!(SmtpEncryption::from_env(None, 465), SmtpEncryption::Ssl);
        assert_eq!(SmtpEncryption::from_env(None, 587), SmtpEncryption::StartTls);
        assert_eq!(
            SmtpEncryption::from_env(Some("none".into()), 465),
            SmtpEncryption::None
        );
        assert_eq!(
            SmtpEncryption::from_env(Some("bogus".into()), 25),
            SmtpEncryption::StartTls
        );
    }

    fn set_required_env() {
        std::env::set_var("OVERSEERR_URL", "http://overseerr:5055/api/v1");
        std::env::set_var("OVERSEERR_API_KEY", "key");
        std::env::set_var("TAUTULLI_URL", "http://tautulli:8181/api/v2");
        std::env::set_var("TAUTULLI_API_KEY", "key");
    }

    #[test]
    #[serial]
    fn reads_environment_with_fallbacks() {
        set_required_env();
        std::env::set_var("SMTP_PORT", "465");
        std::env::set_var("JOB_LOCK_TIMEOUT", "0.5");
        std::env::set_var("DAYS_SINCE_REQUEST", "soon");
        std::env::set_var("DEBUG_MODE", "True");
        std::env::set_var("LOG_LEVEL", "warning");

        let config = Config::new().unwrap();
        assert_eq!(config.smtp.encryption, SmtpEncryption::Ssl);
        assert_eq!(config.job_lock_timeout, Duration::from_millis(500));
        assert_eq!(config.days_since_request, 90);
        assert!(config.debug.enabled);
        assert_eq!(config.log_level, LogLevel::Warning);
        assert_eq!(config.send_throttle, Duration::from_secs(3));

        for name in [
            "SMTP_PORT",
            "JOB_LOCK_TIMEOUT",
            "DAYS_SINCE_REQUEST",
            "DEBUG_MODE",
            "LOG_LEVEL",
        ] {
            std::env::remove_var(name);
        }
    }

    #[test]
    #[serial]
    fn out_of_range_numbers_fall_back_to_defaults() {
        set_required_env();
        std::env::set_var("DAYS_SINCE_REQUEST", "9223372036854775807");
        std::env::set_var("HOURS_BETWEEN_EMAILS", "-5");
        std::env::set_var("JOB_INTERVAL_SECONDS", "1e30");

        let config = Config::new().unwrap();
        assert_eq!(config.days_since_request, 90);
        assert_eq!(config.hours_between_emails, 24);
        assert_eq!(config.job_interval, Duration::from_secs(600));
        assert_eq!(config.grace_period(), chrono::Duration::days(90));

        for name in ["DAYS_SINCE_REQUEST", "HOURS_BETWEEN_EMAILS", "JOB_INTERVAL_SECONDS"] {
            std::env::remove_var(name);
        }
    }

    #[test]
    fn oversized_windows_saturate() {
        let mut config = Config::default();
        config.days_since_request = i64::MAX;
        config.hours_between_emails = i64::MAX;
        assert_eq!(config.grace_period(), chrono::Duration::MAX);
        assert_eq!(config.cooldown(), chrono::Duration::MAX);
    }

    #[test]
    #[serial]
    fn missing_required_variables() {
        set_required_env();
        std::env::remove_var("TAUTULLI_API_KEY");
        let err = Config::new().unwrap_err();
        assert!(err.to_string().contains("TAUTULLI_API_KEY"));
    }

    #[test]
    fn default_windows() {
        let config = Config::default();
        assert_eq!(config.grace_period(), chrono::Duration::days(90));
        assert_eq!(config.cooldown(), chrono::Duration::hours(24));
    }
}
