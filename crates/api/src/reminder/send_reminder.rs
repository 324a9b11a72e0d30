use crate::shared::usecase::UseCase;
use reelminder_domain::{
    cooldown_check, is_unknown_title, needs_legacy_lookup, pre_lookup_checks, Eligibility,
    RequestRecord, RequestUpdate, SendOutcome, SendPolicy, SentEmailRecord,
};
use reelminder_infra::{OutgoingMail, ReelminderContext, ReminderMessage};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

/// Failures that end a send attempt. Suppressions and deferrals are not
/// errors, they are reported through [`SendOutcome`].
#[derive(Error, Debug)]
pub enum SendError {
    #[error("Watch history lookup failed: {0}")]
    WatchHistory(anyhow::Error),
    #[error("Title lookup failed: {0}")]
    Metadata(anyhow::Error),
    #[error("Reminder could not be rendered: {0}")]
    Template(anyhow::Error),
    #[error("Reminder delivery failed: {0}")]
    Delivery(anyhow::Error),
    #[error("Storage error: {0}")]
    Storage(anyhow::Error),
}

pub fn reminder_subject(title: &str) -> String {
    format!("Plex Reminder: {} is available and unwatched", title)
}

/// Decides whether the reminder for a single request goes out now and
/// delivers it when it does
#[derive(Debug)]
pub struct SendReminderUseCase {
    pub request: RequestRecord,
    /// Titles resolved earlier in the same run, by request id
    pub title_overrides: HashMap<i64, String>,
    pub policy: SendPolicy,
}

impl SendReminderUseCase {
    fn initial_title(&self) -> String {
        self.title_overrides
            .get(&self.request.id)
            .filter(|title| !is_unknown_title(title))
            .cloned()
            .unwrap_or_else(|| self.request.title.clone())
    }

    async fn update_request(
        &self,
        ctx: &ReelminderContext,
        update: RequestUpdate,
    ) -> Result<(), SendError> {
        ctx.repos
            .requests
            .update(self.request.id, &update)
            .await
            .map(|_| ())
            .map_err(SendError::Storage)
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for SendReminderUseCase {
    type Response = SendOutcome;

    type Error = SendError;

    const NAME: &'static str = "SendReminder";

    async fn execute(&mut self, ctx: &ReelminderContext) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.now();
        let request = &self.request;
        let mut title = self.initial_title();

        let user = ctx
            .email_users
            .ensure(&request.requester_email)
            .await
            .map_err(SendError::Storage)?;

        if let Some(verdict) = pre_lookup_checks(request, user.as_ref(), &self.policy) {
            match verdict {
                Eligibility::DeferCycle => {
                    self.update_request(ctx, RequestUpdate::eligible_for_email())
                        .await?;
                    info!(
                        "Deferring email for {}; waiting one scheduler cycle.",
                        request.requester_email
                    );
                }
                Eligibility::SuppressMissingData => {
                    info!("Skipping request {}; missing email address.", request.id)
                }
                _ => info!(
                    "Skipping email to {} for {}; {}",
                    request.requester_email,
                    title,
                    verdict.message()
                ),
            }
            return Ok(SendOutcome::not_sent(&verdict, title));
        }
        // Checked by pre_lookup_checks
        let email = match request.normalized_email() {
            Some(email) => email,
            None => {
                return Ok(SendOutcome::not_sent(
                    &Eligibility::SuppressMissingData,
                    title,
                ))
            }
        };

        let watches = ctx
            .services
            .watch_history
            .has_watched(
                &request.requester_username,
                &request.rating_key,
                request.media_type,
            )
            .await
            .map_err(SendError::WatchHistory)?;
        if let Some(watch) = watches.first() {
            self.update_request(ctx, RequestUpdate::watched(now)).await?;
            let verdict = Eligibility::SuppressAlreadyWatched {
                watched_title: watch.title.clone().unwrap_or_else(|| title.clone()),
            };
            info!("{} Recipient: {}", verdict.message(), email);
            return Ok(SendOutcome::not_sent(&verdict, title));
        }

        if is_unknown_title(&title) {
            let metadata = ctx
                .services
                .watch_history
                .fetch_display_metadata(&request.rating_key)
                .await
                .map_err(SendError::Metadata)?;
            if let Some(resolved) = metadata.title.filter(|t| !is_unknown_title(t)) {
                title = resolved;
                self.update_request(ctx, RequestUpdate::title(title.clone()))
                    .await?;
            }
        }

        let already_sent = ctx
            .repos
            .sent_emails
            .find(&email, request.tmdb_id)
            .await
            .map_err(SendError::Storage)?;
        if already_sent.is_some() {
            self.update_request(ctx, RequestUpdate::email_sent()).await?;
            info!("Skipping email to {} for {} (already notified).", email, title);
            return Ok(SendOutcome::not_sent(
                &Eligibility::SuppressAlreadySent,
                title,
            ));
        }

        let legacy_last_sent = if needs_legacy_lookup(user.as_ref(), &self.policy) {
            ctx.repos
                .sent_emails
                .find_latest_for_email(&email)
                .await
                .map_err(SendError::Storage)?
                .map(|sent| sent.sent_at)
        } else {
            None
        };
        if let Some(verdict) = cooldown_check(
            user.as_ref(),
            legacy_last_sent,
            &self.policy,
            ctx.config.cooldown(),
            now,
        ) {
            info!("Skipping email to {}; {}", email, verdict.message());
            return Ok(SendOutcome::not_sent(&verdict, title));
        }

        let message = ReminderMessage {
            plex_username: request.requester_username.clone(),
            media_type: request.media_type.to_string(),
            title: title.clone(),
            time_since_text: ctx.config.days_since_request_text.clone(),
            plex_url: request.browser_url.clone().unwrap_or_default(),
            poster_url: request.poster_url.clone(),
            mobile_url: request.mobile_url.clone().unwrap_or_default(),
            request_url: ctx.config.request_url.clone(),
            admin_name: ctx.config.admin_name.clone(),
        };
        let body = ctx
            .services
            .renderer
            .render(&message)
            .map_err(SendError::Template)?;
        let mail = OutgoingMail {
            to: email.clone(),
            subject: reminder_subject(&title),
            body,
            is_html: true,
        };
        debug!(
            "Preparing email send for request {}: recipient={}, subject={}, rating_key={}",
            request.id, mail.to, mail.subject, request.rating_key
        );
        let recipient = ctx
            .services
            .mailer
            .deliver(&mail)
            .await
            .map_err(SendError::Delivery)?;
        let sent_at = ctx.sys.now();
        info!(
            "Sent email to {} ({}) via {} for {} ({}).",
            request.requester_username, email, recipient, title, request.rating_key
        );

        if !self.policy.perform_db_updates {
            info!("Debug mode active; skipped persisting send for {}.", email);
            return Ok(SendOutcome::delivered(title, recipient, sent_at, false));
        }

        self.update_request(ctx, RequestUpdate::email_sent().with_title(title.clone()))
            .await?;
        ctx.email_users
            .record_send(&email, sent_at, ctx.config.cooldown())
            .await
            .map_err(SendError::Storage)?;
        ctx.repos
            .sent_emails
            .upsert(&SentEmailRecord::new(email, &self.request, &title, sent_at))
            .await
            .map_err(SendError::Storage)?;

        if self.policy.allow_throttle_delay && !ctx.config.send_throttle.is_zero() {
            tokio::time::sleep(ctx.config.send_throttle).await;
        }

        Ok(SendOutcome::delivered(title, recipient, sent_at, true))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::test_helpers::{setup, setup_with_config, stored_request, TestContext};
    use chrono::Duration;
    use reelminder_domain::{EmailUserRecord, WatchEvent, UNKNOWN_TITLE};
    use reelminder_infra::{Config, ISys};

    async fn send(ctx: &ReelminderContext, request: RequestRecord, policy: SendPolicy) -> SendOutcome {
        let mut usecase = SendReminderUseCase {
            request,
            title_overrides: HashMap::new(),
            policy,
        };
        usecase.execute(ctx).await.expect("Send attempt to succeed")
    }

    #[actix_web::main]
    #[test]
    async fn sends_and_records_delivery() {
        let TestContext { ctx, services, sys } = setup();
        let request = stored_request(1, "Neo@Matrix.io ", "neo");
        ctx.repos.requests.insert(&request).await.unwrap();

        let outcome = send(&ctx, request.clone(), SendPolicy::scheduled(false)).await;
        assert!(outcome.sent);
        assert!(outcome.persisted);
        assert_eq!(outcome.recipient.as_deref(), Some("neo@matrix.io"));

        let deliveries = services.mailer.deliveries();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(
            deliveries[0].mail.subject,
            "Plex Reminder: Title 1 is available and unwatched"
        );
        assert!(deliveries[0].mail.body.contains("Hi neo,"));

        let stored = ctx.repos.requests.find(1).await.unwrap().unwrap();
        assert!(stored.email_sent);
        let user = ctx.email_users.get("neo@matrix.io").await.unwrap().unwrap();
        assert_eq!(user.last_email_at, Some(sys.now()));
        assert_eq!(user.next_email_at, Some(sys.now() + Duration::hours(24)));
        assert!(ctx
            .repos
            .sent_emails
            .find("neo@matrix.io", request.tmdb_id)
            .await
            .unwrap()
            .is_some());
    }

    #[actix_web::main]
    #[test]
    async fn first_look_defers_one_cycle() {
        let TestContext { ctx, services, .. } = setup();
        let mut request = stored_request(2, "a@x.com", "a");
        request.eligible_for_email = false;
        ctx.repos.requests.insert(&request).await.unwrap();

        let outcome = send(&ctx, request, SendPolicy::scheduled(false)).await;
        assert!(!outcome.sent);
        assert!(!outcome.remove_candidate);
        assert_eq!(outcome.message, "Waiting one scheduler cycle before emailing.");
        assert!(services.mailer.deliveries().is_empty());
        assert!(ctx.repos.requests.find(2).await.unwrap().unwrap().eligible_for_email);
    }

    #[actix_web::main]
    #[test]
    async fn manual_send_skips_cycle_and_cooldown() {
        let TestContext { ctx, services, sys } = setup();
        let mut request = stored_request(3, "b@x.com", "b");
        request.eligible_for_email = false;
        ctx.repos.requests.insert(&request).await.unwrap();
        ctx.email_users
            .record_send("b@x.com", sys.now(), Duration::hours(24))
            .await
            .unwrap();

        let outcome = send(&ctx, request, SendPolicy::manual(false)).await;
        assert!(outcome.sent);
        assert_eq!(services.mailer.deliveries().len(), 1);
    }

    #[actix_web::main]
    #[test]
    async fn watched_title_is_never_sent() {
        let TestContext { ctx, services, sys } = setup();
        let request = stored_request(4, "c@x.com", "carol");
        ctx.repos.requests.insert(&request).await.unwrap();
        services.watch_history.add_watch(
            "carol",
            &request.rating_key,
            WatchEvent {
                title: Some("Heat".into()),
                watched_at: None,
            },
        );

        let outcome = send(&ctx, request, SendPolicy::manual(false)).await;
        assert!(!outcome.sent);
        assert!(outcome.remove_candidate);
        assert_eq!(outcome.message, "Heat already appears watched; reminder not sent.");
        assert!(services.mailer.deliveries().is_empty());
        let stored = ctx.repos.requests.find(4).await.unwrap().unwrap();
        assert_eq!(stored.watched_at, Some(sys.now()));
    }

    #[actix_web::main]
    #[test]
    async fn unsubscribed_keeps_candidate() {
        let TestContext { ctx, services, sys } = setup();
        let request = stored_request(5, "d@x.com", "d");
        ctx.email_users.unsubscribe("D@x.com", sys.now()).await.unwrap();

        let outcome = send(&ctx, request, SendPolicy::manual(false)).await;
        assert!(!outcome.sent);
        assert!(!outcome.remove_candidate);
        assert_eq!(outcome.message, "Address is unsubscribed; reminder not sent.");
        assert_eq!(services.watch_history.lookups(), 0);
    }

    #[actix_web::main]
    #[test]
    async fn already_delivered_title_is_marked_sent() {
        let TestContext { ctx, services, sys } = setup();
        let request = stored_request(6, "e@x.com", "e");
        ctx.repos.requests.insert(&request).await.unwrap();
        ctx.repos
            .sent_emails
            .upsert(&SentEmailRecord::new(
                "e@x.com".into(),
                &request,
                &request.title,
                sys.now() - Duration::days(30),
            ))
            .await
            .unwrap();

        let outcome = send(&ctx, request, SendPolicy::scheduled(false)).await;
        assert!(!outcome.sent);
        assert!(outcome.remove_candidate);
        assert_eq!(outcome.message, "Reminder already sent for this title.");
        assert!(ctx.repos.requests.find(6).await.unwrap().unwrap().email_sent);
        assert!(services.mailer.deliveries().is_empty());
    }

    #[actix_web::main]
    #[test]
    async fn cooldown_defers_scheduled_send() {
        let TestContext { ctx, services, sys } = setup();
        let request = stored_request(7, "f@x.com", "f");
        ctx.email_users
            .record_send("f@x.com", sys.now() - Duration::hours(2), Duration::hours(24))
            .await
            .unwrap();

        let outcome = send(&ctx, request, SendPolicy::scheduled(false)).await;
        assert!(!outcome.sent);
        assert!(!outcome.remove_candidate);
        assert!(outcome.message.starts_with("Cooldown active until"));
        assert!(services.mailer.deliveries().is_empty());
    }

    #[actix_web::main]
    #[test]
    async fn legacy_sent_log_defers_recipient_without_cooldown_state() {
        let TestContext { ctx, services, sys } = setup();
        let other = stored_request(8, "g@x.com", "g");
        ctx.repos
            .sent_emails
            .upsert(&SentEmailRecord::new(
                "g@x.com".into(),
                &other,
                &other.title,
                sys.now() - Duration::hours(1),
            ))
            .await
            .unwrap();
        ctx.repos
            .email_users
            .insert(&EmailUserRecord::new("g@x.com".into()))
            .await
            .unwrap();

        let outcome = send(&ctx, stored_request(9, "g@x.com", "g"), SendPolicy::scheduled(false)).await;
        assert!(!outcome.sent);
        assert!(!outcome.remove_candidate);
        assert!(services.mailer.deliveries().is_empty());
    }

    #[actix_web::main]
    #[test]
    async fn unknown_title_is_resolved_before_sending() {
        let TestContext { ctx, services, .. } = setup();
        let mut request = stored_request(10, "h@x.com", "h");
        request.title = UNKNOWN_TITLE.into();
        ctx.repos.requests.insert(&request).await.unwrap();
        services.watch_history.set_title(&request.rating_key, "Alien");

        let outcome = send(&ctx, request, SendPolicy::manual(false)).await;
        assert!(outcome.sent);
        assert_eq!(outcome.title, "Alien");
        assert_eq!(ctx.repos.requests.find(10).await.unwrap().unwrap().title, "Alien");
    }

    #[actix_web::main]
    #[test]
    async fn missing_email_removes_candidate() {
        let TestContext { ctx, .. } = setup();
        let outcome = send(&ctx, stored_request(11, "  ", "i"), SendPolicy::scheduled(false)).await;
        assert!(!outcome.sent);
        assert!(outcome.remove_candidate);
        assert_eq!(outcome.message, "Missing email address for request.");
    }

    #[actix_web::main]
    #[test]
    async fn failed_delivery_persists_nothing() {
        let TestContext { ctx, services, .. } = setup();
        let request = stored_request(12, "j@x.com", "j");
        ctx.repos.requests.insert(&request).await.unwrap();
        services.mailer.set_failing(true);

        let mut usecase = SendReminderUseCase {
            request,
            title_overrides: HashMap::new(),
            policy: SendPolicy::scheduled(false),
        };
        let res = usecase.execute(&ctx).await;
        assert!(matches!(res, Err(SendError::Delivery(_))));
        assert!(!ctx.repos.requests.find(12).await.unwrap().unwrap().email_sent);
        assert!(ctx.repos.sent_emails.find("j@x.com", 120).await.unwrap().is_none());
        let user = ctx.email_users.get("j@x.com").await.unwrap().unwrap();
        assert!(user.last_email_at.is_none());
    }

    #[actix_web::main]
    #[test]
    async fn debug_mode_delivers_without_persisting() {
        let mut config = Config::default();
        config.debug.enabled = true;
        let TestContext { ctx, services, .. } = setup_with_config(config);
        let request = stored_request(13, "k@x.com", "k");
        ctx.repos.requests.insert(&request).await.unwrap();

        let outcome = send(&ctx, request, SendPolicy::scheduled(true)).await;
        assert!(outcome.sent);
        assert!(!outcome.persisted);
        assert_eq!(services.mailer.deliveries().len(), 1);
        assert!(!ctx.repos.requests.find(13).await.unwrap().unwrap().email_sent);
        assert!(ctx.repos.sent_emails.find("k@x.com", 130).await.unwrap().is_none());
    }
}
