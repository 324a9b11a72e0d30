use super::{
    backfill_metadata::BackfillMetadataUseCase,
    ingest_requests::{IngestRequestsUseCase, IngestSummary},
};
use crate::{
    reminder::send_reminder::{SendError, SendReminderUseCase},
    settings::check_watch_status::CheckWatchStatusUseCase,
    shared::usecase::{execute, UseCase},
};
use chrono::{DateTime, Utc};
use itertools::Itertools;
use reelminder_domain::{RequestRecord, SendPolicy, WatchStatusStats};
use reelminder_infra::ReelminderContext;
use std::collections::{HashMap, VecDeque};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Error, Debug)]
pub enum RunError {
    #[error("Could not reach {0}: {1}")]
    Connectivity(&'static str, anyhow::Error),
    #[error("Ingestion failed: {0}")]
    Ingest(anyhow::Error),
    #[error("Storage error: {0}")]
    Storage(anyhow::Error),
    #[error(transparent)]
    Send(#[from] SendError),
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunSummary {
    pub ingest: IngestSummary,
    pub titles_resolved: usize,
    /// `None` when the reconciliation was not due or failed
    pub watch_status: Option<WatchStatusStats>,
    pub sent: usize,
    /// Set when the debug delivery cap ended the run
    pub capped: bool,
}

/// Both collaborators must answer before a run touches any state
async fn check_connectivity(ctx: &ReelminderContext) -> Result<(), RunError> {
    if let Err(e) = ctx.services.requests.check_connection().await {
        info!("Aborting run due to Overseerr connectivity issues.");
        return Err(RunError::Connectivity("Overseerr", e));
    }
    if let Err(e) = ctx.services.watch_history.check_connection().await {
        info!("Aborting run due to Tautulli connectivity issues.");
        return Err(RunError::Connectivity("Tautulli", e));
    }
    Ok(())
}

/// Overdue requests keyed by normalized recipient, newest first
fn group_candidates(
    requests: Vec<RequestRecord>,
    now: DateTime<Utc>,
    grace: chrono::Duration,
) -> HashMap<String, VecDeque<RequestRecord>> {
    requests
        .into_iter()
        .filter(|request| request.is_reminder_candidate(now, grace))
        .filter_map(|request| request.normalized_email().map(|email| (email, request)))
        .into_group_map()
        .into_iter()
        .map(|(email, mut requests)| {
            requests.sort_by(|a, b| b.media_added_at.cmp(&a.media_added_at));
            (email, VecDeque::from(requests))
        })
        .collect()
}

/// One complete reminder pass: preflight, ingestion, title backfill, watch
/// status reconciliation and the per recipient send loop. The caller must
/// hold the job lock.
#[derive(Debug)]
pub struct RunRemindersUseCase {
    pub reason: String,
}

#[async_trait::async_trait(?Send)]
impl UseCase for RunRemindersUseCase {
    type Response = RunSummary;

    type Error = RunError;

    const NAME: &'static str = "RunReminders";

    async fn execute(&mut self, ctx: &ReelminderContext) -> Result<Self::Response, Self::Error> {
        check_connectivity(ctx).await?;
        let mut summary = RunSummary::default();

        info!("Step 1: Grab requests from Overseerr");
        summary.ingest = execute(
            IngestRequestsUseCase {
                limit: ctx.config.overseerr_take,
            },
            ctx,
        )
        .await
        .map_err(RunError::Ingest)?;

        info!("Step 2: Update recent titles from Tautulli");
        let title_overrides = execute(BackfillMetadataUseCase::default(), ctx)
            .await
            .map_err(RunError::Storage)?;
        summary.titles_resolved = title_overrides.len();

        info!("Step 3: Check watch status for unwatched sent emails");
        let settings = ctx
            .repos
            .settings
            .scheduler_settings()
            .await
            .map_err(RunError::Storage)?;
        if settings.watch_status_check_due(ctx.sys.now()) {
            match execute(CheckWatchStatusUseCase {}, ctx).await {
                Ok(stats) => summary.watch_status = Some(stats),
                Err(e) => error!("Watch status check failed: {:?}", e),
            }
        } else if let Some(last_check) = settings.last_watch_status_check {
            info!(
                "Skipping watch status check (last run: {})",
                last_check.format("%Y-%m-%d %H:%M:%S")
            );
        }

        info!("Step 4: Evaluate reminders per user");
        let now = ctx.sys.now();
        let unresolved = ctx
            .repos
            .requests
            .find_unresolved()
            .await
            .map_err(RunError::Storage)?;
        let mut candidates = group_candidates(unresolved, now, ctx.config.grace_period());
        let users = ctx
            .email_users
            .list_all()
            .await
            .map_err(RunError::Storage)?;

        let debug_config = &ctx.config.debug;
        let policy = SendPolicy::scheduled(debug_config.enabled);
        for user in users {
            if user.is_unsubscribed() {
                continue;
            }
            let queue = match candidates.get_mut(&user.email) {
                Some(queue) => queue,
                None => continue,
            };

            while let Some(request) = queue.front() {
                if debug_config.enabled && summary.sent >= debug_config.max_emails {
                    info!(
                        "Debug mode email limit of {} reached; stopping run.",
                        debug_config.max_emails
                    );
                    summary.capped = true;
                    return Ok(summary);
                }

                let usecase = SendReminderUseCase {
                    request: request.clone(),
                    title_overrides: title_overrides.clone(),
                    policy,
                };
                let outcome = execute(usecase, ctx).await?;
                if outcome.sent {
                    summary.sent += 1;
                    queue.pop_front();
                    break;
                }
                if !outcome.remove_candidate {
                    break;
                }
                queue.pop_front();
            }
        }

        if summary.sent > 0 && !policy.perform_db_updates {
            warn!(
                "Debug mode sent {} reminders without recording them.",
                summary.sent
            );
        }
        Ok(summary)
    }
}

/// Executes a run for `reason` and reports the result to the log. The
/// caller must hold the job lock.
pub async fn run_reminders_job(ctx: &ReelminderContext, reason: &str) -> Option<RunSummary> {
    info!("Reminder job triggered ({}).", reason);
    let usecase = RunRemindersUseCase {
        reason: reason.to_string(),
    };
    match execute(usecase, ctx).await {
        Ok(summary) => {
            info!("Reminder job completed ({}): {:?}", reason, summary);
            Some(summary)
        }
        Err(e) => {
            error!("Reminder job raised an error ({}): {}", reason, e);
            None
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::test_helpers::{
        setup, setup_with_config, start_time, stored_request, upstream_request, TestContext,
    };
    use chrono::Duration;
    use reelminder_infra::Config;

    async fn run(ctx: &ReelminderContext) -> Result<RunSummary, RunError> {
        RunRemindersUseCase {
            reason: "test".into(),
        }
        .execute(ctx)
        .await
    }

    #[actix_web::main]
    #[test]
    async fn new_requests_wait_one_run() {
        let TestContext { ctx, services, .. } = setup();
        services.requests.push(upstream_request(1, "a@x.com", "a"));
        services.watch_history.set_title("100", "Jaws");

        let summary = run(&ctx).await.unwrap();
        assert_eq!(summary.ingest.created, 1);
        assert_eq!(summary.titles_resolved, 1);
        assert_eq!(summary.sent, 0);
        assert!(services.mailer.deliveries().is_empty());

        let summary = run(&ctx).await.unwrap();
        assert_eq!(summary.sent, 1);
        let deliveries = services.mailer.deliveries();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(
            deliveries[0].mail.subject,
            "Plex Reminder: Jaws is available and unwatched"
        );

        let summary = run(&ctx).await.unwrap();
        assert_eq!(summary.sent, 0);
        assert_eq!(services.mailer.deliveries().len(), 1);
    }

    #[actix_web::main]
    #[test]
    async fn one_reminder_per_user_per_run_newest_first() {
        let TestContext { ctx, services, sys } = setup();
        for id in [1, 2] {
            ctx.repos
                .requests
                .insert(&stored_request(id, "a@x.com", "a"))
                .await
                .unwrap();
        }
        ctx.repos
            .requests
            .insert(&stored_request(3, "b@x.com", "b"))
            .await
            .unwrap();

        let summary = run(&ctx).await.unwrap();
        assert_eq!(summary.sent, 2);
        let subjects = services
            .mailer
            .deliveries()
            .into_iter()
            .map(|d| (d.recipient, d.mail.subject))
            .collect::<Vec<_>>();
        assert!(subjects.contains(&(
            "a@x.com".to_string(),
            "Plex Reminder: Title 2 is available and unwatched".to_string()
        )));

        // Cooldown holds back the older title
        let summary = run(&ctx).await.unwrap();
        assert_eq!(summary.sent, 0);

        sys.advance(Duration::hours(25));
        let summary = run(&ctx).await.unwrap();
        assert_eq!(summary.sent, 1);
        let last = services.mailer.deliveries().pop().unwrap();
        assert_eq!(
            last.mail.subject,
            "Plex Reminder: Title 1 is available and unwatched"
        );
    }

    #[actix_web::main]
    #[test]
    async fn watched_candidate_falls_through_to_the_next() {
        let TestContext { ctx, services, .. } = setup();
        for id in [1, 2] {
            ctx.repos
                .requests
                .insert(&stored_request(id, "a@x.com", "a"))
                .await
                .unwrap();
        }
        services.watch_history.add_watch(
            "a",
            "200",
            reelminder_domain::WatchEvent {
                title: None,
                watched_at: None,
            },
        );

        let summary = run(&ctx).await.unwrap();
        assert_eq!(summary.sent, 1);
        assert!(ctx.repos.requests.find(2).await.unwrap().unwrap().watched_at.is_some());
        assert!(ctx.repos.requests.find(1).await.unwrap().unwrap().email_sent);
    }

    #[actix_web::main]
    #[test]
    async fn unsubscribed_recipient_is_skipped_until_resubscribed() {
        let TestContext { ctx, services, sys } = setup();
        ctx.repos
            .requests
            .insert(&stored_request(1, "a@x.com", "a"))
            .await
            .unwrap();
        ctx.email_users
            .unsubscribe("A@x.com", start_time())
            .await
            .unwrap();

        for _ in 0..3 {
            let summary = run(&ctx).await.unwrap();
            assert_eq!(summary.sent, 0);
            sys.advance(Duration::hours(25));
        }
        assert!(services.mailer.deliveries().is_empty());
        assert!(!ctx.repos.requests.find(1).await.unwrap().unwrap().email_sent);

        assert!(ctx.email_users.resubscribe("a@x.com").await.unwrap());
        let summary = run(&ctx).await.unwrap();
        assert_eq!(summary.sent, 1);
        assert_eq!(services.mailer.deliveries()[0].recipient, "a@x.com");
    }

    #[actix_web::main]
    #[test]
    async fn unreachable_collaborator_aborts_before_ingestion() {
        let TestContext { ctx, services, .. } = setup();
        services.requests.push(upstream_request(1, "a@x.com", "a"));
        services.watch_history.set_unreachable(true);

        let res = run(&ctx).await;
        assert!(matches!(res, Err(RunError::Connectivity("Tautulli", _))));
        assert!(ctx.repos.requests.find(1).await.unwrap().is_none());
    }

    #[actix_web::main]
    #[test]
    async fn delivery_failure_ends_the_run() {
        let TestContext { ctx, services, .. } = setup();
        ctx.repos
            .requests
            .insert(&stored_request(1, "a@x.com", "a"))
            .await
            .unwrap();
        services.mailer.set_failing(true);

        let res = run(&ctx).await;
        assert!(matches!(res, Err(RunError::Send(SendError::Delivery(_)))));
        assert!(!ctx.repos.requests.find(1).await.unwrap().unwrap().email_sent);
    }

    #[actix_web::main]
    #[test]
    async fn debug_cap_stops_the_run() {
        let mut config = Config::default();
        config.debug.enabled = true;
        config.debug.max_emails = 1;
        let TestContext { ctx, services, .. } = setup_with_config(config);
        for (id, email) in [(1, "a@x.com"), (2, "b@x.com"), (3, "c@x.com")] {
            ctx.repos
                .requests
                .insert(&stored_request(id, email, "u"))
                .await
                .unwrap();
        }

        let summary = run(&ctx).await.unwrap();
        assert_eq!(summary.sent, 1);
        assert!(summary.capped);
        assert_eq!(services.mailer.deliveries().len(), 1);
        assert!(ctx.repos.sent_emails.find_recent(10).await.unwrap().is_empty());
    }

    #[actix_web::main]
    #[test]
    async fn watch_status_reconciliation_runs_once_a_day() {
        let TestContext { ctx, sys, .. } = setup();

        let summary = run(&ctx).await.unwrap();
        assert!(summary.watch_status.is_some());
        let summary = run(&ctx).await.unwrap();
        assert!(summary.watch_status.is_none());

        sys.advance(Duration::hours(24));
        let summary = run(&ctx).await.unwrap();
        assert!(summary.watch_status.is_some());
    }
}
