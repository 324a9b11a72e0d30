use crate::{
    error::ReelminderError,
    shared::usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use reelminder_api_structs::check_watch_status::APIResponse;
use reelminder_api_structs::dtos::WatchStatusStatsDTO;
use reelminder_domain::WatchStatusStats;
use reelminder_infra::ReelminderContext;
use tracing::{debug, info, warn};

pub async fn check_watch_status_controller(
    ctx: web::Data<ReelminderContext>,
) -> Result<HttpResponse, ReelminderError> {
    info!("Manual action: update watch status requested");
    let usecase = CheckWatchStatusUseCase {};

    execute(usecase, &ctx)
        .await
        .map(|stats| {
            HttpResponse::Ok().json(APIResponse {
                stats: WatchStatusStatsDTO::new(stats),
            })
        })
        .map_err(ReelminderError::from)
}

/// Rechecks every delivered reminder that is not known to be watched yet
#[derive(Debug)]
pub struct CheckWatchStatusUseCase {}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError(anyhow::Error),
}

impl From<UseCaseError> for ReelminderError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::StorageError(_) => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CheckWatchStatusUseCase {
    type Response = WatchStatusStats;

    type Error = UseCaseError;

    const NAME: &'static str = "CheckWatchStatus";

    async fn execute(&mut self, ctx: &ReelminderContext) -> Result<Self::Response, Self::Error> {
        info!("Starting watch status check for unwatched sent emails");
        ctx.repos
            .settings
            .set_last_watch_status_check(ctx.sys.now())
            .await
            .map_err(UseCaseError::StorageError)?;

        let mut stats = WatchStatusStats::default();
        let unwatched = ctx
            .repos
            .sent_emails
            .find_unwatched()
            .await
            .map_err(UseCaseError::StorageError)?;

        for sent in unwatched {
            stats.checked += 1;
            if sent.requester_username.is_empty() || sent.rating_key.is_empty() {
                debug!(
                    "Skipping sent email with missing data: {} ({})",
                    sent.email, sent.tmdb_id
                );
                continue;
            }

            let lookup = ctx
                .services
                .watch_history
                .has_watched(&sent.requester_username, &sent.rating_key, sent.media_type)
                .await;
            let watches = match lookup {
                Ok(watches) => watches,
                Err(e) => {
                    stats.failed += 1;
                    warn!(
                        "Failed to check watch status for {} ({}) for user {}: {}",
                        sent.title, sent.rating_key, sent.requester_username, e
                    );
                    continue;
                }
            };
            let watch = match watches.first() {
                Some(watch) => watch,
                None => continue,
            };

            let watched_at = watch.watched_at.unwrap_or_else(|| ctx.sys.now());
            match ctx
                .repos
                .sent_emails
                .set_watched(&sent.email, sent.tmdb_id, watched_at)
                .await
            {
                Ok(_) => {
                    stats.watched += 1;
                    info!(
                        "Marked {} ({}) as watched for {} on {}",
                        sent.title, sent.rating_key, sent.requester_username, watched_at
                    );
                }
                Err(e) => {
                    stats.failed += 1;
                    warn!("Failed to store watch status for {}: {}", sent.title, e);
                }
            }
        }

        info!(
            "Watch status check complete: checked={}, watched={}, failed={}",
            stats.checked, stats.watched, stats.failed
        );
        Ok(stats)
    }
}
