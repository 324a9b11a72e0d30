use crate::shared::usecase::UseCase;
use reelminder_domain::{is_unknown_title, RequestUpdate};
use reelminder_infra::ReelminderContext;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Looks up real titles for overdue requests still carrying the
/// placeholder. Only the most recent `pool_size` candidates are considered
/// and at most `limit` are resolved per run.
#[derive(Debug)]
pub struct BackfillMetadataUseCase {
    pub limit: usize,
    pub pool_size: usize,
}

impl Default for BackfillMetadataUseCase {
    fn default() -> Self {
        Self {
            limit: 10,
            pool_size: 50,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for BackfillMetadataUseCase {
    /// Resolved titles by request id
    type Response = HashMap<i64, String>;

    type Error = anyhow::Error;

    const NAME: &'static str = "BackfillMetadata";

    async fn execute(&mut self, ctx: &ReelminderContext) -> Result<Self::Response, Self::Error> {
        let mut resolved = HashMap::new();
        if self.limit == 0 || self.pool_size == 0 {
            return Ok(resolved);
        }

        let now = ctx.sys.now();
        let grace = ctx.config.grace_period();
        let mut candidates = ctx
            .repos
            .requests
            .find_all()
            .await?
            .into_iter()
            .filter(|r| is_unknown_title(&r.title))
            .filter(|r| !r.rating_key.is_empty() && !r.requester_username.is_empty())
            .filter(|r| r.is_overdue(now, grace))
            .collect::<Vec<_>>();
        candidates.sort_by(|a, b| b.media_added_at.cmp(&a.media_added_at));

        for request in candidates.into_iter().take(self.pool_size) {
            if resolved.len() >= self.limit {
                break;
            }
            let watches = match ctx
                .services
                .watch_history
                .has_watched(
                    &request.requester_username,
                    &request.rating_key,
                    request.media_type,
                )
                .await
            {
                Ok(watches) => watches,
                Err(e) => {
                    warn!(
                        "Failed to check watch history for request {} ({}): {}",
                        request.id, request.requester_username, e
                    );
                    continue;
                }
            };

            let (title, update) = match watches.first() {
                Some(watch) => {
                    let title = watch.title.clone().unwrap_or(request.title.clone());
                    let update = RequestUpdate::watched(now).with_title(title.clone());
                    (title, update)
                }
                None => match ctx
                    .services
                    .watch_history
                    .fetch_display_metadata(&request.rating_key)
                    .await
                {
                    Ok(metadata) => {
                        let title = metadata.title.unwrap_or(request.title.clone());
                        debug!("Resolved title of request {}: {}", request.id, title);
                        (title.clone(), RequestUpdate::title(title))
                    }
                    Err(e) => {
                        warn!("Failed to refresh metadata for request {}: {}", request.id, e);
                        continue;
                    }
                },
            };
            ctx.repos.requests.update(request.id, &update).await?;
            resolved.insert(request.id, title);
        }

        Ok(resolved)
    }
}
