use crate::shared::usecase::UseCase;
use reelminder_domain::{plex_links, AvailableRequest, RequestRecord};
use reelminder_infra::ReelminderContext;
use tracing::{debug, info, warn};

/// Brings the request store up to date with the fulfilled requests listed
/// by the request source
#[derive(Debug)]
pub struct IngestRequestsUseCase {
    pub limit: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    pub listed: usize,
    pub created: usize,
    /// Documents that could not be read
    pub skipped: usize,
}

#[async_trait::async_trait(?Send)]
impl UseCase for IngestRequestsUseCase {
    type Response = IngestSummary;

    type Error = anyhow::Error;

    const NAME: &'static str = "IngestRequests";

    async fn execute(&mut self, ctx: &ReelminderContext) -> Result<Self::Response, Self::Error> {
        let documents = ctx
            .services
            .requests
            .list_available_requests(self.limit)
            .await?;
        let mut summary = IngestSummary {
            listed: documents.len(),
            ..Default::default()
        };

        for document in &documents {
            let available = match AvailableRequest::try_from(document) {
                Ok(available) => available,
                Err(e) => {
                    warn!("Skipping request document: {}", e);
                    summary.skipped += 1;
                    continue;
                }
            };
            ctx.email_users.ensure(&available.requester_email).await?;

            if ctx.repos.requests.find(available.id).await?.is_some() {
                continue;
            }
            if available.media_added_at.is_none() {
                debug!(
                    "Request {} carries no availability time, using the current time",
                    available.id
                );
            }
            let links = plex_links(available.plex_url.as_deref());
            let poster_url = ctx
                .services
                .posters
                .fetch_poster_url(available.tmdb_id, available.media_type)
                .await;
            let request = RequestRecord::from_upstream(&available, links, poster_url, ctx.sys.now());
            if ctx.repos.requests.insert(&request).await? {
                info!(
                    "Stored new request {} for {} ({})",
                    request.id, request.requester_username, request.media_type
                );
                summary.created += 1;
            }
        }

        // Requests stored before recipient records existed
        for request in ctx.repos.requests.find_all().await? {
            ctx.email_users.ensure(&request.requester_email).await?;
        }

        Ok(summary)
    }
}
