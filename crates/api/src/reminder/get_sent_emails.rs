use crate::{
    error::ReelminderError,
    shared::usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use reelminder_api_structs::dtos::SentEmailDTO;
use reelminder_api_structs::get_sent_emails::{APIResponse, QueryParams};
use reelminder_domain::SentEmailRecord;
use reelminder_infra::ReelminderContext;

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 500;

pub async fn get_sent_emails_controller(
    query: web::Query<QueryParams>,
    ctx: web::Data<ReelminderContext>,
) -> Result<HttpResponse, ReelminderError> {
    let usecase = GetSentEmailsUseCase {
        limit: query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT),
    };

    execute(usecase, &ctx)
        .await
        .map(|emails| {
            HttpResponse::Ok().json(APIResponse {
                emails: emails.into_iter().map(SentEmailDTO::new).collect(),
            })
        })
        .map_err(ReelminderError::from)
}

/// Most recent reminders, newest first, with their watch status
#[derive(Debug)]
struct GetSentEmailsUseCase {
    limit: usize,
}

#[derive(Debug)]
enum UseCaseError {
    StorageError,
}

impl From<UseCaseError> for ReelminderError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetSentEmailsUseCase {
    type Response = Vec<SentEmailRecord>;

    type Error = UseCaseError;

    const NAME: &'static str = "GetSentEmails";

    async fn execute(&mut self, ctx: &ReelminderContext) -> Result<Self::Response, Self::Error> {
        ctx.repos
            .sent_emails
            .find_recent(self.limit)
            .await
            .map_err(|_| UseCaseError::StorageError)
    }
}
