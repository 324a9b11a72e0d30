use crate::{
    error::ReelminderError,
    shared::usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use reelminder_api_structs::dtos::EmailUserDTO;
use reelminder_api_structs::get_unsubscribed_email_users::APIResponse;
use reelminder_domain::EmailUserRecord;
use reelminder_infra::ReelminderContext;

pub async fn get_unsubscribed_email_users_controller(
    ctx: web::Data<ReelminderContext>,
) -> Result<HttpResponse, ReelminderError> {
    let usecase = GetUnsubscribedEmailUsersUseCase {};

    execute(usecase, &ctx)
        .await
        .map(|users| {
            HttpResponse::Ok().json(APIResponse {
                email_users: users.into_iter().map(EmailUserDTO::new).collect(),
            })
        })
        .map_err(ReelminderError::from)
}

#[derive(Debug)]
struct GetUnsubscribedEmailUsersUseCase {}

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
impl UseCase for GetUnsubscribedEmailUsersUseCase {
    type Response = Vec<EmailUserRecord>;

    type Error = UseCaseError;

    const NAME: &'static str = "GetUnsubscribedEmailUsers";

    async fn execute(&mut self, ctx: &ReelminderContext) -> Result<Self::Response, Self::Error> {
        ctx.email_users
            .list_unsubscribed()
            .await
            .map_err(|_| UseCaseError::StorageError)
    }
}
