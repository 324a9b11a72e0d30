use crate::{
    error::ReelminderError,
    shared::usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use reelminder_api_structs::resubscribe_email_user::{APIResponse, RequestBody};
use reelminder_domain::normalize_email;
use reelminder_infra::ReelminderContext;
use tracing::info;

pub async fn resubscribe_email_user_controller(
    body: web::Json<RequestBody>,
    ctx: web::Data<ReelminderContext>,
) -> Result<HttpResponse, ReelminderError> {
    let usecase = ResubscribeEmailUserUseCase {
        email: body.0.email,
    };

    execute(usecase, &ctx)
        .await
        .map(|res| {
            HttpResponse::Ok().json(APIResponse {
                email: res.email,
                was_unsubscribed: res.was_unsubscribed,
            })
        })
        .map_err(ReelminderError::from)
}

/// Removes the address from the unsubscribe list. Its pending requests are
/// picked up again by the next run without being ingested anew.
#[derive(Debug)]
struct ResubscribeEmailUserUseCase {
    email: String,
}

#[derive(Debug)]
struct UseCaseResponse {
    email: String,
    was_unsubscribed: bool,
}

#[derive(Debug)]
enum UseCaseError {
    EmptyEmail,
    StorageError,
}

impl From<UseCaseError> for ReelminderError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::EmptyEmail => {
                Self::BadClientData("Email address missing for removal.".into())
            }
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for ResubscribeEmailUserUseCase {
    type Response = UseCaseResponse;

    type Error = UseCaseError;

    const NAME: &'static str = "ResubscribeEmailUser";

    async fn execute(&mut self, ctx: &ReelminderContext) -> Result<Self::Response, Self::Error> {
        let email = normalize_email(&self.email).ok_or(UseCaseError::EmptyEmail)?;
        let was_unsubscribed = ctx
            .email_users
            .resubscribe(&email)
            .await
            .map_err(|_| UseCaseError::StorageError)?;
        if was_unsubscribed {
            info!("Manual action: removed {} from the unsubscribe list", email);
        } else {
            info!("{} was not on the unsubscribe list", email);
        }
        Ok(UseCaseResponse {
            email,
            was_unsubscribed,
        })
    }
}
