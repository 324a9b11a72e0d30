use crate::{
    error::ReelminderError,
    shared::usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use reelminder_api_structs::dtos::EmailUserDTO;
use reelminder_api_structs::unsubscribe_email_user::{APIResponse, RequestBody};
use reelminder_domain::EmailUserRecord;
use reelminder_infra::ReelminderContext;
use tracing::info;

pub async fn unsubscribe_email_user_controller(
    body: web::Json<RequestBody>,
    ctx: web::Data<ReelminderContext>,
) -> Result<HttpResponse, ReelminderError> {
    let usecase = UnsubscribeEmailUserUseCase {
        email: body.0.email,
    };

    execute(usecase, &ctx)
        .await
        .map(|user| {
            HttpResponse::Ok().json(APIResponse {
                email_user: EmailUserDTO::new(user),
            })
        })
        .map_err(ReelminderError::from)
}

/// Stops all reminders to the address. Pending candidates are kept and
/// become eligible again once the address is resubscribed.
#[derive(Debug)]
struct UnsubscribeEmailUserUseCase {
    email: String,
}

#[derive(Debug)]
enum UseCaseError {
    EmptyEmail,
    StorageError,
}

impl From<UseCaseError> for ReelminderError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::EmptyEmail => Self::BadClientData("Please provide an email address.".into()),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for UnsubscribeEmailUserUseCase {
    type Response = EmailUserRecord;

    type Error = UseCaseError;

    const NAME: &'static str = "UnsubscribeEmailUser";

    async fn execute(&mut self, ctx: &ReelminderContext) -> Result<Self::Response, Self::Error> {
        let user = ctx
            .email_users
            .unsubscribe(&self.email, ctx.sys.now())
            .await
            .map_err(|_| UseCaseError::StorageError)?
            .ok_or(UseCaseError::EmptyEmail)?;
        info!("Manual action: added {} to the unsubscribe list", user.email);
        Ok(user)
    }
}
