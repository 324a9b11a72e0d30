use crate::{
    error::ReelminderError,
    shared::usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use reelminder_api_structs::dtos::RequestDTO;
use reelminder_api_structs::skip_request::{APIResponse, PathParams};
use reelminder_domain::{RequestRecord, RequestUpdate};
use reelminder_infra::ReelminderContext;
use tracing::info;

pub async fn skip_request_controller(
    path: web::Path<PathParams>,
    ctx: web::Data<ReelminderContext>,
) -> Result<HttpResponse, ReelminderError> {
    let usecase = SkipRequestUseCase {
        request_id: path.request_id,
    };

    execute(usecase, &ctx)
        .await
        .map(|res| {
            HttpResponse::Ok().json(APIResponse {
                request: RequestDTO::new(res.request),
                message: res.message,
            })
        })
        .map_err(ReelminderError::from)
}

#[derive(Debug)]
struct SkipRequestUseCase {
    request_id: i64,
}

#[derive(Debug)]
struct UseCaseResponse {
    request: RequestRecord,
    message: String,
}

#[derive(Debug)]
enum UseCaseError {
    NotFound(i64),
    StorageError,
}

impl From<UseCaseError> for ReelminderError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(id) => {
                Self::NotFound(format!("The request with id: {}, was not found.", id))
            }
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for SkipRequestUseCase {
    type Response = UseCaseResponse;

    type Error = UseCaseError;

    const NAME: &'static str = "SkipRequest";

    async fn execute(&mut self, ctx: &ReelminderContext) -> Result<Self::Response, Self::Error> {
        let mut request = ctx
            .repos
            .requests
            .find(self.request_id)
            .await
            .map_err(|_| UseCaseError::StorageError)?
            .ok_or(UseCaseError::NotFound(self.request_id))?;
        if request.skip_email {
            return Ok(UseCaseResponse {
                request,
                message: "Reminders are already disabled for this item.".into(),
            });
        }

        let update = RequestUpdate::skip_email();
        ctx.repos
            .requests
            .update(self.request_id, &update)
            .await
            .map_err(|_| UseCaseError::StorageError)?;
        request.apply(&update);
        info!(
            "Manual action: marked request {} ({}) as do-not-send",
            request.id, request.title
        );

        let message = format!("Won't send reminders for {}.", request.title);
        Ok(UseCaseResponse { request, message })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::test_helpers::{setup, stored_request, TestContext};

    #[actix_web::main]
    #[test]
    async fn skipping_is_idempotent() {
        let TestContext { ctx, .. } = setup();
        ctx.repos
            .requests
            .insert(&stored_request(1, "a@x.com", "a"))
            .await
            .unwrap();

        let mut usecase = SkipRequestUseCase { request_id: 1 };
        let res = usecase.execute(&ctx).await.unwrap();
        assert!(res.request.skip_email);
        assert_eq!(res.message, "Won't send reminders for Title 1.");
        assert!(ctx.repos.requests.find(1).await.unwrap().unwrap().skip_email);

        let res = usecase.execute(&ctx).await.unwrap();
        assert_eq!(res.message, "Reminders are already disabled for this item.");

        let mut usecase = SkipRequestUseCase { request_id: 2 };
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseError::NotFound(2))
        ));
    }
}
