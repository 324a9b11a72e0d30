use super::send_reminder::{SendError, SendReminderUseCase};
use crate::{
    error::ReelminderError,
    shared::usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use reelminder_api_structs::dtos::SendOutcomeDTO;
use reelminder_api_structs::send_reminder_now::{APIResponse, PathParams};
use reelminder_domain::{SendOutcome, SendPolicy};
use reelminder_infra::ReelminderContext;
use std::collections::HashMap;
use tracing::info;

pub async fn send_reminder_now_controller(
    path: web::Path<PathParams>,
    ctx: web::Data<ReelminderContext>,
) -> Result<HttpResponse, ReelminderError> {
    let usecase = SendReminderNowUseCase {
        request_id: path.request_id,
    };

    execute(usecase, &ctx)
        .await
        .map(|outcome| {
            HttpResponse::Ok().json(APIResponse {
                outcome: SendOutcomeDTO::new(outcome),
            })
        })
        .map_err(ReelminderError::from)
}

/// Operator initiated send that skips the cycle and cooldown controls
#[derive(Debug)]
struct SendReminderNowUseCase {
    request_id: i64,
}

#[derive(Debug)]
enum UseCaseError {
    NotFound(i64),
    MissingEmail(i64),
    Send(SendError),
    StorageError,
}

impl From<UseCaseError> for ReelminderError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(id) => {
                Self::NotFound(format!("The request with id: {}, was not found.", id))
            }
            UseCaseError::MissingEmail(id) => Self::BadClientData(format!(
                "The request with id: {} is missing an email address.",
                id
            )),
            UseCaseError::Send(SendError::Storage(_)) | UseCaseError::StorageError => {
                Self::InternalError
            }
            UseCaseError::Send(e) => Self::Delivery(format!("Failed to send email: {}", e)),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for SendReminderNowUseCase {
    type Response = SendOutcome;

    type Error = UseCaseError;

    const NAME: &'static str = "SendReminderNow";

    async fn execute(&mut self, ctx: &ReelminderContext) -> Result<Self::Response, Self::Error> {
        let request = ctx
            .repos
            .requests
            .find(self.request_id)
            .await
            .map_err(|_| UseCaseError::StorageError)?
            .ok_or(UseCaseError::NotFound(self.request_id))?;
        if request.normalized_email().is_none() {
            return Err(UseCaseError::MissingEmail(self.request_id));
        }
        info!(
            "Manual action: send-now requested for {} (request {})",
            request.requester_email, self.request_id
        );

        let usecase = SendReminderUseCase {
            request,
            title_overrides: HashMap::new(),
            policy: SendPolicy::manual(ctx.config.debug.enabled),
        };
        let outcome = execute(usecase, ctx).await.map_err(UseCaseError::Send)?;
        if outcome.sent {
            info!("Send-now completed for request {}", self.request_id);
        } else {
            info!(
                "Send-now skipped for request {}: {}",
                self.request_id, outcome.message
            );
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::test_helpers::{setup, stored_request, TestContext};

    #[actix_web::main]
    #[test]
    async fn rejects_unknown_and_addressless_requests() {
        let TestContext { ctx, .. } = setup();
        let mut usecase = SendReminderNowUseCase { request_id: 42 };
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseError::NotFound(42))
        ));

        ctx.repos
            .requests
            .insert(&stored_request(43, "", "nomail"))
            .await
            .unwrap();
        let mut usecase = SendReminderNowUseCase { request_id: 43 };
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseError::MissingEmail(43))
        ));
    }

    #[actix_web::main]
    #[test]
    async fn delivery_failure_maps_to_bad_gateway() {
        let TestContext { ctx, services, .. } = setup();
        ctx.repos
            .requests
            .insert(&stored_request(44, "x@x.com", "x"))
            .await
            .unwrap();
        services.mailer.set_failing(true);

        let mut usecase = SendReminderNowUseCase { request_id: 44 };
        let err = usecase.execute(&ctx).await.unwrap_err();
        assert!(matches!(
            ReelminderError::from(err),
            ReelminderError::Delivery(_)
        ));
    }
}
