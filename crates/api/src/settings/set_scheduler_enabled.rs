use crate::{
    error::ReelminderError,
    shared::usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use reelminder_api_structs::dtos::SettingsDTO;
use reelminder_api_structs::set_scheduler_enabled::{APIResponse, RequestBody};
use reelminder_domain::SchedulerSettings;
use reelminder_infra::ReelminderContext;
use tracing::info;

pub async fn set_scheduler_enabled_controller(
    body: web::Json<RequestBody>,
    ctx: web::Data<ReelminderContext>,
) -> Result<HttpResponse, ReelminderError> {
    let usecase = SetSchedulerEnabledUseCase {
        enabled: body.0.enabled,
    };

    execute(usecase, &ctx)
        .await
        .map(|settings| {
            HttpResponse::Ok().json(APIResponse {
                settings: SettingsDTO::new(settings),
            })
        })
        .map_err(ReelminderError::from)
}

/// Pauses or resumes the automated runs. Runs triggered by an operator are
/// not affected.
#[derive(Debug)]
struct SetSchedulerEnabledUseCase {
    enabled: bool,
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
impl UseCase for SetSchedulerEnabledUseCase {
    type Response = SchedulerSettings;

    type Error = UseCaseError;

    const NAME: &'static str = "SetSchedulerEnabled";

    async fn execute(&mut self, ctx: &ReelminderContext) -> Result<Self::Response, Self::Error> {
        ctx.repos
            .settings
            .set_scheduler_disabled(!self.enabled)
            .await
            .map_err(|_| UseCaseError::StorageError)?;
        if self.enabled {
            info!("Scheduler enabled. Automated scans resumed.");
        } else {
            info!("Scheduler disabled. Automated scans are paused.");
        }

        ctx.repos
            .settings
            .scheduler_settings()
            .await
            .map_err(|_| UseCaseError::StorageError)
    }
}
