use crate::{
    error::ReelminderError,
    shared::usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use reelminder_api_structs::dtos::SettingsDTO;
use reelminder_api_structs::get_settings::APIResponse;
use reelminder_domain::SchedulerSettings;
use reelminder_infra::ReelminderContext;

pub async fn get_settings_controller(
    ctx: web::Data<ReelminderContext>,
) -> Result<HttpResponse, ReelminderError> {
    let usecase = GetSettingsUseCase {};

    execute(usecase, &ctx)
        .await
        .map(|settings| {
            HttpResponse::Ok().json(APIResponse {
                settings: SettingsDTO::new(settings),
            })
        })
        .map_err(ReelminderError::from)
}

#[derive(Debug)]
struct GetSettingsUseCase {}

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
impl UseCase for GetSettingsUseCase {
    type Response = SchedulerSettings;

    type Error = UseCaseError;

    const NAME: &'static str = "GetSettings";

    async fn execute(&mut self, ctx: &ReelminderContext) -> Result<Self::Response, Self::Error> {
        ctx.repos
            .settings
            .scheduler_settings()
            .await
            .map_err(|_| UseCaseError::StorageError)
    }
}
