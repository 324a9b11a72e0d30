use crate::{
    error::ReelminderError,
    shared::usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use reelminder_api_structs::dtos::LogLevelDTO;
use reelminder_api_structs::get_log_level::APIResponse;
use reelminder_domain::LogLevel;
use reelminder_infra::ReelminderContext;

pub async fn get_log_level_controller(
    ctx: web::Data<ReelminderContext>,
) -> Result<HttpResponse, ReelminderError> {
    let usecase = GetLogLevelUseCase {};

    execute(usecase, &ctx)
        .await
        .map(|level| {
            HttpResponse::Ok().json(APIResponse {
                log_level: LogLevelDTO::new(level),
            })
        })
        .map_err(ReelminderError::from)
}

#[derive(Debug)]
struct GetLogLevelUseCase {}

#[derive(Debug)]
enum UseCaseError {}

impl From<UseCaseError> for ReelminderError {
    fn from(e: UseCaseError) -> Self {
        match e {}
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetLogLevelUseCase {
    type Response = LogLevel;

    type Error = UseCaseError;

    const NAME: &'static str = "GetLogLevel";

    async fn execute(&mut self, ctx: &ReelminderContext) -> Result<Self::Response, Self::Error> {
        Ok(ctx.log_control.level())
    }
}
