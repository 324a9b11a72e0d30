use crate::{
    error::ReelminderError,
    shared::usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use reelminder_api_structs::dtos::LogLevelDTO;
use reelminder_api_structs::set_log_level::{APIResponse, RequestBody};
use reelminder_domain::LogLevel;
use reelminder_infra::ReelminderContext;
use tracing::info;

pub async fn set_log_level_controller(
    body: web::Json<RequestBody>,
    ctx: web::Data<ReelminderContext>,
) -> Result<HttpResponse, ReelminderError> {
    let usecase = SetLogLevelUseCase {
        level: body.0.level,
    };

    execute(usecase, &ctx)
        .await
        .map(|level| {
            HttpResponse::Ok().json(APIResponse {
                log_level: LogLevelDTO::new(level),
            })
        })
        .map_err(ReelminderError::from)
}

/// Changes the verbosity of the running process. Not persisted; a restart
/// goes back to `LOG_LEVEL`.
#[derive(Debug)]
struct SetLogLevelUseCase {
    level: String,
}

#[derive(Debug)]
enum UseCaseError {
    InvalidLevel(String),
    ReloadFailed(anyhow::Error),
}

impl From<UseCaseError> for ReelminderError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::InvalidLevel(level) => {
                Self::BadClientData(format!("Invalid log level: {}.", level))
            }
            UseCaseError::ReloadFailed(_) => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for SetLogLevelUseCase {
    type Response = LogLevel;

    type Error = UseCaseError;

    const NAME: &'static str = "SetLogLevel";

    async fn execute(&mut self, ctx: &ReelminderContext) -> Result<Self::Response, Self::Error> {
        let level = LogLevel::parse(&self.level)
            .ok_or_else(|| UseCaseError::InvalidLevel(self.level.trim().to_uppercase()))?;
        ctx.log_control
            .set_level(level)
            .map_err(UseCaseError::ReloadFailed)?;
        info!("Log level set to {}.", level);
        Ok(level)
    }
}
