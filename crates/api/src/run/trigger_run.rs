use super::run_reminders::run_reminders_job;
use crate::{
    error::ReelminderError,
    shared::usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use reelminder_api_structs::trigger_run::APIResponse;
use reelminder_infra::{LockAcquisition, ReelminderContext};
use std::time::Duration;
use tracing::info;

pub async fn trigger_run_controller(
    ctx: web::Data<ReelminderContext>,
) -> Result<HttpResponse, ReelminderError> {
    let usecase = TriggerRunUseCase {
        reason: "manual".into(),
    };

    execute(usecase, &ctx)
        .await
        .map(|res| {
            HttpResponse::Ok().json(APIResponse {
                accepted: res.accepted,
                message: res.message,
            })
        })
        .map_err(ReelminderError::from)
}

/// Starts a run in the background unless one is already in progress.
/// Never waits for the job lock.
#[derive(Debug)]
pub struct TriggerRunUseCase {
    pub reason: String,
}

#[derive(Debug, PartialEq)]
pub struct UseCaseResponse {
    pub accepted: bool,
    pub message: String,
}

#[derive(Debug)]
pub enum UseCaseError {
    LockError(anyhow::Error),
}

impl From<UseCaseError> for ReelminderError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::LockError(_) => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for TriggerRunUseCase {
    type Response = UseCaseResponse;

    type Error = UseCaseError;

    const NAME: &'static str = "TriggerRun";

    async fn execute(&mut self, ctx: &ReelminderContext) -> Result<Self::Response, Self::Error> {
        match ctx.job_lock.try_acquire(Duration::from_secs(0)).await {
            LockAcquisition::Acquired(guard) => {
                let ctx = ctx.clone();
                let reason = self.reason.clone();
                actix_web::rt::spawn(async move {
                    let _guard = guard;
                    run_reminders_job(&ctx, &reason).await;
                });
                Ok(UseCaseResponse {
                    accepted: true,
                    message: "Job started.".into(),
                })
            }
            LockAcquisition::Busy => {
                info!("Job already running; skipping {} trigger.", self.reason);
                Ok(UseCaseResponse {
                    accepted: false,
                    message: "Job is already running.".into(),
                })
            }
            LockAcquisition::Error(e) => Err(UseCaseError::LockError(e)),
        }
    }
}
