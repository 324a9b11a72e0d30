use crate::run::run_reminders::run_reminders_job;
use reelminder_infra::{LockAcquisition, ReelminderContext};
use std::time::Duration;
use tokio::{sync::watch, task::JoinHandle, time::sleep};
use tracing::{error, info};

/// Handle to the background reminder job
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stops the scheduler before its next run. A run already in progress
    /// is allowed to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            error!("Scheduler task ended abnormally: {:?}", e);
        }
    }
}

pub fn start_reminder_job_scheduler(ctx: ReelminderContext) -> SchedulerHandle {
    let (shutdown, receiver) = watch::channel(false);
    let handle = actix_web::rt::spawn(reminder_job_loop(ctx, receiver));
    SchedulerHandle { shutdown, handle }
}

/// Returns false when shutdown was requested before `duration` elapsed
async fn sleep_or_shutdown(duration: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    if *shutdown.borrow() {
        return false;
    }
    tokio::select! {
        _ = sleep(duration) => true,
        _ = shutdown.changed() => false,
    }
}

async fn reminder_job_loop(ctx: ReelminderContext, mut shutdown: watch::Receiver<bool>) {
    info!(
        "Scheduler starting (initial delay {:?}, interval {:?}).",
        ctx.config.initial_delay, ctx.config.job_interval
    );
    if !sleep_or_shutdown(ctx.config.initial_delay, &mut shutdown).await {
        info!("Scheduler exiting.");
        return;
    }

    let mut disabled_notice_logged = false;
    loop {
        match ctx.repos.settings.scheduler_settings().await {
            Ok(settings) if settings.scheduler_disabled => {
                if !disabled_notice_logged {
                    info!("Scheduler disabled; skipping automated runs until re-enabled.");
                    disabled_notice_logged = true;
                }
            }
            Ok(_) => {
                if disabled_notice_logged {
                    info!("Scheduler re-enabled; resuming automated runs.");
                    disabled_notice_logged = false;
                }
                run_scheduled(&ctx).await;
            }
            Err(e) => error!("Failed to read scheduler settings: {:?}", e),
        }

        if !sleep_or_shutdown(ctx.config.job_interval, &mut shutdown).await {
            break;
        }
    }
    info!("Scheduler exiting.");
}

async fn run_scheduled(ctx: &ReelminderContext) {
    match ctx.job_lock.try_acquire(ctx.config.job_lock_timeout).await {
        LockAcquisition::Acquired(_guard) => {
            run_reminders_job(ctx, "scheduled").await;
        }
        LockAcquisition::Busy => info!("Job already running; skipping automated run."),
        LockAcquisition::Error(e) => error!("Failed to acquire the job lock: {:?}", e),
    }
}
