mod backfill_metadata;
mod ingest_requests;
pub mod run_reminders;
mod trigger_run;

use actix_web::web;
use trigger_run::trigger_run_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/run", web::post().to(trigger_run_controller));
}
