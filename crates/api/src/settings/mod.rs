pub mod check_watch_status;
mod get_log_level;
mod get_settings;
mod set_log_level;
mod set_scheduler_enabled;

use actix_web::web;
use check_watch_status::check_watch_status_controller;
use get_log_level::get_log_level_controller;
use get_settings::get_settings_controller;
use set_log_level::set_log_level_controller;
use set_scheduler_enabled::set_scheduler_enabled_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/settings", web::get().to(get_settings_controller));
    cfg.route(
        "/settings/scheduler",
        web::put().to(set_scheduler_enabled_controller),
    );
    cfg.route(
        "/settings/watch-status",
        web::post().to(check_watch_status_controller),
    );
    cfg.route(
        "/settings/log-level",
        web::get().to(get_log_level_controller),
    );
    cfg.route(
        "/settings/log-level",
        web::put().to(set_log_level_controller),
    );
}
