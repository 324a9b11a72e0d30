mod get_pending_reminders;
mod get_sent_emails;
pub mod send_reminder;
mod send_reminder_now;
mod skip_request;

use actix_web::web;
use get_pending_reminders::get_pending_reminders_controller;
use get_sent_emails::get_sent_emails_controller;
use send_reminder_now::send_reminder_now_controller;
use skip_request::skip_request_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/reminders/pending",
        web::get().to(get_pending_reminders_controller),
    );
    cfg.route("/emails/sent", web::get().to(get_sent_emails_controller));
    cfg.route(
        "/requests/{request_id}/send",
        web::post().to(send_reminder_now_controller),
    );
    cfg.route(
        "/requests/{request_id}/skip",
        web::post().to(skip_request_controller),
    );
}
