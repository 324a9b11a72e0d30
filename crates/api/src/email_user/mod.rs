mod get_unsubscribed_email_users;
mod resubscribe_email_user;
mod unsubscribe_email_user;

use actix_web::web;
use get_unsubscribed_email_users::get_unsubscribed_email_users_controller;
use resubscribe_email_user::resubscribe_email_user_controller;
use unsubscribe_email_user::unsubscribe_email_user_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/email-users/unsubscribed",
        web::get().to(get_unsubscribed_email_users_controller),
    );
    cfg.route(
        "/email-users/unsubscribe",
        web::post().to(unsubscribe_email_user_controller),
    );
    cfg.route(
        "/email-users/resubscribe",
        web::post().to(resubscribe_email_user_controller),
    );
}
