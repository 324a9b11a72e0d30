mod telemetry;

use reelminder_api::Application;
use reelminder_infra::{setup_context, ILogControl};
use std::sync::Arc;
use telemetry::{get_subscriber, init_subscriber, ReloadLogControl};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    openssl_probe::init_ssl_cert_env_vars();

    let (subscriber, filter_handle) = get_subscriber("reelminder".into(), "info".into());
    init_subscriber(subscriber)?;

    let mut context = setup_context().await?;

    let log_control = ReloadLogControl::new(filter_handle, context.config.log_level);
    // RUST_LOG keeps its filter until an operator picks a level
    if std::env::var("RUST_LOG").is_err() {
        log_control.set_level(context.config.log_level)?;
    }
    context.log_control = Arc::new(log_control);

    let app = Application::new(context).await?;
    app.start().await?;
    Ok(())
}
