use super::utils::start_time;
use reelminder_api::Application;
use reelminder_infra::{Config, InMemoryServices, ReelminderContext, StaticTimeSys};
use reelminder_sdk::ReelminderSDK;
use std::sync::Arc;

pub struct TestApp {
    pub ctx: ReelminderContext,
    pub services: InMemoryServices,
    pub sys: Arc<StaticTimeSys>,
}

// Launch the application as a background task
pub async fn spawn_app() -> (TestApp, ReelminderSDK) {
    spawn_app_with_config(Config::default()).await
}

pub async fn spawn_app_with_config(mut config: Config) -> (TestApp, ReelminderSDK) {
    config.port = 0; // Random port
    let services = InMemoryServices::new();
    let sys = Arc::new(StaticTimeSys::new(start_time()));
    let ctx = ReelminderContext::create_inmemory(config, services.services(), sys.clone());
    ctx.seed_settings()
        .await
        .expect("Expected settings to be seeded");

    let application = Application::new(ctx.clone())
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}/api/v1", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    let app = TestApp { ctx, services, sys };
    let sdk = ReelminderSDK::new(address);
    (app, sdk)
}
