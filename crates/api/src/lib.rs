mod email_user;
mod error;
mod job_schedulers;
mod reminder;
mod run;
mod settings;
mod shared;
mod status;

use actix_cors::Cors;
use actix_web::{dev::Server, middleware, web, App, HttpServer};
use job_schedulers::{start_reminder_job_scheduler, SchedulerHandle};
use reelminder_infra::ReelminderContext;
use std::net::TcpListener;
use tracing::info;
use tracing_actix_web::TracingLogger;

pub fn configure_server_api(cfg: &mut web::ServiceConfig) {
    email_user::configure_routes(cfg);
    reminder::configure_routes(cfg);
    run::configure_routes(cfg);
    settings::configure_routes(cfg);
    status::configure_routes(cfg);
}

pub struct Application {
    server: Server,
    port: u16,
    scheduler: SchedulerHandle,
}

impl Application {
    pub async fn new(context: ReelminderContext) -> Result<Self, std::io::Error> {
        let (server, port) = Application::configure_server(context.clone()).await?;
        let scheduler = start_reminder_job_scheduler(context);

        Ok(Self {
            server,
            port,
            scheduler,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    async fn configure_server(
        context: ReelminderContext,
    ) -> Result<(Server, u16), std::io::Error> {
        let port = context.config.port;
        let address = format!("0.0.0.0:{}", port);
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();

        let server = HttpServer::new(move || {
            let ctx = context.clone();

            App::new()
                .wrap(Cors::permissive())
                .wrap(middleware::Compress::default())
                .wrap(TracingLogger::default())
                .app_data(web::Data::new(ctx))
                .service(web::scope("/api/v1").configure(configure_server_api))
        })
        .listen(listener)?
        .workers(4)
        .run();

        Ok((server, port))
    }

    /// Serves until the process is told to stop, then winds down the
    /// scheduler
    pub async fn start(self) -> Result<(), std::io::Error> {
        let res = self.server.await;
        info!("HTTP server stopped; stopping the scheduler.");
        self.scheduler.stop().await;
        res
    }
}
