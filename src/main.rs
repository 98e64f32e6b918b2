//! Mockup Resolver
//!
//! HTTP entry point: resolves a Printful variant, builds its mockup style
//! catalog and stores the filtered mockups in S3.

use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing::{error, info};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

use mockup_resolver::api;
use mockup_resolver::config::Settings;
use mockup_resolver::storage::{load_aws_config, S3Uploader};
use mockup_resolver::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = Settings::load().context("Failed to load configuration")?;

    // Initialize tracing subscriber for structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(settings.log_filter())),
        )
        .json()
        .init();

    if let Err(e) = settings.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(e.into());
    }

    let bind_addr = format!("{}:{}", settings.server.host, settings.server.port);
    info!(
        "Starting Mockup Resolver v{} on {}",
        env!("CARGO_PKG_VERSION"),
        bind_addr
    );

    let aws_config = load_aws_config(&settings.storage.region).await;
    let uploader = S3Uploader::new(&aws_config, &settings.storage)?;
    info!(bucket = uploader.bucket(), "S3 uploader initialized");

    let workers = settings.server.worker_count();

    // Create shared application state
    let app_state = web::Data::new(AppState {
        settings,
        uploader: Arc::new(uploader),
    });

    // Configure and start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(TracingLogger::default())
            .wrap(middleware::Compress::default())
            .wrap(
                middleware::DefaultHeaders::new()
                    .add(("X-Service", "mockup-resolver"))
                    .add(("X-Version", env!("CARGO_PKG_VERSION")))
            )
            // Routes
            .configure(api::configure_routes)
    })
    .workers(workers)
    .bind(&bind_addr)
    .with_context(|| format!("Failed to bind {}", bind_addr))?
    .run()
    .await?;

    Ok(())
}
