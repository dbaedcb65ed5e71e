//! TutorHub Server
//!
//! Class-management backend for a tutoring center: parents, students,
//! classes, session-based subscriptions and class registrations.

use actix_cors::Cors;
use actix_web::{http::header, middleware, App, HttpServer};
use anyhow::Context;
use tracing::info;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tutorhub_api::configure_app;
use tutorhub_core::config::{LogFormat, LoggingConfig};
use tutorhub_core::AppConfig;
use tutorhub_db::Store;

/// Initialize tracing/logging
fn init_tracing(config: &LoggingConfig) {
    let level = &config.level;
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "tutorhub={level},tutorhub_api={level},tutorhub_services={level},\
             tutorhub_db={level},tutorhub_core={level},actix_web=info,sqlx=warn"
        ))
    });

    let registry = tracing_subscriber::registry().with(env_filter);
    match config.format {
        LogFormat::Json => registry.with(fmt::layer().json().with_target(true)).init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_line_number(true),
            )
            .init(),
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    init_tracing(&config.logging);

    info!("Starting TutorHub v{}", env!("CARGO_PKG_VERSION"));

    info!("Opening {} store...", config.database.backend);
    let store = Store::from_config(&config.database)
        .await
        .context("Failed to open store")?;

    let bind_addr = config.server_addr();
    let workers = config.server.workers.max(1);
    let cors_origins = config.server.allowed_origins();
    info!(
        "Starting HTTP server on {} with {} workers",
        bind_addr, workers
    );

    let app_store = store.clone();
    let server = HttpServer::new(move || {
        let origins = cors_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _req_head| {
                origin
                    .to_str()
                    .map(|o| origins.iter().any(|allowed| allowed == o))
                    .unwrap_or(false)
            })
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .max_age(3600);

        let store = app_store.clone();
        App::new()
            .wrap(cors)
            .wrap(TracingLogger::default())
            .wrap(middleware::NormalizePath::trim())
            .configure(move |cfg| configure_app(cfg, &store))
    })
    .workers(workers)
    .bind(&bind_addr)
    .with_context(|| format!("Failed to bind {}", bind_addr))?
    .run();

    let result = server.await;

    store.close().await;
    info!("TutorHub stopped");

    result.context("HTTP server failed")
}
