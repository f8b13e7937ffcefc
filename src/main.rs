use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use dotenvy::dotenv;
use std::sync::Arc;

mod analytics;
mod api;
mod client;
mod config;
mod docs;
mod error;
mod model;
mod routes;

use analytics::AnalyticsEngine;
use client::HttpRecordSource;
use config::Config;

use crate::docs::ApiDoc;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "HRM analytics is running"
}

/// Load the dashboard snapshot once so the first visitor hits a warm cache.
async fn warmup_dashboard(engine: &AnalyticsEngine) -> anyhow::Result<()> {
    let data = engine.load_dataset().await?;
    info!(
        employees = data.employees.len(),
        work_logs = data.work_logs.len(),
        payrolls = data.payrolls.len(),
        "Dashboard cache warmup complete"
    );
    Ok(())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let source = HttpRecordSource::from_config(&config).map_err(std::io::Error::other)?;
    let engine = Data::new(AnalyticsEngine::from_config(&config, Arc::new(source)));

    let engine_for_warmup = engine.clone();
    let server_addr = config.server_addr.clone();

    actix_web::rt::spawn(async move {
        if let Err(e) = warmup_dashboard(&engine_for_warmup).await {
            warn!(error = %e, "Failed to warm up dashboard cache");
        }
    });

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(engine.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, config.clone()))
    })
    .bind(server_addr)?
    .run()
    .await
}
