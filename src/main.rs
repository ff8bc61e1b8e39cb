mod ai;
mod api;
mod config;
mod error;
mod guidelines;
mod host;
mod lines;
mod llm;
mod orchestrator;
mod types;

use actix_web::{web, App, HttpServer};
use config::AppConfig;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional outside local development
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    let bind_addr = (config.server.host.clone(), config.server.port);
    tracing::info!(host = %bind_addr.0, port = bind_addr.1, "starting PR review service");

    let data = web::Data::new(config);
    HttpServer::new(move || App::new().app_data(data.clone()).configure(api::configure))
        .bind(bind_addr)?
        .run()
        .await?;

    Ok(())
}
