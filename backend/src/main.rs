//! Docvault entry-point: loads settings, applies migrations, wires adapters
//! and serves the REST API until interrupted.

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use docvault::inbound::http::health::HealthState;
use docvault::outbound::persistence::run_migrations;
use server::{AppSettings, Routes, ServerConfig, build_http_state, create_server};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(e) = fmt().with_env_filter(filter).json().try_init() {
        warn!(error = %e, "tracing init failed");
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|err| eyre!("failed to load settings: {err}"))?;
    let config = ServerConfig::try_from(settings).wrap_err("invalid settings")?;

    run_migrations(config.database.database_url().to_owned())
        .await
        .wrap_err("failed to apply database migrations")?;

    let http_state = web::Data::new(build_http_state(&config).await?);
    let health_state = web::Data::new(HealthState::new());
    let routes = Routes::new(health_state.clone(), http_state);
    let server = create_server(routes, config.bind_addr())
        .wrap_err_with(|| format!("failed to bind {}", config.bind_addr()))?;
    info!(addr = %config.bind_addr(), "server listening");

    let handle = server.handle();
    actix_web::rt::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for shutdown signal");
            return;
        }
        info!("shutdown requested; draining connections");
        health_state.mark_unhealthy();
        handle.stop(true).await;
    });

    server.await.wrap_err("server terminated with an error")?;
    info!("server stopped");
    Ok(())
}
