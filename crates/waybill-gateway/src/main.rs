use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use waybill_gateway::cli::Cli;
use waybill_gateway::observer::TracingObserver;
use waybill_gateway::{telemetry, App, AppState};
use waybill_generator::HashedGenerator;
use waybill_limiter::AdmissionController;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse();
    telemetry::init(config.log_format, &config.log_filter)?;

    let generator = HashedGenerator::new().with_observer(Arc::new(TracingObserver::default()));
    let strategy = generator.strategy();

    let settings = config.limiter_settings();
    let limiter = Arc::new(AdmissionController::new(settings));
    let eviction = limiter.spawn_eviction(config.eviction_interval());

    let state = AppState::new(Arc::new(generator), limiter, config.credentials());

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;

    info!(
        listen_addr = %listener.local_addr()?,
        hash_strategy = %strategy,
        bucket_capacity = settings.capacity,
        refill_interval_secs = settings.refill_interval.as_secs(),
        log_format = %config.log_format,
        "starting waybill gateway"
    );

    axum::serve(
        listener,
        App::router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("gateway server failed")?;

    eviction.abort();
    info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for ctrl-c, running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
