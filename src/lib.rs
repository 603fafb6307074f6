pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod ratelimit;
pub mod runner;
pub mod transpile;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;

use crate::{
    config::Config,
    runner::{CodeRunner, ProcessRunner},
};

pub async fn run() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing(&config);

    let runner: Arc<dyn CodeRunner> = Arc::new(ProcessRunner::new(config.clone()));
    let app = api::routes(config.clone(), runner);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .context("failed to bind listener")?;
    let local = listener
        .local_addr()
        .unwrap_or(SocketAddr::from(([0, 0, 0, 0], 0)));
    tracing::info!(bind = %local, "block execution service ready");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("server error")?;
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_level.clone()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_current_span(false)
        .with_span_list(false)
        .init();
}
