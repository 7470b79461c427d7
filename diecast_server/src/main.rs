use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use diecast_core::{build_registry, render, Aggregator, AggregatorSettings, DiecastConfig};
use diecast_server::{create_router, AppState, ServerError};

#[derive(Parser, Debug)]
#[command(name = "diecast_server", version, about = "Die-cast model search API")]
struct Args {
    /// Address to listen on
    #[arg(long, env = "DIECAST_BIND", default_value = "127.0.0.1:5000")]
    bind: SocketAddr,

    /// Path to a TOML config file
    #[arg(long, short)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("diecast_server=info,diecast_core=info,tower_http=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting Diecast search server");

    let config = DiecastConfig::load(args.config.as_deref())?;
    let renderer = render::build_renderer(&config.render)?;
    let registry = build_registry(&config, renderer)?;
    info!(
        sources = registry.len(),
        webdriver = config.render.webdriver_url.is_some(),
        "registry ready"
    );

    let aggregator = Aggregator::new(registry, AggregatorSettings::from(&config.aggregator));
    let app = create_router(AppState::new(aggregator));

    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
