use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use hazard_report_core::{IncidentSchema, IncidentStore, MemStorage, SubmissionService};
use hazard_report_server::{build_app, AppState, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Hazard Report incident API server")]
struct Args {
    /// Config file path
    #[clap(short, long, env = "HAZARD_CONFIG")]
    config: Option<String>,

    /// Interface to listen on
    #[clap(long)]
    host: Option<String>,

    /// TCP port to listen on
    #[clap(short, long)]
    port: Option<u16>,

    /// Default log filter when RUST_LOG is unset
    #[clap(long)]
    log_level: Option<String>,

    /// Allow cross-origin requests from any origin
    #[clap(long)]
    cors_permissive: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Load configuration, then apply command-line overrides
    let mut config = ServerConfig::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(log_level) = args.log_level {
        config.log_level = log_level;
    }
    if args.cors_permissive {
        config.cors_permissive = true;
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting hazard report service");

    // The store lives as long as the process
    let store: Arc<dyn IncidentStore> = Arc::new(MemStorage::new());
    let schema = IncidentSchema::new(config.core.validation.clone());
    let state = Arc::new(AppState::new(SubmissionService::new(store, schema)));

    let app = build_app(state, &config);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
