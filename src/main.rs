use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use wabridge::client::{SessionClient, SidecarClient};
use wabridge::config::Config;
use wabridge::server::{self, AppState};
use wabridge::state::{self, ConnectionState};

// ============================================================================
// CLI Types
// ============================================================================

/// Wabridge - HTTP bridge for a browser-driven WhatsApp web session
#[derive(Parser, Debug)]
#[command(version = wabridge::build_info::VERSION, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "wabridge.yaml")]
    config: String,

    /// Host to bind to (overrides config file)
    #[arg(long)]
    host: Option<IpAddr>,

    /// Port to listen on (overrides config file)
    #[arg(short, long)]
    port: Option<u16>,
}

// ============================================================================
// Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> std::process::ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(&cli.config).await?;
    if let Some(host) = cli.host {
        config.server.host = host.to_string();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    // The sidecar is spawned exactly once; reconnection is its own business.
    let (event_tx, event_rx) = mpsc::channel(64);
    let sidecar = Arc::new(
        SidecarClient::spawn(&config.client, event_tx)
            .with_context(|| format!("failed to spawn session client '{}'", config.client.command))?,
    );
    info!(command = %config.client.command, "Session client started");

    let connection = ConnectionState::new();
    tokio::spawn(state::run_event_pump(connection.clone(), event_rx));

    let client: Arc<dyn SessionClient> = sidecar.clone();
    let app_state = AppState {
        connection,
        client,
        api_key: config.server.api_key.clone(),
        chat_suffix: config.client.chat_suffix.clone(),
    };
    let app = server::build_app(app_state);

    let ip: IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::new(ip, config.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(addr = %addr, "Starting server");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sidecar.shutdown().await;
    info!("Server stopped");
    Ok(())
}

// ============================================================================
// Initialization
// ============================================================================

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
