use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use axum::Router;
use duet_server::{AppState, RelayConfig, router};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Two-party WebRTC signaling relay.
#[derive(Parser, Debug)]
#[command(name = "duet", version)]
struct Cli {
    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on.
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    port: u16,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Do not echo server log lines to clients as `log` events.
    #[arg(long)]
    no_log_echo: bool,

    /// Treat `bye` as leaving the room instead of a logged notice.
    #[arg(long)]
    leave_on_bye: bool,

    /// Capacity of the coordinator command queue.
    #[arg(long, default_value_t = 256)]
    command_buffer: usize,
}

impl Cli {
    fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            echo_logs: !self.no_log_echo,
            leave_on_bye: self.leave_on_bye,
            command_buffer: self.command_buffer,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .context("Invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let (state, coordinator) = AppState::start(cli.relay_config());
    let app = app(state);

    let addr = SocketAddr::new(cli.host, cli.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    println!(
        "{} {}",
        "Signaling relay listening on".green().bold(),
        format!("ws://{}/ws", addr).cyan()
    );
    info!("Signaling relay listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Sockets still open hold the command sender, so the coordinator is not awaited.
    coordinator.abort();
    info!("Signaling relay stopped");

    Ok(())
}

/// The signaling routes with request tracing and a permissive CORS policy.
fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
