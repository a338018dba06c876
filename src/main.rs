//! Overlay hub
//!
//! Serves the overlay pages and WebSocket hub, and restreams the ingest
//! feed to the output until the pipeline fails or ends.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use overlay_hub::clock::{self, ClockConfig};
use overlay_hub::registry::ConnectionRegistry;
use overlay_hub::server::config::DEFAULT_PORT;
use overlay_hub::stream::{self, StreamConfig};
use overlay_hub::{Hub, HubServer, ServerConfig};

const DEFAULT_LOG_FILTER: &str = "overlay_hub=info,tower_http=info";
const STREAM_STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Real-time state hub for live broadcast overlays
#[derive(Parser, Debug)]
#[command(name = "overlay-hub", version, about)]
struct Args {
    /// Source the pipeline pulls video from
    ingest: String,

    /// Destination the pipeline pushes video to
    output: String,

    /// Address to listen on
    #[arg(long, default_value_t = SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)))]
    bind: SocketAddr,

    /// Directory of overlay pages
    #[arg(long, default_value = "public")]
    static_dir: PathBuf,

    /// Pipeline command line; `{ingest}`, `{output}`, `{overlay}` and
    /// `{hls_root}` are substituted
    #[arg(long)]
    pipeline: Option<String>,

    /// Log level for this crate and the HTTP layer (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize tracing
    let filter = match &args.log_level {
        Some(level) => EnvFilter::try_new(format!("overlay_hub={level},tower_http={level}"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(ingest = %args.ingest, output = %args.output, "Starting overlay hub");

    let config = ServerConfig::default()
        .bind(args.bind)
        .static_dir(args.static_dir);

    let mut stream_config = StreamConfig::new(args.ingest, args.output)
        .served_from(config.bind_addr, &config.static_dir);
    if let Some(pipeline) = &args.pipeline {
        stream_config = stream_config.command_line(pipeline);
    }

    let shutdown = CancellationToken::new();
    let registry = Arc::new(ConnectionRegistry::with_config(config.registry.clone()));

    let (clock, clock_task) = clock::spawn(ClockConfig::default());
    let bridge = clock::spawn_bridge(clock.subscribe(), Arc::clone(&registry));

    let (stream, events, stream_task) = stream::spawn(stream_config);
    let supervisor = tokio::spawn(stream::supervise(events, shutdown.clone()));
    stream.play();

    tokio::spawn(shutdown_signal(shutdown.clone()));

    let hub = Arc::new(Hub::new(registry, clock, stream));
    let server = HubServer::new(config, hub);
    let result = server.run_until(shutdown.clone()).await;

    // The server may have failed on its own; stop everything else too
    shutdown.cancel();
    drop(server);

    // Dropping the last stream handle stops the pipeline process
    if tokio::time::timeout(STREAM_STOP_TIMEOUT, stream_task).await.is_err() {
        error!("Stream controller did not stop in time");
        supervisor.abort();
    }
    bridge.abort();
    clock_task.abort();

    match supervisor.await {
        Ok(Some(event)) => info!(event = ?event, "Stream ended"),
        Ok(None) => {}
        Err(e) if e.is_cancelled() => {}
        Err(e) => error!(error = %e, "Stream supervisor failed"),
    }

    if let Err(e) = &result {
        error!(error = %e, "Server failed");
    }
    result?;

    info!("Overlay hub shutdown complete");

    Ok(())
}

/// Cancel `shutdown` on SIGINT or SIGTERM
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown"),
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGINT");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown");
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
        _ = shutdown.cancelled() => {},
    }

    shutdown.cancel();
}
