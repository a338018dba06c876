//! HTTP listener
//!
//! Serves the overlay pages as static files and upgrades the WebSocket
//! route into a [`Connection`] per client.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::Result;
use crate::hub::Hub;
use crate::server::config::ServerConfig;
use crate::server::connection::Connection;

/// State shared with every request handler
#[derive(Clone)]
struct ServerState {
    hub: Arc<Hub>,
    shutdown: CancellationToken,
    connection_semaphore: Option<Arc<Semaphore>>,
}

/// Overlay hub server
pub struct HubServer {
    config: ServerConfig,
    hub: Arc<Hub>,
    connection_semaphore: Option<Arc<Semaphore>>,
}

impl HubServer {
    /// Create a new server around a hub
    pub fn new(config: ServerConfig, hub: Arc<Hub>) -> Self {
        let connection_semaphore = if config.max_connections > 0 {
            Some(Arc::new(Semaphore::new(config.max_connections)))
        } else {
            None
        };

        Self {
            config,
            hub,
            connection_semaphore,
        }
    }

    /// Get a reference to the hub
    pub fn hub(&self) -> &Arc<Hub> {
        &self.hub
    }

    /// Get the bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }

    /// Build the router: WebSocket route plus static fallback
    ///
    /// Connections opened through it close when `shutdown` is cancelled.
    pub fn router(&self, shutdown: CancellationToken) -> Router {
        let state = ServerState {
            hub: Arc::clone(&self.hub),
            shutdown,
            connection_semaphore: self.connection_semaphore.clone(),
        };

        Router::new()
            .route(&self.config.ws_path, get(ws_upgrade))
            .fallback_service(ServeDir::new(&self.config.static_dir))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Run the server
    ///
    /// This method blocks until the server fails.
    pub async fn run(&self) -> Result<()> {
        self.run_until(CancellationToken::new()).await
    }

    /// Run the server with graceful shutdown
    pub async fn run_until(&self, shutdown: CancellationToken) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` is cancelled
    pub async fn serve(&self, listener: TcpListener, shutdown: CancellationToken) -> Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(
            addr = %addr,
            ws_path = %self.config.ws_path,
            static_dir = %self.config.static_dir.display(),
            "Overlay hub listening"
        );

        let app = self.router(shutdown.clone());

        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        Ok(())
    }
}

async fn ws_upgrade(
    State(state): State<ServerState>,
    ConnectInfo(peer_addr): ConnectInfo<SocketAddr>,
    ws: WebSocketUpgrade,
) -> Response {
    // Check connection limit
    let permit = match &state.connection_semaphore {
        Some(sem) => match Arc::clone(sem).try_acquire_owned() {
            Ok(permit) => Some(permit),
            Err(_) => {
                tracing::warn!(peer = %peer_addr, "Connection rejected: limit reached");
                return StatusCode::SERVICE_UNAVAILABLE.into_response();
            }
        },
        None => None,
    };

    ws.on_upgrade(move |socket| async move {
        let _permit = permit;
        let connection = Connection::new(peer_addr, state.hub, state.shutdown);

        if let Err(e) = connection.run(socket).await {
            tracing::debug!(peer = %peer_addr, error = %e, "Connection error");
        }

        tracing::debug!(peer = %peer_addr, "Connection closed");
    })
}
