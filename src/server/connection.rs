//! Per-client WebSocket connection
//!
//! Each connection task forwards broadcast frames out to its socket and
//! hands inbound text frames to the hub. It keeps no state of its own.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;

use crate::error::{Error, ProtocolError, Result};
use crate::hub::Hub;
use crate::registry::{BroadcastFrame, ClientId};

/// A connected WebSocket client
pub struct Connection {
    peer_addr: SocketAddr,
    hub: Arc<Hub>,
    shutdown: CancellationToken,
}

impl Connection {
    /// Create a connection handler for an upgraded socket
    pub fn new(peer_addr: SocketAddr, hub: Arc<Hub>, shutdown: CancellationToken) -> Self {
        Self {
            peer_addr,
            hub,
            shutdown,
        }
    }

    /// Serve the socket until either side closes it or the server shuts down
    pub async fn run(self, socket: WebSocket) -> Result<()> {
        let registry = Arc::clone(self.hub.registry());
        let (id, frames) = registry.register(self.peer_addr).await;

        let result = self.pump(id, socket, frames).await;

        if let Err(e) = registry.unregister(id).await {
            tracing::debug!(client = %id, error = %e, "Client already unregistered");
        }

        result
    }

    async fn pump(
        &self,
        id: ClientId,
        socket: WebSocket,
        mut frames: broadcast::Receiver<BroadcastFrame>,
    ) -> Result<()> {
        let (mut sink, mut stream) = socket.split();

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    // Best effort; the peer may already be gone
                    let _ = sink.send(Message::Close(None)).await;
                    return Ok(());
                }

                frame = frames.recv() => match frame {
                    Ok(frame) => sink.send(Message::Text(frame.text.to_string())).await?,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(client = %id, skipped = skipped, "Client lagging, frames skipped");
                    }
                    Err(RecvError::Closed) => return Ok(()),
                },

                incoming = stream.next() => match incoming {
                    Some(Ok(Message::Text(text))) => {
                        if let Err(e) = self.hub.dispatch_text(id, &text).await {
                            tracing::debug!(client = %id, error = %e, "Ignoring client frame");
                        }
                    }
                    Some(Ok(Message::Binary(_))) => {
                        let e = Error::from(ProtocolError::BinaryFrame);
                        tracing::debug!(client = %id, error = %e, "Ignoring client frame");
                    }
                    Some(Ok(Message::Close(_))) | None => return Ok(()),
                    // Pong replies are sent by axum
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                },
            }
        }
    }
}
