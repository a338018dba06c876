//! Connection registry implementation
//!
//! Tracks connected clients and fans frames out to all of them.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{broadcast, RwLock};

use super::config::RegistryConfig;
use super::entry::{ClientEntry, ClientInfo};
use super::error::RegistryError;
use super::frame::{BroadcastFrame, ClientId};

/// Registry of connected clients
///
/// Membership is behind a `RwLock`; fan-out goes through a single
/// `broadcast` channel so sending never waits on a slow client.
pub struct ConnectionRegistry {
    /// Connected clients keyed by id
    clients: RwLock<HashMap<ClientId, ClientEntry>>,

    /// Broadcast sender for fan-out to every connection
    tx: broadcast::Sender<BroadcastFrame>,

    /// Next id to hand out
    next_id: AtomicU64,

    /// Configuration
    config: RegistryConfig,
}

impl ConnectionRegistry {
    /// Create a new registry with default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a new registry with custom configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        let (tx, _) = broadcast::channel(config.broadcast_capacity.max(1));

        Self {
            clients: RwLock::new(HashMap::new()),
            tx,
            next_id: AtomicU64::new(1),
            config,
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register a newly connected client
    ///
    /// Returns the client's id and a receiver for every frame broadcast from
    /// now on. The receiver is created before the client becomes visible, so
    /// a resync triggered by this client is never missed.
    pub async fn register(
        &self,
        peer_addr: SocketAddr,
    ) -> (ClientId, broadcast::Receiver<BroadcastFrame>) {
        let id = ClientId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let rx = self.tx.subscribe();

        let mut clients = self.clients.write().await;
        clients.insert(id, ClientEntry::new(peer_addr));

        tracing::info!(
            client = %id,
            peer = %peer_addr,
            clients = clients.len(),
            "Client connected"
        );

        (id, rx)
    }

    /// Remove a client from the registry
    pub async fn unregister(&self, id: ClientId) -> Result<ClientInfo, RegistryError> {
        let mut clients = self.clients.write().await;

        let entry = clients
            .remove(&id)
            .ok_or(RegistryError::ClientNotFound(id))?;

        tracing::info!(
            client = %id,
            peer = %entry.peer_addr,
            connected_secs = entry.duration().as_secs(),
            clients = clients.len(),
            "Client disconnected"
        );

        Ok(ClientInfo {
            id,
            peer_addr: entry.peer_addr,
            connected_for: entry.duration(),
        })
    }

    /// Subscribe to broadcasts without registering a client
    ///
    /// Used by in-process observers such as tests.
    pub fn subscribe(&self) -> broadcast::Receiver<BroadcastFrame> {
        self.tx.subscribe()
    }

    /// Send a frame to every connected client
    ///
    /// Returns the number of receivers the frame was queued for; 0 when
    /// nobody is listening.
    pub fn broadcast(&self, frame: BroadcastFrame) -> usize {
        let event = frame.event.clone();
        let receivers = self.tx.send(frame).unwrap_or(0);

        tracing::trace!(event = %event, receivers = receivers, "Broadcast frame");

        receivers
    }

    /// Look up a connected client
    pub async fn client_info(&self, id: ClientId) -> Option<ClientInfo> {
        let clients = self.clients.read().await;

        clients.get(&id).map(|entry| ClientInfo {
            id,
            peer_addr: entry.peer_addr,
            connected_for: entry.duration(),
        })
    }

    /// Number of connected clients
    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use serde_json::json;

    use super::*;

    fn addr(port: u16) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
    }

    #[tokio::test]
    async fn test_register_unregister() {
        let registry = ConnectionRegistry::new();

        let (a, _rx_a) = registry.register(addr(5000)).await;
        let (b, _rx_b) = registry.register(addr(5001)).await;
        assert_ne!(a, b);
        assert_eq!(registry.client_count().await, 2);

        let info = registry.unregister(a).await.unwrap();
        assert_eq!(info.peer_addr, addr(5000));
        assert_eq!(registry.client_count().await, 1);

        // Second removal is reported, not ignored
        assert_eq!(
            registry.unregister(a).await.unwrap_err(),
            RegistryError::ClientNotFound(a)
        );
        assert!(registry.client_info(b).await.is_some());
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_client() {
        let registry = ConnectionRegistry::new();

        let (_a, mut rx_a) = registry.register(addr(5000)).await;
        let (_b, mut rx_b) = registry.register(addr(5001)).await;

        let sent = registry.broadcast(BroadcastFrame::new("score", json!({"totalPoints": 1})));
        assert_eq!(sent, 2);

        for rx in [&mut rx_a, &mut rx_b] {
            let frame = rx.recv().await.unwrap();
            assert_eq!(&*frame.event, "score");
            assert_eq!(frame.payload(), Some(&json!({"totalPoints": 1})));
        }
    }

    #[tokio::test]
    async fn test_broadcast_without_clients() {
        let registry = ConnectionRegistry::new();
        assert_eq!(registry.broadcast(BroadcastFrame::signal("rollingtext:hideall")), 0);
    }

    #[tokio::test]
    async fn test_slow_client_lags_instead_of_blocking() {
        let registry = ConnectionRegistry::with_config(RegistryConfig::default().broadcast_capacity(2));
        let (_id, mut rx) = registry.register(addr(5000)).await;

        for n in 0..5 {
            registry.broadcast(BroadcastFrame::new("score", json!({"totalPoints": n})));
        }

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(_))
        ));
        // Newest frames are still delivered after the lag is reported
        let frame = rx.recv().await.unwrap();
        assert_eq!(frame.payload(), Some(&json!({"totalPoints": 3})));
    }
}
