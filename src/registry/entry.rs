//! Per-client registry entries

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use super::frame::ClientId;

/// Entry for a single connected client
#[derive(Debug, Clone)]
pub struct ClientEntry {
    /// Remote peer address
    pub peer_addr: SocketAddr,

    /// When the client connected
    pub connected_at: Instant,
}

impl ClientEntry {
    pub(super) fn new(peer_addr: SocketAddr) -> Self {
        Self {
            peer_addr,
            connected_at: Instant::now(),
        }
    }

    /// How long the client has been connected
    pub fn duration(&self) -> Duration {
        self.connected_at.elapsed()
    }
}

/// Snapshot of a client's registry entry
#[derive(Debug, Clone)]
pub struct ClientInfo {
    /// Client identifier
    pub id: ClientId,
    /// Remote peer address
    pub peer_addr: SocketAddr,
    /// Time connected so far
    pub connected_for: Duration,
}
