//! Server configuration

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::registry::RegistryConfig;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 3000;

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Route clients upgrade to a WebSocket on
    pub ws_path: String,

    /// Directory of overlay pages served on every other path
    pub static_dir: PathBuf,

    /// Maximum concurrent WebSocket clients (0 = unlimited)
    pub max_connections: usize,

    /// Broadcast fan-out settings
    pub registry: RegistryConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            ws_path: "/ws".into(),
            static_dir: PathBuf::from("public"),
            max_connections: 0, // Unlimited
            registry: RegistryConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the WebSocket route; a leading `/` is added if missing
    pub fn ws_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.ws_path = if path.starts_with('/') {
            path
        } else {
            format!("/{}", path)
        };
        self
    }

    /// Set the static asset directory
    pub fn static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = dir.into();
        self
    }

    /// Set maximum connections
    pub fn max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the broadcast fan-out settings
    pub fn registry(mut self, registry: RegistryConfig) -> Self {
        self.registry = registry;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();

        assert_eq!(config.bind_addr.port(), DEFAULT_PORT);
        assert!(config.bind_addr.ip().is_unspecified());
        assert_eq!(config.ws_path, "/ws");
        assert_eq!(config.static_dir, PathBuf::from("public"));
        assert_eq!(config.max_connections, 0);
    }

    #[test]
    fn test_with_addr() {
        let addr: SocketAddr = "127.0.0.1:3001".parse().unwrap();
        let config = ServerConfig::with_addr(addr);

        assert_eq!(config.bind_addr.port(), 3001);
    }

    #[test]
    fn test_builder_ws_path_gets_slash() {
        assert_eq!(ServerConfig::default().ws_path("socket").ws_path, "/socket");
        assert_eq!(ServerConfig::default().ws_path("/live").ws_path, "/live");
    }

    #[test]
    fn test_builder_chaining() {
        let addr: SocketAddr = "127.0.0.1:8080".parse().unwrap();
        let config = ServerConfig::default()
            .bind(addr)
            .static_dir("/srv/overlays")
            .max_connections(50)
            .registry(RegistryConfig::default().broadcast_capacity(16));

        assert_eq!(config.bind_addr, addr);
        assert_eq!(config.static_dir, PathBuf::from("/srv/overlays"));
        assert_eq!(config.max_connections, 50);
        assert_eq!(config.registry.broadcast_capacity, 16);
    }
}
