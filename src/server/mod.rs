//! WebSocket server
//!
//! Accepts browser clients (admin panels and overlay pages) and serves the
//! static overlay assets from the same port.

pub mod config;
pub mod connection;
pub mod listener;

pub use config::ServerConfig;
pub use connection::Connection;
pub use listener::HubServer;
