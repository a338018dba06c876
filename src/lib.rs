//! Real-time state hub for live broadcast overlays
//!
//! Admin panels and on-air overlay pages connect over WebSocket. The hub
//! keeps one canonical snapshot per widget, echoes every change to every
//! client, runs the match clock, and pauses or resumes the outgoing video
//! stream when the `bug` widget asks it to.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use overlay_hub::clock::{self, ClockConfig};
//! use overlay_hub::registry::ConnectionRegistry;
//! use overlay_hub::stream::{self, StreamConfig};
//! use overlay_hub::{Hub, HubServer, ServerConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> overlay_hub::Result<()> {
//!     let registry = Arc::new(ConnectionRegistry::new());
//!     let (clock, _clock_task) = clock::spawn(ClockConfig::default());
//!     let _bridge = clock::spawn_bridge(clock.subscribe(), Arc::clone(&registry));
//!     let (stream, _events, _stream_task) =
//!         stream::spawn(StreamConfig::new("rtmp://ingest/live", "rtmp://cdn/live"));
//!
//!     let hub = Arc::new(Hub::new(registry, clock, stream));
//!     HubServer::new(ServerConfig::default(), hub)
//!         .run_until(CancellationToken::new())
//!         .await
//! }
//! ```

pub mod clock;
pub mod error;
pub mod hub;
pub mod registry;
pub mod server;
pub mod state;
pub mod stream;

pub use error::{Error, Result};
pub use hub::{Command, Hub};
pub use server::{HubServer, ServerConfig};
