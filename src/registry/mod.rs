//! Connection registry and broadcast fan-out
//!
//! The registry tracks which clients are connected and owns the single
//! broadcast channel every connection task listens on. It holds no widget
//! state; that lives in [`crate::state`].
//!
//! # Architecture
//!
//! ```text
//!                        Arc<ConnectionRegistry>
//!                     ┌─────────────────────────┐
//!                     │ clients: HashMap<Id,    │
//!                     │   ClientEntry>          │
//!                     │ tx: broadcast::Tx       │
//!                     └───────────┬─────────────┘
//!                                 │
//!         ┌───────────────────────┼───────────────────────┐
//!         │                       │                       │
//!         ▼                       ▼                       ▼
//!      [Admin]                [Overlay]               [Overlay]
//!    hub.dispatch()         frame_rx.recv()         frame_rx.recv()
//!         │                       │                       │
//!         └──► registry.broadcast()──► Message::Text ──► WebSocket
//! ```
//!
//! # Shared Frames
//!
//! Each [`BroadcastFrame`] is serialized once when it is created. Receivers
//! clone it out of the channel, which only bumps reference counts on the
//! shared event name, payload and JSON text.

pub mod config;
pub mod entry;
pub mod error;
pub mod frame;
pub mod store;

pub use config::RegistryConfig;
pub use entry::{ClientEntry, ClientInfo};
pub use error::RegistryError;
pub use frame::{BroadcastFrame, ClientId};
pub use store::ConnectionRegistry;
