//! Broadcast hub
//!
//! Turns inbound client events into commands, applies them to the state
//! store, and fans the result out to every connected client, the sender
//! included. Clients never apply their own writes locally; the echo is how
//! they learn the canonical value (which may have been rewritten, as for
//! swimming placings).

pub mod command;
pub mod dispatch;

pub use command::{Command, Envelope, RELAY_EVENTS};
pub use dispatch::Hub;
