//! Client identifiers and the frames broadcast to them

use std::sync::Arc;

use serde_json::{json, Value};

/// Unique identifier for a connected client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(pub u64);

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

/// An event to be delivered to every connected client
///
/// Cheap to clone: the event name, payload and serialized text are shared.
#[derive(Debug, Clone)]
pub struct BroadcastFrame {
    /// Event name (e.g. `football`, `clock:tick`)
    pub event: Arc<str>,
    /// Payload, if the event carries one
    pub data: Option<Arc<Value>>,
    /// The `{"event", "data"}` envelope as sent on the wire
    pub text: Arc<str>,
}

impl BroadcastFrame {
    /// Create a frame carrying a payload
    pub fn new(event: &str, data: Value) -> Self {
        let text = json!({ "event": event, "data": &data }).to_string();
        Self {
            event: Arc::from(event),
            data: Some(Arc::new(data)),
            text: Arc::from(text),
        }
    }

    /// Create a frame with no payload (e.g. `lowerthird:hideall`)
    pub fn signal(event: &str) -> Self {
        let text = json!({ "event": event }).to_string();
        Self {
            event: Arc::from(event),
            data: None,
            text: Arc::from(text),
        }
    }

    /// Create a frame from an optional payload
    pub fn with_optional(event: &str, data: Option<Value>) -> Self {
        match data {
            Some(data) => Self::new(event, data),
            None => Self::signal(event),
        }
    }

    /// Borrow the payload, if any
    pub fn payload(&self) -> Option<&Value> {
        self.data.as_deref()
    }
}
