//! Hub implementation

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;

use super::command::Command;
use crate::clock::{ClockHandle, CLOCK_TICK_EVENT};
use crate::error::Result;
use crate::registry::{BroadcastFrame, ClientId, ConnectionRegistry};
use crate::state::{StateStore, WidgetKind};
use crate::stream::StreamHandle;

const TENNIS_SCORE_EVENT: &str = "tennisScore";

/// Applies client commands and broadcasts the results
///
/// All state lives behind one mutex, and every broadcast for an event is
/// sent while it is held. Two events therefore never interleave, and all
/// clients observe updates in the same order.
pub struct Hub {
    state: Mutex<StateStore>,
    registry: Arc<ConnectionRegistry>,
    clock: ClockHandle,
    stream: StreamHandle,
}

impl Hub {
    /// Create a hub with every widget at its default state
    pub fn new(registry: Arc<ConnectionRegistry>, clock: ClockHandle, stream: StreamHandle) -> Self {
        Self {
            state: Mutex::new(StateStore::new()),
            registry,
            clock,
            stream,
        }
    }

    /// The registry this hub broadcasts through
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Decode and apply a text frame from a client
    ///
    /// Frames that do not decode are returned as errors and change nothing.
    pub async fn dispatch_text(&self, client: ClientId, text: &str) -> Result<()> {
        let command = Command::from_frame(text)?;
        tracing::trace!(client = %client, command = ?command, "Client command");
        self.apply(command).await;
        Ok(())
    }

    /// Apply a decoded command
    pub async fn apply(&self, command: Command) {
        match command {
            Command::Update { widget, payload } => self.update(widget, payload).await,

            Command::Get(widget) => {
                let state = self.state.lock().await;
                self.send(widget.name(), state.get(widget).clone());
            }

            Command::Relay { event, payload } => {
                let _state = self.state.lock().await;
                self.registry
                    .broadcast(BroadcastFrame::with_optional(event, payload));
            }

            Command::Clock(command) => self.clock.send(command),

            Command::ClockGet => {
                let _state = self.state.lock().await;
                self.send(CLOCK_TICK_EVENT, Value::String(self.clock.time()));
            }

            Command::TennisScore(snapshot) => {
                let mut state = self.state.lock().await;
                if let Some(current) = state.submit_tennis_score(snapshot) {
                    self.send(TENNIS_SCORE_EVENT, current.clone());
                }
            }

            Command::TennisGet => {
                let state = self.state.lock().await;
                let (options, score) = state.tennis_snapshot();
                self.send(WidgetKind::TennisOptions.name(), options.clone());
                self.send(TENNIS_SCORE_EVENT, score.clone());
            }

            Command::TennisUndo => {
                let mut state = self.state.lock().await;
                if let Some(current) = state.undo_tennis_score() {
                    self.send(TENNIS_SCORE_EVENT, current.clone());
                }
            }

            Command::TennisReset => {
                let mut state = self.state.lock().await;
                let (options, score) = state.reset_tennis();
                self.send(WidgetKind::TennisOptions.name(), options.clone());
                self.send(TENNIS_SCORE_EVENT, score.clone());
            }
        }
    }

    async fn update(&self, widget: WidgetKind, payload: Value) {
        let clock_time = match widget {
            WidgetKind::Swimming => self.clock.time(),
            _ => String::new(),
        };

        let mut state = self.state.lock().await;
        let stored = state.update(widget, payload, &clock_time).clone();

        if widget == WidgetKind::Bug {
            if is_truthy(stored.get("pause")) {
                self.stream.pause();
            } else {
                self.stream.play();
            }
        }

        self.send(widget.name(), stored);
    }

    /// Current snapshot of a widget
    pub async fn snapshot(&self, widget: WidgetKind) -> Value {
        self.state.lock().await.get(widget).clone()
    }

    fn send(&self, event: &str, data: Value) {
        self.registry.broadcast(BroadcastFrame::new(event, data));
    }
}

/// Loose truthiness for flags set by browser clients
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
