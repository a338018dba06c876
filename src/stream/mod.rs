//! Stream lifecycle adapter
//!
//! The video pipeline runs as an external process owned by a controller
//! task. The hub only ever asks it to pause or play (driven by the `bug`
//! widget's `pause` flag); the controller reports lifecycle events back.
//! Errors and end-of-stream are fatal: [`supervise`] turns them into a
//! cancelled shutdown token so the server can drain before exiting.

pub mod config;
pub mod controller;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub use config::StreamConfig;
pub use controller::spawn;

/// Lifecycle state of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// No pipeline process and none will be started
    Null,
    /// Waiting for the first play command
    Ready,
    /// Stopped by a pause command; play resumes it
    Paused,
    /// Pipeline process running
    Playing,
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineState::Null => "Null",
            PipelineState::Ready => "Ready",
            PipelineState::Paused => "Paused",
            PipelineState::Playing => "Playing",
        };
        f.write_str(name)
    }
}

/// Commands accepted by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamCommand {
    /// Stop pushing video
    Pause,
    /// Start or resume pushing video
    Play,
}

/// Events reported by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Pipeline failed
    Error {
        /// Short description
        message: String,
        /// Diagnostic detail (tail of the pipeline's stderr)
        stack: String,
    },

    /// Pipeline reached end of stream
    Eos,

    /// Pipeline moved to a new state
    StateChanged {
        /// The state now in effect
        state: PipelineState,
    },
}

impl StreamEvent {
    /// Whether this event ends the process
    pub fn is_fatal(&self) -> bool {
        matches!(self, StreamEvent::Error { .. } | StreamEvent::Eos)
    }
}

/// Handle for commanding the controller
#[derive(Debug, Clone)]
pub struct StreamHandle {
    commands: mpsc::UnboundedSender<StreamCommand>,
}

impl StreamHandle {
    /// Build a handle around a command sender
    pub fn from_sender(commands: mpsc::UnboundedSender<StreamCommand>) -> Self {
        Self { commands }
    }

    /// Pause the stream; fire and forget
    pub fn pause(&self) {
        self.send(StreamCommand::Pause);
    }

    /// Start or resume the stream; fire and forget
    pub fn play(&self) {
        self.send(StreamCommand::Play);
    }

    fn send(&self, command: StreamCommand) {
        if self.commands.send(command).is_err() {
            tracing::warn!(command = ?command, "Stream controller has stopped, command dropped");
        }
    }
}

/// Log controller events and trigger shutdown on fatal ones
///
/// Returns the fatal event, or `None` if the controller went away first.
pub async fn supervise(
    mut events: mpsc::Receiver<StreamEvent>,
    shutdown: CancellationToken,
) -> Option<StreamEvent> {
    while let Some(event) = events.recv().await {
        match &event {
            StreamEvent::Error { message, stack } => {
                tracing::error!(message = %message, "Stream error");
                tracing::error!(stack = %stack, "    Inner message");
            }
            StreamEvent::Eos => {
                tracing::error!("End of stream received");
            }
            StreamEvent::StateChanged { state } => {
                tracing::info!(state = %state, "Stream changed state");
                if *state == PipelineState::Playing {
                    tracing::info!("Stream started");
                }
            }
        }

        if event.is_fatal() {
            shutdown.cancel();
            return Some(event);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_supervise_cancels_on_eos() {
        let (tx, rx) = mpsc::channel(8);
        let shutdown = CancellationToken::new();

        tx.send(StreamEvent::StateChanged {
            state: PipelineState::Playing,
        })
        .await
        .unwrap();
        tx.send(StreamEvent::Eos).await.unwrap();

        let fatal = supervise(rx, shutdown.clone()).await;

        assert_eq!(fatal, Some(StreamEvent::Eos));
        assert!(shutdown.is_cancelled());
    }

    #[tokio::test]
    async fn test_supervise_cancels_on_error() {
        let (tx, rx) = mpsc::channel(8);
        let shutdown = CancellationToken::new();

        tx.send(StreamEvent::Error {
            message: "Pipeline exited with exit status: 1".into(),
            stack: "Connection refused".into(),
        })
        .await
        .unwrap();

        assert!(matches!(
            supervise(rx, shutdown.clone()).await,
            Some(StreamEvent::Error { .. })
        ));
        assert!(shutdown.is_cancelled());
    }

    #[tokio::test]
    async fn test_state_changes_are_not_fatal() {
        let (tx, rx) = mpsc::channel(8);
        let shutdown = CancellationToken::new();

        tx.send(StreamEvent::StateChanged {
            state: PipelineState::Paused,
        })
        .await
        .unwrap();
        drop(tx);

        assert_eq!(supervise(rx, shutdown.clone()).await, None);
        assert!(!shutdown.is_cancelled());
    }

    #[test]
    fn test_handle_forwards_commands() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = StreamHandle::from_sender(tx);

        handle.pause();
        handle.play();

        assert_eq!(rx.try_recv().unwrap(), StreamCommand::Pause);
        assert_eq!(rx.try_recv().unwrap(), StreamCommand::Play);
        assert!(rx.try_recv().is_err());
    }
}
