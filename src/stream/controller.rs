//! Process-backed stream controller
//!
//! Owns the pipeline child process. Pausing stops the process and playing
//! starts a fresh one, so the output sees a reconnect on resume. A process
//! that exits without being asked to is reported as end of stream (clean
//! exit) or an error (anything else).

use std::collections::VecDeque;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::config::StreamConfig;
use super::{PipelineState, StreamCommand, StreamEvent, StreamHandle};

const STDERR_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// A running pipeline process and the task draining its stderr
struct Running {
    child: Child,
    stderr: Option<JoinHandle<Vec<String>>>,
}

impl Running {
    async fn stop(mut self) {
        if let Err(e) = self.child.kill().await {
            tracing::warn!(error = %e, "Failed to stop pipeline process");
        }
        if let Some(stderr) = self.stderr.take() {
            stderr.abort();
        }
    }

    /// Collected stderr once the process has exited
    ///
    /// Bounded wait: a grandchild may still hold the pipe open.
    async fn stderr_tail(&mut self) -> String {
        let Some(task) = self.stderr.take() else {
            return String::new();
        };

        match tokio::time::timeout(STDERR_DRAIN_TIMEOUT, task).await {
            Ok(Ok(lines)) => lines.join("\n"),
            _ => String::new(),
        }
    }
}

/// Controller task state
struct Controller {
    config: StreamConfig,
    events: mpsc::Sender<StreamEvent>,
    state: PipelineState,
    running: Option<Running>,
}

impl Controller {
    async fn set_state(&mut self, state: PipelineState) {
        if self.state != state {
            self.state = state;
            self.emit(StreamEvent::StateChanged { state }).await;
        }
    }

    async fn emit(&self, event: StreamEvent) {
        // Nobody listening means the process is already shutting down
        let _ = self.events.send(event).await;
    }

    fn launch(&self) -> std::io::Result<Running> {
        let args = self.config.resolved_args();
        tracing::info!(program = %self.config.program, args = ?args, "Starting pipeline");

        let mut child = Command::new(&self.config.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stderr = child
            .stderr
            .take()
            .map(|stderr| tokio::spawn(collect_stderr(stderr, self.config.stderr_tail)));

        Ok(Running { child, stderr })
    }

    /// Handle a command; returns false once the pipeline has failed
    async fn handle(&mut self, command: StreamCommand) -> bool {
        match command {
            StreamCommand::Play if self.running.is_none() => match self.launch() {
                Ok(running) => {
                    self.running = Some(running);
                    self.set_state(PipelineState::Playing).await;
                }
                Err(e) => {
                    self.emit(StreamEvent::Error {
                        message: format!("Failed to start {}: {}", self.config.program, e),
                        stack: format!("{:?}", e),
                    })
                    .await;
                    return false;
                }
            },
            StreamCommand::Pause => {
                if let Some(running) = self.running.take() {
                    running.stop().await;
                    self.set_state(PipelineState::Paused).await;
                }
            }
            StreamCommand::Play => {}
        }

        true
    }

    async fn exited(&mut self, status: std::io::Result<ExitStatus>) {
        let tail = match self.running.as_mut() {
            Some(running) => running.stderr_tail().await,
            None => String::new(),
        };
        self.running = None;

        let event = match status {
            Ok(status) if status.success() => StreamEvent::Eos,
            Ok(status) => StreamEvent::Error {
                message: format!("Pipeline exited with {}", status),
                stack: tail,
            },
            Err(e) => StreamEvent::Error {
                message: format!("Lost track of pipeline process: {}", e),
                stack: tail,
            },
        };

        self.emit(event).await;
    }

    async fn shutdown(&mut self) {
        if let Some(running) = self.running.take() {
            running.stop().await;
        }
        self.set_state(PipelineState::Null).await;
    }
}

/// Wait for the running process, or forever if there is none
async fn wait_running(running: &mut Option<Running>) -> std::io::Result<ExitStatus> {
    match running {
        Some(running) => running.child.wait().await,
        None => std::future::pending().await,
    }
}

/// Drain the pipeline's stderr, keeping the last `keep` lines
async fn collect_stderr(stderr: ChildStderr, keep: usize) -> Vec<String> {
    let mut lines = BufReader::new(stderr).lines();
    let mut tail = VecDeque::with_capacity(keep);

    while let Ok(Some(line)) = lines.next_line().await {
        tracing::trace!(line = %line, "pipeline");
        if keep == 0 {
            continue;
        }
        if tail.len() == keep {
            tail.pop_front();
        }
        tail.push_back(line);
    }

    tail.into()
}

/// Spawn the controller task
///
/// The pipeline starts in `Ready`; send [`StreamHandle::play`] to start
/// it. The task ends after a fatal event or once every handle is dropped.
pub fn spawn(config: StreamConfig) -> (StreamHandle, mpsc::Receiver<StreamEvent>, JoinHandle<()>) {
    let (command_tx, mut command_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::channel(64);

    let mut controller = Controller {
        config,
        events: event_tx,
        state: PipelineState::Null,
        running: None,
    };

    let task = tokio::spawn(async move {
        controller.set_state(PipelineState::Ready).await;

        loop {
            tokio::select! {
                command = command_rx.recv() => {
                    let Some(command) = command else { break };
                    if !controller.handle(command).await {
                        break;
                    }
                }
                status = wait_running(&mut controller.running) => {
                    controller.exited(status).await;
                    break;
                }
            }
        }

        controller.shutdown().await;
        tracing::debug!("Stream controller stopped");
    });

    (StreamHandle::from_sender(command_tx), event_rx, task)
}
