//! Match clock and its bridge to connected clients
//!
//! The clock runs as its own task. Clients drive it with `clock:*`
//! commands, which the hub forwards without keeping any state, and every
//! change to the display is rebroadcast as `clock:tick`.
//!
//! ```text
//!   hub ──ClockCommand──► clock task ──watch<String>──► bridge ──clock:tick──► registry
//!                         (Stopwatch)        │
//!                                            └──► hub reads time for swim splits
//! ```

pub mod stopwatch;

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::registry::{BroadcastFrame, ConnectionRegistry};

pub use stopwatch::{format_time, Direction, Stopwatch};

/// Event name under which the clock display is broadcast
pub const CLOCK_TICK_EVENT: &str = "clock:tick";

/// Clock configuration
#[derive(Debug, Clone)]
pub struct ClockConfig {
    /// Time between ticks while running
    pub tick_interval: Duration,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
        }
    }
}

impl ClockConfig {
    /// Set the tick interval (never zero)
    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval.max(Duration::from_millis(1));
        self
    }
}

/// Commands accepted by the clock
#[derive(Debug, Clone, PartialEq)]
pub enum ClockCommand {
    /// `clock:pause`
    Pause,
    /// `clock:reset`
    Reset,
    /// `clock:up`
    CountUp,
    /// `clock:down`
    CountDown,
    /// `clock:set` with the raw client value
    SetValue(Value),
}

/// Handle for sending commands to the clock and reading its display
#[derive(Debug, Clone)]
pub struct ClockHandle {
    commands: mpsc::UnboundedSender<ClockCommand>,
    time: watch::Receiver<String>,
}

impl ClockHandle {
    /// Build a handle from raw channel halves
    ///
    /// Lets callers other than [`spawn`] stand in for the clock task.
    pub fn from_channels(
        commands: mpsc::UnboundedSender<ClockCommand>,
        time: watch::Receiver<String>,
    ) -> Self {
        Self { commands, time }
    }

    /// Forward a command; fire and forget
    pub fn send(&self, command: ClockCommand) {
        if self.commands.send(command).is_err() {
            tracing::warn!("Clock task has stopped, command dropped");
        }
    }

    /// Current display, e.g. `"03:27"`
    pub fn time(&self) -> String {
        self.time.borrow().clone()
    }

    /// Receiver notified on every tick and command
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.time.clone()
    }
}

/// Spawn the clock task
///
/// The task ends once every [`ClockHandle`] has been dropped.
pub fn spawn(config: ClockConfig) -> (ClockHandle, JoinHandle<()>) {
    let (command_tx, mut command_rx) = mpsc::unbounded_channel();
    let mut stopwatch = Stopwatch::new();
    let (time_tx, time_rx) = watch::channel(stopwatch.time());

    let handle = tokio::spawn(async move {
        let period = config.tick_interval;
        let mut ticker = time::interval_at(time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                command = command_rx.recv() => {
                    let Some(command) = command else { break };
                    let was_running = stopwatch.is_running();

                    apply(&mut stopwatch, command);

                    // A fresh start gets a full period before its first tick
                    if stopwatch.is_running() && !was_running {
                        ticker.reset();
                    }
                    time_tx.send_replace(stopwatch.time());
                }
                _ = ticker.tick() => {
                    if stopwatch.tick(period) {
                        time_tx.send_replace(stopwatch.time());
                    }
                }
            }
        }

        tracing::debug!("Clock task stopped");
    });

    (ClockHandle::from_channels(command_tx, time_rx), handle)
}

fn apply(stopwatch: &mut Stopwatch, command: ClockCommand) {
    tracing::debug!(command = ?command, "Clock command");

    match command {
        ClockCommand::Pause => stopwatch.pause(),
        ClockCommand::Reset => stopwatch.reset(),
        ClockCommand::CountUp => stopwatch.count_up(),
        ClockCommand::CountDown => stopwatch.count_down(),
        ClockCommand::SetValue(value) => {
            if let Err(e) = stopwatch.set_value(&value) {
                tracing::warn!(error = %e, "Ignoring clock value");
            }
        }
    }
}

/// Spawn the bridge that rebroadcasts clock changes as `clock:tick`
pub fn spawn_bridge(
    mut time: watch::Receiver<String>,
    registry: Arc<ConnectionRegistry>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while time.changed().await.is_ok() {
            let display = time.borrow_and_update().clone();
            registry.broadcast(BroadcastFrame::new(CLOCK_TICK_EVENT, Value::String(display)));
        }
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_clock_counts_up() {
        let (clock, _task) = spawn(ClockConfig::default());

        clock.send(ClockCommand::CountUp);
        time::sleep(Duration::from_millis(3500)).await;

        assert_eq!(clock.time(), "00:03");

        clock.send(ClockCommand::Pause);
        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(clock.time(), "00:03");
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_counts_down_and_stops() {
        let (clock, _task) = spawn(ClockConfig::default());

        clock.send(ClockCommand::SetValue(json!("00:02")));
        clock.send(ClockCommand::CountDown);
        time::sleep(Duration::from_secs(10)).await;

        assert_eq!(clock.time(), "00:00");
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_set_keeps_time() {
        let (clock, _task) = spawn(ClockConfig::default());

        clock.send(ClockCommand::SetValue(json!("12:00")));
        clock.send(ClockCommand::SetValue(json!("later")));
        time::sleep(Duration::from_millis(10)).await;

        assert_eq!(clock.time(), "12:00");
    }

    #[tokio::test(start_paused = true)]
    async fn test_bridge_broadcasts_ticks() {
        let registry = Arc::new(ConnectionRegistry::new());
        let mut rx = registry.subscribe();

        let (clock, _task) = spawn(ClockConfig::default());
        let _bridge = spawn_bridge(clock.subscribe(), Arc::clone(&registry));

        clock.send(ClockCommand::SetValue(json!(61)));

        let frame = rx.recv().await.unwrap();
        assert_eq!(&*frame.event, CLOCK_TICK_EVENT);
        assert_eq!(frame.payload(), Some(&json!("01:01")));
    }
}
