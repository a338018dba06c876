//! Stopwatch state machine
//!
//! Pure state with no timers of its own; the clock task in the parent
//! module drives [`Stopwatch::tick`] from a tokio interval.

use std::time::Duration;

use serde_json::Value;

use crate::error::ClockError;

/// Largest value the clock accepts, 100 hours
pub const MAX_VALUE: Duration = Duration::from_secs(100 * 3600);

/// Counting direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Time increases on each tick
    Up,
    /// Time decreases on each tick and stops at zero
    Down,
}

/// Match clock
#[derive(Debug, Clone)]
pub struct Stopwatch {
    /// Value on display
    value: Duration,
    /// Direction used while running
    direction: Direction,
    /// Whether ticks move the value
    running: bool,
}

impl Stopwatch {
    /// Create a stopped clock at `00:00`, counting up
    pub fn new() -> Self {
        Self {
            value: Duration::ZERO,
            direction: Direction::Up,
            running: false,
        }
    }

    /// Stop counting, keeping the value
    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Stop counting and return to `00:00`
    pub fn reset(&mut self) {
        self.running = false;
        self.value = Duration::ZERO;
    }

    /// Start counting up from the current value
    pub fn count_up(&mut self) {
        self.direction = Direction::Up;
        self.running = true;
    }

    /// Start counting down from the current value
    pub fn count_down(&mut self) {
        self.direction = Direction::Down;
        self.running = !self.value.is_zero();
    }

    /// Set the displayed value
    ///
    /// Accepts `"MM:SS"`, `"H:MM:SS"`, a string of seconds, or a
    /// non-negative number of seconds, up to [`MAX_VALUE`]. Running state
    /// is left alone.
    pub fn set_value(&mut self, value: &Value) -> Result<(), ClockError> {
        self.value = parse_value(value)?;
        Ok(())
    }

    /// Advance by one tick
    ///
    /// Returns true if the value moved. Counting down stops at zero.
    pub fn tick(&mut self, step: Duration) -> bool {
        if !self.running {
            return false;
        }

        match self.direction {
            Direction::Up => self.value = self.value.saturating_add(step),
            Direction::Down => {
                self.value = self.value.saturating_sub(step);
                if self.value.is_zero() {
                    self.running = false;
                }
            }
        }

        true
    }

    /// Whether the clock is counting
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current direction
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Current value
    pub fn value(&self) -> Duration {
        self.value
    }

    /// Display string, `MM:SS`
    pub fn time(&self) -> String {
        format_time(self.value)
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Render whole seconds as `MM:SS`; minutes grow past 99 rather than wrap
pub fn format_time(value: Duration) -> String {
    let secs = value.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn parse_value(value: &Value) -> Result<Duration, ClockError> {
    let invalid = || ClockError::InvalidValue(value.to_string());

    let parsed = match value {
        Value::Number(n) => n
            .as_u64()
            .map(Duration::from_secs)
            .or_else(|| n.as_f64().and_then(|secs| Duration::try_from_secs_f64(secs).ok()))
            .ok_or_else(invalid),
        Value::String(s) => parse_clock_text(s.trim()).ok_or_else(invalid),
        _ => Err(invalid()),
    }?;

    if parsed > MAX_VALUE {
        return Err(invalid());
    }
    Ok(parsed)
}

fn parse_clock_text(text: &str) -> Option<Duration> {
    let parts = text
        .split(':')
        .map(|part| part.trim().parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;

    let secs = match parts.as_slice() {
        [secs] => *secs,
        [mins, secs] if *secs < 60 => mins.checked_mul(60)?.checked_add(*secs)?,
        [hours, mins, secs] if *mins < 60 && *secs < 60 => hours
            .checked_mul(3600)?
            .checked_add(mins * 60 + secs)?,
        _ => return None,
    };

    Some(Duration::from_secs(secs))
}
