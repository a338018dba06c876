//! Tennis score history
//!
//! Scores arrive as whole snapshots from the admin. The hub keeps every
//! distinct snapshot so the operator can step back through mistakes:
//!
//! ```text
//!   submit(S1)   [default] -> [default, S1]
//!   submit(S1)   [default, S1] -> unchanged (duplicate)
//!   submit(S2)   [default, S1] -> [default, S1, S2]
//!   undo()       [default, S1, S2] -> [default, S1]
//!   undo() x2    [default, S1] -> [default] -> [default] (floor)
//!   reset()      anything -> [default]
//! ```

use serde_json::{json, Value};

/// Tennis display options restored by a reset
pub fn default_options() -> Value {
    json!({
        "player1": "Canberra",
        "player2": "York",
        "matchName": "",
        "maxSets": 3,
        "disableInput": false,
        "showScore": false,
        "showSets": false,
        "showStats": false,
    })
}

/// Score snapshot at the bottom of every history
pub fn default_score() -> Value {
    json!({
        "sets1": [0], "sets2": [0],
        "set1": 0, "set2": 0,
        "game1": 0, "game2": 0,
        "point1": 0, "point2": 0,
        "pointName1": 0, "pointName2": 0,
        "pointsServed1": 0, "pointsServed2": 0,
        "pointsWon1": 0, "pointsWon2": 0,
        "firstServeWon1": 0, "firstServeWon2": 0,
        "secondServeWon1": 0, "secondServeWon2": 0,
        "ace1": 0, "ace2": 0,
        "singleFault1": 0, "singleFault2": 0,
        "doubleFault1": 0, "doubleFault2": 0,
        "breakPoint1": 0, "breakPoint2": 0,
        "breaksWon1": 0, "breaksWon2": 0,
        "serviceGame1": 0, "serviceGame2": 0,
        "servicesWon1": 0, "servicesWon2": 0,
        "pointsPlayed": 0,
        "server": 1,
        "tiebreak": false,
        "gamePoint": "",
        "firstFault": false,
    })
}

/// Structural equality between two snapshots
///
/// Objects compare by key set regardless of order, arrays element-wise,
/// and numbers by value so `1` and `1.0` are the same score.
pub fn snapshots_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| snapshots_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| snapshots_equal(x, y)))
        }
        _ => a == b,
    }
}

/// Non-empty stack of score snapshots
///
/// The current snapshot is held apart from the ones below it, so the stack
/// can never be emptied.
#[derive(Debug, Clone)]
pub struct ScoreHistory {
    /// Snapshots that undo can return to, oldest first
    previous: Vec<Value>,
    /// Latest snapshot
    current: Value,
}

impl ScoreHistory {
    /// Create a history holding only the default snapshot
    pub fn new() -> Self {
        Self {
            previous: Vec::new(),
            current: default_score(),
        }
    }

    /// The snapshot on display
    pub fn current(&self) -> &Value {
        &self.current
    }

    /// Number of snapshots, always at least 1
    pub fn len(&self) -> usize {
        self.previous.len() + 1
    }

    /// Always false; present for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Push a snapshot unless it equals the current one
    ///
    /// Returns true if the snapshot was appended.
    pub fn submit(&mut self, snapshot: Value) -> bool {
        if snapshots_equal(&snapshot, &self.current) {
            return false;
        }

        let replaced = std::mem::replace(&mut self.current, snapshot);
        self.previous.push(replaced);
        true
    }

    /// Drop the current snapshot
    ///
    /// Returns the snapshot now current, or `None` if only the bottom
    /// snapshot remains and nothing changed.
    pub fn undo(&mut self) -> Option<&Value> {
        let restored = self.previous.pop()?;
        self.current = restored;
        Some(&self.current)
    }

    /// Replace everything with a single default snapshot
    pub fn reset(&mut self) {
        self.previous.clear();
        self.current = default_score();
    }

    /// Iterate over all snapshots, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.previous.iter().chain(std::iter::once(&self.current))
    }
}

impl Default for ScoreHistory {
    fn default() -> Self {
        Self::new()
    }
}
