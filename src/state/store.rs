//! Keyed widget state store
//!
//! One canonical snapshot per widget kind plus the tennis score history.
//! Writes replace the whole snapshot; nothing is merged or validated.

use std::collections::HashMap;

use serde_json::Value;

use super::swimming;
use super::tennis::{self, ScoreHistory};
use super::widget::WidgetKind;

/// Canonical state for every widget
#[derive(Debug, Clone)]
pub struct StateStore {
    /// Latest snapshot per widget kind
    widgets: HashMap<WidgetKind, Value>,

    /// Tennis scores, alongside the `tennisOptions` widget entry
    tennis: ScoreHistory,
}

impl StateStore {
    /// Create a store holding every widget's default state
    pub fn new() -> Self {
        let widgets = WidgetKind::ALL
            .into_iter()
            .map(|kind| (kind, kind.default_state()))
            .collect();

        Self {
            widgets,
            tennis: ScoreHistory::new(),
        }
    }

    /// Current snapshot for a widget
    pub fn get(&self, kind: WidgetKind) -> &Value {
        // Every kind is inserted by `new` and entries are never removed
        self.widgets.get(&kind).unwrap_or(&Value::Null)
    }

    /// Replace a widget's snapshot
    ///
    /// `swimming` payloads are run through the lane resolver first, using
    /// `clock_time` for the split stamp. Returns the snapshot as stored,
    /// which is what clients must be sent.
    pub fn update(&mut self, kind: WidgetKind, payload: Value, clock_time: &str) -> &Value {
        let payload = match kind {
            WidgetKind::Swimming => swimming::resolve(payload, clock_time),
            _ => payload,
        };

        tracing::debug!(widget = %kind, "Widget updated");

        let slot = self.widgets.entry(kind).or_insert(Value::Null);
        *slot = payload;
        slot
    }

    /// The tennis score history
    pub fn tennis_history(&self) -> &ScoreHistory {
        &self.tennis
    }

    /// Record a tennis score snapshot
    ///
    /// Returns the snapshot if it was appended, `None` for a duplicate.
    pub fn submit_tennis_score(&mut self, snapshot: Value) -> Option<&Value> {
        if self.tennis.submit(snapshot) {
            tracing::debug!(depth = self.tennis.len(), "Tennis score recorded");
            Some(self.tennis.current())
        } else {
            tracing::debug!("Duplicate tennis score ignored");
            None
        }
    }

    /// Step the tennis score back one snapshot
    pub fn undo_tennis_score(&mut self) -> Option<&Value> {
        let restored = self.tennis.undo();
        if restored.is_none() {
            tracing::debug!("Tennis undo at initial score ignored");
        }
        restored
    }

    /// Restore tennis options and scores to their defaults
    ///
    /// Returns `(options, score)` as now stored.
    pub fn reset_tennis(&mut self) -> (&Value, &Value) {
        self.widgets
            .insert(WidgetKind::TennisOptions, tennis::default_options());
        self.tennis.reset();

        tracing::info!("Tennis match reset");

        self.tennis_snapshot()
    }

    /// Current tennis options and score, for resync
    pub fn tennis_snapshot(&self) -> (&Value, &Value) {
        (self.get(WidgetKind::TennisOptions), self.tennis.current())
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
