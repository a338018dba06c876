//! Inbound event catalog
//!
//! Every frame a client sends is a JSON envelope `{"event", "data"}`. The
//! event name selects one of the commands below; anything else is dropped.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clock::ClockCommand;
use crate::error::ProtocolError;
use crate::state::WidgetKind;

/// Events relayed to every client verbatim, with no stored state
pub const RELAY_EVENTS: [&str; 13] = [
    "lancScore",
    "yorkScore",
    "totalPoints",
    "lowerthird:left",
    "lowerthird:right",
    "lowerthird:full",
    "lowerthird:hidefull",
    "lowerthird:hideleft",
    "lowerthird:hideright",
    "lowerthird:hideall",
    "rollingtext:show",
    "rollingtext:hide",
    "rollingtext:hideall",
];

/// Suffix of resync requests (`football:get`)
const GET_SUFFIX: &str = ":get";

/// Wire envelope, used in both directions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Event name
    pub event: String,
    /// Payload; absent for signals such as `lowerthird:hideall`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A decoded client request
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Replace a widget's snapshot and echo it
    Update {
        /// Widget addressed
        widget: WidgetKind,
        /// New snapshot, stored as sent
        payload: Value,
    },

    /// Re-send a widget's snapshot to everyone
    Get(WidgetKind),

    /// Pass an event through untouched
    Relay {
        /// One of [`RELAY_EVENTS`]
        event: &'static str,
        /// Payload, if the client sent one
        payload: Option<Value>,
    },

    /// Forward to the clock
    Clock(ClockCommand),

    /// Broadcast the clock's current display
    ClockGet,

    /// Record a tennis score snapshot (deduplicated)
    TennisScore(Value),

    /// Re-send tennis options and the current score
    TennisGet,

    /// Step the tennis score back
    TennisUndo,

    /// Restore tennis defaults
    TennisReset,
}

impl Command {
    /// Decode a text frame
    pub fn from_frame(text: &str) -> Result<Self, ProtocolError> {
        let envelope: Envelope = serde_json::from_str(text)
            .map_err(|e| ProtocolError::MalformedFrame(e.to_string()))?;

        Self::parse(&envelope.event, envelope.data)
    }

    /// Decode an event name and its payload
    pub fn parse(event: &str, data: Option<Value>) -> Result<Self, ProtocolError> {
        let command = match event {
            "clock:pause" => Command::Clock(ClockCommand::Pause),
            "clock:reset" => Command::Clock(ClockCommand::Reset),
            "clock:up" => Command::Clock(ClockCommand::CountUp),
            "clock:down" => Command::Clock(ClockCommand::CountDown),
            "clock:set" => Command::Clock(ClockCommand::SetValue(data.unwrap_or(Value::Null))),
            "clock:get" => Command::ClockGet,
            "tennisScore" => Command::TennisScore(data.unwrap_or(Value::Null)),
            "tennis:get" => Command::TennisGet,
            "tennis:undo" => Command::TennisUndo,
            "tennis:reset" => Command::TennisReset,
            _ => return Self::parse_widget_or_relay(event, data),
        };

        Ok(command)
    }

    fn parse_widget_or_relay(event: &str, data: Option<Value>) -> Result<Self, ProtocolError> {
        if let Some(relay) = RELAY_EVENTS.iter().find(|name| **name == event) {
            return Ok(Command::Relay {
                event: *relay,
                payload: data,
            });
        }

        if let Some(widget) = WidgetKind::from_name(event) {
            return Ok(Command::Update {
                widget,
                payload: data.unwrap_or(Value::Null),
            });
        }

        event
            .strip_suffix(GET_SUFFIX)
            .and_then(WidgetKind::from_name)
            .filter(|widget| widget.supports_get())
            .map(Command::Get)
            .ok_or_else(|| ProtocolError::UnknownEvent(event.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_widget_update_and_get() {
        assert_eq!(
            Command::parse("football", Some(json!({"lancScore": 2}))),
            Ok(Command::Update {
                widget: WidgetKind::Football,
                payload: json!({"lancScore": 2}),
            })
        );
        assert_eq!(
            Command::parse("waterpolo:get", None),
            Ok(Command::Get(WidgetKind::Waterpolo))
        );
        assert_eq!(
            Command::parse("tennisOptions", Some(json!({}))),
            Ok(Command::Update {
                widget: WidgetKind::TennisOptions,
                payload: json!({}),
            })
        );
    }

    #[test]
    fn test_update_without_data_stores_null() {
        assert_eq!(
            Command::parse("archery", None),
            Ok(Command::Update {
                widget: WidgetKind::Archery,
                payload: Value::Null,
            })
        );
    }

    #[test]
    fn test_grid_and_tennis_options_have_no_get() {
        for event in ["grid:get", "tennisOptions:get"] {
            assert_eq!(
                Command::parse(event, None),
                Err(ProtocolError::UnknownEvent(event.into()))
            );
        }
    }

    #[test]
    fn test_relay_events() {
        for event in RELAY_EVENTS {
            assert!(matches!(
                Command::parse(event, None),
                Ok(Command::Relay { event: e, payload: None }) if e == event
            ));
        }
        assert_eq!(
            Command::parse("lowerthird:left", Some(json!({"name": "Ada"}))),
            Ok(Command::Relay {
                event: "lowerthird:left",
                payload: Some(json!({"name": "Ada"})),
            })
        );
    }

    #[test]
    fn test_clock_and_tennis_events() {
        assert_eq!(
            Command::parse("clock:up", None),
            Ok(Command::Clock(ClockCommand::CountUp))
        );
        assert_eq!(
            Command::parse("clock:set", Some(json!("10:00"))),
            Ok(Command::Clock(ClockCommand::SetValue(json!("10:00"))))
        );
        assert_eq!(Command::parse("clock:get", None), Ok(Command::ClockGet));
        assert_eq!(Command::parse("tennis:undo", None), Ok(Command::TennisUndo));
        assert_eq!(
            Command::parse("tennisScore", Some(json!({"point1": 1}))),
            Ok(Command::TennisScore(json!({"point1": 1})))
        );
    }

    #[test]
    fn test_unknown_events() {
        for event in ["", "curling", "clock:tick", ":get", "Football", "bug:set"] {
            assert_eq!(
                Command::parse(event, None),
                Err(ProtocolError::UnknownEvent(event.into()))
            );
        }
    }

    #[test]
    fn test_from_frame() {
        assert_eq!(
            Command::from_frame(r#"{"event":"bug:get"}"#),
            Ok(Command::Get(WidgetKind::Bug))
        );
        assert_eq!(
            Command::from_frame(r#"{"event":"score","data":{"totalPoints":3}}"#),
            Ok(Command::Update {
                widget: WidgetKind::Score,
                payload: json!({"totalPoints": 3}),
            })
        );
        assert!(matches!(
            Command::from_frame("bug"),
            Err(ProtocolError::MalformedFrame(_))
        ));
        assert!(matches!(
            Command::from_frame(r#"{"data":1}"#),
            Err(ProtocolError::MalformedFrame(_))
        ));
    }

    #[test]
    fn test_envelope_serialization() {
        let envelope = Envelope {
            event: "lowerthird:hideall".into(),
            data: None,
        };
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"event": "lowerthird:hideall"})
        );
    }
}
