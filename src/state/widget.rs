//! Widget kinds and their default state

use serde_json::{json, Value};

/// One named on-air widget with its own canonical snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    /// Persistent status indicator; its `pause` flag drives the stream
    Bug,
    Boxing,
    /// Running points total
    Score,
    Football,
    Rugby,
    Basketball,
    Dart,
    /// Swimming results with derived lane placings
    Swimming,
    /// Colour grid; stored but has no `get`
    Grid,
    Archery,
    /// Tennis display options, reset together with the score history
    TennisOptions,
    Badminton,
    Netball,
    Waterpolo,
}

impl WidgetKind {
    /// Every widget kind, in catalog order
    pub const ALL: [WidgetKind; 14] = [
        WidgetKind::Bug,
        WidgetKind::Boxing,
        WidgetKind::Score,
        WidgetKind::Football,
        WidgetKind::Rugby,
        WidgetKind::Basketball,
        WidgetKind::Dart,
        WidgetKind::Swimming,
        WidgetKind::Grid,
        WidgetKind::Archery,
        WidgetKind::TennisOptions,
        WidgetKind::Badminton,
        WidgetKind::Netball,
        WidgetKind::Waterpolo,
    ];

    /// Event name used on the wire for updates and echoes
    pub fn name(self) -> &'static str {
        match self {
            WidgetKind::Bug => "bug",
            WidgetKind::Boxing => "boxing",
            WidgetKind::Score => "score",
            WidgetKind::Football => "football",
            WidgetKind::Rugby => "rugby",
            WidgetKind::Basketball => "basketball",
            WidgetKind::Dart => "dart",
            WidgetKind::Swimming => "swimming",
            WidgetKind::Grid => "grid",
            WidgetKind::Archery => "archery",
            WidgetKind::TennisOptions => "tennisOptions",
            WidgetKind::Badminton => "badminton",
            WidgetKind::Netball => "netball",
            WidgetKind::Waterpolo => "waterpolo",
        }
    }

    /// Look up a kind by its event name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Whether clients may request a `<name>:get` resync
    ///
    /// `grid` never had one, and tennis options are resynced through
    /// `tennis:get` together with the current score.
    pub fn supports_get(self) -> bool {
        !matches!(self, WidgetKind::Grid | WidgetKind::TennisOptions)
    }

    /// Hand-authored state the widget starts with
    pub fn default_state(self) -> Value {
        match self {
            WidgetKind::Bug => json!({
                "livetext": "Live",
                "locationtext": "",
                "showLive": false,
                "showLocation": false,
                "pause": true,
            }),
            WidgetKind::Boxing => json!({"lancScore": 0, "yorkScore": 0, "currRound": ""}),
            WidgetKind::Score => json!({"totalPoints": 354}),
            WidgetKind::Football => json!({
                "homeTeam": "Deportivo",
                "awayTeam": "Barcelona",
                "lancScore": 4,
                "yorkScore": 0,
            }),
            WidgetKind::Rugby
            | WidgetKind::Basketball
            | WidgetKind::Netball
            | WidgetKind::Waterpolo => json!({
                "homeTeam": "Canberra",
                "awayTeam": "York",
                "lancScore": 0,
                "yorkScore": 0,
            }),
            WidgetKind::Dart => json!({
                "match": "Darts",
                "player1": "Canberra",
                "player2": "York",
                "set1": 0,
                "set2": 0,
                "leg1": 0,
                "leg2": 0,
                "score1": 501,
                "score2": 501,
            }),
            WidgetKind::Swimming => json!({"order": ""}),
            WidgetKind::Grid => json!({
                "headingcolor": "#BC204B",
                "leftcolor": "#1f1a34",
                "rightcolor": "#1f1a34",
            }),
            WidgetKind::Archery => json!({}),
            WidgetKind::TennisOptions => super::tennis::default_options(),
            WidgetKind::Badminton => json!({
                "match": "Badminton",
                "subtitle": "Best of 3 Games Wins Match",
                "player1": "Canberra",
                "player2": "York",
                "game1": 0,
                "game2": 0,
                "point1": 0,
                "point2": 0,
            }),
        }
    }
}

impl std::fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        for kind in WidgetKind::ALL {
            assert_eq!(WidgetKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(WidgetKind::from_name("curling"), None);
        // Names are case sensitive on the wire
        assert_eq!(WidgetKind::from_name("Football"), None);
    }

    #[test]
    fn test_get_support() {
        assert!(WidgetKind::Bug.supports_get());
        assert!(WidgetKind::Waterpolo.supports_get());
        assert!(!WidgetKind::Grid.supports_get());
        assert!(!WidgetKind::TennisOptions.supports_get());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(WidgetKind::Bug.default_state()["pause"], true);
        assert_eq!(WidgetKind::Football.default_state()["lancScore"], 4);
        assert_eq!(WidgetKind::Dart.default_state()["score2"], 501);
        assert_eq!(WidgetKind::Archery.default_state(), json!({}));
        assert_eq!(WidgetKind::TennisOptions.default_state()["maxSets"], 3);
    }
}
