//! Swim lane resolution
//!
//! The admin types a running order such as `"4 5 3"` and the overlay shows
//! placings. Every `swimming` update is rewritten before it is stored:
//!
//! 1. `order` keeps only the digits 1-8, each at most once (first wins)
//! 2. The first update with a running order gets a `splittime` stamp
//!    (a payload whose `pos1name` is missing or `null` has no placings yet)
//! 3. `pos{i}lane`, `pos{i}name` and `pos{i}team` are derived for i = 1..8
//!
//! Positions past the end of the order resolve to `null`.

use serde_json::{Map, Value};

/// Number of lanes in the pool
pub const LANE_COUNT: usize = 8;

/// Keep the digits 1-8 in first-seen order, dropping repeats and everything else
pub fn normalize_order(raw: &str) -> String {
    let mut seen = [false; LANE_COUNT];
    let mut order = String::with_capacity(LANE_COUNT);

    for c in raw.chars() {
        if let Some(index) = lane_index(c) {
            if !seen[index] {
                seen[index] = true;
                order.push(c);
            }
        }
    }

    order
}

/// Map `'1'..='8'` to a lane table index
fn lane_index(c: char) -> Option<usize> {
    match c {
        '1'..='8' => c.to_digit(10).map(|d| d as usize - 1),
        _ => None,
    }
}

/// Read `order` as text; numbers are read through their decimal form
fn order_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Name and team shown for one lane
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Lane {
    /// `lane{L}name`, `null` if absent
    pub name: Value,
    /// `lane{L}team`, `null` if absent
    pub team: Value,
}

/// Lane fields of one swimming snapshot, indexed by lane number
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LaneTable {
    lanes: [Lane; LANE_COUNT],
}

impl LaneTable {
    /// Collect `lane1name` .. `lane8team` from a snapshot
    pub fn from_fields(fields: &Map<String, Value>) -> Self {
        let mut table = Self::default();

        for (index, lane) in table.lanes.iter_mut().enumerate() {
            let number = index + 1;
            let field = |suffix: &str| {
                fields
                    .get(&format!("lane{number}{suffix}"))
                    .cloned()
                    .unwrap_or(Value::Null)
            };
            lane.name = field("name");
            lane.team = field("team");
        }

        table
    }

    /// Look up a lane by its digit
    pub fn lane(&self, digit: char) -> Option<&Lane> {
        lane_index(digit).and_then(|index| self.lanes.get(index))
    }
}

/// One resolved finishing position
#[derive(Debug, Clone, PartialEq)]
pub struct Placing {
    /// Lane digit, or empty if the order is shorter than this position
    pub lane: String,
    /// Swimmer name, `null` when unassigned
    pub name: Value,
    /// Swimmer team, `null` when unassigned
    pub team: Value,
}

impl Placing {
    fn unassigned() -> Self {
        Self {
            lane: String::new(),
            name: Value::Null,
            team: Value::Null,
        }
    }
}

/// Resolve all eight positions from a normalized order
pub fn resolve_placings(order: &str, lanes: &LaneTable) -> Vec<Placing> {
    let mut digits = order.chars();

    (0..LANE_COUNT)
        .map(|_| match digits.next() {
            Some(digit) => match lanes.lane(digit) {
                Some(lane) => Placing {
                    lane: digit.to_string(),
                    name: lane.name.clone(),
                    team: lane.team.clone(),
                },
                None => Placing::unassigned(),
            },
            None => Placing::unassigned(),
        })
        .collect()
}

/// Rewrite a `swimming` update in place of the one the client sent
///
/// `clock_time` is the clock display (e.g. `"01:23"`) used for the split
/// stamp. Payloads that are not objects are passed through untouched.
pub fn resolve(payload: Value, clock_time: &str) -> Value {
    let Value::Object(mut fields) = payload else {
        tracing::debug!("Swimming payload is not an object, storing as-is");
        return payload;
    };

    let order = normalize_order(&order_text(fields.get("order")));

    // A null pos1name is the echo of an update that had no placings yet
    let placed = fields.get("pos1name").is_some_and(|name| !name.is_null());
    if !placed && !order.is_empty() {
        let split = clock_time.strip_prefix('0').unwrap_or(clock_time);
        fields.insert("splittime".into(), Value::String(split.to_string()));
    }

    let lanes = LaneTable::from_fields(&fields);
    for (index, placing) in resolve_placings(&order, &lanes).into_iter().enumerate() {
        let position = index + 1;
        fields.insert(format!("pos{position}name"), placing.name);
        fields.insert(format!("pos{position}team"), placing.team);
        fields.insert(format!("pos{position}lane"), Value::String(placing.lane));
    }

    fields.insert("order".into(), Value::String(order));
    Value::Object(fields)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn heat() -> Value {
        let mut fields = Map::new();
        for lane in 1..=8 {
            fields.insert(format!("lane{lane}name"), json!(format!("Swimmer {lane}")));
            fields.insert(format!("lane{lane}team"), json!(format!("Team {lane}")));
        }
        Value::Object(fields)
    }

    #[test]
    fn test_normalize_drops_duplicates_and_noise() {
        assert_eq!(normalize_order("1233211"), "123");
        assert_eq!(normalize_order("4, 5, 9, 0, 3"), "453");
        assert_eq!(normalize_order("a8b7c8"), "87");
        assert_eq!(normalize_order(""), "");
        assert_eq!(normalize_order("87654321"), "87654321");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["1233211", "x9y1 2-2", "", "8888", "12345678"] {
            let once = normalize_order(raw);
            assert_eq!(normalize_order(&once), once);
        }
    }

    #[test]
    fn test_short_order_resolves_to_no_data() {
        let mut payload = heat();
        payload["order"] = json!("1233211");

        let resolved = resolve(payload, "01:05");

        assert_eq!(resolved["order"], "123");
        for (position, lane) in [(1, 1), (2, 2), (3, 3)] {
            assert_eq!(resolved[format!("pos{position}lane")], lane.to_string());
            assert_eq!(resolved[format!("pos{position}name")], format!("Swimmer {lane}"));
            assert_eq!(resolved[format!("pos{position}team")], format!("Team {lane}"));
        }
        for position in 4..=8 {
            assert_eq!(resolved[format!("pos{position}lane")], "");
            assert_eq!(resolved[format!("pos{position}name")], Value::Null);
            assert_eq!(resolved[format!("pos{position}team")], Value::Null);
        }
    }

    #[test]
    fn test_order_maps_positions_to_lanes() {
        let mut payload = heat();
        payload["order"] = json!("4 7 1");

        let resolved = resolve(payload, "00:59");

        assert_eq!(resolved["pos1lane"], "4");
        assert_eq!(resolved["pos1name"], "Swimmer 4");
        assert_eq!(resolved["pos2team"], "Team 7");
        assert_eq!(resolved["pos3name"], "Swimmer 1");
    }

    #[test]
    fn test_missing_lane_fields_are_null() {
        let resolved = resolve(json!({"order": "2", "lane1name": "Only lane one"}), "00:10");

        assert_eq!(resolved["pos1lane"], "2");
        assert_eq!(resolved["pos1name"], Value::Null);
        assert_eq!(resolved["pos1team"], Value::Null);
    }

    #[test]
    fn test_split_time_stamped_on_first_order() {
        let resolved = resolve(json!({"order": "3"}), "02:41");
        assert_eq!(resolved["splittime"], "2:41");

        // Only one leading zero is removed
        let resolved = resolve(json!({"order": "3"}), "00:41");
        assert_eq!(resolved["splittime"], "0:41");
    }

    #[test]
    fn test_split_time_kept_once_placings_exist() {
        // The echo of a resolved update carries pos1name, so the stamp sticks
        let first = resolve(json!({"order": "3", "lane3name": "Ada"}), "02:41");
        let second = resolve(first, "03:00");

        assert_eq!(second["splittime"], "2:41");
    }

    #[test]
    fn test_split_time_stamped_after_empty_echo() {
        let mut echo = resolve(json!({"order": "", "lane3name": "Ada"}), "00:00");
        assert_eq!(echo["pos1name"], Value::Null);

        echo["order"] = json!("3");
        let resolved = resolve(echo, "02:41");

        assert_eq!(resolved["pos1name"], "Ada");
        assert_eq!(resolved["splittime"], "2:41");
    }

    #[test]
    fn test_no_split_time_without_order() {
        let resolved = resolve(json!({"order": "9x"}), "02:41");

        assert_eq!(resolved["order"], "");
        assert!(resolved.get("splittime").is_none());
    }

    #[test]
    fn test_numeric_and_missing_order() {
        let resolved = resolve(json!({"order": 3121}), "00:00");
        assert_eq!(resolved["order"], "312");

        let resolved = resolve(json!({}), "00:00");
        assert_eq!(resolved["order"], "");
        assert_eq!(resolved["pos8lane"], "");
    }

    #[test]
    fn test_non_object_passes_through() {
        assert_eq!(resolve(json!([1, 2, 3]), "00:00"), json!([1, 2, 3]));
        assert_eq!(resolve(Value::Null, "00:00"), Value::Null);
    }

    #[test]
    fn test_lane_table_lookup() {
        let Value::Object(fields) = heat() else {
            unreachable!()
        };
        let table = LaneTable::from_fields(&fields);

        assert_eq!(table.lane('8').map(|l| &l.name), Some(&json!("Swimmer 8")));
        assert!(table.lane('9').is_none());
        assert!(table.lane('0').is_none());
    }
}
