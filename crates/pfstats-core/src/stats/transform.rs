//! Statistics payload normalization
//!
//! Turns the statistics service's raw JSON into a [`DungeonStats`]. The
//! payload shape this module reads:
//!
//! ```text
//! {
//!   "success": true,
//!   "dungeons": {
//!     "cataxp": 453559640.0,
//!     "secrets": 12000,
//!     "runs": 900 | { "total": 900, ... },
//!     "pb": {
//!       "catacombs":        { "1": { "rawS+": 61000, ... }, ... },
//!       "master_catacombs": { "7": { "rawS+": "No S+", ... }, ... }
//!     }
//!   }
//! }
//! ```
//!
//! The result is all-or-nothing: a payload that fails any required read
//! never yields partially populated stats.

use crate::error::{Error, Result};
use crate::model::{DungeonMode, DungeonStats, MAX_FLOOR, MIN_FLOOR, PersonalBest};
use crate::stats::level::level_for_xp;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Field holding the highest-rank (S+) time of a floor
const BEST_TIME_FIELD: &str = "rawS+";

/// Build normalized stats from a raw statistics payload
pub fn transform(payload: &Value) -> Result<DungeonStats> {
    let dungeons = payload
        .get("dungeons")
        .and_then(Value::as_object)
        .ok_or_else(|| Error::structural("payload has no dungeons object"))?;

    let total_experience = dungeons
        .get("cataxp")
        .and_then(Value::as_f64)
        .ok_or_else(|| Error::structural("dungeons.cataxp is missing or not a number"))?;

    let total_secrets = dungeons
        .get("secrets")
        .and_then(as_count)
        .ok_or_else(|| Error::structural("dungeons.secrets is missing or not a count"))?;

    let runs_by_category = extract_runs(dungeons.get("runs"))?;

    let pb = dungeons.get("pb").and_then(Value::as_object);
    let mut personal_bests = HashMap::new();
    for mode in DungeonMode::ALL {
        let floors = match pb.and_then(|pb| pb.get(mode.payload_key())) {
            Some(Value::Object(floors)) => extract_personal_bests(mode, floors)?,
            _ => HashMap::new(),
        };
        personal_bests.insert(mode, floors);
    }

    Ok(DungeonStats {
        personal_bests,
        total_experience,
        total_secrets,
        runs_by_category,
        level: level_for_xp(total_experience),
    })
}

/// A bare count is the "total"; an object is copied key by key.
/// The result always carries a "total" entry, 0 when the payload has none
/// or only has an unusable one.
fn extract_runs(runs: Option<&Value>) -> Result<HashMap<String, u64>> {
    let mut map = HashMap::new();
    match runs {
        // A negative bare total is ignored like any other unusable shape.
        Some(value @ Value::Number(_)) => {
            if let Some(total) = as_count(value) {
                map.insert("total".to_string(), total);
            }
        }
        Some(Value::Object(categories)) => {
            for (category, value) in categories {
                let count = as_count(value).ok_or_else(|| {
                    Error::structural(format!("dungeons.runs.{} is not a count", category))
                })?;
                map.insert(category.clone(), count);
            }
        }
        _ => {}
    }
    map.entry("total".to_string()).or_insert(0);
    Ok(map)
}

fn extract_personal_bests(
    mode: DungeonMode,
    floors: &Map<String, Value>,
) -> Result<HashMap<u8, PersonalBest>> {
    let mut map = HashMap::new();
    for floor in MIN_FLOOR..=MAX_FLOOR {
        let Some(entry) = floors.get(&floor.to_string()) else {
            continue;
        };
        let entry = entry.as_object().ok_or_else(|| {
            Error::structural(format!(
                "pb.{}.{} is not an object",
                mode.payload_key(),
                floor
            ))
        })?;

        // Placeholders such as "No S+" are not a time of zero.
        let best = entry.get(BEST_TIME_FIELD).filter(|v| v.is_number()).and_then(as_count);
        map.insert(floor, PersonalBest::new(floor, best));
    }
    Ok(map)
}

/// Non-negative integer view of a JSON number; fractional values truncate
fn as_count(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v as u64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(dungeons: Value) -> Value {
        json!({ "success": true, "dungeons": dungeons })
    }

    #[test]
    fn test_missing_dungeons_is_structural() {
        let result = transform(&json!({ "success": true }));
        assert!(matches!(result, Err(Error::Structural(_))));
    }

    #[test]
    fn test_missing_required_fields() {
        let no_xp = payload(json!({ "secrets": 10 }));
        assert!(matches!(transform(&no_xp), Err(Error::Structural(_))));

        let no_secrets = payload(json!({ "cataxp": 100.0 }));
        assert!(matches!(transform(&no_secrets), Err(Error::Structural(_))));

        let bad_secrets = payload(json!({ "cataxp": 100.0, "secrets": "lots" }));
        assert!(matches!(transform(&bad_secrets), Err(Error::Structural(_))));
    }

    #[test]
    fn test_bare_runs_count() {
        let stats = transform(&payload(json!({ "cataxp": 0, "secrets": 0, "runs": 42 }))).unwrap();
        assert_eq!(stats.runs_by_category.get("total"), Some(&42));
        assert_eq!(stats.total_runs(), 42);
    }

    #[test]
    fn test_negative_bare_runs_defaults_total() {
        let stats = transform(&payload(json!({ "cataxp": 10.0, "secrets": 4, "runs": -5 }))).unwrap();
        assert_eq!(stats.runs_by_category.len(), 1);
        assert_eq!(stats.total_runs(), 0);
        assert_eq!(stats.total_secrets, 4);
    }

    #[test]
    fn test_runs_object_without_total() {
        let stats = transform(&payload(json!({ "cataxp": 0, "secrets": 0, "runs": { "s": 3 } }))).unwrap();
        assert_eq!(stats.runs_by_category.get("s"), Some(&3));
        assert_eq!(stats.total_runs(), 0);
    }

    #[test]
    fn test_runs_object_preserves_keys() {
        let stats = transform(&payload(json!({
            "cataxp": 0,
            "secrets": 0,
            "runs": { "total": 10, "s": 3 }
        })))
        .unwrap();
        assert_eq!(stats.runs_by_category.len(), 2);
        assert_eq!(stats.runs_by_category.get("total"), Some(&10));
        assert_eq!(stats.runs_by_category.get("s"), Some(&3));
    }

    #[test]
    fn test_unexpected_runs_shape_defaults_total() {
        let stats = transform(&payload(json!({ "cataxp": 0, "secrets": 0, "runs": "many" }))).unwrap();
        assert_eq!(stats.runs_by_category.len(), 1);
        assert_eq!(stats.runs_by_category.get("total"), Some(&0));
        assert_eq!(stats.total_runs(), 0);
    }

    #[test]
    fn test_personal_bests() {
        let stats = transform(&payload(json!({
            "cataxp": 453559640.0,
            "secrets": 5000,
            "runs": 100,
            "pb": {
                "catacombs": {
                    "3": { "rawS+": 65000, "rawS": 90000 },
                    "5": { "rawS+": "No S+" }
                },
                "master_catacombs": {
                    "7": { "rawS+": 600000 }
                }
            }
        })))
        .unwrap();

        assert_eq!(stats.level, 50.0);

        let normal = &stats.personal_bests[&DungeonMode::Catacombs];
        assert_eq!(normal.len(), 2);
        assert_eq!(normal[&3].best_time, "1:05");
        assert_eq!(normal[&3].best_time_millis, Some(65_000));
        assert_eq!(normal[&5].best_time_millis, None);
        assert_eq!(normal[&5].best_time, "N/A");
        assert!(!normal.contains_key(&1));

        let master = &stats.personal_bests[&DungeonMode::MasterCatacombs];
        assert_eq!(master[&7].best_time, "10:00");
    }

    #[test]
    fn test_missing_pb_is_empty() {
        let stats = transform(&payload(json!({ "cataxp": 10.0, "secrets": 1 }))).unwrap();
        assert_eq!(stats.personal_bests.len(), 2);
        assert!(stats.personal_bests.values().all(HashMap::is_empty));

        let only_normal = transform(&payload(json!({
            "cataxp": 10.0,
            "secrets": 1,
            "pb": { "catacombs": { "1": { "rawS+": 30000 } } }
        })))
        .unwrap();
        assert!(only_normal.personal_bests[&DungeonMode::MasterCatacombs].is_empty());
        assert_eq!(only_normal.personal_bests[&DungeonMode::Catacombs][&1].best_time, "0:30");
    }

    #[test]
    fn test_malformed_floor_fails_whole_transform() {
        let result = transform(&payload(json!({
            "cataxp": 10.0,
            "secrets": 1,
            "pb": { "catacombs": { "2": 12345 } }
        })));
        assert!(matches!(result, Err(Error::Structural(_))));
    }
}
