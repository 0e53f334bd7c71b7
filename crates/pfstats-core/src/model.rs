//! Data model shared by the resolver and the coordinator

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Lowest and highest floor a party finder listing can target
pub const MIN_FLOOR: u8 = 1;
pub const MAX_FLOOR: u8 = 7;

/// Player name used as the cache and dedup key
///
/// Case-sensitive; "Steve" and "steve" are distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerKey(String);

impl PlayerKey {
    /// Create a key, rejecting empty names
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::invalid_input("Player name cannot be empty"));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PlayerKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Dungeon game mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DungeonMode {
    /// Normal mode
    Catacombs,
    /// Master mode
    MasterCatacombs,
}

impl DungeonMode {
    /// All modes, in payload order
    pub const ALL: [DungeonMode; 2] = [DungeonMode::Catacombs, DungeonMode::MasterCatacombs];

    /// Map the free-form mode label the host scraped from its UI
    ///
    /// Any label mentioning "master" (case-insensitive) is master mode,
    /// everything else is the normal catacombs.
    pub fn from_label(label: &str) -> Self {
        if label.to_lowercase().contains("master") {
            DungeonMode::MasterCatacombs
        } else {
            DungeonMode::Catacombs
        }
    }

    /// Key of this mode's personal-best object in the stats payload
    pub fn payload_key(&self) -> &'static str {
        match self {
            DungeonMode::Catacombs => "catacombs",
            DungeonMode::MasterCatacombs => "master_catacombs",
        }
    }
}

/// Mode and floor a lookup is made for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DungeonContext {
    mode: DungeonMode,
    floor: u8,
}

impl DungeonContext {
    /// Create a context, rejecting floors outside 1..=7
    pub fn new(mode: DungeonMode, floor: i64) -> Result<Self> {
        if !(MIN_FLOOR as i64..=MAX_FLOOR as i64).contains(&floor) {
            return Err(Error::invalid_input(format!(
                "Floor must be between {} and {}. Got: {}",
                MIN_FLOOR, MAX_FLOOR, floor
            )));
        }
        Ok(Self {
            mode,
            floor: floor as u8,
        })
    }

    /// Build a context straight from the host's signals
    pub fn from_label(mode_label: &str, floor: i64) -> Result<Self> {
        Self::new(DungeonMode::from_label(mode_label), floor)
    }

    pub fn mode(&self) -> DungeonMode {
        self.mode
    }

    pub fn floor(&self) -> u8 {
        self.floor
    }
}

/// Personal best for one floor
///
/// Only the highest-rank (S+) time is tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalBest {
    /// Floor number (1..=7)
    pub floor: u8,
    /// Raw best time in milliseconds, when the payload had a numeric value
    pub best_time_millis: Option<u64>,
    /// `best_time_millis` rendered as `M:SS`, or "N/A"
    pub best_time: String,
}

impl PersonalBest {
    pub fn new(floor: u8, best_time_millis: Option<u64>) -> Self {
        Self {
            floor,
            best_time_millis,
            best_time: crate::stats::time::format_duration(best_time_millis),
        }
    }

    /// Time to show for this floor
    pub fn display_time(&self) -> &str {
        &self.best_time
    }
}

/// Normalized dungeon statistics for one player
///
/// Built once per successful resolution and never mutated afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonStats {
    /// Personal bests per mode, keyed by floor; floors without data are absent
    pub personal_bests: HashMap<DungeonMode, HashMap<u8, PersonalBest>>,
    /// Total catacombs experience
    pub total_experience: f64,
    /// Total secrets found
    pub total_secrets: u64,
    /// Run counts by category name ("total" and friends)
    pub runs_by_category: HashMap<String, u64>,
    /// Fractional catacombs level derived from `total_experience`
    pub level: f64,
}

impl DungeonStats {
    /// Value of the "total" run category, 0 when absent
    pub fn total_runs(&self) -> u64 {
        self.runs_by_category.get("total").copied().unwrap_or(0)
    }

    /// Secrets per total run
    ///
    /// Not finite when the player has no recorded runs.
    pub fn secrets_per_run(&self) -> f64 {
        self.total_secrets as f64 / self.total_runs() as f64
    }

    /// Personal best recorded for the context's mode and floor
    pub fn best_for(&self, context: &DungeonContext) -> Option<&PersonalBest> {
        self.personal_bests
            .get(&context.mode())
            .and_then(|floors| floors.get(&context.floor()))
    }
}
