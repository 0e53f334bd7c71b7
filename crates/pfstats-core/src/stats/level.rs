//! Catacombs level curve
//!
//! Maps cumulative experience to a fractional level in two regimes:
//!
//! - **Capped** (`xp < UNCAPPED_START_XP`): table lookup with linear
//!   interpolation between the thresholds of consecutive levels.
//! - **Uncapped** (`xp >= UNCAPPED_START_XP`): a flat `XP_PER_LEVEL`
//!   experience per level past 50, floored to two decimals.

/// Cumulative experience required to start level `k` (index `k`).
///
/// Levels 0 and 1 both start at zero experience, so the first 50 xp are
/// progress through level 1. Index 50 starts level 50 and index 51 marks
/// the end of capped progression.
pub const LEVEL_THRESHOLDS: [u64; 52] = [
    0, 0, 50, 125, 235, 395, 625, 955, 1425, 2095, 3045, 4385,
    6275, 8940, 12700, 17960, 25340, 35640, 50040, 70040, 97640,
    135640, 188140, 259640, 356640, 488640, 668640, 911640, 1239640,
    1684640, 2284640, 3084640, 4149640, 5559640, 7459640, 9959640,
    13259640, 17559640, 23159640, 30359640, 39559640, 51559640,
    66559640, 85559640, 109559640, 139559640, 177559640, 225559640,
    285559640, 360559640, 453559640,
    569809640,
];

/// Experience where uncapped progression begins
pub const UNCAPPED_START_XP: f64 = LEVEL_THRESHOLDS[51] as f64;

/// Level reported for zero experience
pub const MIN_LEVEL: f64 = 1.0;

/// Highest level reachable through the table
pub const MAX_CAPPED_LEVEL: f64 = 50.0;

/// Experience per level once past the table
pub const XP_PER_LEVEL: f64 = 200_000_000.0;

/// Fractional catacombs level for the given cumulative experience
///
/// Non-positive experience is level 1, and the curve never reports less
/// than that.
pub fn level_for_xp(xp: f64) -> f64 {
    if xp <= 0.0 {
        return MIN_LEVEL;
    }

    if xp < UNCAPPED_START_XP {
        return capped_level(xp);
    }

    let level = MAX_CAPPED_LEVEL + (xp - UNCAPPED_START_XP) / XP_PER_LEVEL;
    (level * 100.0).floor() / 100.0
}

fn capped_level(xp: f64) -> f64 {
    // First threshold strictly above xp; the level before it is the one achieved.
    let Some(next) = (1..LEVEL_THRESHOLDS.len()).find(|&level| xp < LEVEL_THRESHOLDS[level] as f64)
    else {
        return MAX_CAPPED_LEVEL;
    };

    let achieved = next - 1;
    let start = LEVEL_THRESHOLDS[achieved] as f64;
    let span = LEVEL_THRESHOLDS[next] as f64 - start;
    if span == 0.0 {
        return achieved as f64;
    }

    // Progress inside level 50 does not count; the uncapped regime restarts at 50.
    (achieved as f64 + (xp - start) / span).clamp(MIN_LEVEL, MAX_CAPPED_LEVEL)
}
