//! Stats math and payload normalization
//!
//! - [`level`]: experience → fractional catacombs level
//! - [`time`]: millisecond run times → `M:SS`
//! - [`transform`]: raw statistics payload → [`DungeonStats`](crate::model::DungeonStats)

pub mod level;
pub mod time;
pub mod transform;

pub use level::level_for_xp;
pub use time::format_duration;
pub use transform::transform;
