//! Display line assembly

use crate::error::{Error, Result};
use crate::model::{DungeonContext, DungeonStats, PersonalBest};
use crate::stats::time::NO_TIME;

/// Shown in place of secrets per run when the player has no runs
pub const NO_RATE: &str = "N/A";

/// Build the line shown next to a party member
///
/// `" (<level>) [<secrets>/<secrets per run>] [<best time>]"`, where the
/// best time is the one recorded for the context's mode and floor.
pub fn format_summary(stats: &DungeonStats, context: &DungeonContext) -> Result<String> {
    if !stats.level.is_finite() {
        return Err(Error::format(format!("level is not finite: {}", stats.level)));
    }
    let level = stats.level.floor() as i64;

    let per_run = stats.secrets_per_run();
    let per_run = if per_run.is_finite() {
        format!("{:.2}", per_run)
    } else {
        NO_RATE.to_string()
    };

    let best = stats
        .best_for(context)
        .map(PersonalBest::display_time)
        .unwrap_or(NO_TIME);

    Ok(format!(
        " ({}) [{}/{}] [{}]",
        level, stats.total_secrets, per_run, best
    ))
}
