//! Run time formatting

/// Placeholder for a missing or non-positive time
pub const NO_TIME: &str = "N/A";

/// Render a duration in milliseconds as `M:SS`
///
/// Seconds are truncated, not rounded, and there is no hours component:
/// a two hour run renders as `120:00`.
pub fn format_duration(millis: Option<u64>) -> String {
    match millis {
        Some(ms) if ms > 0 => {
            let total_seconds = ms / 1000;
            format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
        }
        _ => NO_TIME.to_string(),
    }
}
