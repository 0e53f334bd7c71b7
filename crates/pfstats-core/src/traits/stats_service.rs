// # Stats Service Trait
//
// Defines the interface for fetching a player's raw dungeon statistics.
//
// The service hands back the JSON body untouched; checking the `success`
// flag and normalizing the payload belongs to the resolver.

use async_trait::async_trait;

/// Trait for statistics service implementations
///
/// # Contract
///
/// - HTTP 200 → `Ok(body)` with the parsed JSON, whatever its content
/// - Anything else → `Err(Error::Transient)` with stage `"stats"`
#[async_trait]
pub trait StatsService: Send + Sync {
    /// Fetch the raw statistics payload for a player id
    ///
    /// # Parameters
    ///
    /// - `player_id`: Id returned by an [`IdentityService`](super::IdentityService)
    async fn fetch_stats(&self, player_id: &str) -> Result<serde_json::Value, crate::Error>;

    /// Service name (for logging/debugging)
    fn service_name(&self) -> &'static str;
}
