// # Identity Service Trait
//
// Defines the interface for resolving a player name into the opaque id the
// statistics service is keyed by.
//
// ## Implementations
//
// - HTTP: `pfstats-http` crate (`HttpIdentityService`)
//
// ## Usage
//
// ```rust,ignore
// use pfstats_core::IdentityService;
//
// let id = identity.lookup_id("Technoblade").await?;
// ```

use async_trait::async_trait;

/// Trait for identity lookup implementations
///
/// # Contract
///
/// - Unknown player → `Err(Error::NotFound)`; the name is not retried
/// - Network failure or unexpected status → `Err(Error::Transient)` with
///   stage `"identity"`, carrying the status and body
///
/// Implementations are single-shot: no retries, no caching. The
/// coordinator owns both.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Resolve a player name to its id
    ///
    /// # Parameters
    ///
    /// - `player_name`: Case-sensitive player name
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The player's id
    /// - `Err(Error)`: If the player does not exist or the lookup failed
    async fn lookup_id(&self, player_name: &str) -> Result<String, crate::Error>;

    /// Service name (for logging/debugging)
    fn service_name(&self) -> &'static str;
}
