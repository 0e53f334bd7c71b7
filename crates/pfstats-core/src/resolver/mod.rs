//! Remote stats resolution
//!
//! [`RemoteResolver`] chains the two remote lookups and normalizes the result:
//!
//! ```text
//! player name ──► IdentityService ──► id ──► StatsService ──► raw JSON
//!                      │ 204                     │ success=false
//!                      ▼                         ▼
//!                   NotFound                 Structural
//!                                                │ ok
//!                                                ▼
//!                                      transform ──► DungeonStats
//! ```
//!
//! Each stage short-circuits: a failed identity lookup never reaches the
//! statistics service. The resolver holds no state between calls.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::DungeonStats;
use crate::stats::transform;
use crate::traits::{IdentityService, StatsService};

/// Anything that can turn a player name into dungeon stats
///
/// The coordinator depends on this trait only, so tests and alternative
/// backends can skip the two-service chain entirely.
#[async_trait]
pub trait StatsResolver: Send + Sync {
    /// Resolve a player's stats
    ///
    /// # Returns
    ///
    /// - `Ok(DungeonStats)`: Stats for the player
    /// - `Err(Error::NotFound)`: The player does not exist
    /// - `Err(Error)`: Any other failure at any stage
    async fn resolve(&self, player_name: &str) -> Result<DungeonStats>;
}

/// Two-stage resolver: identity lookup, then statistics lookup
#[derive(Debug, Clone)]
pub struct RemoteResolver<I, S> {
    identity: I,
    stats: S,
}

impl<I, S> RemoteResolver<I, S>
where
    I: IdentityService,
    S: StatsService,
{
    pub fn new(identity: I, stats: S) -> Self {
        Self { identity, stats }
    }

    pub fn identity(&self) -> &I {
        &self.identity
    }

    pub fn stats(&self) -> &S {
        &self.stats
    }
}

#[async_trait]
impl<I, S> StatsResolver for RemoteResolver<I, S>
where
    I: IdentityService,
    S: StatsService,
{
    async fn resolve(&self, player_name: &str) -> Result<DungeonStats> {
        let player_id = self.identity.lookup_id(player_name).await.inspect_err(|e| {
            warn!(
                player = player_name,
                service = self.identity.service_name(),
                "Identity lookup failed: {}",
                e
            );
        })?;
        debug!(player = player_name, id = %player_id, "Resolved player id");

        let payload = self.stats.fetch_stats(&player_id).await.inspect_err(|e| {
            warn!(
                player = player_name,
                service = self.stats.service_name(),
                "Stats lookup failed for id {}: {}",
                player_id,
                e
            );
        })?;

        if !payload_succeeded(&payload) {
            warn!(player = player_name, "Stats service reported success=false for id {}", player_id);
            return Err(Error::structural(format!(
                "stats service reported success=false for {}",
                player_name
            )));
        }

        transform(&payload).inspect_err(|e| {
            warn!(player = player_name, stage = "transform", "Could not read stats payload: {}", e);
        })
    }
}

fn payload_succeeded(payload: &Value) -> bool {
    payload.get("success").and_then(Value::as_bool).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedIdentity {
        outcome: fn(&str) -> Result<String>,
    }

    #[async_trait]
    impl IdentityService for FixedIdentity {
        async fn lookup_id(&self, player_name: &str) -> Result<String> {
            (self.outcome)(player_name)
        }

        fn service_name(&self) -> &'static str {
            "fixed-identity"
        }
    }

    struct FixedStats {
        payload: Value,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl StatsService for FixedStats {
        async fn fetch_stats(&self, _player_id: &str) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.payload.clone())
        }

        fn service_name(&self) -> &'static str {
            "fixed-stats"
        }
    }

    fn resolver(
        outcome: fn(&str) -> Result<String>,
        payload: Value,
    ) -> (RemoteResolver<FixedIdentity, FixedStats>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = RemoteResolver::new(
            FixedIdentity { outcome },
            FixedStats {
                payload,
                calls: calls.clone(),
            },
        );
        (resolver, calls)
    }

    #[tokio::test]
    async fn test_not_found_short_circuits() {
        let (resolver, stats_calls) = resolver(|name| Err(Error::not_found(name)), json!({}));

        let result = resolver.resolve("Ghost").await;
        assert!(matches!(result, Err(Error::NotFound(_))));
        assert_eq!(stats_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_transient_identity_failure_short_circuits() {
        let (resolver, stats_calls) = resolver(
            |_| Err(Error::transient("identity", "status 500")),
            json!({}),
        );

        let result = resolver.resolve("Steve").await;
        assert!(matches!(result, Err(Error::Transient { stage: "identity", .. })));
        assert_eq!(stats_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_success_false_is_failure() {
        let (resolver, stats_calls) = resolver(
            |_| Ok("abc123".to_string()),
            json!({ "success": false, "dungeons": { "cataxp": 1.0, "secrets": 1 } }),
        );

        let result = resolver.resolve("Steve").await;
        assert!(matches!(result, Err(Error::Structural(_))));
        assert_eq!(stats_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_success_flag_is_failure() {
        let (resolver, _) = resolver(
            |_| Ok("abc123".to_string()),
            json!({ "dungeons": { "cataxp": 1.0, "secrets": 1 } }),
        );
        assert!(resolver.resolve("Steve").await.is_err());
    }

    #[tokio::test]
    async fn test_full_chain() {
        let (resolver, stats_calls) = resolver(
            |_| Ok("abc123".to_string()),
            json!({
                "success": true,
                "dungeons": { "cataxp": 569809640.0 + 100000000.0, "secrets": 300, "runs": 100 }
            }),
        );

        let stats = resolver.resolve("Steve").await.unwrap();
        assert_eq!(stats.level, 50.5);
        assert_eq!(stats.total_secrets, 300);
        assert_eq!(stats_calls.load(Ordering::SeqCst), 1);
    }
}
