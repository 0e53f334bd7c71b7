// # pfstats-core
//
// Core library for party finder dungeon statistics lookups.
//
// ## Architecture Overview
//
// Given a player name and the dungeon mode/floor the host is showing, this
// library produces a short "augmented" line (level, secrets, best time):
//
// - **LevelCurve** (`stats::level`): cumulative experience → fractional level
// - **TimeFormatter** (`stats::time`): run time in milliseconds → `M:SS`
// - **StatsTransformer** (`stats::transform`): raw payload → `DungeonStats`
// - **RemoteResolver** (`resolver`): identity lookup, then stats lookup
// - **LookupCoordinator** (`coordinator`): dedup, cache, host delivery
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Remote services sit behind traits; HTTP lives in `pfstats-http`
// 2. **At Most One In Flight**: A player is never resolved twice concurrently
// 3. **Never Throw At The Host**: Every failure becomes a cached placeholder line
// 4. **Explicit Ownership**: The coordinator is an owned value, not ambient global state

pub mod traits;
pub mod model;
pub mod stats;
pub mod resolver;
pub mod coordinator;
pub mod host;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{IdentityService, StatsService, HostExecutor, ClearListener};
pub use model::{DungeonContext, DungeonMode, DungeonStats, PersonalBest, PlayerKey};
pub use resolver::{RemoteResolver, StatsResolver};
pub use coordinator::{CacheEntry, LookupCoordinator, LookupEvent, LookupStatus};
pub use host::{ContextSlot, HostQueue, QueuedExecutor};
pub use config::{PfStatsConfig, EndpointConfig, DisplayConfig, CoordinatorConfig};
pub use error::{Error, Result};
