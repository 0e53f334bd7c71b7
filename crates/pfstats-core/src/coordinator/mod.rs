//! Lookup coordinator
//!
//! The LookupCoordinator is responsible for:
//! - Deduplicating lookups: at most one resolution in flight per player
//! - Owning the result cache (successes and failure placeholders)
//! - Running resolutions on the tokio runtime, off the host's thread
//! - Delivering `fetch` callbacks through the host's executor
//!
//! ## Architecture
//!
//! ```text
//!    host (every frame)
//!          │ request / fetch
//!          ▼
//! ┌──────────────────┐  cached  ┌──────────────┐
//! │ LookupCoordinator│─────────►│ LookupState  │
//! └──────────────────┘          │ (one mutex)  │
//!          │ absent             └──────────────┘
//!          ▼                           ▲
//! ┌──────────────────┐  outcome        │ finish (atomic)
//! │  StatsResolver   │─────────────────┘
//! │  (spawned task)  │
//! └──────────────────┘
//!          │ followers
//!          ▼
//!   HostExecutor ──► callbacks on the host context
//! ```
//!
//! ## Per-player states
//!
//! `Absent → InFlight → Cached(success | failure placeholder)`. Cached
//! entries persist until [`LookupCoordinator::clear`], which resets every
//! player back to `Absent`. Failures are cached too, so a missing player
//! is not looked up again on every frame.

pub mod cache;
pub mod format;

pub use cache::{CacheEntry, EntryOutcome, FetchCallback};
pub use format::{NO_RATE, format_summary};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info, warn};

use crate::config::{DisplayConfig, PfStatsConfig};
use crate::error::{Error, Result};
use crate::model::{DungeonContext, DungeonStats, PlayerKey};
use crate::resolver::StatsResolver;
use crate::traits::{ClearListener, HostExecutor};
use cache::LookupState;

/// Events emitted by the LookupCoordinator
#[derive(Debug, Clone, PartialEq)]
pub enum LookupEvent {
    /// A resolution was started for a player
    ResolutionStarted { player: PlayerKey },

    /// A resolution finished with stats
    ResolutionSucceeded { player: PlayerKey, level: f64 },

    /// A resolution finished without stats; a placeholder was cached
    ResolutionFailed { player: PlayerKey, reason: String },

    /// The cache was cleared
    Cleared { dropped: usize },
}

/// Answer to a polling [`LookupCoordinator::request`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupStatus {
    /// Finished lookup: the stats line or a failure marker
    Ready(String),
    /// A resolution is underway; poll again later
    Pending,
}

/// Deduplicating, caching front door to a [`StatsResolver`]
///
/// ## Lifecycle
///
/// 1. Create with [`LookupCoordinator::new()`] inside a tokio runtime
/// 2. Share it with whatever polls for lookups (it is cheap to clone)
/// 3. Call [`LookupCoordinator::clear()`] when the host's screen closes
/// 4. Drop to release the cache
///
/// ## Threading
///
/// `request`, `fetch` and `clear` are synchronous and safe to call from any
/// thread. Cache and in-flight bookkeeping sit behind a single mutex; the
/// network work runs on the runtime captured at construction.
#[derive(Clone)]
pub struct LookupCoordinator {
    shared: Arc<Shared>,

    /// Runtime resolutions are spawned on
    runtime: Handle,

    /// Listeners notified on every clear
    listeners: Arc<RwLock<Vec<Arc<dyn ClearListener>>>>,
}

/// State reachable from spawned resolution tasks
struct Shared {
    resolver: Arc<dyn StatsResolver>,
    executor: Arc<dyn HostExecutor>,
    state: Mutex<LookupState>,
    display: DisplayConfig,
    event_tx: mpsc::Sender<LookupEvent>,
}

impl LookupCoordinator {
    /// Create a new coordinator on the current tokio runtime
    ///
    /// # Parameters
    ///
    /// - `resolver`: Resolves a player name into stats
    /// - `executor`: Host context `fetch` callbacks are delivered on
    /// - `config`: pfstats configuration
    ///
    /// # Returns
    ///
    /// A tuple of (coordinator, event_receiver) where event_receiver yields lookup events
    pub fn new(
        resolver: Box<dyn StatsResolver>,
        executor: Arc<dyn HostExecutor>,
        config: PfStatsConfig,
    ) -> Result<(Self, mpsc::Receiver<LookupEvent>)> {
        let runtime = Handle::try_current()
            .map_err(|e| Error::config(format!("LookupCoordinator needs a tokio runtime: {}", e)))?;
        Self::with_runtime(resolver, executor, config, runtime)
    }

    /// Create a new coordinator that spawns resolutions on `runtime`
    ///
    /// For hosts whose own thread is not a tokio worker.
    pub fn with_runtime(
        resolver: Box<dyn StatsResolver>,
        executor: Arc<dyn HostExecutor>,
        config: PfStatsConfig,
        runtime: Handle,
    ) -> Result<(Self, mpsc::Receiver<LookupEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.coordinator.event_channel_capacity);

        let coordinator = Self {
            shared: Arc::new(Shared {
                resolver: Arc::from(resolver),
                executor,
                state: Mutex::new(LookupState::default()),
                display: config.display,
                event_tx: tx,
            }),
            runtime,
            listeners: Arc::new(RwLock::new(Vec::new())),
        };

        Ok((coordinator, rx))
    }

    /// Poll for a player's line
    ///
    /// Never blocks and never touches the network on the caller's thread.
    /// The first request for an absent player starts its resolution;
    /// requests made while it runs return [`LookupStatus::Pending`].
    pub fn request(&self, key: &PlayerKey, context: &DungeonContext) -> LookupStatus {
        let ticket = {
            let mut state = self.shared.lock_state();
            if let Some(entry) = state.cache.get(key) {
                let line = entry.line.clone();
                drop(state);
                debug!(player = %key, "Cache hit");
                return LookupStatus::Ready(line);
            }
            if state.in_flight.contains_key(key) {
                return LookupStatus::Pending;
            }
            state.begin(key.clone())
        };

        self.spawn_resolution(key.clone(), *context, ticket);
        LookupStatus::Pending
    }

    /// Line to show for a player right now: the cached line or the pending marker
    pub fn display_line(&self, key: &PlayerKey, context: &DungeonContext) -> String {
        match self.request(key, context) {
            LookupStatus::Ready(line) => line,
            LookupStatus::Pending => self.shared.display.pending_marker.clone(),
        }
    }

    /// Look up a player and report the result through a callback
    ///
    /// # Parameters
    ///
    /// - `player_name`: Case-sensitive player name
    /// - `mode_label`: Mode text from the host; anything mentioning "master" is master mode
    /// - `floor`: Floor number, 1 through 7
    /// - `on_result`: Receives the line, or `None` when the lookup failed
    ///
    /// # Delivery
    ///
    /// `on_result` runs exactly once, always on the host executor, even
    /// for cache hits. Calls for a player whose resolution is already
    /// running wait for that resolution instead of starting another.
    /// Invalid input completes with `None` without touching the cache.
    pub fn fetch<F>(&self, player_name: &str, mode_label: &str, floor: i64, on_result: F)
    where
        F: FnOnce(Option<String>) + Send + 'static,
    {
        let callback: FetchCallback = Box::new(on_result);

        let (key, context) = match (
            PlayerKey::new(player_name),
            DungeonContext::from_label(mode_label, floor),
        ) {
            (Ok(key), Ok(context)) => (key, context),
            (Err(e), _) | (_, Err(e)) => {
                warn!(player = player_name, floor, "Rejected lookup: {}", e);
                self.shared.deliver(vec![callback], None);
                return;
            }
        };

        let ticket = {
            let mut state = self.shared.lock_state();
            if let Some(entry) = state.cache.get(&key) {
                let result = entry.result();
                drop(state);
                debug!(player = %key, "Cache hit");
                self.shared.deliver(vec![callback], result);
                return;
            }
            if let Some(&ticket) = state.in_flight.get(&key) {
                debug!(player = %key, "Lookup already in flight, attaching follower");
                state.followers.entry(ticket).or_default().push(callback);
                return;
            }
            let ticket = state.begin(key.clone());
            state.followers.insert(ticket, vec![callback]);
            ticket
        };

        self.spawn_resolution(key, context, ticket);
    }

    /// Forget every cached line and in-flight mark
    ///
    /// Resolutions already running still finish: their callbacks fire and
    /// their result lands in the fresh cache.
    pub fn clear(&self) {
        let dropped = self.shared.lock_state().reset();
        info!("Cleared lookup cache ({} entries)", dropped);

        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in listeners {
            listener.on_clear();
        }

        self.shared.emit_event(LookupEvent::Cleared { dropped });
    }

    /// Register a listener invoked on every [`clear`](Self::clear)
    pub fn register_clear_listener(&self, listener: Arc<dyn ClearListener>) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    /// Cached entry for a player, if any
    pub fn cached(&self, key: &PlayerKey) -> Option<CacheEntry> {
        self.shared.lock_state().cache.get(key).cloned()
    }

    /// Whether a resolution is running for a player
    pub fn is_in_flight(&self, key: &PlayerKey) -> bool {
        self.shared.lock_state().in_flight.contains_key(key)
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.shared.lock_state().cache.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.shared.lock_state().cache.is_empty()
    }

    /// Number of players with a resolution underway
    pub fn in_flight_count(&self) -> usize {
        self.shared.lock_state().in_flight.len()
    }

    /// Marker strings this coordinator renders
    pub fn display(&self) -> &DisplayConfig {
        &self.shared.display
    }

    /// Run one resolution off the caller's thread
    ///
    /// The resolver runs in its own task so that a panic inside it
    /// surfaces as a `JoinError` here and becomes a cached failure.
    fn spawn_resolution(&self, key: PlayerKey, context: DungeonContext, ticket: u64) {
        debug!(player = %key, ticket, "Starting resolution");
        self.shared
            .emit_event(LookupEvent::ResolutionStarted { player: key.clone() });

        let shared = Arc::clone(&self.shared);
        self.runtime.spawn(async move {
            let resolver = Arc::clone(&shared.resolver);
            let name = key.as_str().to_string();
            let outcome = match tokio::spawn(async move { resolver.resolve(&name).await }).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(player = %key, "Resolution task failed: {}", e);
                    Err(Error::Other(format!("resolution task failed: {}", e)))
                }
            };
            shared.complete(key, context, ticket, outcome);
        });
    }
}

impl std::fmt::Debug for LookupCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.lock_state();
        f.debug_struct("LookupCoordinator")
            .field("cached", &state.cache.len())
            .field("in_flight", &state.in_flight.len())
            .finish()
    }
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, LookupState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Turn a resolution outcome into a cache entry and release its followers
    fn complete(
        &self,
        key: PlayerKey,
        context: DungeonContext,
        ticket: u64,
        outcome: Result<DungeonStats>,
    ) {
        let entry = match outcome {
            Ok(stats) => match format_summary(&stats, &context) {
                Ok(line) => {
                    info!(player = %key, level = stats.level, "Resolved: {}", line.trim_start());
                    self.emit_event(LookupEvent::ResolutionSucceeded {
                        player: key.clone(),
                        level: stats.level,
                    });
                    CacheEntry::new(line, EntryOutcome::Resolved)
                }
                Err(e) => {
                    warn!(player = %key, stage = e.stage(), "Could not format stats: {}", e);
                    self.emit_event(LookupEvent::ResolutionFailed {
                        player: key.clone(),
                        reason: e.to_string(),
                    });
                    CacheEntry::new(self.display.format_error_marker.clone(), EntryOutcome::FormatError)
                }
            },
            Err(e) => {
                if e.is_terminal_miss() {
                    info!(player = %key, "Player does not exist, caching failure");
                } else {
                    warn!(player = %key, stage = e.stage(), "Lookup failed, caching failure: {}", e);
                }
                self.emit_event(LookupEvent::ResolutionFailed {
                    player: key.clone(),
                    reason: e.to_string(),
                });
                CacheEntry::new(self.display.failure_marker.clone(), EntryOutcome::Failed)
            }
        };

        let result = entry.result();
        let followers = self.lock_state().finish(key, ticket, entry);
        self.deliver(followers, result);
    }

    /// Queue callbacks on the host executor
    fn deliver(&self, callbacks: Vec<FetchCallback>, result: Option<String>) {
        for callback in callbacks {
            let result = result.clone();
            self.executor.execute(Box::new(move || callback(result)));
        }
    }

    fn emit_event(&self, event: LookupEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
            }
            // Nobody is listening; events are optional.
            Err(TrySendError::Closed(_)) => {}
        }
    }
}
