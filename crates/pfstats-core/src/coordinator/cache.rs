// # Lookup Cache State
//
// Everything the coordinator tracks per player, behind one lock:
//
// - `cache`: finished lookups, success or failure placeholder
// - `in_flight`: players with a resolution underway, tagged with a ticket
// - `followers`: `fetch` callbacks waiting on a ticket
//
// Followers are keyed by ticket, not by player, so a clear (which empties
// `cache` and `in_flight`) never strands a callback: the resolution that
// owns the ticket still finds and delivers them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::model::PlayerKey;

/// Callback handed to [`LookupCoordinator::fetch`](super::LookupCoordinator::fetch)
pub type FetchCallback = Box<dyn FnOnce(Option<String>) + Send + 'static>;

/// How a cached lookup ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryOutcome {
    /// Stats resolved and formatted
    Resolved,
    /// Stats resolved but the line could not be assembled
    FormatError,
    /// Player missing, remote failure or unreadable payload
    Failed,
}

/// A finished lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheEntry {
    /// Line appended to the host's display
    pub line: String,
    /// How the lookup ended
    pub outcome: EntryOutcome,
    /// When the entry was written
    pub created_at: DateTime<Utc>,
}

impl CacheEntry {
    pub(crate) fn new(line: String, outcome: EntryOutcome) -> Self {
        Self {
            line,
            outcome,
            created_at: Utc::now(),
        }
    }

    /// Value handed to `fetch` callbacks: the line, or `None` for a failure
    pub fn result(&self) -> Option<String> {
        match self.outcome {
            EntryOutcome::Resolved | EntryOutcome::FormatError => Some(self.line.clone()),
            EntryOutcome::Failed => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.outcome == EntryOutcome::Failed
    }
}

#[derive(Default)]
pub(crate) struct LookupState {
    pub(crate) cache: HashMap<PlayerKey, CacheEntry>,
    pub(crate) in_flight: HashMap<PlayerKey, u64>,
    pub(crate) followers: HashMap<u64, Vec<FetchCallback>>,
    next_ticket: u64,
}

impl LookupState {
    /// Mark `key` in flight and hand out the ticket for its resolution
    pub(crate) fn begin(&mut self, key: PlayerKey) -> u64 {
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.in_flight.insert(key, ticket);
        ticket
    }

    /// Record a resolution's outcome and release its followers
    ///
    /// The in-flight mark is only removed if it still belongs to `ticket`;
    /// after a clear the key may already be owned by a newer resolution.
    pub(crate) fn finish(
        &mut self,
        key: PlayerKey,
        ticket: u64,
        entry: CacheEntry,
    ) -> Vec<FetchCallback> {
        if self.in_flight.get(&key) == Some(&ticket) {
            self.in_flight.remove(&key);
        }
        self.cache.insert(key, entry);
        self.followers.remove(&ticket).unwrap_or_default()
    }

    /// Drop every cached entry and in-flight mark; returns the number of cached entries dropped
    pub(crate) fn reset(&mut self) -> usize {
        let dropped = self.cache.len();
        self.cache.clear();
        self.in_flight.clear();
        dropped
    }
}
