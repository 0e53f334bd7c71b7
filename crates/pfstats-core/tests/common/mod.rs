//! Test doubles and common utilities for coordinator contract tests
//!
//! This module provides minimal remote services that count their calls and
//! can be held open to keep a lookup in flight.

#![allow(dead_code)]

use pfstats_core::error::{Error, Result};
use pfstats_core::host::{HostQueue, QueuedExecutor};
use pfstats_core::traits::{IdentityService, StatsService};
use pfstats_core::{LookupCoordinator, LookupEvent, PfStatsConfig, RemoteResolver};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Semaphore, mpsc};

/// Identity service backed by a fixed name → id table
///
/// Names missing from the table are reported as not found.
#[derive(Clone)]
pub struct MockIdentityService {
    ids: Arc<HashMap<String, String>>,
    /// Names whose lookup fails with a transient error
    failing: Arc<Vec<String>>,
    calls: Arc<AtomicUsize>,
    /// When set, every lookup waits for a permit
    gate: Option<Arc<Semaphore>>,
}

impl MockIdentityService {
    pub fn new(ids: &[(&str, &str)]) -> Self {
        Self {
            ids: Arc::new(
                ids.iter()
                    .map(|(name, id)| (name.to_string(), id.to_string()))
                    .collect(),
            ),
            failing: Arc::new(Vec::new()),
            calls: Arc::new(AtomicUsize::new(0)),
            gate: None,
        }
    }

    /// Make lookups for `name` fail with a transient error
    pub fn with_failing(mut self, name: &str) -> Self {
        let mut failing = (*self.failing).clone();
        failing.push(name.to_string());
        self.failing = Arc::new(failing);
        self
    }

    /// Hold every lookup until the returned gate is opened
    pub fn gated(mut self) -> (Self, Gate) {
        let semaphore = Arc::new(Semaphore::new(0));
        self.gate = Some(semaphore.clone());
        (self, Gate(semaphore))
    }

    /// Get the number of times lookup_id() was called
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IdentityService for MockIdentityService {
    async fn lookup_id(&self, player_name: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }

        if self.failing.iter().any(|name| name == player_name) {
            return Err(Error::transient("identity", "status 503: unavailable"));
        }

        self.ids
            .get(player_name)
            .cloned()
            .ok_or_else(|| Error::not_found(player_name))
    }

    fn service_name(&self) -> &'static str {
        "mock-identity"
    }
}

/// Opens a gated mock service
pub struct Gate(Arc<Semaphore>);

impl Gate {
    /// Let `n` waiting (or future) lookups through
    pub fn open(&self, n: usize) {
        self.0.add_permits(n);
    }
}

/// Stats service backed by a fixed id → payload table
#[derive(Clone)]
pub struct MockStatsService {
    payloads: Arc<HashMap<String, Value>>,
    calls: Arc<AtomicUsize>,
}

impl MockStatsService {
    pub fn new(payloads: Vec<(&str, Value)>) -> Self {
        Self {
            payloads: Arc::new(
                payloads
                    .into_iter()
                    .map(|(id, payload)| (id.to_string(), payload))
                    .collect(),
            ),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the number of times fetch_stats() was called
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl StatsService for MockStatsService {
    async fn fetch_stats(&self, player_id: &str) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payloads
            .get(player_id)
            .cloned()
            .ok_or_else(|| Error::transient("stats", format!("status 404 for {}", player_id)))
    }

    fn service_name(&self) -> &'static str {
        "mock-stats"
    }
}

/// A successful stats payload
pub fn stats_payload(cataxp: f64, secrets: u64, runs: u64) -> Value {
    json!({
        "success": true,
        "dungeons": {
            "cataxp": cataxp,
            "secrets": secrets,
            "runs": { "total": runs },
            "pb": {
                "catacombs": {
                    "3": { "rawS+": 65000 },
                    "4": { "rawS+": "No S+" }
                },
                "master_catacombs": {
                    "7": { "rawS+": 600000 }
                }
            }
        }
    })
}

/// Everything a contract test needs, wired together
pub struct Harness {
    pub coordinator: LookupCoordinator,
    pub events: mpsc::Receiver<LookupEvent>,
    pub queue: HostQueue,
    pub identity: MockIdentityService,
    pub stats: MockStatsService,
}

/// Build a coordinator over the given mock services
pub fn harness(identity: MockIdentityService, stats: MockStatsService) -> Harness {
    let (executor, queue) = QueuedExecutor::new();
    let resolver = RemoteResolver::new(identity.clone(), stats.clone());

    let (coordinator, events) = LookupCoordinator::new(
        Box::new(resolver),
        Arc::new(executor),
        PfStatsConfig::default(),
    )
    .expect("coordinator construction succeeds");

    Harness {
        coordinator,
        events,
        queue,
        identity,
        stats,
    }
}

/// Standard services: "Steve" resolves, everyone else is unknown
pub fn standard_services() -> (MockIdentityService, MockStatsService) {
    let identity = MockIdentityService::new(&[("Steve", "id-steve")]);
    let stats = MockStatsService::new(vec![("id-steve", stats_payload(453_559_640.0, 1000, 400))]);
    (identity, stats)
}

/// Shared sink for `fetch` results
pub type Results = Arc<std::sync::Mutex<Vec<Option<String>>>>;

pub fn results() -> Results {
    Arc::new(std::sync::Mutex::new(Vec::new()))
}

/// Callback that records its result into `sink`
pub fn record_into(sink: &Results) -> impl FnOnce(Option<String>) + Send + 'static {
    let sink = sink.clone();
    move |result| sink.lock().unwrap().push(result)
}

/// Drain the host queue until `count` callbacks have run
pub async fn run_callbacks(queue: &mut HostQueue, count: usize) {
    for _ in 0..count {
        let ran = tokio::time::timeout(std::time::Duration::from_secs(5), queue.run_next())
            .await
            .expect("callback delivered within 5 seconds");
        assert!(ran, "host queue closed early");
    }
}

/// Give spawned resolutions a moment to finish
pub async fn settle() {
    tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
}
