//! Core traits for the pfstats system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IdentityService`]: Resolve a player name to an opaque id
//! - [`StatsService`]: Fetch the raw statistics payload for an id
//! - [`HostExecutor`]: Run callbacks on the host's designated context
//! - [`ClearListener`]: Hear about cache clears

pub mod identity_service;
pub mod stats_service;
pub mod host;

pub use identity_service::IdentityService;
pub use stats_service::StatsService;
pub use host::{ClearListener, HostExecutor, HostTask};
