// # Host Integration Traits
//
// The host (a game client UI, a CLI loop, ...) owns a thread or loop with
// its own rules about what may run there. The coordinator never invokes
// host callbacks from a network task directly: it hands them to a
// `HostExecutor`, and the host runs them on its own schedule.

/// A unit of work queued for the host context
pub type HostTask = Box<dyn FnOnce() + Send + 'static>;

/// Execution context callbacks are delivered on
///
/// `execute` must not run the task inline on the caller's stack when the
/// caller is a network task; queueing it for the host loop is the
/// expected implementation.
pub trait HostExecutor: Send + Sync {
    /// Schedule a task on the host context
    fn execute(&self, task: HostTask);
}

/// Notified whenever the coordinator's cache is cleared
///
/// Register with
/// [`LookupCoordinator::register_clear_listener`](crate::LookupCoordinator::register_clear_listener).
/// Called synchronously from `clear()`, after the cache is empty.
pub trait ClearListener: Send + Sync {
    /// The cache was just cleared
    fn on_clear(&self);
}
