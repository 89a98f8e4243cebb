//! Core monitoring traits for universal event observation.
//!
//! Grounded on the reference implementation's `monitoring::traits` module,
//! with one deliberate divergence: that trait is `async_trait` and requires
//! `Clone` on the monitor type, because the reference's `ActorSystem` is
//! generic over its monitor and runs on tokio. This runtime is
//! thread-per-worker with no async executor, and the engine holds its
//! monitor as `Arc<dyn Monitor>` so it stays a concrete, non-generic type at
//! the public API. Both built-in implementations ([`NoopMonitor`],
//! [`InMemoryMonitor`]) are `parking_lot`-backed and cannot fail, so
//! `record`/`reset` are infallible here rather than returning the
//! reference's `Result<_, MonitoringError>` -- see `DESIGN.md`.

// Layer 1: Standard library imports
use std::fmt::Debug;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use serde::Serialize;

// Layer 3: Internal module imports
use super::types::MonitoringSnapshot;

/// Event severity levels for filtering and categorization.
///
/// Ordered from lowest to highest severity for filtering purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum EventSeverity {
    /// Detailed tracing, off by default.
    Trace,
    /// Development-time diagnostics.
    Debug,
    /// Normal operation.
    Info,
    /// Recoverable anomalies worth a human's attention.
    Warning,
    /// Failures surfaced to a caller.
    Error,
    /// Failures that took down a worker.
    Critical,
}

/// A recordable runtime event: a timestamp plus a severity.
pub trait MonitoringEvent: Send + Sync + Clone + Debug + Serialize + 'static {
    /// Returns when this event occurred.
    fn timestamp(&self) -> DateTime<Utc>;

    /// Returns this event's severity.
    fn severity(&self) -> EventSeverity;
}

/// Records runtime events and can be asked for a point-in-time snapshot.
///
/// Implementations MUST be `Send + Sync`: the engine and every worker thread
/// hold the same monitor handle and may record concurrently.
pub trait Monitor<E: MonitoringEvent>: Send + Sync {
    /// Record one event. Never changes routing or backpressure decisions
    /// (§4.7) -- this is pure observation.
    fn record(&self, event: E);

    /// A snapshot of counters and recent history at the moment of the call.
    fn snapshot(&self) -> MonitoringSnapshot<E>;

    /// Clear all counters and history.
    fn reset(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering() {
        assert!(EventSeverity::Trace < EventSeverity::Debug);
        assert!(EventSeverity::Debug < EventSeverity::Info);
        assert!(EventSeverity::Info < EventSeverity::Warning);
        assert!(EventSeverity::Warning < EventSeverity::Error);
        assert!(EventSeverity::Error < EventSeverity::Critical);
    }
}
