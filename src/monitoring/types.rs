//! Monitoring event types and configuration.
//!
//! The reference implementation (and the teacher repo it is patterned on)
//! splits events by subsystem (`ActorEvent`, `BrokerEvent`, `SystemEvent`,
//! `MailboxEvent`, ...) because its scope also covers supervision trees and
//! an OS-process layer. This crate's scope is the four §2 components plus
//! routing, so those event families are consolidated into one
//! [`RuntimeEvent`] enum rather than kept as four near-empty ones -- see
//! `DESIGN.md`.

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use serde::Serialize;

// Layer 3: Internal module imports
use super::traits::{EventSeverity, MonitoringEvent};
use crate::util::{ActorId, WorkerId};

/// Configuration for monitor behaviour.
#[derive(Debug, Clone, Serialize)]
pub struct MonitoringConfig {
    /// Whether recording is enabled at all.
    pub enabled: bool,
    /// Maximum number of events kept in the ring-buffer history.
    pub max_history_size: usize,
    /// Minimum severity recorded; events below this are dropped.
    pub severity_filter: EventSeverity,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_history_size: 1000,
            severity_filter: EventSeverity::Info,
        }
    }
}

/// A point-in-time snapshot of a monitor's counters and recent history.
#[derive(Debug, Clone, Serialize)]
pub struct MonitoringSnapshot<E: MonitoringEvent> {
    /// When the snapshot was taken.
    pub timestamp: DateTime<Utc>,
    /// Total events recorded since the last reset.
    pub total_events: u64,
    /// Count of trace-level events.
    pub trace_count: u64,
    /// Count of debug-level events.
    pub debug_count: u64,
    /// Count of info-level events.
    pub info_count: u64,
    /// Count of warning-level events.
    pub warning_count: u64,
    /// Count of error-level events.
    pub error_count: u64,
    /// Count of critical-level events.
    pub critical_count: u64,
    /// Most recent events, bounded by `MonitoringConfig::max_history_size`.
    pub recent_events: Vec<E>,
}

/// What kind of routing operation a [`RuntimeEventKind::Routed`] event
/// describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RoutingKind {
    /// `Engine::send`.
    Send,
    /// `Engine::call`.
    Call,
    /// One recipient of an `Engine::broadcast`.
    Broadcast,
}

/// Why a reply channel was posted a null payload instead of a handler's
/// real reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NullReplyReason {
    /// The handler returned `None` for a `Call` envelope.
    HandlerDeclined,
    /// The worker was shutting down with the envelope still queued.
    ShutdownFlush,
}

/// Every event this runtime emits, per §4.7.
#[derive(Debug, Clone, Serialize)]
pub struct RuntimeEvent {
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The specific thing that happened.
    pub kind: RuntimeEventKind,
}

/// The specific runtime occurrences §4.7 requires to be observable.
#[derive(Debug, Clone, Serialize)]
pub enum RuntimeEventKind {
    /// A worker's context was bound and its OS thread started.
    WorkerSpawned {
        /// The worker that was spawned.
        worker: WorkerId,
    },
    /// An actor was registered on a worker before spawn.
    ActorRegistered {
        /// The message type's compile-time key.
        type_key: &'static str,
        /// This instance's diagnostic id (see [`ActorId`]).
        actor_id: ActorId,
    },
    /// `send`/`call`/`broadcast` successfully routed to a worker.
    Routed {
        /// The message type's compile-time key.
        type_key: &'static str,
        /// The worker selected.
        worker: WorkerId,
        /// Which operation routed.
        kind: RoutingKind,
    },
    /// Routing failed because no worker hosts the requested type.
    ActorNotFound {
        /// The message type's compile-time key.
        type_key: &'static str,
    },
    /// A push was rejected because the target mailbox was full.
    MailboxFull {
        /// The message type's compile-time key.
        type_key: &'static str,
        /// The worker whose mailbox rejected the push.
        worker: WorkerId,
    },
    /// A reply channel was posted a null payload rather than a handler's
    /// real reply.
    NullReplyPosted {
        /// The message type's compile-time key.
        type_key: &'static str,
        /// The worker that posted the null reply.
        worker: WorkerId,
        /// Why the reply was null.
        reason: NullReplyReason,
    },
    /// A worker transitioned lifecycle state.
    WorkerStateChanged {
        /// The worker that transitioned.
        worker: WorkerId,
        /// The state it entered, rendered for display (`Armed`, `Running`,
        /// `Stopped`, ...).
        state: &'static str,
    },
    /// The engine transitioned lifecycle state.
    EngineStateChanged {
        /// The state it entered (`Running`, `Draining`, `Terminated`, ...).
        state: &'static str,
    },
}

impl RuntimeEvent {
    pub(crate) fn new(kind: RuntimeEventKind) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
        }
    }
}

impl MonitoringEvent for RuntimeEvent {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.kind {
            RuntimeEventKind::WorkerSpawned { .. } => EventSeverity::Info,
            RuntimeEventKind::ActorRegistered { .. } => EventSeverity::Debug,
            RuntimeEventKind::Routed { .. } => EventSeverity::Trace,
            RuntimeEventKind::ActorNotFound { .. } => EventSeverity::Error,
            RuntimeEventKind::MailboxFull { .. } => EventSeverity::Warning,
            RuntimeEventKind::NullReplyPosted { .. } => EventSeverity::Warning,
            RuntimeEventKind::WorkerStateChanged { .. } => EventSeverity::Info,
            RuntimeEventKind::EngineStateChanged { .. } => EventSeverity::Info,
        }
    }
}
