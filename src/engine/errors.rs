//! Errors surfaced at the engine's public API boundary.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::mailbox::MailboxError;
use crate::util::WorkerId;

/// Errors produced by [`crate::engine::Engine::spawn`], `send`, `call`, and
/// `broadcast`, and by the re-entrant handle exposed to handlers via
/// `ActorContext`.
///
/// Follows the reference implementation's canonical-struct pattern:
/// structured variants carrying the context needed to log the failure
/// without re-deriving it at the call site, plus `is_transient`/`is_fatal`
/// helper methods for callers that want to classify failures generically.
#[derive(Error, Debug, Clone)]
pub enum RuntimeError {
    /// No worker hosts an actor for the requested message type.
    #[error("no actor registered for message type {type_key}")]
    ActorNotFound {
        /// The message type's compile-time key.
        type_key: &'static str,
    },

    /// The selected actor's mailbox was at capacity.
    #[error("mailbox full for message type {type_key} on {worker}: {source}")]
    MailboxFull {
        /// The message type's compile-time key.
        type_key: &'static str,
        /// The worker whose actor rejected the push.
        worker: WorkerId,
        /// The underlying mailbox error.
        #[source]
        source: MailboxError,
    },

    /// A `call` never received a real reply: the handler declined to answer
    /// a `Call` envelope, or the worker was draining/stopped and flushed the
    /// envelope with a null reply to unblock the caller.
    #[error("call to message type {type_key} produced no response")]
    NoResponse {
        /// The message type's compile-time key.
        type_key: &'static str,
    },

    /// Two actors were registered for the same message type on one worker.
    #[error("actor for message type {type_key} already registered on this worker")]
    DuplicateActorType {
        /// The message type's compile-time key.
        type_key: &'static str,
    },

    /// The engine's configured worker-count cap was reached.
    #[error("worker count cap of {max} reached")]
    TooManyWorkers {
        /// The configured cap.
        max: usize,
    },

    /// The underlying wake facility for a worker could not be signalled.
    /// Fatal for that worker; the engine marks it `Stopped` and continues
    /// serving the others.
    #[error("failed to signal wake handle for {worker}")]
    WakeFailed {
        /// The affected worker.
        worker: WorkerId,
    },

    /// A handler issued a re-entrant `call` whose round-robin selection
    /// landed back on the handler's own worker -- which would deadlock that
    /// worker waiting on a reply only it could produce. Rejected immediately
    /// instead of blocking forever.
    #[error("re-entrant call to message type {type_key} would deadlock {worker} against itself")]
    SameWorkerCall {
        /// The message type's compile-time key.
        type_key: &'static str,
        /// The worker that would have deadlocked itself.
        worker: WorkerId,
    },

    /// The operation is not legal in the engine's current lifecycle state
    /// (e.g. `spawn` after `start`, any traffic after `stop`).
    #[error("engine is not accepting this operation in its current state")]
    EngineNotRunning,

    /// The engine itself has already been dropped; a re-entrant handle
    /// obtained from a now-orphaned actor context can no longer reach it.
    #[error("engine has been terminated")]
    EngineTerminated,
}

impl RuntimeError {
    /// Transient failures reflect momentary resource pressure (a full
    /// mailbox) rather than a structural problem; callers may reasonably
    /// retry after backing off.
    pub fn is_transient(&self) -> bool {
        matches!(self, RuntimeError::MailboxFull { .. })
    }

    /// Fatal failures mean the affected worker (or the whole engine) cannot
    /// continue serving this request under any retry.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RuntimeError::WakeFailed { .. }
                | RuntimeError::EngineNotRunning
                | RuntimeError::EngineTerminated
        )
    }

    /// Everything that is not fatal can, in principle, be handled without
    /// tearing down the engine.
    pub fn is_recoverable(&self) -> bool {
        !self.is_fatal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mailbox_full_is_transient_and_recoverable() {
        let err = RuntimeError::MailboxFull {
            type_key: "t",
            worker: crate::util::WorkerId::from_index(0),
            source: MailboxError::Full { capacity: 100 },
        };
        assert!(err.is_transient());
        assert!(!err.is_fatal());
        assert!(err.is_recoverable());
    }

    #[test]
    fn wake_failed_is_fatal() {
        let err = RuntimeError::WakeFailed {
            worker: crate::util::WorkerId::from_index(1),
        };
        assert!(err.is_fatal());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn actor_not_found_display_contains_type_key() {
        let err = RuntimeError::ActorNotFound { type_key: "demo.ping" };
        assert!(err.to_string().contains("demo.ping"));
    }
}
