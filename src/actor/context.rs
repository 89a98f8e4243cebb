//! The handle a handler sees on every dispatch: which worker it runs on,
//! and a re-entrant path back into the engine for `send`/`call`/`broadcast`.

// Layer 1: Standard library imports
use std::sync::{Arc, Weak};

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::engine::{EngineShared, RuntimeError};
use crate::message::Message;
use crate::monitoring::{Monitor, RuntimeEvent};
use crate::util::WorkerId;

/// Per-dispatch context passed to [`Actor::handle`](crate::actor::Actor::handle).
///
/// Holds the worker id a handler is currently running on and a weak
/// back-reference to the engine, per §9's "global back-pointers" note: the
/// engine outlives every worker and every worker outlives its actors, so a
/// back-pointer is sound as long as teardown is top-down. We use `Weak`
/// rather than a raw pointer anyway -- it costs one upgrade-and-check per
/// re-entrant call and turns a dangling back-pointer into
/// [`RuntimeError::EngineTerminated`] instead of undefined behaviour.
#[derive(Clone)]
pub struct ActorContext {
    worker_id: WorkerId,
    engine: Weak<EngineShared>,
}

impl ActorContext {
    pub(crate) fn new(worker_id: WorkerId, engine: Weak<EngineShared>) -> Self {
        Self { worker_id, engine }
    }

    /// The id of the worker currently running the handler.
    pub fn worker_id(&self) -> WorkerId {
        self.worker_id
    }

    fn engine(&self) -> Result<Arc<EngineShared>, RuntimeError> {
        self.engine.upgrade().ok_or(RuntimeError::EngineTerminated)
    }

    /// The engine's installed monitor, if the engine is still alive. Used
    /// internally by actor dispatch to record null-reply events; returns
    /// `None` rather than an error since a dead engine simply means nothing
    /// is left to observe the event.
    pub(crate) fn monitor(&self) -> Option<Arc<dyn Monitor<RuntimeEvent>>> {
        self.engine.upgrade().map(|shared| shared.monitor())
    }

    /// Re-entrant fire-and-forget send, routed through the engine's normal
    /// round-robin selection -- see `DESIGN.md` for why this implementation
    /// picked the engine-routed variant over the reference's local-bind
    /// alternative.
    pub fn send<M: Message>(&self, message: M) -> Result<(), RuntimeError> {
        self.engine()?.send(message)
    }

    /// Re-entrant synchronous call. Guarded against the same-worker deadlock
    /// hazard flagged in §4.3/§9: if round-robin selection would land back
    /// on this handler's own worker, this fails fast with
    /// [`RuntimeError::SameWorkerCall`] instead of blocking a worker on a
    /// reply only it could ever produce.
    pub fn call<M: Message>(&self, message: M) -> Result<Option<M::Reply>, RuntimeError> {
        self.engine()?.call_guarded(message, self.worker_id)
    }

    /// Re-entrant broadcast, routed through the engine exactly like a
    /// top-level caller's broadcast.
    pub fn broadcast<M: Message>(&self, message: M) -> Result<(), RuntimeError> {
        self.engine()?.broadcast(message)
    }
}

impl std::fmt::Debug for ActorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorContext")
            .field("worker_id", &self.worker_id)
            .finish()
    }
}
