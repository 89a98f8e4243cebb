//! Worker: owns a set of type-erased actors on one dedicated OS thread and
//! drains their mailboxes on wake. Shaped like the reference implementation's
//! event loop, condvar-driven rather than `tokio::select!`-driven, since this
//! crate runs one thread per worker instead of tasks on a shared runtime.

// Layer 1: Standard library imports
use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use tracing::{debug, info};

// Layer 3: Internal module imports
use crate::actor::context::ActorContext;
use crate::actor::instance::{ActorInstance, AnyActor};
use crate::actor::Actor;
use crate::engine::RuntimeError;
use crate::mailbox::DEFAULT_MAILBOX_CAPACITY;
use crate::message::Message;
use crate::monitoring::{Monitor, RuntimeEvent, RuntimeEventKind};
use crate::worker::wake::WakeHandle;

pub(crate) mod wake;

/// How long `run_loop` blocks on its wake handle between shutdown checks.
/// Bounds the latency of noticing a stop request; does not otherwise affect
/// throughput since a real wake always short-circuits the wait.
const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Lifecycle states a worker passes through (§4.4). Surfaced only through
/// monitoring events -- nothing outside the worker's own thread can act on
/// the current state, so there is no public getter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WorkerState {
    /// No actors registered yet, no thread started.
    #[allow(dead_code)]
    Unbound,
    /// Actors registered, not yet moved onto its thread.
    #[allow(dead_code)]
    Bound,
    /// Thread started, about to enter its event loop.
    Armed,
    /// Actively draining mailboxes.
    Running,
    /// Event loop exited; pending envelopes flushed.
    Stopped,
}

impl WorkerState {
    fn label(self) -> &'static str {
        match self {
            WorkerState::Unbound => "Unbound",
            WorkerState::Bound => "Bound",
            WorkerState::Armed => "Armed",
            WorkerState::Running => "Running",
            WorkerState::Stopped => "Stopped",
        }
    }
}

/// A worker under construction: actors registered onto it before
/// [`Engine::spawn`](crate::engine::Engine::spawn) moves it onto its own OS
/// thread and runs [`run_loop`](Self::run_loop).
pub struct Worker {
    actors: HashMap<&'static str, Box<dyn AnyActor>>,
    wake: Arc<WakeHandle>,
    default_capacity: usize,
}

impl Worker {
    /// Construct an empty worker with no actors registered yet, using the
    /// reference implementation's default mailbox capacity for any actor
    /// registered without an explicit override.
    pub fn new() -> Self {
        Self::with_default_capacity(DEFAULT_MAILBOX_CAPACITY)
    }

    /// Construct an empty worker whose [`register_actor`](Self::register_actor)
    /// calls default to `capacity` instead of the crate-wide default. Pairs
    /// with [`EngineConfig::default_mailbox_capacity`](crate::engine::EngineConfig::default_mailbox_capacity)
    /// when a caller wants every worker's default to track one validated
    /// engine configuration rather than the hardcoded constant.
    pub fn with_default_capacity(capacity: usize) -> Self {
        Self {
            actors: HashMap::new(),
            wake: Arc::new(WakeHandle::new()),
            default_capacity: capacity,
        }
    }

    /// The wake handle every hosted mailbox signals on push.
    pub(crate) fn wake_handle(&self) -> Arc<WakeHandle> {
        Arc::clone(&self.wake)
    }

    /// Type-key and diagnostic actor id of every actor hosted on this
    /// worker, in the order the engine should register and announce them.
    pub(crate) fn actor_entries(&self) -> Vec<(&'static str, crate::util::ActorId)> {
        self.actors
            .iter()
            .map(|(key, actor)| (*key, actor.actor_id()))
            .collect()
    }

    /// Every hosted actor's mailbox, type-erased, so the engine can retain a
    /// routing-side handle after this `Worker` is moved onto its own thread.
    pub(crate) fn mailboxes(&self) -> HashMap<&'static str, Arc<dyn Any + Send + Sync>> {
        self.actors
            .iter()
            .map(|(key, actor)| (*key, actor.mailbox_any()))
            .collect()
    }

    /// Register an actor using this worker's default mailbox capacity (see
    /// [`with_default_capacity`](Self::with_default_capacity)).
    pub fn register_actor<A: Actor>(&mut self, actor: A) -> Result<(), RuntimeError> {
        self.register_actor_with_capacity(actor, self.default_capacity)
    }

    /// Register an actor with an explicit mailbox capacity. Fails if this
    /// worker already hosts an actor for the same message type (§4.2).
    pub fn register_actor_with_capacity<A: Actor>(
        &mut self,
        actor: A,
        capacity: usize,
    ) -> Result<(), RuntimeError> {
        let type_key = <A::Message as Message>::TYPE_KEY;
        if self.actors.contains_key(type_key) {
            return Err(RuntimeError::DuplicateActorType { type_key });
        }
        let instance = ActorInstance::new(actor, capacity, Arc::clone(&self.wake));
        self.actors.insert(type_key, Box::new(instance));
        Ok(())
    }

    /// Run this worker's event loop on the calling thread until `stop_flag`
    /// is observed set, then flush whatever is left with a null reply.
    ///
    /// Takes `self` by value: the `Worker` (and every actor it hosts) lives
    /// only on the thread that ends up calling this, never shared.
    pub(crate) fn run_loop(
        mut self,
        ctx: ActorContext,
        stop_flag: Arc<AtomicBool>,
        monitor: Arc<dyn Monitor<RuntimeEvent>>,
    ) {
        let worker_id = ctx.worker_id();

        monitor.record(RuntimeEvent::new(RuntimeEventKind::WorkerStateChanged {
            worker: worker_id,
            state: WorkerState::Armed.label(),
        }));
        debug!(%worker_id, "worker armed");

        monitor.record(RuntimeEvent::new(RuntimeEventKind::WorkerStateChanged {
            worker: worker_id,
            state: WorkerState::Running.label(),
        }));
        info!(%worker_id, "worker running");

        loop {
            self.wake.wait_timeout(SHUTDOWN_POLL_INTERVAL);
            if stop_flag.load(Ordering::Acquire) {
                break;
            }
            for actor in self.actors.values_mut() {
                actor.drain(&ctx, &stop_flag);
            }
        }

        // The in-flight envelope (if any) already finished inside the last
        // `drain` call the main loop made before observing `stop_flag`.
        // Running `drain` again here would process one more queued envelope
        // before noticing the stop request, instead of leaving the backlog
        // for `discard_pending` to flush with a null reply (§4.4).
        for actor in self.actors.values_mut() {
            actor.discard_pending(&ctx);
        }

        monitor.record(RuntimeEvent::new(RuntimeEventKind::WorkerStateChanged {
            worker: worker_id,
            state: WorkerState::Stopped.label(),
        }));
        info!(%worker_id, "worker stopped");
    }
}

impl Default for Worker {
    fn default() -> Self {
        Self::new()
    }
}
