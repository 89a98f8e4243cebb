//! The engine: owns every worker, the type-key routing registry, and the
//! public `send`/`call`/`broadcast` surface. Patterned on the reference
//! implementation's `ActorSystem`, with its async `tokio::spawn` tasks
//! replaced by one dedicated OS thread per worker and its `Arc<RwLock<..>>`
//! registries kept but built only once, during setup.

// Layer 1: Standard library imports
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
#[cfg(test)]
use std::sync::Weak;
use std::thread::JoinHandle;

// Layer 2: Third-party crate imports
use parking_lot::{Condvar, Mutex, RwLock};
use tracing::info;

// Layer 3: Internal module imports
use crate::actor::context::ActorContext;
use crate::mailbox::BoundedMailbox;
use crate::message::{Envelope, Message};
use crate::monitoring::{Monitor, RoutingKind, RuntimeEvent, RuntimeEventKind};
use crate::util::{WorkerId, WorkerIdAllocator};
use crate::worker::Worker;

mod config;
mod errors;
mod registry;

pub use config::{ConfigError, EngineConfig, EngineConfigBuilder, MonitorChoice};
pub use errors::RuntimeError;
use registry::TypeRegistry;

/// Lifecycle states the engine passes through (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineState {
    /// Accepting `spawn`, not yet accepting traffic.
    Setup,
    /// Workers running, accepting `send`/`call`/`broadcast`.
    Running,
    /// `stop` has been called; workers are being signalled and joined.
    Draining,
    /// Every worker thread has exited.
    Terminated,
}

impl EngineState {
    fn label(self) -> &'static str {
        match self {
            EngineState::Setup => "Setup",
            EngineState::Running => "Running",
            EngineState::Draining => "Draining",
            EngineState::Terminated => "Terminated",
        }
    }
}

/// Everything the engine retains about one spawned worker once its `Worker`
/// value has been moved onto its own thread.
struct WorkerHandle {
    mailboxes: std::collections::HashMap<&'static str, Arc<dyn Any + Send + Sync>>,
    wake: Arc<crate::worker::wake::WakeHandle>,
    stop_flag: Arc<AtomicBool>,
    join: Mutex<Option<JoinHandle<()>>>,
}

/// Engine state shared between the `Engine` handle and every `ActorContext`
/// re-entrant handle handed to a running actor. Always accessed through an
/// `Arc`; actors only ever see a `Weak<EngineShared>` so a dropped engine
/// cannot dangle a back-pointer (§9).
pub(crate) struct EngineShared {
    registry: TypeRegistry,
    workers: RwLock<Vec<WorkerHandle>>,
    id_alloc: WorkerIdAllocator,
    state: Mutex<EngineState>,
    state_changed: Condvar,
    config: EngineConfig,
    monitor: Arc<dyn Monitor<RuntimeEvent>>,
}

impl EngineShared {
    pub(crate) fn monitor(&self) -> Arc<dyn Monitor<RuntimeEvent>> {
        Arc::clone(&self.monitor)
    }

    fn ensure_running(&self) -> Result<(), RuntimeError> {
        if *self.state.lock() == EngineState::Running {
            Ok(())
        } else {
            Err(RuntimeError::EngineNotRunning)
        }
    }

    fn select_worker(&self, type_key: &'static str) -> Result<WorkerId, RuntimeError> {
        let selected = self
            .registry
            .workers_for(type_key)
            .and_then(|list| self.registry.next_round_robin(type_key, &list));
        selected.ok_or_else(|| {
            self.monitor
                .record(RuntimeEvent::new(RuntimeEventKind::ActorNotFound { type_key }));
            RuntimeError::ActorNotFound { type_key }
        })
    }

    fn mailbox_for<M: Message>(&self, worker_id: WorkerId) -> Result<Arc<BoundedMailbox<M>>, RuntimeError> {
        let type_key = M::TYPE_KEY;
        let workers = self.workers.read();
        let handle = workers
            .get(worker_id.index())
            .ok_or(RuntimeError::ActorNotFound { type_key })?;
        let any = handle
            .mailboxes
            .get(type_key)
            .ok_or(RuntimeError::ActorNotFound { type_key })?;
        Arc::clone(any)
            .downcast::<BoundedMailbox<M>>()
            .map_err(|_| RuntimeError::ActorNotFound { type_key })
    }

    fn dispatch_one_way<M: Message>(
        &self,
        type_key: &'static str,
        worker_id: WorkerId,
        message: M,
        kind: RoutingKind,
    ) -> Result<(), RuntimeError> {
        let mailbox = self.mailbox_for::<M>(worker_id)?;
        mailbox.push(Envelope::one_way(message)).map_err(|source| {
            self.monitor.record(RuntimeEvent::new(RuntimeEventKind::MailboxFull {
                type_key,
                worker: worker_id,
            }));
            RuntimeError::MailboxFull {
                type_key,
                worker: worker_id,
                source,
            }
        })?;
        self.monitor.record(RuntimeEvent::new(RuntimeEventKind::Routed {
            type_key,
            worker: worker_id,
            kind,
        }));
        Ok(())
    }

    fn dispatch_call<M: Message>(
        &self,
        type_key: &'static str,
        worker_id: WorkerId,
        message: M,
    ) -> Result<Option<M::Reply>, RuntimeError> {
        let mailbox = self.mailbox_for::<M>(worker_id)?;
        let (envelope, reply) = Envelope::call(message);
        mailbox.push(envelope).map_err(|source| {
            self.monitor.record(RuntimeEvent::new(RuntimeEventKind::MailboxFull {
                type_key,
                worker: worker_id,
            }));
            RuntimeError::MailboxFull {
                type_key,
                worker: worker_id,
                source,
            }
        })?;
        self.monitor.record(RuntimeEvent::new(RuntimeEventKind::Routed {
            type_key,
            worker: worker_id,
            kind: RoutingKind::Call,
        }));
        reply
            .receive()
            .flatten()
            .map(Some)
            .ok_or(RuntimeError::NoResponse { type_key })
    }

    /// Fire-and-forget send, routed through round-robin selection.
    pub(crate) fn send<M: Message>(&self, message: M) -> Result<(), RuntimeError> {
        self.ensure_running()?;
        let type_key = M::TYPE_KEY;
        let worker_id = self.select_worker(type_key)?;
        self.dispatch_one_way(type_key, worker_id, message, RoutingKind::Send)
    }

    /// Top-level (non re-entrant) synchronous call: no same-worker guard,
    /// since the caller is not itself a worker thread.
    pub(crate) fn call<M: Message>(&self, message: M) -> Result<Option<M::Reply>, RuntimeError> {
        self.ensure_running()?;
        let type_key = M::TYPE_KEY;
        let worker_id = self.select_worker(type_key)?;
        self.dispatch_call(type_key, worker_id, message)
    }

    /// Re-entrant synchronous call issued from inside a handler. Fails fast
    /// with `SameWorkerCall` if routing would deadlock the caller against
    /// itself (§4.3/§9).
    pub(crate) fn call_guarded<M: Message>(
        &self,
        message: M,
        caller_worker: WorkerId,
    ) -> Result<Option<M::Reply>, RuntimeError> {
        self.ensure_running()?;
        let type_key = M::TYPE_KEY;
        let worker_id = self.select_worker(type_key)?;
        if worker_id == caller_worker {
            return Err(RuntimeError::SameWorkerCall {
                type_key,
                worker: worker_id,
            });
        }
        self.dispatch_call(type_key, worker_id, message)
    }

    /// Deliver to every worker hosting `M`, in registration order. Aborts on
    /// the first failure rather than continuing to the remaining workers
    /// (Open Question #1, decided in favor of the reference's `try`-and-stop
    /// behaviour -- see `DESIGN.md`).
    pub(crate) fn broadcast<M: Message>(&self, message: M) -> Result<(), RuntimeError> {
        self.ensure_running()?;
        let type_key = M::TYPE_KEY;
        let list = self
            .registry
            .workers_for(type_key)
            .ok_or(RuntimeError::ActorNotFound { type_key })?;
        for worker_id in list {
            self.dispatch_one_way(type_key, worker_id, message.clone(), RoutingKind::Broadcast)?;
        }
        Ok(())
    }
}

/// A running (or not-yet-started) actor runtime: a typed registry of
/// workers, each draining its own mailboxes on its own OS thread.
pub struct Engine {
    shared: Arc<EngineShared>,
}

impl Engine {
    /// Construct an engine with the default configuration and a no-op
    /// monitor.
    pub fn new() -> Self {
        let (config, monitor) = EngineConfig::builder()
            .build()
            .unwrap_or_else(|_| (EngineConfig::default(), MonitorChoice::default()));
        Self::with_config(config, monitor)
    }

    /// Construct an engine from an explicit configuration and monitor
    /// choice, as produced by [`EngineConfigBuilder::build`].
    pub fn with_config(config: EngineConfig, monitor: MonitorChoice) -> Self {
        Self {
            shared: Arc::new(EngineShared {
                registry: TypeRegistry::new(),
                workers: RwLock::new(Vec::new()),
                id_alloc: WorkerIdAllocator::new(),
                state: Mutex::new(EngineState::Setup),
                state_changed: Condvar::new(),
                config,
                monitor: monitor.build(),
            }),
        }
    }

    /// This engine's validated configuration, e.g. to build workers whose
    /// default mailbox capacity tracks [`EngineConfig::default_mailbox_capacity`]
    /// via [`Worker::with_default_capacity`](crate::worker::Worker::with_default_capacity)
    /// instead of the crate-wide constant.
    pub fn config(&self) -> &EngineConfig {
        &self.shared.config
    }

    /// Register `worker` and move it onto its own OS thread. Only legal
    /// before [`start`](Self::start) is called.
    pub fn spawn(&self, worker: Worker) -> Result<WorkerId, RuntimeError> {
        {
            let state = self.shared.state.lock();
            if *state != EngineState::Setup {
                return Err(RuntimeError::EngineNotRunning);
            }
        }

        let current_count = self.shared.workers.read().len();
        if current_count >= self.shared.config.max_workers() {
            return Err(RuntimeError::TooManyWorkers {
                max: self.shared.config.max_workers(),
            });
        }

        let worker_id = self.shared.id_alloc.allocate();
        let actor_entries = worker.actor_entries();
        let mailboxes = worker.mailboxes();
        let wake = worker.wake_handle();
        let stop_flag = Arc::new(AtomicBool::new(false));

        for (type_key, actor_id) in actor_entries.iter().copied() {
            self.shared.registry.register(type_key, worker_id);
            self.shared
                .monitor
                .record(RuntimeEvent::new(RuntimeEventKind::ActorRegistered {
                    type_key,
                    actor_id,
                }));
        }

        let ctx = ActorContext::new(worker_id, Arc::downgrade(&self.shared));
        let monitor = self.shared.monitor();
        let thread_stop_flag = Arc::clone(&stop_flag);
        let join = std::thread::Builder::new()
            .name(worker_id.to_string())
            .spawn(move || worker.run_loop(ctx, thread_stop_flag, monitor))
            .map_err(|_| RuntimeError::WakeFailed { worker: worker_id })?;

        self.shared.workers.write().push(WorkerHandle {
            mailboxes,
            wake,
            stop_flag,
            join: Mutex::new(Some(join)),
        });

        self.shared
            .monitor
            .record(RuntimeEvent::new(RuntimeEventKind::WorkerSpawned {
                worker: worker_id,
            }));
        let type_keys: Vec<&'static str> = actor_entries.iter().map(|(key, _)| *key).collect();
        info!(%worker_id, types = ?type_keys, "worker spawned");

        Ok(worker_id)
    }

    /// Transition to `Running` and block the calling thread until
    /// [`stop`](Self::stop) has fully drained and joined every worker.
    pub fn start(&self) -> Result<(), RuntimeError> {
        {
            let mut state = self.shared.state.lock();
            if *state != EngineState::Setup {
                return Err(RuntimeError::EngineNotRunning);
            }
            *state = EngineState::Running;
        }
        self.shared
            .monitor
            .record(RuntimeEvent::new(RuntimeEventKind::EngineStateChanged {
                state: EngineState::Running.label(),
            }));
        self.shared.state_changed.notify_all();

        let mut state = self.shared.state.lock();
        while *state != EngineState::Terminated {
            self.shared.state_changed.wait(&mut state);
        }
        Ok(())
    }

    /// Signal every worker to stop, join their threads, and transition to
    /// `Terminated`. Idempotent: a second call while already draining or
    /// terminated is a no-op.
    pub fn stop(&self) -> Result<(), RuntimeError> {
        {
            let mut state = self.shared.state.lock();
            match *state {
                EngineState::Terminated | EngineState::Draining => return Ok(()),
                EngineState::Setup | EngineState::Running => {
                    *state = EngineState::Draining;
                }
            }
        }
        self.shared
            .monitor
            .record(RuntimeEvent::new(RuntimeEventKind::EngineStateChanged {
                state: EngineState::Draining.label(),
            }));

        {
            let workers = self.shared.workers.read();
            for handle in workers.iter() {
                handle.stop_flag.store(true, Ordering::Release);
                handle.wake.wake();
            }
        }
        {
            let workers = self.shared.workers.read();
            for handle in workers.iter() {
                if let Some(join) = handle.join.lock().take() {
                    let _ = join.join();
                }
            }
        }

        {
            let mut state = self.shared.state.lock();
            *state = EngineState::Terminated;
        }
        self.shared
            .monitor
            .record(RuntimeEvent::new(RuntimeEventKind::EngineStateChanged {
                state: EngineState::Terminated.label(),
            }));
        self.shared.state_changed.notify_all();
        Ok(())
    }

    /// Fire-and-forget send to a round-robin-selected worker hosting `M`.
    pub fn send<M: Message>(&self, message: M) -> Result<(), RuntimeError> {
        self.shared.send(message)
    }

    /// Synchronous request/reply to a round-robin-selected worker hosting
    /// `M`. Blocks the calling thread until the handler replies.
    pub fn call<M: Message>(&self, message: M) -> Result<Option<M::Reply>, RuntimeError> {
        self.shared.call(message)
    }

    /// Deliver `message` to every worker hosting `M`, in registration order.
    pub fn broadcast<M: Message>(&self, message: M) -> Result<(), RuntimeError> {
        self.shared.broadcast(message)
    }

    /// A weak handle usable to build an `ActorContext` outside of `spawn`,
    /// e.g. in tests that need to exercise re-entrant dispatch directly.
    #[cfg(test)]
    pub(crate) fn weak_shared(&self) -> Weak<EngineShared> {
        Arc::downgrade(&self.shared)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::actor::Actor;
    use crate::worker::Worker;
    use std::time::Duration;

    #[derive(Debug, Clone)]
    struct Ping;

    impl Message for Ping {
        const TYPE_KEY: &'static str = "test.engine.ping";
        type Reply = u32;
    }

    struct PongActor {
        count: u32,
    }

    impl Actor for PongActor {
        type Message = Ping;

        fn handle(&mut self, _msg: Ping, _ctx: &ActorContext) -> Option<u32> {
            self.count += 1;
            Some(self.count)
        }
    }

    fn spawned_engine() -> Engine {
        let engine = Engine::new();
        let mut worker = Worker::new();
        worker.register_actor(PongActor { count: 0 }).expect("registration succeeds");
        engine.spawn(worker).expect("spawn succeeds");
        engine
    }

    #[test]
    fn send_and_call_before_start_fail_with_engine_not_running() {
        let engine = spawned_engine();
        assert!(matches!(engine.send(Ping), Err(RuntimeError::EngineNotRunning)));
        assert!(matches!(engine.call(Ping), Err(RuntimeError::EngineNotRunning)));
    }

    #[test]
    fn call_routes_to_the_single_worker_and_returns_its_reply() {
        let engine = Arc::new(spawned_engine());
        let runner = Arc::clone(&engine);
        let handle = std::thread::spawn(move || runner.start());

        // Poll until Running without a fixed sleep racing worker startup.
        std::thread::sleep(Duration::from_millis(20));

        let reply = engine.call(Ping).expect("call succeeds");
        assert_eq!(reply, Some(1));

        engine.stop().expect("stop succeeds");
        handle.join().expect("start thread does not panic").expect("engine terminates cleanly");
    }

    #[test]
    fn spawn_after_start_is_rejected() {
        let engine = Arc::new(spawned_engine());
        let runner = Arc::clone(&engine);
        let handle = std::thread::spawn(move || runner.start());
        std::thread::sleep(Duration::from_millis(20));

        let err = engine.spawn(Worker::new()).expect_err("spawn after start should fail");
        assert!(matches!(err, RuntimeError::EngineNotRunning));

        engine.stop().expect("stop succeeds");
        handle.join().expect("start thread does not panic").expect("engine terminates cleanly");
    }

    #[test]
    fn actor_registered_events_carry_a_distinct_actor_id_per_instance() {
        use crate::monitoring::{MonitoringConfig, RuntimeEventKind};

        let engine = Engine::with_config(
            EngineConfig::default(),
            MonitorChoice::InMemory(MonitoringConfig::default()),
        );

        let mut worker = Worker::new();
        worker.register_actor(PongActor { count: 0 }).expect("registration succeeds");
        engine.spawn(worker).expect("spawn succeeds");

        let snapshot = engine.shared.monitor().snapshot();
        let actor_ids: Vec<_> = snapshot
            .recent_events
            .iter()
            .filter_map(|event| match event.kind {
                RuntimeEventKind::ActorRegistered { actor_id, .. } => Some(actor_id),
                _ => None,
            })
            .collect();
        assert_eq!(actor_ids.len(), 1);
    }

    #[test]
    fn worker_default_capacity_can_track_the_engines_configuration() {
        let (config, monitor) = EngineConfig::builder()
            .with_mailbox_capacity(200)
            .build()
            .expect("valid configuration");
        let engine = Engine::with_config(config, monitor);

        let mut worker = Worker::with_default_capacity(engine.config().default_mailbox_capacity());
        worker.register_actor(PongActor { count: 0 }).expect("registration succeeds");
        engine.spawn(worker).expect("spawn succeeds");
    }

    #[test]
    fn stop_is_idempotent() {
        let engine = spawned_engine();
        engine.stop().expect("first stop succeeds");
        engine.stop().expect("second stop is a no-op");
    }

    #[test]
    fn unregistered_message_type_fails_with_actor_not_found() {
        #[derive(Debug, Clone)]
        struct Unregistered;
        impl Message for Unregistered {
            const TYPE_KEY: &'static str = "test.engine.unregistered";
            type Reply = ();
        }

        let engine = Arc::new(spawned_engine());
        let runner = Arc::clone(&engine);
        let handle = std::thread::spawn(move || runner.start());
        std::thread::sleep(Duration::from_millis(20));

        let err = engine.send(Unregistered).expect_err("no worker hosts this type");
        assert!(matches!(err, RuntimeError::ActorNotFound { .. }));

        engine.stop().expect("stop succeeds");
        handle.join().expect("start thread does not panic").expect("engine terminates cleanly");
    }
}
