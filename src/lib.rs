//! A synchronous, thread-per-worker actor runtime core.
//!
//! # Shape
//!
//! A [`Worker`] hosts one [`actor::Actor`] per [`message::Message`] type,
//! each behind its own bounded FIFO mailbox. An [`engine::Engine`] owns a
//! fleet of workers, each running on its own dedicated OS thread, and
//! exposes `send`/`call`/`broadcast` with round-robin load balancing across
//! every worker hosting a given message type. Handlers reach back into the
//! engine through an [`actor::ActorContext`] to send, call, or broadcast
//! re-entrantly.
//!
//! There is no async runtime underneath this crate: a worker's event loop is
//! a plain condvar wait, and `call` blocks the calling thread on a one-shot
//! reply channel rather than yielding to an executor.
//!
//! ```rust
//! use rotor_rt::engine::Engine;
//! use rotor_rt::worker::Worker;
//! use rotor_rt::{Actor, ActorContext, Message};
//!
//! #[derive(Debug, Clone)]
//! struct Increment;
//!
//! impl Message for Increment {
//!     const TYPE_KEY: &'static str = "doctest.counter.increment";
//!     type Reply = u64;
//! }
//!
//! struct Counter {
//!     count: u64,
//! }
//!
//! impl Actor for Counter {
//!     type Message = Increment;
//!
//!     fn handle(&mut self, _msg: Increment, _ctx: &ActorContext) -> Option<u64> {
//!         self.count += 1;
//!         Some(self.count)
//!     }
//! }
//!
//! let engine = Engine::new();
//! let mut worker = Worker::new();
//! worker.register_actor(Counter { count: 0 }).expect("registration succeeds");
//! engine.spawn(worker).expect("spawn succeeds");
//!
//! // `engine.start()` blocks the calling thread until `engine.stop()` is
//! // called from elsewhere (typically another thread, or a signal handler);
//! // a real program would run one of those on its own thread.
//! engine.stop().expect("stop succeeds");
//! ```

mod channel;
mod mailbox;
mod util;

pub mod actor;
pub mod engine;
pub mod message;
pub mod monitoring;
pub mod prelude;
pub mod worker;

pub use actor::{Actor, ActorContext};
pub use engine::{ConfigError, Engine, EngineConfig, EngineConfigBuilder, MonitorChoice, RuntimeError};
pub use message::{Envelope, Message};
pub use util::{ActorId, WorkerId};
pub use worker::Worker;
