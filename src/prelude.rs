//! Convenience re-exports for the common case: defining message types,
//! implementing actors, and driving an engine.
//!
//! ```rust
//! use rotor_rt::prelude::*;
//! ```

pub use crate::actor::{Actor, ActorContext};
pub use crate::engine::{Engine, EngineConfig, RuntimeError};
pub use crate::message::{Envelope, Message};
pub use crate::monitoring::{EventSeverity, InMemoryMonitor, Monitor, NoopMonitor};
pub use crate::worker::Worker;
pub use crate::{ActorId, WorkerId};
