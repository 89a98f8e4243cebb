//! Observability: let an operator see what the runtime did without
//! instrumenting every handler (§4.7). Purely additive -- a monitor never
//! changes a routing or backpressure decision.

mod in_memory;
mod noop;
mod traits;
mod types;

pub use in_memory::InMemoryMonitor;
pub use noop::NoopMonitor;
pub use traits::{EventSeverity, Monitor, MonitoringEvent};
pub use types::{
    MonitoringConfig, MonitoringSnapshot, NullReplyReason, RoutingKind, RuntimeEvent,
    RuntimeEventKind,
};
