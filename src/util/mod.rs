//! Small shared utilities: identifiers and duration serde helpers.

mod ids;
pub(crate) mod serde_helpers;

pub use ids::{ActorId, WorkerId};
pub(crate) use ids::WorkerIdAllocator;
