// Layer 1: Standard library imports
use std::fmt::{self, Display};
use std::sync::atomic::{AtomicU32, Ordering};

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Layer 3: Internal module imports
// (none)

/// Dense, zero-based identifier assigned to a worker at `Engine::spawn` time.
///
/// Worker ids double as the index into the engine's worker array, so they are
/// assigned in spawn order starting at zero rather than drawn from a UUID
/// space like [`ActorId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorkerId(u32);

impl WorkerId {
    /// Construct a worker id from its raw index. Only the engine should call this.
    pub(crate) fn from_index(index: u32) -> Self {
        Self(index)
    }

    /// The raw zero-based index, usable to index into the engine's worker array.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker-{}", self.0)
    }
}

/// Monotonic allocator for [`WorkerId`] values, held by the engine.
#[derive(Debug, Default)]
pub(crate) struct WorkerIdAllocator {
    next: AtomicU32,
}

impl WorkerIdAllocator {
    pub(crate) fn new() -> Self {
        Self {
            next: AtomicU32::new(0),
        }
    }

    pub(crate) fn allocate(&self) -> WorkerId {
        WorkerId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

/// Unique identifier for an actor instance, used only for monitoring and
/// diagnostics (routing itself is keyed by [`crate::message::Message::TYPE_KEY`]
/// and [`WorkerId`], never by `ActorId`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(Uuid);

impl ActorId {
    /// Generate a new random actor id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
