//! The primitive a worker's event loop blocks on, and that any thread can
//! use to wake it: a condvar-backed signal, standing in for whatever
//! platform facility (eventfd, kqueue user event, I/O completion port) a
//! given environment would otherwise reach for.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use parking_lot::{Condvar, Mutex};

// Layer 3: Internal module imports
// (none)

/// One per worker. Cloned into every mailbox the worker hosts so that any
/// producer thread can signal the worker after a successful push.
#[derive(Debug)]
pub struct WakeHandle {
    signalled: Mutex<bool>,
    condvar: Condvar,
}

impl WakeHandle {
    /// Construct an unsignalled wake handle.
    pub fn new() -> Self {
        Self {
            signalled: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    /// Signal the worker. Idempotent: multiple wakes before the worker
    /// drains coalesce into a single wakeup, since the worker drains every
    /// hosted actor's mailbox to empty on each wake rather than one message
    /// per wake.
    pub fn wake(&self) {
        let mut signalled = self.signalled.lock();
        *signalled = true;
        self.condvar.notify_one();
    }

    /// Block the calling (worker) thread until `wake` has been called at
    /// least once since the last `wait`/`wait_timeout`, or until `timeout`
    /// elapses. Returns `true` if woken by a signal, `false` on timeout --
    /// the timeout exists purely so the event loop can periodically check
    /// for a shutdown request without an unbounded block.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut signalled = self.signalled.lock();
        if !*signalled {
            let result = self.condvar.wait_for(&mut signalled, timeout);
            if result.timed_out() && !*signalled {
                return false;
            }
        }
        *signalled = false;
        true
    }
}

impl Default for WakeHandle {
    fn default() -> Self {
        Self::new()
    }
}
