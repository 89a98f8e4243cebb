//! Bounded, single-reader/multi-writer FIFO mailbox for one actor instance.

// Layer 1: Standard library imports
use std::collections::VecDeque;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use parking_lot::Mutex;

// Layer 3: Internal module imports
use crate::mailbox::error::MailboxError;
use crate::message::{Envelope, Message};
use crate::worker::wake::WakeHandle;

/// The reference implementation's floor: a mailbox capacity below this is
/// rejected at construction rather than silently accepted.
pub const MIN_MAILBOX_CAPACITY: usize = 64;

/// The reference implementation's default capacity.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 100;

/// Bounded FIFO queue of envelopes for a single actor of message type `M`.
///
/// Any number of producer threads may call [`push`](Self::push) concurrently;
/// exactly one consumer -- the owning actor's `drain`, called only from its
/// worker thread -- calls [`pop`](Self::pop). Enqueue order equals dequeue
/// order for any single producer (§5 ordering guarantee); no ordering is
/// promised across producers.
pub struct BoundedMailbox<M: Message> {
    queue: Mutex<VecDeque<Envelope<M>>>,
    capacity: usize,
    wake: Arc<WakeHandle>,
}

impl<M: Message> BoundedMailbox<M> {
    /// Construct a mailbox with the given capacity (clamped up to
    /// [`MIN_MAILBOX_CAPACITY`]) that signals `wake` on every successful push.
    pub fn new(capacity: usize, wake: Arc<WakeHandle>) -> Self {
        let capacity = capacity.max(MIN_MAILBOX_CAPACITY);
        Self {
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            wake,
        }
    }

    /// This mailbox's configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of buffered envelopes.
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// True if no envelopes are buffered.
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Append `envelope` at the tail and signal the owning worker's wake
    /// handle. Fails with [`MailboxError::Full`] without enqueuing if the
    /// mailbox is already at capacity.
    pub fn push(&self, envelope: Envelope<M>) -> Result<(), MailboxError> {
        {
            let mut queue = self.queue.lock();
            if queue.len() >= self.capacity {
                return Err(MailboxError::Full {
                    capacity: self.capacity,
                });
            }
            queue.push_back(envelope);
        }
        self.wake.wake();
        Ok(())
    }

    /// Remove and return the envelope at the head, or `None` if empty.
    pub fn pop(&self) -> Option<Envelope<M>> {
        self.queue.lock().pop_front()
    }
}
