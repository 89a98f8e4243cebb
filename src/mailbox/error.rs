//! Mailbox-local error type.

use thiserror::Error;

/// Errors a mailbox push can produce.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailboxError {
    /// The mailbox was at capacity when `push` was attempted.
    #[error("mailbox full (capacity {capacity})")]
    Full {
        /// The mailbox's configured capacity.
        capacity: usize,
    },
    /// The owning worker's wake handle could not be signalled after the
    /// envelope was enqueued. Treated as fatal for that worker by the caller.
    #[error("failed to signal worker wake handle")]
    WakeFailed,
}
