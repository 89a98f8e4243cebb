//! The bounded, per-actor FIFO mailbox.

mod bounded;
mod error;

pub use bounded::{BoundedMailbox, DEFAULT_MAILBOX_CAPACITY, MIN_MAILBOX_CAPACITY};
pub use error::MailboxError;
