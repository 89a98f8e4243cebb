//! The envelope a mailbox actually stores: a message plus, for calls, the
//! reply channel the caller is blocked on.

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::channel::ReplyChannel;
use crate::message::Message;

/// One unit of mailbox traffic for message type `M`.
///
/// `Call`'s reply channel is `Arc`-owned rather than a borrowed reference:
/// the envelope crosses into a type-erased `Box<dyn Any + Send>` on its way
/// into the mailbox (see [`crate::actor::instance`]), which requires
/// `'static`, so the caller's stack frame cannot be borrowed directly.
/// The caller retains its own `Arc` clone and blocks on it after handing the
/// envelope to the mailbox.
///
/// The reply channel transports `Option<M::Reply>` rather than `M::Reply`
/// directly: `None` is the sentinel "null" payload §4.3 requires the worker
/// to post when a handler declines to answer a `Call`, or when the worker
/// flushes an in-flight envelope during shutdown (§4.4). `Engine::call`
/// turns that sentinel into `RuntimeError::NoResponse` at the API boundary.
#[derive(Debug)]
pub enum Envelope<M: Message> {
    /// Fire-and-forget delivery; no reply is expected or possible.
    OneWay(M),
    /// Request/reply delivery; the handler's return value is posted to
    /// `reply` before `drain` moves on to the next envelope.
    Call {
        /// The message payload.
        message: M,
        /// Shared handle to the one-shot reply slot the caller awaits.
        reply: Arc<ReplyChannel<Option<M::Reply>>>,
    },
}

impl<M: Message> Envelope<M> {
    /// Build a one-way envelope.
    pub fn one_way(message: M) -> Self {
        Self::OneWay(message)
    }

    /// Build a call envelope paired with a fresh reply channel, returning
    /// both the envelope and the caller's retained handle to the channel.
    pub fn call(message: M) -> (Self, Arc<ReplyChannel<Option<M::Reply>>>) {
        let reply = Arc::new(ReplyChannel::new());
        (
            Self::Call {
                message,
                reply: Arc::clone(&reply),
            },
            reply,
        )
    }

    /// Borrow the message payload regardless of envelope kind.
    pub fn message(&self) -> &M {
        match self {
            Self::OneWay(message) => message,
            Self::Call { message, .. } => message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Echo(u32);

    impl Message for Echo {
        const TYPE_KEY: &'static str = "test.echo";
        type Reply = u32;
    }

    #[test]
    fn one_way_carries_message() {
        let envelope = Envelope::one_way(Echo(7));
        assert_eq!(envelope.message().0, 7);
    }

    #[test]
    fn call_pairs_envelope_with_shared_reply_handle() {
        let (envelope, reply) = Envelope::call(Echo(3));
        assert_eq!(envelope.message().0, 3);
        if let Envelope::Call { reply: inner, .. } = &envelope {
            assert!(Arc::ptr_eq(inner, &reply));
        } else {
            unreachable!("constructed a Call envelope");
        }
    }
}
