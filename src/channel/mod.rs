//! The one-shot reply channel that backs synchronous `call` request/reply.

mod oneshot;

pub use oneshot::ReplyChannel;
