// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::actor::context::ActorContext;
use crate::message::Message;

/// A handler for exactly one [`Message`] type, owning whatever per-actor
/// state it needs as ordinary struct fields.
///
/// There is no separate opaque "user state" slot here (contrast the
/// reference implementation's `state<S>()`/`set_state()`/`reset_state()`
/// triad): the actor value itself *is* the state, constructed once at
/// registration and mutated in place through `&mut self` on every dispatch.
/// See `DESIGN.md` for why this redesign was taken over the opaque-cell
/// approach.
///
/// # Example
/// ```rust
/// use rotor_rt::actor::{Actor, ActorContext};
/// use rotor_rt::message::Message;
///
/// #[derive(Debug, Clone)]
/// struct Increment;
///
/// impl Message for Increment {
///     const TYPE_KEY: &'static str = "counter.increment";
///     type Reply = u64;
/// }
///
/// struct Counter {
///     count: u64,
/// }
///
/// impl Actor for Counter {
///     type Message = Increment;
///
///     fn handle(&mut self, _msg: Increment, _ctx: &ActorContext) -> Option<u64> {
///         self.count += 1;
///         Some(self.count)
///     }
/// }
/// ```
pub trait Actor: Send + 'static {
    /// The message type this actor handles. One actor instance handles
    /// exactly one message type; co-locate several `(Message, Actor)` pairs
    /// on one worker to host more than one type per thread.
    type Message: Message;

    /// Process one envelope's payload.
    ///
    /// Returns `Some(reply)` to answer a `Call`; returns `None` for
    /// one-way messages that produce nothing, or -- for a `Call` -- to
    /// (incorrectly) decline to answer, which the dispatch loop treats as a
    /// logged programming error and unblocks the caller with `NoResponse`
    /// rather than leaving it parked.
    fn handle(
        &mut self,
        message: Self::Message,
        ctx: &ActorContext,
    ) -> Option<<Self::Message as Message>::Reply>;
}
