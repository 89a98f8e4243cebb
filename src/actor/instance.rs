//! Type-erased actor dispatch.
//!
//! A worker hosts actors of different concrete types in one `HashMap`, so it
//! needs something non-generic to hold. Per §9's "type-erased polymorphic
//! dispatch" note, this implements the reference's v-table-of-function-
//! pointers idea as a plain trait object: [`AnyActor`] is the tagged
//! interface (`type_key`, `drain`, `discard_pending`, `mailbox_any`), and
//! [`ActorInstance`] is the one concrete impl, closing over a specific
//! `Actor` type.

// Layer 1: Standard library imports
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use tracing::warn;

// Layer 3: Internal module imports
use crate::actor::context::ActorContext;
use crate::actor::traits::Actor;
use crate::mailbox::BoundedMailbox;
use crate::message::{Envelope, Message};
use crate::monitoring::{NullReplyReason, RuntimeEvent, RuntimeEventKind};
use crate::util::ActorId;
use crate::worker::wake::WakeHandle;

/// Non-generic handle a [`crate::worker::Worker`] holds for one registered
/// actor. Every method here is the type-erased counterpart of an
/// `ActorInstance<A>` method; downcasting happens only at the mailbox
/// boundary ([`mailbox_any`](Self::mailbox_any)), never in the dispatch path.
pub(crate) trait AnyActor: Send {
    /// The compile-time type-key of the message type this actor handles.
    fn type_key(&self) -> &'static str;

    /// This instance's randomly generated diagnostic id (§3's "Monitoring
    /// event" entity wants something more specific than a type-key to
    /// correlate registration/drain events against when a worker hosts more
    /// than one actor of unrelated types; never used for routing).
    fn actor_id(&self) -> ActorId;

    /// This actor's mailbox, type-erased so it can sit in a
    /// `HashMap<&'static str, Arc<dyn Any + Send + Sync>>` alongside
    /// mailboxes of unrelated message types. The engine downcasts it back
    /// to `Arc<BoundedMailbox<M>>` once it knows `M` from the caller's type
    /// parameter.
    fn mailbox_any(&self) -> Arc<dyn Any + Send + Sync>;

    /// Pop and dispatch buffered envelopes, invoking the handler for each.
    /// Never yields mid-envelope (§4.3). Checks `stop_requested` after each
    /// completed envelope and returns early if it is set, so a stop request
    /// lets the in-flight envelope finish but leaves the rest of the backlog
    /// for [`discard_pending`](Self::discard_pending) rather than running it
    /// to completion (§4.4).
    fn drain(&mut self, ctx: &ActorContext, stop_requested: &AtomicBool);

    /// Used only during worker shutdown: pop and drop every remaining
    /// envelope without invoking the handler, posting a null reply for any
    /// `Call` so its caller unblocks (§4.4 cancellation).
    fn discard_pending(&mut self, ctx: &ActorContext);
}

/// The live state of one registered actor: the user's handler value, and
/// the mailbox it drains from.
pub(crate) struct ActorInstance<A: Actor> {
    actor: A,
    mailbox: Arc<BoundedMailbox<A::Message>>,
    actor_id: ActorId,
}

impl<A: Actor> ActorInstance<A> {
    pub(crate) fn new(actor: A, capacity: usize, wake: Arc<WakeHandle>) -> Self {
        Self {
            actor,
            mailbox: Arc::new(BoundedMailbox::new(capacity, wake)),
            actor_id: ActorId::new(),
        }
    }
}

impl<A: Actor> AnyActor for ActorInstance<A> {
    fn type_key(&self) -> &'static str {
        A::Message::TYPE_KEY
    }

    fn actor_id(&self) -> ActorId {
        self.actor_id
    }

    fn mailbox_any(&self) -> Arc<dyn Any + Send + Sync> {
        Arc::clone(&self.mailbox) as Arc<dyn Any + Send + Sync>
    }

    fn drain(&mut self, ctx: &ActorContext, stop_requested: &AtomicBool) {
        while let Some(envelope) = self.mailbox.pop() {
            match envelope {
                Envelope::OneWay(message) => {
                    let _ = self.actor.handle(message, ctx);
                }
                Envelope::Call { message, reply } => {
                    let result = self.actor.handle(message, ctx);
                    if result.is_none() {
                        warn!(
                            type_key = A::Message::TYPE_KEY,
                            "handler returned no reply for a Call envelope; unblocking caller with a null reply"
                        );
                        if let Some(monitor) = ctx.monitor() {
                            monitor.record(RuntimeEvent::new(RuntimeEventKind::NullReplyPosted {
                                type_key: A::Message::TYPE_KEY,
                                worker: ctx.worker_id(),
                                reason: NullReplyReason::HandlerDeclined,
                            }));
                        }
                    }
                    // First send on a fresh channel always succeeds.
                    let _ = reply.send(result);
                }
            }
            if stop_requested.load(Ordering::Acquire) {
                break;
            }
        }
    }

    fn discard_pending(&mut self, ctx: &ActorContext) {
        while let Some(envelope) = self.mailbox.pop() {
            if let Envelope::Call { reply, .. } = envelope {
                warn!(
                    type_key = A::Message::TYPE_KEY,
                    "dropping queued Call envelope during shutdown; unblocking caller with a null reply"
                );
                if let Some(monitor) = ctx.monitor() {
                    monitor.record(RuntimeEvent::new(RuntimeEventKind::NullReplyPosted {
                        type_key: A::Message::TYPE_KEY,
                        worker: ctx.worker_id(),
                        reason: NullReplyReason::ShutdownFlush,
                    }));
                }
                let _ = reply.send(None);
            }
        }
    }
}
