//! Actor trait, per-(actor, message-type) `Handler` trait, and the dispatch
//! helper that stands in for the narrative spec's reflective
//! `on_<lowercase(type)>` method lookup (`spec.md` §9).

// Layer 1: Standard library
// (none)

// Layer 2: Third-party
use async_trait::async_trait;

// Layer 3: Internal
use crate::envelope::{Envelope, EnvelopeMeta};
use crate::manager::ManagerHandle;
use crate::message::Message;
use crate::reference::Reference;
use crate::util::ActorId;

/// Runtime-injected context passed to every handler invocation: the
/// actor's own reference and a back-handle to the manager, the idiomatic
/// equivalent of `spec.md`'s "runtime-injected fields" on the actor object
/// (see `DESIGN.md`).
pub struct ActorContext {
    name: String,
    id: ActorId,
    self_ref: Reference,
    manager: ManagerHandle,
}

impl ActorContext {
    pub(crate) fn new(name: String, self_ref: Reference, manager: ManagerHandle) -> Self {
        Self {
            name,
            id: ActorId::new(),
            self_ref,
            manager,
        }
    }

    /// This actor's registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Diagnostic-only identifier (`tracing` fields); never part of wire
    /// identity (`spec.md` §4.4 uses the plain name string).
    pub fn id(&self) -> ActorId {
        self.id
    }

    /// This actor's own reference, usable as the `sender` of outgoing sends.
    pub fn self_ref(&self) -> &Reference {
        &self.self_ref
    }

    /// Back-handle to the manager (registry lookup, termination).
    pub fn manager(&self) -> &ManagerHandle {
        &self.manager
    }
}

/// Outcome of an actor's `dispatch`.
pub enum DispatchResult {
    /// A handler accepted and processed the envelope.
    Handled,
    /// No handler matched; the envelope is returned so the caller (the
    /// mailbox worker) can apply the no-handler policy for its origin
    /// (`spec.md` §4.1: drop locally, `Reject` remotely).
    NoHandler(Envelope),
}

/// Object-safe actor contract. The only method the mailbox worker calls
/// directly; everything else (which message types an actor handles) is
/// internal to each actor's own `dispatch` implementation.
#[async_trait]
pub trait Actor: Send + 'static {
    async fn dispatch(&mut self, envelope: Envelope, ctx: &mut ActorContext) -> DispatchResult;
}

/// Per-(actor, message-type) handler. Not object-safe (generic over `M`
/// with an associated `Error`), so it is never stored behind `dyn Actor`;
/// concrete actors implement it once per message type they handle and
/// chain [`try_dispatch`] calls inside their `dispatch` body.
#[async_trait]
pub trait Handler<M: Message>: Actor {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn handle(&mut self, message: M, meta: EnvelopeMeta, ctx: &mut ActorContext) -> Result<(), Self::Error>;
}

/// Downcast-and-call helper: if `envelope` carries an `M`, invoke
/// `A::handle` and report `Handled`; otherwise hand the envelope back
/// unchanged as `NoHandler` so the actor's `dispatch` can try the next
/// type it handles.
///
/// A handler error is logged and the actor continues — `spec.md` §4.1:
/// "An unrecovered error during handler dispatch must not terminate the
/// worker unless it is the Shutdown handler itself", and this runtime has
/// no supervision tree to escalate to regardless.
pub async fn try_dispatch<A, M>(actor: &mut A, envelope: Envelope, ctx: &mut ActorContext) -> DispatchResult
where
    A: Handler<M>,
    M: Message,
{
    match envelope.try_downcast::<M>() {
        Ok((msg, meta)) => {
            if let Err(err) = actor.handle(msg, meta, ctx).await {
                tracing::error!(
                    actor = ctx.name(),
                    message_type = M::MESSAGE_TYPE,
                    error = %err,
                    "handler returned an error; actor continues"
                );
            }
            DispatchResult::Handled
        }
        Err(envelope) => DispatchResult::NoHandler(envelope),
    }
}

/// `Actor.reply(envelope, payload)` convenience: deposit into the
/// synchronous reply sink if the envelope carried one, else send back to
/// `sender` with `self_ref` as its own sender, else drop with a
/// diagnostic (`spec.md` §4.2).
pub async fn reply<M: Message>(meta: &mut EnvelopeMeta, ctx: &ActorContext, response: M) {
    if let Some(sink) = meta.take_reply_sink() {
        if sink.fill(Box::new(response)).is_err() {
            tracing::debug!(actor = ctx.name(), "reply sink dropped before value delivered");
        }
        return;
    }

    if let Some(sender) = meta.sender.clone() {
        if let Err(err) = sender.send(response, Some(ctx.self_ref().clone())).await {
            tracing::debug!(actor = ctx.name(), error = %err, "reply send failed");
        }
        return;
    }

    tracing::debug!(actor = ctx.name(), "reply() called with no sender or reply sink; dropping");
}
