//! Per-actor worker loop: the async equivalent of `spec.md`'s "one thread
//! per actor" (`SPEC_FULL.md` §5), one `tokio::task` over an unbounded
//! `tokio::sync::mpsc` channel. Dequeue blocks the task while the mailbox
//! is empty; dispatch is strictly sequential within an actor, guaranteeing
//! per-sender FIFO and that `Shutdown` is always the last envelope handled.

// Layer 1: Standard library
// (none)

// Layer 2: Third-party
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

// Layer 3: Internal
use crate::actor::{Actor, ActorContext, DispatchResult};
use crate::envelope::{Envelope, Origin};
use crate::message::{Message, Shutdown, Start};
use crate::reject;

/// A mailbox's receiving half, bounded or unbounded depending on
/// `RuntimeConfig::mailbox_bound` (`spec.md` §4.1).
pub(crate) enum MailboxRx {
    Unbounded(mpsc::UnboundedReceiver<Envelope>),
    Bounded(mpsc::Receiver<Envelope>),
}

impl MailboxRx {
    async fn recv(&mut self) -> Option<Envelope> {
        match self {
            MailboxRx::Unbounded(receiver) => receiver.recv().await,
            MailboxRx::Bounded(receiver) => receiver.recv().await,
        }
    }
}

/// Spawn the worker task owning `actor`'s mailbox. Terminates once a
/// `Shutdown` envelope has been dispatched (`spec.md` §4.1 state machine:
/// `Registered -> Running -> Draining -> Stopped`, all irreversible).
pub(crate) fn spawn_worker(
    name: String,
    mut actor: Box<dyn Actor>,
    mut receiver: MailboxRx,
    mut ctx: ActorContext,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(envelope) = receiver.recv().await {
            let message_type = envelope.message_type();
            let is_lifecycle = message_type == Start::MESSAGE_TYPE || message_type == Shutdown::MESSAGE_TYPE;
            let is_shutdown = message_type == Shutdown::MESSAGE_TYPE;
            let origin = envelope.origin;
            let message_type = message_type.to_string();

            match actor.dispatch(envelope, &mut ctx).await {
                DispatchResult::Handled => {}
                DispatchResult::NoHandler(envelope) => {
                    if is_lifecycle {
                        // Start/Shutdown handlers are optional; absence is
                        // not an error (spec.md §4.1 applies its no-handler
                        // policy only to user message types).
                        tracing::trace!(
                            actor = %name,
                            actor_id = %ctx.id(),
                            message_type = %message_type,
                            "no handler for lifecycle message; continuing"
                        );
                    } else {
                        match origin {
                            Origin::Local => {
                                tracing::debug!(
                                    actor = %name,
                                    actor_id = %ctx.id(),
                                    message_type = %message_type,
                                    "dropping message: no handler"
                                );
                            }
                            Origin::Remote => {
                                let reason = format!("No handler for {message_type}");
                                reject::route(envelope.sender.as_ref(), message_type.clone(), reason, name.clone())
                                    .await;
                            }
                        }
                    }
                }
            }

            if is_shutdown {
                break;
            }
        }
    })
}
