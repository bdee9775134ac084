//! Reference: the opaque destination handle uniform across local and remote
//! actors.

// Layer 1: Standard library
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// Layer 2: Third-party
use tokio::sync::mpsc;

// Layer 3: Internal
use crate::envelope::{Envelope, Origin};
use crate::error::SendError;
use crate::message::Message;
use crate::registry::MessageRegistry;
use crate::transport::outbound::OutboundTransport;

/// Destination handle. Both variants satisfy the same asynchronous
/// send/reply contract; only [`Reference::ask`] is local-only
/// (`spec.md` §4.2).
#[derive(Clone)]
pub enum Reference {
    Local(LocalRef),
    Remote(RemoteRef),
}

impl Reference {
    /// The destination actor's registered name.
    pub fn name(&self) -> &str {
        match self {
            Reference::Local(local) => local.name(),
            Reference::Remote(remote) => remote.actor_name(),
        }
    }

    /// Asynchronous send. For a local reference this enqueues into the
    /// target mailbox and returns immediately; for a remote reference it
    /// delegates to the outbound transport.
    pub async fn send<M: Message>(&self, payload: M, sender: Option<Reference>) -> Result<(), SendError> {
        match self {
            Reference::Local(local) => local.send(payload, sender),
            Reference::Remote(remote) => remote.send(payload, sender).await,
        }
    }

    /// Synchronous, RPC-style send. Valid only on [`Reference::Local`]; a
    /// remote reference always fails with
    /// [`SendError::UnsupportedRemoteSynchronous`].
    pub async fn ask<M: Message, R: Message>(&self, payload: M) -> Result<R, SendError> {
        match self {
            Reference::Local(local) => local.ask(payload).await,
            Reference::Remote(_) => Err(SendError::UnsupportedRemoteSynchronous),
        }
    }
}

/// A mailbox's sending half, bounded or unbounded depending on
/// `RuntimeConfig::mailbox_bound` (`spec.md` §4.1: "implementations may
/// choose bounds but must then define backpressure"). Bounded sends use
/// `try_send` — reject-on-full rather than blocking the caller.
#[derive(Clone)]
pub(crate) enum MailboxTx {
    Unbounded(mpsc::UnboundedSender<Envelope>),
    Bounded(mpsc::Sender<Envelope>),
}

/// Local variant: carries the target mailbox's sending half and the actor's
/// registered name.
#[derive(Clone)]
pub struct LocalRef {
    pub(crate) name: String,
    pub(crate) sender: MailboxTx,
    /// Flipped by `Manager::end()` once every worker has been joined; gates
    /// further sends with `SendError::RuntimeStopped` instead of the
    /// ordinary closed-channel error (`spec.md` §5/§7).
    pub(crate) stopped: Arc<AtomicBool>,
}

impl LocalRef {
    pub(crate) fn new(name: String, sender: MailboxTx, stopped: Arc<AtomicBool>) -> Self {
        Self { name, sender, stopped }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn send<M: Message>(&self, payload: M, sender: Option<Reference>) -> Result<(), SendError> {
        let envelope = Envelope::new(Box::new(payload), sender, Origin::Local);
        self.enqueue(envelope)
    }

    pub async fn ask<M: Message, R: Message>(&self, payload: M) -> Result<R, SendError> {
        let (envelope, rx) = Envelope::new_ask(Box::new(payload));
        self.enqueue(envelope)?;
        let boxed = rx.await.map_err(|_| SendError::ReplyDropped)?;
        let any = boxed.into_any();
        any.downcast::<R>()
            .map(|boxed| *boxed)
            .map_err(|_| SendError::ReplyTypeMismatch)
    }

    /// Enqueue an already-built envelope, bypassing the generic `M`
    /// parameter. Used by the inbound transport to deliver decoded,
    /// type-erased payloads (`spec.md` §4.7).
    pub(crate) fn enqueue(&self, envelope: Envelope) -> Result<(), SendError> {
        if self.stopped.load(Ordering::Acquire) {
            return Err(SendError::RuntimeStopped);
        }

        match &self.sender {
            MailboxTx::Unbounded(sender) => sender
                .send(envelope)
                .map_err(|_| SendError::MailboxClosed(Some(self.name.clone()))),
            MailboxTx::Bounded(sender) => sender.try_send(envelope).map_err(|err| match err {
                mpsc::error::TrySendError::Full(_) => SendError::MailboxFull(Some(self.name.clone())),
                mpsc::error::TrySendError::Closed(_) => SendError::MailboxClosed(Some(self.name.clone())),
            }),
        }
    }
}

/// Remote variant: carries the target endpoint, actor name, a handle to the
/// outbound transport, and the sender-side message registry used to gate
/// sends of unregistered types (`spec.md` §4.4).
#[derive(Clone)]
pub struct RemoteRef {
    pub(crate) actor_name: String,
    pub(crate) endpoint: String,
    pub(crate) outbound: Arc<OutboundTransport>,
    pub(crate) registry: MessageRegistry,
}

impl RemoteRef {
    pub fn new(
        actor_name: impl Into<String>,
        endpoint: impl Into<String>,
        outbound: Arc<OutboundTransport>,
        registry: MessageRegistry,
    ) -> Self {
        Self {
            actor_name: actor_name.into(),
            endpoint: endpoint.into(),
            outbound,
            registry,
        }
    }

    pub fn actor_name(&self) -> &str {
        &self.actor_name
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn send<M: Message>(&self, payload: M, sender: Option<Reference>) -> Result<(), SendError> {
        let (sender_actor, sender_endpoint) = stamp_sender(&sender, &self.outbound);
        self.outbound
            .send_to(&self.endpoint, &self.actor_name, &payload, &sender_actor, &sender_endpoint, &self.registry)
            .await
    }
}

/// When the caller's own reference doesn't carry an endpoint (it's local),
/// stamp the outbound transport's bound `local_endpoint` instead
/// (`spec.md` §4.6).
fn stamp_sender(sender: &Option<Reference>, outbound: &OutboundTransport) -> (String, String) {
    match sender {
        Some(Reference::Local(local)) => (
            local.name.clone(),
            outbound.local_endpoint().unwrap_or_default().to_string(),
        ),
        Some(Reference::Remote(remote)) => (remote.actor_name.clone(), remote.endpoint.clone()),
        None => (String::new(), String::new()),
    }
}
