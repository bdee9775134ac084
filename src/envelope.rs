//! Envelope: the immutable record pairing a payload with sender metadata and
//! an optional synchronous reply sink.

// Layer 1: Standard library
use std::fmt;

// Layer 2: Third-party
use chrono::{DateTime, Utc};
use tokio::sync::oneshot;

// Layer 3: Internal
use crate::message::Message;
use crate::payload::Payload;
use crate::reference::Reference;

/// Where an envelope entered the runtime. Recorded at enqueue time by
/// whichever component built the envelope, and used to decide the
/// no-handler policy (drop locally, `Reject` remotely — `spec.md` §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Local,
    Remote,
}

/// A single-slot, fill-at-most-once synchronous reply channel.
///
/// Wraps a [`oneshot::Sender`]; the underlying channel already enforces
/// "filled at most once" for us — `send` consumes the sender, so a second
/// attempt simply cannot compile, and `Envelope` only ever hands out the
/// sink wrapped in an `Option` that is taken exactly once.
pub struct ReplySink(oneshot::Sender<Box<dyn Payload>>);

impl ReplySink {
    pub(crate) fn new() -> (Self, oneshot::Receiver<Box<dyn Payload>>) {
        let (tx, rx) = oneshot::channel();
        (Self(tx), rx)
    }

    /// Deposit the reply. Returns the payload back on error (receiver gone).
    pub fn fill(self, payload: Box<dyn Payload>) -> Result<(), Box<dyn Payload>> {
        self.0.send(payload)
    }
}

impl fmt::Debug for ReplySink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ReplySink(..)")
    }
}

/// Message payload plus sender metadata plus an optional synchronous reply
/// sink. Created by [`Reference`] send operations, consumed by exactly one
/// handler invocation.
pub struct Envelope {
    pub(crate) payload: Box<dyn Payload>,
    pub sender: Option<Reference>,
    pub(crate) reply_sink: Option<ReplySink>,
    pub origin: Origin,
    /// When this envelope was constructed. Diagnostic only — no TTL or
    /// expiry semantics are defined by `spec.md`.
    pub timestamp: DateTime<Utc>,
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("message_type", &self.payload.message_type())
            .field("sender", &self.sender.as_ref().map(Reference::name))
            .field("has_reply_sink", &self.reply_sink.is_some())
            .field("origin", &self.origin)
            .finish()
    }
}

impl Envelope {
    pub(crate) fn new(payload: Box<dyn Payload>, sender: Option<Reference>, origin: Origin) -> Self {
        Self {
            payload,
            sender,
            reply_sink: None,
            origin,
            timestamp: Utc::now(),
        }
    }

    pub(crate) fn new_ask(payload: Box<dyn Payload>) -> (Self, oneshot::Receiver<Box<dyn Payload>>) {
        let (sink, rx) = ReplySink::new();
        let envelope = Self {
            payload,
            sender: None,
            reply_sink: Some(sink),
            origin: Origin::Local,
            timestamp: Utc::now(),
        };
        (envelope, rx)
    }

    /// Wire type-name of the carried payload.
    pub fn message_type(&self) -> &'static str {
        self.payload.message_type()
    }

    /// Attempt to downcast into a concrete `M`, consuming `self` on success
    /// and handing it back unchanged on a type mismatch so the caller can
    /// try the next handled type (the "tagged-variant switch" design note
    /// in `spec.md` §9).
    pub(crate) fn try_downcast<M: Message>(self) -> Result<(M, EnvelopeMeta), Envelope> {
        if self.payload.as_any().is::<M>() {
            let Envelope {
                payload,
                sender,
                reply_sink,
                origin,
                timestamp,
            } = self;
            let any = payload.into_any();
            let msg = *any.downcast::<M>().expect("type checked immediately above");
            Ok((
                msg,
                EnvelopeMeta {
                    sender,
                    reply_sink,
                    origin,
                    timestamp,
                },
            ))
        } else {
            Err(self)
        }
    }
}

/// Sender metadata handed to a [`crate::actor::Handler::handle`] invocation
/// alongside the downcast payload.
pub struct EnvelopeMeta {
    pub sender: Option<Reference>,
    pub timestamp: DateTime<Utc>,
    pub(crate) reply_sink: Option<ReplySink>,
    pub origin: Origin,
}

impl EnvelopeMeta {
    pub(crate) fn take_reply_sink(&mut self) -> Option<ReplySink> {
        self.reply_sink.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Shutdown, Start};

    #[test]
    fn try_downcast_matching_type_succeeds() {
        let envelope = Envelope::new(Box::new(Start), None, Origin::Local);
        let (msg, meta) = envelope.try_downcast::<Start>().expect("Start matches");
        let _: Start = msg;
        assert!(meta.sender.is_none());
    }

    #[test]
    fn try_downcast_mismatched_type_returns_envelope_unchanged() {
        let envelope = Envelope::new(Box::new(Start), None, Origin::Remote);
        let envelope = envelope.try_downcast::<Shutdown>().expect_err("Start != Shutdown");
        assert_eq!(envelope.message_type(), "Start");
        assert_eq!(envelope.origin, Origin::Remote);
    }
}
