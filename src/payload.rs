//! Type-erased message payloads.
//!
//! An [`Envelope`](crate::envelope::Envelope) carries `Box<dyn Payload>` so a
//! mailbox can hold messages of any registered type. `Payload` is a blanket
//! impl over every [`Message`]; actor dispatch downcasts back to the
//! concrete type by trying each handled type in turn (see
//! `crate::actor::try_dispatch`), the non-reflective equivalent of the
//! narrative spec's "handler keyed by type-name".

// Layer 1: Standard library
use std::any::Any;
use std::fmt::Debug;

// Layer 2: Third-party
use serde_json::{Map, Value};

// Layer 3: Internal
use crate::error::EncodeError;
use crate::message::Message;

/// Object-safe, downcastable message payload.
///
/// `Payload: Send + Sync` (both supertraits) so `Box<dyn Payload>` is itself
/// `Send + Sync`, which is what lets an [`Envelope`](crate::envelope::Envelope)
/// cross an actor's mailbox channel.
pub trait Payload: Any + Debug + Send + Sync {
    /// The wire type-name of the concrete message.
    fn message_type(&self) -> &'static str;

    /// Borrow as `dyn Any` for a type-check prior to downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Consume into an owned `dyn Any + Send` for downcasting by value.
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;

    /// Encode the payload's exposed fields as a flat JSON object, per
    /// `spec.md` §4.4's wire schema.
    fn to_wire_fields(&self) -> Result<Map<String, Value>, EncodeError>;
}

impl<M: Message> Payload for M {
    fn message_type(&self) -> &'static str {
        M::MESSAGE_TYPE
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }

    fn to_wire_fields(&self) -> Result<Map<String, Value>, EncodeError> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Err(EncodeError::NotAnObject),
        }
    }
}
