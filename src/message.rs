//! Core `Message` trait and the runtime's built-in wire types.
//!
//! A type becomes a message by implementing [`Message`]: it names itself with
//! a wire type-name (`MESSAGE_TYPE`) and is `Serialize`/`DeserializeOwned` so
//! it can cross the wire. `Reference::send` is one generic operation usable
//! against a local or a remote destination, so every message pays the
//! serde cost uniformly even when it is only ever sent locally.

// Layer 1: Standard library
use std::fmt::Debug;

// Layer 2: Third-party
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A message payload that can be dispatched by an actor and, if registered,
/// carried over the wire.
///
/// `MESSAGE_TYPE` is the wire type-name used for handler lookup
/// (`on_<lowercase(type)>` in the narrative spec this runtime implements;
/// here, a [`crate::actor::Handler<M>`] impl keyed by `M`) and for the
/// `message_type` field of an encoded [`crate::transport::wire::WireFrame`].
pub trait Message: Send + Sync + Clone + Debug + Serialize + DeserializeOwned + 'static {
    /// Wire type-name. Case-sensitive; must match exactly on both peers.
    const MESSAGE_TYPE: &'static str;
}

/// Synthetic message the manager enqueues once, at the head of every
/// mailbox, before any user traffic (`Manager::init`).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Start;

impl Message for Start {
    const MESSAGE_TYPE: &'static str = "Start";
}

/// Synthetic message the manager enqueues once, last, in every mailbox
/// (`Manager::end`). A worker terminates after dispatching it.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Shutdown;

impl Message for Shutdown {
    const MESSAGE_TYPE: &'static str = "Shutdown";
}

/// Delivered by a timer collaborator when a scheduled deadline elapses.
/// The core runtime only registers the type; scheduling it is external.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Timeout {
    pub id: i64,
}

impl Message for Timeout {
    const MESSAGE_TYPE: &'static str = "Timeout";
}

/// In-band failure notification routed back to a sender whose remote
/// message could not be delivered (see [`crate::transport::inbound`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reject {
    /// The type-name that could not be delivered.
    pub message_type: String,
    /// Free-text diagnostic.
    pub reason: String,
    /// Name of whichever component detected the failure.
    pub rejected_by: String,
}

impl Message for Reject {
    const MESSAGE_TYPE: &'static str = "Reject";
}
