//! Error taxonomy for the actor runtime.
//!
//! Follows the teacher's canonical-struct pattern: one `thiserror` enum per
//! layer (configuration, send/ask, transport, decode/encode, system), each
//! variant carrying enough context to reconstruct the failing operation
//! without re-deriving it from a string.

// Layer 1: Standard library
use std::io;

// Layer 2: Third-party
use thiserror::Error;

/// Errors raised while registering actors or message types, before `init()`.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// `Manager::register` called twice with the same actor name.
    #[error("duplicate actor name: {0}")]
    DuplicateName(String),

    /// `Manager::register` called after `init()`.
    #[error("registry frozen: cannot register {0:?} after init()")]
    RegistryFrozen(Option<String>),

    /// A message type was used remotely without a prior `register_message`.
    #[error("unregistered message type: {0}")]
    UnregisteredType(String),
}

/// Errors raised by `Reference::send` / `Reference::ask`.
#[derive(Error, Debug)]
pub enum SendError {
    /// `ask()` was called on a `Reference::Remote`.
    #[error("synchronous ask is not supported on a remote reference")]
    UnsupportedRemoteSynchronous,

    /// The target mailbox has already been dropped (worker exited).
    #[error("mailbox for {0:?} is closed")]
    MailboxClosed(Option<String>),

    /// The target mailbox is bounded (`RuntimeConfig::mailbox_bound`) and at
    /// capacity; the send is rejected rather than blocking the caller.
    #[error("mailbox for {0:?} is full")]
    MailboxFull(Option<String>),

    /// A send or ask was attempted after `Manager::end()` completed.
    #[error("runtime has stopped, no further sends are accepted")]
    RuntimeStopped,

    /// A message type was sent remotely without a prior `register_message`
    /// on the sending side (`spec.md` §4.4: "registration is a precondition
    /// for any remote use of that type in either direction").
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Encoding the outbound payload failed (remote send path).
    #[error("failed to encode outbound message: {0}")]
    Encode(#[from] EncodeError),

    /// The underlying transport rejected the send synchronously.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The reply sink for an `ask()` was dropped before a reply arrived.
    #[error("reply channel closed before a response was delivered")]
    ReplyDropped,

    /// `ask()` received a reply whose payload type did not match `R`.
    #[error("reply payload did not match the expected response type")]
    ReplyTypeMismatch,
}

/// Errors converting a [`crate::message::Message`] into its wire field map.
#[derive(Error, Debug)]
pub enum EncodeError {
    /// `serde_json` failed to serialize the payload.
    #[error("serialization failed: {0}")]
    Serde(#[from] serde_json::Error),

    /// The payload serialized to something other than a JSON object.
    #[error("message did not serialize to a JSON object")]
    NotAnObject,
}

/// Errors decoding an inbound wire frame into a typed payload.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The frame was not valid JSON.
    #[error("invalid JSON frame: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The frame was missing a required top-level field.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// `message_type` was not present in the message registry.
    #[error("Unknown message type: {0}")]
    UnknownMessageType(String),

    /// The registered constructor rejected the decoded field map.
    #[error("Failed to deserialize {type_name}: {source}")]
    ConstructorFailed {
        type_name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised synchronously by the outbound transport.
#[derive(Error, Debug)]
pub enum TransportError {
    /// `endpoint` could not be parsed into a connectable address.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// The underlying socket operation failed.
    #[error("I/O error talking to {endpoint}: {source}")]
    Io {
        endpoint: String,
        #[source]
        source: io::Error,
    },
}

/// Top-level system error surfaced by [`crate::manager::Manager`] operations.
#[derive(Error, Debug)]
pub enum SystemError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Send(#[from] SendError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// `run()` was called before `init()`.
    #[error("manager has not been initialized: call init() before run()")]
    NotInitialized,
}

impl SystemError {
    /// Configuration errors are caller mistakes, never transient.
    pub fn is_transient(&self) -> bool {
        matches!(self, SystemError::Send(SendError::MailboxClosed(_)))
    }
}
