//! Convenience re-exports for building actors with `relaycell`.
//!
//! ```rust,ignore
//! use relaycell::prelude::*;
//! ```

pub use crate::actor::{try_dispatch, Actor, ActorContext, DispatchResult, Handler};
pub use crate::config::RuntimeConfig;
pub use crate::envelope::{Envelope, EnvelopeMeta, Origin};
pub use crate::error::{ConfigError, DecodeError, EncodeError, SendError, SystemError, TransportError};
pub use crate::manager::{Manager, ManagerHandle};
pub use crate::message::{Message, Reject, Shutdown, Start, Timeout};
pub use crate::reference::{LocalRef, Reference, RemoteRef};
pub use crate::registry::{register_message, MessageRegistry};
pub use crate::transport::inbound::InboundTransport;
pub use crate::transport::outbound::OutboundTransport;
