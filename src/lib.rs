//! # relaycell — a lightweight actor runtime with a cross-process wire protocol
//!
//! `relaycell` gives a process a uniform mailbox/handler model for named
//! actors: each actor owns a FIFO mailbox served by a dedicated worker task,
//! dispatch is keyed by payload type, and a [`reference::Reference`] to a
//! destination actor is interchangeable whether that actor lives in the same
//! process or across the network. Remote actors are reached over a small
//! JSON-over-TCP wire protocol with an explicit message-type registry and an
//! in-band rejection path for delivery failures — so "the peer is remote"
//! never becomes a different API to program against.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use relaycell::prelude::*;
//! use async_trait::async_trait;
//!
//! #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
//! struct Ping { count: i64 }
//!
//! impl Message for Ping {
//!     const MESSAGE_TYPE: &'static str = "Ping";
//! }
//!
//! struct PingActor;
//!
//! #[async_trait]
//! impl Handler<Ping> for PingActor {
//!     type Error = std::convert::Infallible;
//!
//!     async fn handle(&mut self, msg: Ping, _meta: EnvelopeMeta, _ctx: &mut ActorContext) -> Result<(), Self::Error> {
//!         println!("got ping #{}", msg.count);
//!         Ok(())
//!     }
//! }
//!
//! #[async_trait]
//! impl Actor for PingActor {
//!     async fn dispatch(&mut self, envelope: Envelope, ctx: &mut ActorContext) -> DispatchResult {
//!         try_dispatch::<Self, Ping>(self, envelope, ctx).await
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let manager = Manager::new(RuntimeConfig::default());
//!     let ping = manager.register("ping", PingActor).unwrap();
//!     manager.init().unwrap();
//!     ping.send(Ping { count: 1 }, None).await.unwrap();
//!     manager.end().await.unwrap();
//! }
//! ```
//!
//! # Module organization
//!
//! - [`message`] / [`payload`] — the `Message` trait, built-in lifecycle
//!   types, and the type-erased `Payload` every envelope actually carries.
//! - [`envelope`] — the immutable record pairing a payload with sender
//!   metadata and an optional synchronous reply sink.
//! - [`reference`] — the local/remote destination handle.
//! - [`mailbox`] — the per-actor worker loop.
//! - [`actor`] — the `Actor`/`Handler<M>` traits actors implement.
//! - [`manager`] — actor registry, lifecycle (`init`/`run`/`end`), termination.
//! - [`registry`] — the process-wide wire type-name → constructor map.
//! - [`reject`] — the in-band delivery-failure notification path.
//! - [`transport`] — the wire frame schema plus outbound/inbound TCP transport.
//! - [`config`] — runtime configuration (mailbox bound, shutdown timeout).
//! - [`error`] — the error taxonomy used across every layer above.

pub mod actor;
pub mod config;
pub mod envelope;
pub mod error;
pub mod mailbox;
pub mod manager;
pub mod message;
pub mod payload;
pub mod prelude;
pub mod reference;
pub mod registry;
pub mod reject;
pub mod transport;
pub mod util;

pub use actor::{reply, try_dispatch, Actor, ActorContext, DispatchResult, Handler};
pub use config::RuntimeConfig;
pub use envelope::{Envelope, EnvelopeMeta, Origin};
pub use error::{ConfigError, DecodeError, EncodeError, SendError, SystemError, TransportError};
pub use manager::{Manager, ManagerHandle};
pub use message::{Message, Reject, Shutdown, Start, Timeout};
pub use payload::Payload;
pub use reference::{LocalRef, Reference, RemoteRef};
pub use registry::{register_message, MessageRegistry};
pub use transport::inbound::InboundTransport;
pub use transport::outbound::OutboundTransport;
pub use util::ActorId;
