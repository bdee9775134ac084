//! Inbound transport (`spec.md` §4.7): an ordinary actor whose `Start`
//! handler opens the accept loop, reads newline-delimited wire frames off
//! each connection, and converts them into local envelopes — applying the
//! reject protocol (`spec.md` §4.5) whenever a step along the way fails.

// Layer 1: Standard library
use std::sync::Arc;

// Layer 2: Third-party
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

// Layer 3: Internal
use crate::actor::{try_dispatch, Actor, ActorContext, DispatchResult, Handler};
use crate::envelope::{Envelope, EnvelopeMeta, Origin};
use crate::manager::ManagerHandle;
use crate::message::{Shutdown, Start};
use crate::reference::{Reference, RemoteRef};
use crate::registry::MessageRegistry;
use crate::reject;
use crate::transport::outbound::OutboundTransport;
use crate::transport::{bind_addr, wire};

/// Runs as a normal registered actor (`spec.md` §4.7: "registers itself as
/// a normal actor ... and participates in Start/Shutdown like any other
/// actor"). Its own registered name is the conventional `rejected_by` for
/// registry/receiver/decode failures it detects before any user actor sees
/// the envelope (`DESIGN.md` Open Question 3).
pub struct InboundTransport {
    endpoint: String,
    manager: ManagerHandle,
    outbound: Arc<OutboundTransport>,
    accept_task: Option<JoinHandle<()>>,
}

impl InboundTransport {
    pub fn new(endpoint: impl Into<String>, manager: ManagerHandle, outbound: Arc<OutboundTransport>) -> Self {
        Self {
            endpoint: endpoint.into(),
            manager,
            outbound,
            accept_task: None,
        }
    }
}

#[async_trait]
impl Handler<Start> for InboundTransport {
    type Error = std::convert::Infallible;

    async fn handle(&mut self, _msg: Start, _meta: EnvelopeMeta, ctx: &mut ActorContext) -> Result<(), Self::Error> {
        let bind = bind_addr(&self.endpoint);
        let listener = match TcpListener::bind(&bind).await {
            Ok(listener) => listener,
            Err(err) => {
                tracing::error!(actor = ctx.name(), endpoint = %self.endpoint, error = %err, "failed to bind inbound endpoint");
                return Ok(());
            }
        };
        tracing::info!(actor = ctx.name(), endpoint = %self.endpoint, "inbound transport listening");

        let name = ctx.name().to_string();
        let registry = self.manager.registry().clone();
        let manager = self.manager.clone();
        let outbound = Arc::clone(&self.outbound);

        self.accept_task = Some(tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, peer)) => {
                        let name = name.clone();
                        let registry = registry.clone();
                        let manager = manager.clone();
                        let outbound = Arc::clone(&outbound);
                        tokio::spawn(async move {
                            if let Err(err) = serve_connection(stream, &name, &registry, &manager, &outbound).await {
                                tracing::debug!(actor = %name, peer = %peer, error = %err, "inbound connection closed");
                            }
                        });
                    }
                    Err(err) => {
                        tracing::warn!(actor = %name, error = %err, "accept failed");
                        break;
                    }
                }
            }
        }));

        Ok(())
    }
}

#[async_trait]
impl Handler<Shutdown> for InboundTransport {
    type Error = std::convert::Infallible;

    async fn handle(&mut self, _msg: Shutdown, _meta: EnvelopeMeta, ctx: &mut ActorContext) -> Result<(), Self::Error> {
        // Stop accepting new frames before returning (`spec.md` §4.7);
        // connections already being served finish their current read and
        // exit on their own once the task is gone.
        if let Some(task) = self.accept_task.take() {
            task.abort();
            tracing::debug!(actor = ctx.name(), "inbound transport stopped accepting connections");
        }
        Ok(())
    }
}

#[async_trait]
impl Actor for InboundTransport {
    async fn dispatch(&mut self, envelope: Envelope, ctx: &mut ActorContext) -> DispatchResult {
        let envelope = match try_dispatch::<Self, Start>(self, envelope, ctx).await {
            DispatchResult::Handled => return DispatchResult::Handled,
            DispatchResult::NoHandler(envelope) => envelope,
        };
        try_dispatch::<Self, Shutdown>(self, envelope, ctx).await
    }
}

async fn serve_connection(
    stream: tokio::net::TcpStream,
    name: &str,
    registry: &MessageRegistry,
    manager: &ManagerHandle,
    outbound: &Arc<OutboundTransport>,
) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            return Ok(());
        }
        let frame = line.trim_end_matches(['\n', '\r']);
        if frame.is_empty() {
            continue;
        }

        match wire::decode(frame, registry) {
            Ok((payload, meta)) => {
                let message_type = payload.message_type();
                if message_type == Start::MESSAGE_TYPE || message_type == Shutdown::MESSAGE_TYPE {
                    // Peer-originated Start/Shutdown is silently discarded
                    // (`spec.md` §4.4: "internal-only and should not be
                    // accepted from the wire").
                    tracing::debug!(actor = %name, message_type, "discarding peer-originated lifecycle message");
                    continue;
                }

                let Some(target) = manager.resolve(&meta.receiver) else {
                    route_reject(
                        &meta.sender_actor,
                        &meta.sender_endpoint,
                        outbound,
                        registry,
                        message_type,
                        format!("Unknown receiver: {}", meta.receiver),
                        name,
                    )
                    .await;
                    continue;
                };

                let Reference::Local(local) = target else {
                    route_reject(
                        &meta.sender_actor,
                        &meta.sender_endpoint,
                        outbound,
                        registry,
                        message_type,
                        format!("Unknown receiver: {}", meta.receiver),
                        name,
                    )
                    .await;
                    continue;
                };

                let sender = sender_reference(&meta.sender_actor, &meta.sender_endpoint, outbound, registry);
                let envelope = Envelope::new(payload, sender, Origin::Remote);
                if local.enqueue(envelope).is_err() {
                    tracing::debug!(actor = %name, receiver = %meta.receiver, "target mailbox closed, dropping frame");
                }
            }
            Err(failure) => {
                let message_type = failure.message_type.clone().unwrap_or_else(|| "<unknown>".to_string());
                let sender_actor = failure.sender_actor.clone().unwrap_or_default();
                let sender_endpoint = failure.sender_endpoint.clone().unwrap_or_default();
                route_reject(
                    &sender_actor,
                    &sender_endpoint,
                    outbound,
                    registry,
                    &message_type,
                    failure.error.to_string(),
                    name,
                )
                .await;
            }
        }
    }
}

fn sender_reference(
    sender_actor: &str,
    sender_endpoint: &str,
    outbound: &Arc<OutboundTransport>,
    registry: &MessageRegistry,
) -> Option<Reference> {
    if sender_actor.is_empty() {
        return None;
    }
    Some(Reference::Remote(RemoteRef::new(
        sender_actor,
        sender_endpoint,
        Arc::clone(outbound),
        registry.clone(),
    )))
}

async fn route_reject(
    sender_actor: &str,
    sender_endpoint: &str,
    outbound: &Arc<OutboundTransport>,
    registry: &MessageRegistry,
    message_type: impl Into<String>,
    reason: impl Into<String>,
    rejected_by: &str,
) {
    let sender = sender_reference(sender_actor, sender_endpoint, outbound, registry);
    reject::route(sender.as_ref(), message_type, reason, rejected_by.to_string()).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeConfig;
    use crate::manager::Manager;
    use crate::message::{Message, Reject};
    use serde::{Deserialize, Serialize};
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpStream;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Ping {
        count: i64,
    }

    impl Message for Ping {
        const MESSAGE_TYPE: &'static str = "Ping";
    }

    struct RecordingActor {
        tx: tokio::sync::mpsc::UnboundedSender<Ping>,
    }

    #[async_trait]
    impl Handler<Ping> for RecordingActor {
        type Error = std::convert::Infallible;

        async fn handle(&mut self, msg: Ping, _meta: EnvelopeMeta, _ctx: &mut ActorContext) -> Result<(), Self::Error> {
            let _ = self.tx.send(msg);
            Ok(())
        }
    }

    #[async_trait]
    impl Actor for RecordingActor {
        async fn dispatch(&mut self, envelope: Envelope, ctx: &mut ActorContext) -> DispatchResult {
            try_dispatch::<Self, Ping>(self, envelope, ctx).await
        }
    }

    struct RejectCatcher {
        tx: tokio::sync::mpsc::UnboundedSender<Reject>,
    }

    #[async_trait]
    impl Handler<Reject> for RejectCatcher {
        type Error = std::convert::Infallible;

        async fn handle(&mut self, msg: Reject, _meta: EnvelopeMeta, _ctx: &mut ActorContext) -> Result<(), Self::Error> {
            let _ = self.tx.send(msg);
            Ok(())
        }
    }

    #[async_trait]
    impl Actor for RejectCatcher {
        async fn dispatch(&mut self, envelope: Envelope, ctx: &mut ActorContext) -> DispatchResult {
            try_dispatch::<Self, Reject>(self, envelope, ctx).await
        }
    }

    async fn connect_retrying(addr: &str) -> TcpStream {
        for _ in 0..50 {
            if let Ok(stream) = TcpStream::connect(addr).await {
                return stream;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        panic!("could not connect to {addr}");
    }

    async fn free_local_addr() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);
        addr
    }

    #[tokio::test]
    async fn delivers_known_frame_to_registered_receiver() {
        let addr = free_local_addr().await;

        let manager = Manager::new(RuntimeConfig::default());
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        manager.register("pong", RecordingActor { tx }).unwrap();
        crate::registry::register_message::<Ping>(manager.registry());
        let outbound = manager.outbound();
        manager
            .register("receiver", InboundTransport::new(addr.clone(), manager.handle(), outbound))
            .unwrap();
        manager.init().unwrap();

        let mut stream = connect_retrying(&addr).await;
        let frame = wire::encode(&Ping { count: 7 }, "pong", "ping", "tcp://localhost:5002").unwrap();
        stream.write_all(format!("{frame}\n").as_bytes()).await.unwrap();

        let received = tokio::time::timeout(std::time::Duration::from_secs(2), rx.recv())
            .await
            .expect("Ping delivered within timeout")
            .unwrap();
        assert_eq!(received.count, 7);

        manager.end().await.unwrap();
    }

    /// Scenario 4 of `spec.md` §8: a frame targets a receiver name the
    /// peer never registered. The `Reject` comes back to an actor
    /// registered under `sender_actor` at a second, independently-bound
    /// inbound endpoint, exactly as two separate processes would see it.
    #[tokio::test]
    async fn unknown_receiver_produces_reject_routed_to_sender() {
        let sender_addr = free_local_addr().await;
        let sender_manager = Manager::new(RuntimeConfig::default());
        let (reject_tx, mut reject_rx) = tokio::sync::mpsc::unbounded_channel();
        sender_manager.register("ping", RejectCatcher { tx: reject_tx }).unwrap();
        let sender_outbound = sender_manager.outbound();
        sender_manager
            .register(
                "receiver",
                InboundTransport::new(sender_addr.clone(), sender_manager.handle(), sender_outbound),
            )
            .unwrap();
        sender_manager.init().unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let peer_addr = free_local_addr().await;
        let peer_manager = Manager::new(RuntimeConfig::default());
        let peer_outbound = peer_manager.outbound();
        peer_manager
            .register(
                "receiver",
                InboundTransport::new(peer_addr.clone(), peer_manager.handle(), peer_outbound),
            )
            .unwrap();
        peer_manager.init().unwrap();
        // Note: "pong" is intentionally never registered on the peer.

        let mut stream = connect_retrying(&peer_addr).await;
        let sender_endpoint = format!("tcp://{sender_addr}");
        let frame = wire::encode(&Ping { count: 1 }, "ghost", "ping", &sender_endpoint).unwrap();
        crate::registry::register_message::<Ping>(peer_manager.registry());
        stream.write_all(format!("{frame}\n").as_bytes()).await.unwrap();

        let reject = tokio::time::timeout(std::time::Duration::from_secs(2), reject_rx.recv())
            .await
            .expect("Reject delivered within timeout")
            .unwrap();
        assert_eq!(reject.message_type, "Ping");
        assert!(reject.reason.starts_with("Unknown receiver:"));
        assert_eq!(reject.rejected_by, "receiver");

        sender_manager.end().await.unwrap();
        peer_manager.end().await.unwrap();
    }
}
