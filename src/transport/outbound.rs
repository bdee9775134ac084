//! Outbound transport (`spec.md` §4.6): serializes envelopes and publishes
//! them to remote endpoints, reusing one TCP connection per endpoint.
//!
//! Frames are newline-delimited JSON — `spec.md` §6 mandates "one JSON
//! document per transport frame, UTF-8 encoded"; length-prefixing is
//! unnecessary once frames cannot contain raw newlines (`serde_json` escapes
//! `\n` inside string fields), so a trailing `\n` is the simplest framing
//! that satisfies the schema.

// Layer 1: Standard library
// (none)

// Layer 2: Third-party
use dashmap::DashMap;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::Mutex as AsyncMutex;

// Layer 3: Internal
use crate::error::{ConfigError, SendError, TransportError};
use crate::message::Message;
use crate::registry::MessageRegistry;
use crate::transport::wire;

/// One logical outbound channel per endpoint, created lazily and reused for
/// the lifetime of the manager that owns this transport (`spec.md` §4.6).
pub struct OutboundTransport {
    local_endpoint: Option<String>,
    connections: DashMap<String, AsyncMutex<OwnedWriteHalf>>,
}

impl OutboundTransport {
    /// `local_endpoint` is this process's own bound inbound endpoint, if
    /// any, stamped as `sender_endpoint` when the caller's reference does
    /// not already supply one (`spec.md` §4.6).
    pub fn new(local_endpoint: Option<String>) -> Self {
        Self {
            local_endpoint,
            connections: DashMap::new(),
        }
    }

    pub fn local_endpoint(&self) -> Option<&str> {
        self.local_endpoint.as_deref()
    }

    /// Encode and transmit one frame to `endpoint`. Non-blocking from the
    /// caller's perspective aside from the brief write itself; failures
    /// detectable before or during the write (invalid endpoint, encode
    /// failure, connection reset) are surfaced synchronously. Post-send
    /// network failures (the peer silently drops the connection later) are
    /// not reported in-band — `spec.md` §4.6.
    pub async fn send_to<M: Message>(
        &self,
        endpoint: &str,
        receiver: &str,
        payload: &M,
        sender_actor: &str,
        sender_endpoint: &str,
        registry: &MessageRegistry,
    ) -> Result<(), SendError> {
        if !registry.contains(M::MESSAGE_TYPE) {
            return Err(ConfigError::UnregisteredType(M::MESSAGE_TYPE.to_string()).into());
        }

        if endpoint.is_empty() {
            return Err(TransportError::InvalidEndpoint(endpoint.to_string()).into());
        }

        let mut frame = wire::encode(payload, receiver, sender_actor, sender_endpoint)?;
        frame.push('\n');

        // Retry once against a freshly-dialed connection if the cached one
        // turns out to be dead — the common case for a long-lived reused
        // socket whose peer restarted.
        match self.write_to_cached(endpoint, &frame).await {
            Ok(()) => Ok(()),
            Err(_) => {
                self.connections.remove(endpoint);
                self.write_to_cached(endpoint, &frame).await
            }
        }
    }

    async fn write_to_cached(&self, endpoint: &str, frame: &str) -> Result<(), SendError> {
        if !self.connections.contains_key(endpoint) {
            let addr = crate::transport::strip_scheme(endpoint);
            let stream = TcpStream::connect(addr).await.map_err(|source| TransportError::Io {
                endpoint: endpoint.to_string(),
                source,
            })?;
            let (_, write_half) = stream.into_split();
            self.connections.insert(endpoint.to_string(), AsyncMutex::new(write_half));
        }

        let entry = self
            .connections
            .get(endpoint)
            .ok_or_else(|| TransportError::InvalidEndpoint(endpoint.to_string()))?;
        let mut write_half = entry.lock().await;
        write_half
            .write_all(frame.as_bytes())
            .await
            .map_err(|source| TransportError::Io {
                endpoint: endpoint.to_string(),
                source,
            })?;
        Ok(())
    }

    /// Drop every cached connection, e.g. on `Manager::end()`.
    pub fn close_all(&self) {
        self.connections.clear();
    }
}
