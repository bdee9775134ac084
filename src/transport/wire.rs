//! Wire frame schema and encode/decode (`spec.md` §4.4, §6): one JSON
//! document per transport frame, UTF-8 encoded.

// Layer 1: Standard library
// (none)

// Layer 2: Third-party
use serde::{Deserialize, Serialize};
use serde_json::Value;

// Layer 3: Internal
use crate::error::{DecodeError, EncodeError};
use crate::message::Message;
use crate::payload::Payload;
use crate::registry::MessageRegistry;

/// One JSON document per transport frame (`spec.md` §4.4). Unknown
/// top-level fields are ignored by `serde`'s default struct deserialization
/// (`spec.md` §6).
#[derive(Debug, Serialize, Deserialize)]
struct WireFrame {
    message_type: String,
    receiver: String,
    #[serde(default)]
    sender_actor: String,
    #[serde(default)]
    sender_endpoint: String,
    message: Value,
}

/// Addressing fields carried alongside a successfully decoded payload.
#[derive(Debug, Clone)]
pub struct WireMeta {
    pub receiver: String,
    pub sender_actor: String,
    pub sender_endpoint: String,
}

/// A decode failure, plus whatever addressing info survived parsing far
/// enough to read it — the caller still routes a `Reject` when
/// `sender_endpoint` was present (`spec.md` §6: "Missing required fields
/// ... cause a parse-failure Reject (if `sender_endpoint` is present) or a
/// silent drop").
#[derive(Debug)]
pub struct DecodeFailure {
    pub error: DecodeError,
    pub message_type: Option<String>,
    pub sender_actor: Option<String>,
    pub sender_endpoint: Option<String>,
}

/// Encode `payload` as one wire frame (`spec.md` §4.4's `encode` operation).
pub fn encode<M: Message>(
    payload: &M,
    receiver: &str,
    sender_actor: &str,
    sender_endpoint: &str,
) -> Result<String, EncodeError> {
    let fields = payload.to_wire_fields()?;
    let frame = WireFrame {
        message_type: M::MESSAGE_TYPE.to_string(),
        receiver: receiver.to_string(),
        sender_actor: sender_actor.to_string(),
        sender_endpoint: sender_endpoint.to_string(),
        message: Value::Object(fields),
    };
    serde_json::to_string(&frame).map_err(EncodeError::from)
}

/// Decode one wire frame: parse JSON, look up `message_type` in `registry`,
/// invoke its constructor with the `message` field map (`spec.md` §4.4's
/// `decode` operation).
pub fn decode(line: &str, registry: &MessageRegistry) -> Result<(Box<dyn Payload>, WireMeta), DecodeFailure> {
    let value: Value = serde_json::from_str(line).map_err(|source| DecodeFailure {
        error: DecodeError::InvalidJson(source),
        message_type: None,
        sender_actor: None,
        sender_endpoint: None,
    })?;

    let object = value.as_object();
    let field_str = |field: &str| -> Option<String> {
        object.and_then(|o| o.get(field)).and_then(Value::as_str).map(str::to_string)
    };

    let sender_actor = field_str("sender_actor").unwrap_or_default();
    let sender_endpoint = field_str("sender_endpoint").unwrap_or_default();

    let Some(message_type) = field_str("message_type") else {
        return Err(DecodeFailure {
            error: DecodeError::MissingField("message_type"),
            message_type: None,
            sender_actor: Some(sender_actor),
            sender_endpoint: Some(sender_endpoint),
        });
    };

    let Some(receiver) = field_str("receiver") else {
        return Err(DecodeFailure {
            error: DecodeError::MissingField("receiver"),
            message_type: Some(message_type),
            sender_actor: Some(sender_actor),
            sender_endpoint: Some(sender_endpoint),
        });
    };

    let Some(message) = object.and_then(|o| o.get("message")).cloned() else {
        return Err(DecodeFailure {
            error: DecodeError::MissingField("message"),
            message_type: Some(message_type),
            sender_actor: Some(sender_actor),
            sender_endpoint: Some(sender_endpoint),
        });
    };

    let payload = registry.construct(&message_type, message).map_err(|error| DecodeFailure {
        error,
        message_type: Some(message_type.clone()),
        sender_actor: Some(sender_actor.clone()),
        sender_endpoint: Some(sender_endpoint.clone()),
    })?;

    Ok((
        payload,
        WireMeta {
            receiver,
            sender_actor,
            sender_endpoint,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Reject, Start};

    #[test]
    fn encode_then_decode_round_trips() {
        let registry = MessageRegistry::new();
        let frame = encode(&Reject {
            message_type: "Ping".to_string(),
            reason: "Unknown message type: Ping".to_string(),
            rejected_by: "pong".to_string(),
        }, "ping", "pong", "tcp://localhost:5001")
        .unwrap();

        let (payload, meta) = decode(&frame, &registry).unwrap();
        assert_eq!(payload.message_type(), "Reject");
        assert_eq!(meta.receiver, "ping");
        assert_eq!(meta.sender_actor, "pong");
        assert_eq!(meta.sender_endpoint, "tcp://localhost:5001");

        let reject = payload.into_any().downcast::<Reject>().unwrap();
        assert_eq!(reject.reason, "Unknown message type: Ping");
    }

    #[test]
    fn decode_unknown_type_reports_sender_for_reject_routing() {
        let registry = MessageRegistry::new();
        let frame = encode(&Start, "pong", "ping", "tcp://localhost:5002").unwrap();
        // Rewrite the message_type to something unregistered, simulating a
        // peer sending a type this side never registered.
        let mutated = frame.replace("\"Start\"", "\"UnknownMessage\"");

        let failure = decode(&mutated, &registry).unwrap_err();
        assert!(matches!(failure.error, DecodeError::UnknownMessageType(ref name) if name == "UnknownMessage"));
        assert_eq!(failure.sender_actor.as_deref(), Some("ping"));
        assert_eq!(failure.sender_endpoint.as_deref(), Some("tcp://localhost:5002"));
    }

    #[test]
    fn decode_missing_required_field_still_carries_sender_endpoint() {
        let registry = MessageRegistry::new();
        let line = serde_json::json!({
            "receiver": "pong",
            "sender_actor": "ping",
            "sender_endpoint": "tcp://localhost:5002",
            "message": {}
        })
        .to_string();

        let failure = decode(&line, &registry).unwrap_err();
        assert!(matches!(failure.error, DecodeError::MissingField("message_type")));
        assert_eq!(failure.sender_endpoint.as_deref(), Some("tcp://localhost:5002"));
    }

    #[test]
    fn decode_invalid_json_has_no_sender_info() {
        let registry = MessageRegistry::new();
        let failure = decode("not json", &registry).unwrap_err();
        assert!(matches!(failure.error, DecodeError::InvalidJson(_)));
        assert!(failure.sender_endpoint.is_none());
    }
}
