//! Process-wide mapping from wire type-name to a constructor that
//! rehydrates a payload from its decoded JSON field map (`spec.md` §4.4).
//!
//! Scoped as one `Arc<DashMap<..>>`-backed instance per
//! [`crate::manager::Manager`] rather than a `static` — see `DESIGN.md`
//! Open Question 4 — matching how the teacher scopes its own
//! `ActorRegistry` per `ActorSystem`.

// Layer 1: Standard library
use std::sync::Arc;

// Layer 2: Third-party
use dashmap::DashMap;
use serde_json::Value;

// Layer 3: Internal
use crate::error::DecodeError;
use crate::message::{Message, Reject, Shutdown, Start, Timeout};
use crate::payload::Payload;

/// Rehydrates a `Box<dyn Payload>` from a decoded `message` field map.
pub type Constructor = Arc<dyn Fn(Value) -> Result<Box<dyn Payload>, DecodeError> + Send + Sync>;

/// Process-wide (per-manager) registry of wire type-name → [`Constructor`].
/// Populated at load time, read-only during steady-state operation
/// (`spec.md` §3).
#[derive(Clone)]
pub struct MessageRegistry {
    constructors: Arc<DashMap<&'static str, Constructor>>,
}

impl Default for MessageRegistry {
    fn default() -> Self {
        Self {
            constructors: Arc::new(DashMap::new()),
        }
    }
}

impl MessageRegistry {
    /// A registry with the runtime's built-in types already registered
    /// (`spec.md` §4.4: "`Start`, `Shutdown`, `Timeout`, and `Reject` are
    /// registered by the runtime itself").
    pub fn new() -> Self {
        let registry = Self::default();
        register_message::<Start>(&registry);
        register_message::<Shutdown>(&registry);
        register_message::<Timeout>(&registry);
        register_message::<Reject>(&registry);
        registry
    }

    pub(crate) fn insert(&self, type_name: &'static str, constructor: Constructor) {
        self.constructors.insert(type_name, constructor);
    }

    /// Decode `fields` into a payload of the registered type named
    /// `type_name`. Fails with [`DecodeError::UnknownMessageType`] if no
    /// such type was registered, or [`DecodeError::ConstructorFailed`] if
    /// the constructor itself rejects the field map.
    pub fn construct(&self, type_name: &str, fields: Value) -> Result<Box<dyn Payload>, DecodeError> {
        let constructor = self
            .constructors
            .get(type_name)
            .ok_or_else(|| DecodeError::UnknownMessageType(type_name.to_string()))?;
        constructor(fields)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.constructors.contains_key(type_name)
    }
}

/// Register `M` for remote use. A precondition for using `M` remotely in
/// either direction (`spec.md` §4.4): encode is automatic (every
/// [`Message`] is a [`Payload`] via the blanket impl), but decode requires
/// this registration so an inbound frame's `message_type` string can be
/// turned back into a concrete `M`.
pub fn register_message<M: Message>(registry: &MessageRegistry) {
    registry.insert(
        M::MESSAGE_TYPE,
        Arc::new(|fields: Value| -> Result<Box<dyn Payload>, DecodeError> {
            serde_json::from_value::<M>(fields)
                .map(|message| Box::new(message) as Box<dyn Payload>)
                .map_err(|source| DecodeError::ConstructorFailed {
                    type_name: M::MESSAGE_TYPE.to_string(),
                    source,
                })
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Ping {
        count: i64,
    }

    impl Message for Ping {
        const MESSAGE_TYPE: &'static str = "Ping";
    }

    #[test]
    fn builtins_are_preregistered() {
        let registry = MessageRegistry::new();
        assert!(registry.contains("Start"));
        assert!(registry.contains("Shutdown"));
        assert!(registry.contains("Timeout"));
        assert!(registry.contains("Reject"));
        assert!(!registry.contains("Ping"));
    }

    #[test]
    fn construct_unknown_type_fails() {
        let registry = MessageRegistry::new();
        let err = registry.construct("Ping", serde_json::json!({"count": 1})).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownMessageType(name) if name == "Ping"));
    }

    #[test]
    fn construct_registered_type_round_trips() {
        let registry = MessageRegistry::new();
        register_message::<Ping>(&registry);

        let payload = registry
            .construct("Ping", serde_json::json!({"count": 3}))
            .expect("Ping is registered");
        assert_eq!(payload.message_type(), "Ping");
        let ping = payload.into_any().downcast::<Ping>().expect("type matches");
        assert_eq!(ping.count, 3);
    }

    #[test]
    fn construct_with_bad_fields_reports_constructor_failed() {
        let registry = MessageRegistry::new();
        register_message::<Ping>(&registry);

        let err = registry
            .construct("Ping", serde_json::json!({"count": "not a number"}))
            .unwrap_err();
        assert!(matches!(err, DecodeError::ConstructorFailed { type_name, .. } if type_name == "Ping"));
    }
}
