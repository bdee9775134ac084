//! Diagnostic-only actor identifier (`SPEC_FULL.md` "Supplemented
//! features"). Never part of wire identity — that stays the plain actor
//! name string (`spec.md` §4.4) — used only in `tracing` fields to
//! disambiguate log lines when actors are re-registered under the same
//! name across restarts.

// Layer 1: Standard library
use std::fmt;

// Layer 2: Third-party
use uuid::Uuid;

// Layer 3: Internal
// (none)

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActorId(Uuid);

impl ActorId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(ActorId::new(), ActorId::new());
    }

    #[test]
    fn display_matches_uuid_string() {
        let id = ActorId::new();
        assert_eq!(id.to_string(), id.0.to_string());
    }
}
