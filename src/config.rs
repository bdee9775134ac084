//! Runtime configuration (`SPEC_FULL.md` §2 ambient additions): the knobs
//! `spec.md` leaves as "an implementation may choose" — mailbox capacity,
//! shutdown timeout — built with sensible defaults behind a fluent builder,
//! mirroring the teacher's `SystemConfig`/`SystemConfig::builder()`.

// Layer 1: Standard library
use std::time::Duration;

// Layer 2: Third-party
// (none)

// Layer 3: Internal
// (none)

/// Per-actor mailbox capacity. `None` is the reference model's unbounded
/// mailbox (`spec.md` §4.1) and is the default this crate ships with. `Some(n)`
/// switches `Manager::register` to a bounded channel of capacity `n`; a send
/// against a full mailbox is rejected with `SendError::MailboxFull` rather
/// than blocking the caller (`spec.md` §4.1: "implementations may choose
/// bounds but must then define backpressure").
pub const DEFAULT_MAILBOX_BOUND: Option<usize> = None;

/// Default upper bound `Manager::end()` waits on each worker join before
/// logging a warning and moving on, so shutdown can never hang forever on
/// a wedged actor.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// System-wide configuration for one [`crate::manager::Manager`] instance.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Per-actor mailbox capacity. `None` is unbounded.
    pub mailbox_bound: Option<usize>,
    /// Timeout `Manager::end()` waits for each worker to join.
    pub shutdown_timeout: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            mailbox_bound: DEFAULT_MAILBOX_BOUND,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

impl RuntimeConfig {
    pub fn builder() -> RuntimeConfigBuilder {
        RuntimeConfigBuilder::default()
    }
}

/// Fluent builder for [`RuntimeConfig`].
#[derive(Debug, Default)]
pub struct RuntimeConfigBuilder {
    config: RuntimeConfig,
}

impl RuntimeConfigBuilder {
    /// Bound every registered actor's mailbox to `bound` entries.
    pub fn mailbox_bound(mut self, bound: usize) -> Self {
        self.config.mailbox_bound = Some(bound);
        self
    }

    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.config.shutdown_timeout = timeout;
        self
    }

    pub fn build(self) -> RuntimeConfig {
        self.config
    }
}
