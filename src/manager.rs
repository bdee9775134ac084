//! Manager: owns the actor name space, the worker tasks, the message
//! registry, and the termination latch (`spec.md` §4.3).

// Layer 1: Standard library
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// Layer 2: Third-party
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

// Layer 3: Internal
use crate::actor::{Actor, ActorContext};
use crate::config::RuntimeConfig;
use crate::envelope::{Envelope, Origin};
use crate::error::{ConfigError, SystemError};
use crate::mailbox::{self, MailboxRx};
use crate::message::Shutdown;
use crate::reference::{LocalRef, MailboxTx, Reference};
use crate::registry::MessageRegistry;
use crate::transport::outbound::OutboundTransport;

/// An actor awaiting `Manager::init()`: its mailbox already exists (so a
/// `Start` envelope can be enqueued immediately, see `Manager::register`),
/// but no worker task has been spawned for it yet.
struct PendingActor {
    name: String,
    actor: Box<dyn Actor>,
    receiver: MailboxRx,
    local_ref: LocalRef,
}

struct Inner {
    config: RuntimeConfig,
    registry: MessageRegistry,
    outbound: Arc<OutboundTransport>,
    name_to_ref: DashMap<String, Reference>,
    /// `Some` while registration is open; taken (becoming `None`) by the
    /// first `init()` call, which freezes the registry (`spec.md` §4.3).
    pending: Mutex<Option<Vec<PendingActor>>>,
    workers: Mutex<Vec<(String, JoinHandle<()>)>>,
    terminate: watch::Sender<bool>,
    /// Flipped once by `Manager::end()`; every `LocalRef` shares this flag
    /// and rejects further sends with `SendError::RuntimeStopped`.
    stopped: Arc<AtomicBool>,
}

/// Owns the actor registry, worker tasks, message registry, and outbound
/// transport for one running actor system. Cheaply cloneable (`Arc`
/// internals), the same shape as the teacher's own `ActorSystem`.
#[derive(Clone)]
pub struct Manager {
    inner: Arc<Inner>,
}

impl Manager {
    /// A manager with no remote capability: `Reference::Remote` can still
    /// be constructed against an externally-owned `OutboundTransport`, but
    /// this manager's own outbound transport has no bound local endpoint to
    /// stamp as `sender_endpoint`.
    pub fn new(config: RuntimeConfig) -> Self {
        Self::build(config, None)
    }

    /// A manager whose outbound transport is stamped with `endpoint` as its
    /// `local_endpoint` (`spec.md` §4.6). Registering an
    /// [`crate::transport::inbound::InboundTransport`] bound to the same
    /// endpoint is the caller's responsibility, like any other actor.
    pub fn with_endpoint(config: RuntimeConfig, endpoint: impl Into<String>) -> Self {
        Self::build(config, Some(endpoint.into()))
    }

    fn build(config: RuntimeConfig, local_endpoint: Option<String>) -> Self {
        let (terminate, _) = watch::channel(false);
        let inner = Arc::new(Inner {
            config,
            registry: MessageRegistry::new(),
            outbound: Arc::new(OutboundTransport::new(local_endpoint)),
            name_to_ref: DashMap::new(),
            pending: Mutex::new(Some(Vec::new())),
            workers: Mutex::new(Vec::new()),
            terminate,
            stopped: Arc::new(AtomicBool::new(false)),
        });
        Self { inner }
    }

    /// This manager's configuration.
    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    /// Process-wide message registry for this manager (`spec.md` §4.4).
    pub fn registry(&self) -> &MessageRegistry {
        &self.inner.registry
    }

    /// Outbound transport wired to this manager's bound endpoint, if any.
    pub fn outbound(&self) -> Arc<OutboundTransport> {
        Arc::clone(&self.inner.outbound)
    }

    /// Cheap, cloneable back-handle injected into every actor's context.
    pub fn handle(&self) -> ManagerHandle {
        ManagerHandle {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Register `actor` under `name`, binding a fresh local [`Reference`].
    /// Must be called before [`Manager::init`] — [`ConfigError::RegistryFrozen`]
    /// afterward — with a unique `name` — [`ConfigError::DuplicateName`]
    /// otherwise (`spec.md` §4.3).
    pub fn register<A: Actor>(&self, name: impl Into<String>, actor: A) -> Result<Reference, ConfigError> {
        let name = name.into();

        let mut pending_guard = self.inner.pending.lock();
        let Some(pending) = pending_guard.as_mut() else {
            return Err(ConfigError::RegistryFrozen(Some(name)));
        };

        if self.inner.name_to_ref.contains_key(&name) {
            return Err(ConfigError::DuplicateName(name));
        }

        let (tx, rx) = match self.inner.config.mailbox_bound {
            Some(bound) => {
                let (tx, rx) = mpsc::channel(bound);
                (MailboxTx::Bounded(tx), MailboxRx::Bounded(rx))
            }
            None => {
                let (tx, rx) = mpsc::unbounded_channel();
                (MailboxTx::Unbounded(tx), MailboxRx::Unbounded(rx))
            }
        };
        let local_ref = LocalRef::new(name.clone(), tx, Arc::clone(&self.inner.stopped));
        let reference = Reference::Local(local_ref.clone());

        // Enqueued now, before the Reference is handed back to the caller,
        // so nothing can reach this mailbox ahead of it — the easiest way
        // to guarantee "a synthetic Start envelope pushed at the head of
        // every mailbox" (spec.md §3) without a priority queue.
        let _ = local_ref.enqueue(Envelope::new(Box::new(crate::message::Start), None, Origin::Local));

        self.inner.name_to_ref.insert(name.clone(), reference.clone());
        pending.push(PendingActor {
            name,
            actor: Box::new(actor),
            receiver: rx,
            local_ref,
        });

        Ok(reference)
    }

    /// Spawn one worker task per registered actor and freeze the registry.
    /// Fails with [`ConfigError::RegistryFrozen`] if called more than once.
    pub fn init(&self) -> Result<(), ConfigError> {
        let pending = {
            let mut guard = self.inner.pending.lock();
            guard.take()
        };
        let Some(pending) = pending else {
            return Err(ConfigError::RegistryFrozen(None));
        };

        let handle = self.handle();
        let mut workers = self.inner.workers.lock();
        for pending_actor in pending {
            let self_ref = Reference::Local(pending_actor.local_ref);
            let ctx = ActorContext::new(pending_actor.name.clone(), self_ref, handle.clone());
            let join = mailbox::spawn_worker(pending_actor.name.clone(), pending_actor.actor, pending_actor.receiver, ctx);
            workers.push((pending_actor.name, join));
        }

        Ok(())
    }

    /// Block until [`ManagerHandle::terminate`] is called, from any actor or
    /// from outside the runtime.
    pub async fn run(&self) {
        let mut rx = self.inner.terminate.subscribe();
        let _ = rx.wait_for(|terminated| *terminated).await;
    }

    /// Enqueue `Shutdown` into every mailbox and join every worker, in
    /// registration order (`spec.md` §4.3). A worker that does not join
    /// within the configured `shutdown_timeout` is logged and skipped
    /// rather than hanging `end()` forever.
    pub async fn end(&self) -> Result<(), SystemError> {
        let workers = {
            let mut guard = self.inner.workers.lock();
            std::mem::take(&mut *guard)
        };

        for (name, _) in &workers {
            if let Some(entry) = self.inner.name_to_ref.get(name) {
                if let Reference::Local(local) = entry.value() {
                    let _ = local.enqueue(Envelope::new(Box::new(Shutdown), None, Origin::Local));
                }
            }
        }

        let shutdown_timeout = self.inner.config.shutdown_timeout;
        for (name, join) in workers {
            match tokio::time::timeout(shutdown_timeout, join).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    tracing::warn!(actor = %name, error = %err, "actor worker task panicked");
                }
                Err(_) => {
                    tracing::warn!(actor = %name, "actor worker did not shut down within the configured timeout");
                }
            }
        }

        self.inner.stopped.store(true, Ordering::Release);

        Ok(())
    }

    /// Resolve a registered actor's local [`Reference`] by name, used by the
    /// inbound transport to route decoded envelopes (`spec.md` §4.7).
    pub fn resolve(&self, name: &str) -> Option<Reference> {
        self.inner.name_to_ref.get(name).map(|entry| entry.value().clone())
    }
}

/// Back-handle injected into every actor's [`ActorContext`]
/// (`spec.md` §4.3). Cheap to clone; [`ManagerHandle::terminate`] is
/// idempotent.
#[derive(Clone)]
pub struct ManagerHandle {
    inner: Arc<Inner>,
}

impl ManagerHandle {
    /// Trip the termination latch, waking any task blocked in
    /// [`Manager::run`]. Calling this more than once has no further effect.
    pub fn terminate(&self) {
        let _ = self.inner.terminate.send(true);
    }

    /// Resolve a registered actor's local [`Reference`] by name.
    pub fn resolve(&self, name: &str) -> Option<Reference> {
        self.inner.name_to_ref.get(name).map(|entry| entry.value().clone())
    }

    /// Process-wide message registry for this manager.
    pub fn registry(&self) -> &MessageRegistry {
        &self.inner.registry
    }

    /// Outbound transport wired to this manager's bound endpoint, if any.
    pub fn outbound(&self) -> Arc<OutboundTransport> {
        Arc::clone(&self.inner.outbound)
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{try_dispatch, DispatchResult};
    use crate::envelope::EnvelopeMeta;
    use crate::message::{Message, Start};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingActor {
        starts: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl crate::actor::Handler<Start> for CountingActor {
        type Error = std::convert::Infallible;

        async fn handle(&mut self, _message: Start, _meta: EnvelopeMeta, _ctx: &mut ActorContext) -> Result<(), Self::Error> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[async_trait]
    impl Actor for CountingActor {
        async fn dispatch(&mut self, envelope: Envelope, ctx: &mut ActorContext) -> DispatchResult {
            try_dispatch::<Self, Start>(self, envelope, ctx).await
        }
    }

    #[tokio::test]
    async fn register_then_init_then_end_runs_clean() {
        let manager = Manager::new(RuntimeConfig::default());
        let starts = Arc::new(AtomicUsize::new(0));
        manager
            .register("counter", CountingActor { starts: Arc::clone(&starts) })
            .expect("first registration succeeds");

        manager.init().expect("init succeeds once");
        manager.end().await.expect("end succeeds");

        assert_eq!(starts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn duplicate_registration_fails() {
        let manager = Manager::new(RuntimeConfig::default());
        manager
            .register("dup", CountingActor { starts: Arc::new(AtomicUsize::new(0)) })
            .unwrap();
        let err = manager
            .register("dup", CountingActor { starts: Arc::new(AtomicUsize::new(0)) })
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateName(name) if name == "dup"));
    }

    #[tokio::test]
    async fn registration_after_init_is_frozen() {
        let manager = Manager::new(RuntimeConfig::default());
        manager.init().unwrap();
        let err = manager
            .register("late", CountingActor { starts: Arc::new(AtomicUsize::new(0)) })
            .unwrap_err();
        assert!(matches!(err, ConfigError::RegistryFrozen(Some(name)) if name == "late"));
    }

    #[tokio::test]
    async fn terminate_unblocks_run() {
        let manager = Manager::new(RuntimeConfig::default());
        manager.init().unwrap();
        let handle = manager.handle();

        let run_manager = manager.clone();
        let run_task = tokio::spawn(async move { run_manager.run().await });

        handle.terminate();
        tokio::time::timeout(std::time::Duration::from_secs(1), run_task)
            .await
            .expect("run() returns after terminate()")
            .unwrap();

        manager.end().await.unwrap();
    }
}
