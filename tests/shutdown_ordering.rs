//! End-to-end scenario 6 (`spec.md` §8): enqueue 3 messages, then call
//! `end()`. The actor handles all 3, then `Shutdown`, then exits —
//! `Shutdown` is always the last envelope a mailbox processes.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use relaycell::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Tick {
    value: i64,
}

impl Message for Tick {
    const MESSAGE_TYPE: &'static str = "Tick";
}

#[derive(Debug, Clone)]
enum Observed {
    Tick(i64),
    Shutdown,
}

struct RecordingActor {
    log: Arc<Mutex<Vec<Observed>>>,
}

#[async_trait]
impl Handler<Tick> for RecordingActor {
    type Error = std::convert::Infallible;

    async fn handle(&mut self, msg: Tick, _meta: EnvelopeMeta, _ctx: &mut ActorContext) -> Result<(), Self::Error> {
        self.log.lock().unwrap().push(Observed::Tick(msg.value));
        Ok(())
    }
}

#[async_trait]
impl Handler<Shutdown> for RecordingActor {
    type Error = std::convert::Infallible;

    async fn handle(&mut self, _msg: Shutdown, _meta: EnvelopeMeta, _ctx: &mut ActorContext) -> Result<(), Self::Error> {
        self.log.lock().unwrap().push(Observed::Shutdown);
        Ok(())
    }
}

#[async_trait]
impl Actor for RecordingActor {
    async fn dispatch(&mut self, envelope: Envelope, ctx: &mut ActorContext) -> DispatchResult {
        let envelope = match try_dispatch::<Self, Tick>(self, envelope, ctx).await {
            DispatchResult::Handled => return DispatchResult::Handled,
            DispatchResult::NoHandler(envelope) => envelope,
        };
        try_dispatch::<Self, Shutdown>(self, envelope, ctx).await
    }
}

#[tokio::test]
async fn shutdown_is_always_the_last_envelope_dispatched() {
    let manager = Manager::new(RuntimeConfig::default());
    let log = Arc::new(Mutex::new(Vec::new()));
    let actor_ref = manager.register("recorder", RecordingActor { log: Arc::clone(&log) }).unwrap();
    manager.init().unwrap();

    actor_ref.send(Tick { value: 1 }, None).await.unwrap();
    actor_ref.send(Tick { value: 2 }, None).await.unwrap();
    actor_ref.send(Tick { value: 3 }, None).await.unwrap();

    manager.end().await.unwrap();

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 4);
    assert!(matches!(log[0], Observed::Tick(1)));
    assert!(matches!(log[1], Observed::Tick(2)));
    assert!(matches!(log[2], Observed::Tick(3)));
    assert!(matches!(log[3], Observed::Shutdown));
}

#[tokio::test]
async fn send_after_end_fails_with_runtime_stopped() {
    let manager = Manager::new(RuntimeConfig::default());
    let log = Arc::new(Mutex::new(Vec::new()));
    let actor_ref = manager.register("recorder", RecordingActor { log }).unwrap();
    manager.init().unwrap();
    manager.end().await.unwrap();

    let result = actor_ref.send(Tick { value: 99 }, None).await;
    assert!(matches!(result, Err(relaycell::error::SendError::RuntimeStopped)));
}
