//! Shared `Reject`-routing helper (`spec.md` §4.5), used by both the
//! inbound transport (triggers 1-3: unknown message type, unknown
//! receiver, decode failure) and the mailbox worker (trigger 4: no handler
//! for a remote-origin envelope).

// Layer 1: Standard library
// (none)

// Layer 2: Third-party
// (none)

// Layer 3: Internal
use crate::message::Reject;
use crate::reference::Reference;

/// Route a `Reject` back to `sender`, unless there is no sender or its
/// endpoint is empty (`spec.md` §4.5: "If `sender_endpoint` is missing or
/// empty, the reject is dropped"). Delivery of the reject itself is
/// best-effort: a failure is logged, never escalated — "no infinite reject
/// storms".
pub(crate) async fn route(
    sender: Option<&Reference>,
    message_type: impl Into<String>,
    reason: impl Into<String>,
    rejected_by: impl Into<String>,
) {
    let message_type = message_type.into();

    let Some(sender) = sender else {
        tracing::debug!(message_type = %message_type, "dropping reject: no sender to route it to");
        return;
    };

    if let Reference::Remote(remote) = sender {
        if remote.endpoint().is_empty() {
            tracing::debug!(message_type = %message_type, "dropping reject: sender endpoint is empty");
            return;
        }
    }

    let reject = Reject {
        message_type: message_type.clone(),
        reason: reason.into(),
        rejected_by: rejected_by.into(),
    };

    if let Err(err) = sender.send(reject, None).await {
        tracing::debug!(message_type = %message_type, error = %err, "failed to deliver reject");
    }
}
