//! Side-effect port for flow actions.
//!
//! The reference console stubbed these out; here they terminate at an
//! injected `ActionSink` so a real deployment can wire ticketing, email, or
//! agent notification without touching classification code. The default sink
//! only logs and counts. Conversation ids are logged as short hashes, never
//! raw.

use async_trait::async_trait;
use metrics::counter;
use tracing::info;

use crate::flows::FlowAction;

/// What the sink gets to know about the action's origin.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    pub conversation_id: &'a str,
    /// Name of the flow that requested the action.
    pub flow: &'a str,
}

#[async_trait]
pub trait ActionSink: Send + Sync {
    async fn dispatch(&self, ctx: ActionContext<'_>, action: FlowAction) -> anyhow::Result<()>;
}

/// Anonymized id for logs: first 6 bytes of a SHA-256, hex-encoded.
pub fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Default sink: structured log + counter per action, no real side effects.
#[derive(Debug, Default, Clone)]
pub struct TracingActionSink;

#[async_trait]
impl ActionSink for TracingActionSink {
    async fn dispatch(&self, ctx: ActionContext<'_>, action: FlowAction) -> anyhow::Result<()> {
        info!(
            target: "actions",
            conversation = %anon_hash(ctx.conversation_id),
            flow = %ctx.flow,
            action = action.as_str(),
            "flow action dispatched"
        );
        counter!("engine_flow_actions_total", "action" => action.as_str()).increment(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anon_hash_is_short_stable_and_input_sensitive() {
        let a = anon_hash("conversation-1");
        let b = anon_hash("conversation-1");
        let c = anon_hash("conversation-2");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 12);
    }

    #[tokio::test]
    async fn tracing_sink_accepts_every_action() {
        let sink = TracingActionSink;
        let ctx = ActionContext {
            conversation_id: "c1",
            flow: "human_handoff",
        };
        for action in [
            FlowAction::TagConversation,
            FlowAction::SetPriority,
            FlowAction::NotifyAgent,
            FlowAction::CreateTicket,
            FlowAction::SendEmail,
            FlowAction::ScheduleFollowup,
        ] {
            sink.dispatch(ctx, action).await.unwrap();
        }
    }
}
