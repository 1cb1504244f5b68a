//! Proactive re-engagement: nudge a conversation that has gone quiet.
//!
//! The check is pull-based in the orchestrator (it runs when the next inbound
//! message arrives) and additionally runs on a background sweep tick so truly
//! abandoned conversations still surface. Either way a session is nudged at
//! most once; clearing the session is the only reset.

use chrono::{DateTime, Duration, Utc};

use crate::response::{ResponsePayload, ResponseSource};
use crate::session::Session;

pub const DEFAULT_IDLE_MINUTES: i64 = 5;
const REENGAGEMENT_CONFIDENCE: f32 = 0.8;

const REENGAGEMENT_MESSAGE: &str = "Are you still there? I'm happy to keep helping — just let \
                                    me know what you need, or I can hand things over to an agent.";

#[derive(Debug, Clone, Copy)]
pub struct ProactiveChecker {
    idle_after: Duration,
}

impl Default for ProactiveChecker {
    fn default() -> Self {
        Self {
            idle_after: Duration::minutes(DEFAULT_IDLE_MINUTES),
        }
    }
}

impl ProactiveChecker {
    pub fn new(idle_after: Duration) -> Self {
        Self { idle_after }
    }

    pub fn idle_after(&self) -> Duration {
        self.idle_after
    }

    /// True when the session has been quiet past the threshold and was never
    /// nudged before.
    pub fn should_engage(&self, session: &Session, now: DateTime<Utc>) -> bool {
        !session.proactive_engaged && now - session.last_activity > self.idle_after
    }
}

/// The fixed nudge payload.
pub fn reengagement_payload() -> ResponsePayload {
    ResponsePayload::new(
        REENGAGEMENT_MESSAGE,
        REENGAGEMENT_CONFIDENCE,
        ResponseSource::ProactiveEngagement,
    )
}
