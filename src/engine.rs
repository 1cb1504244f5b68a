//! # Response Engine
//! Orchestrates one inbound message through the pipeline:
//! analyze → flow check → proactive check → generate → enhance → update state.
//!
//! The flow and proactive stages short-circuit response generation but still
//! record the turn, so session counters hold on every path. Any error inside
//! the pipeline is caught once here and degrades to the fallback reply; the
//! failure is logged and counted but never reaches the chat user.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::counter;
use tracing::warn;

use crate::actions::{anon_hash, ActionContext, ActionSink, TracingActionSink};
use crate::analyze::{Analyzer, Intent, IntentClassifier, IntentConfig, MessageAnalysis, Sentiment, SentimentAnalyzer};
use crate::flows::{self, FlowSet, HotReloadFlows};
use crate::proactive::{self, ProactiveChecker};
use crate::respond;
use crate::response::{CustomerContext, ResponsePayload, ResponseSource};
use crate::session::{ResponseTrace, SessionConfig, SessionStore, TurnRecord};

pub const ENV_INTENT_CONFIG_PATH: &str = "INTENT_CONFIG_PATH";
pub const DEFAULT_INTENT_CONFIG_PATH: &str = "config/intents.json";

const FALLBACK_CONFIDENCE: f32 = 0.5;
const FALLBACK_MESSAGE: &str = "I'm sorry, I didn't quite catch that. Could you rephrase, or \
                                tell me a bit more about what you need?";

pub struct ResponseEngine {
    analyzer: Analyzer,
    flows: HotReloadFlows,
    sessions: Arc<SessionStore>,
    actions: Arc<dyn ActionSink>,
    proactive: ProactiveChecker,
}

impl ResponseEngine {
    pub fn new(
        analyzer: Analyzer,
        flows: HotReloadFlows,
        sessions: Arc<SessionStore>,
        actions: Arc<dyn ActionSink>,
        proactive: ProactiveChecker,
    ) -> Self {
        Self {
            analyzer,
            flows,
            sessions,
            actions,
            proactive,
        }
    }

    /// Engine on embedded seeds and a fresh store; used by tests and as the
    /// zero-config startup path.
    pub fn with_seed(actions: Arc<dyn ActionSink>) -> Self {
        Self::new(
            Analyzer::with_seed(),
            HotReloadFlows::new(None),
            Arc::new(SessionStore::default()),
            actions,
            ProactiveChecker::default(),
        )
    }

    /// Engine wired from config paths (env-overridable), the production path.
    pub fn from_env(actions: Arc<dyn ActionSink>) -> anyhow::Result<Self> {
        let intent_path = std::env::var(ENV_INTENT_CONFIG_PATH)
            .unwrap_or_else(|_| DEFAULT_INTENT_CONFIG_PATH.to_string());
        let intents = IntentClassifier::from_config(IntentConfig::load_from_file(intent_path))?;

        Ok(Self::new(
            Analyzer::new(intents, SentimentAnalyzer::default()),
            HotReloadFlows::new(None),
            Arc::new(SessionStore::new(SessionConfig::default())),
            actions,
            ProactiveChecker::default(),
        ))
    }

    /// Default sink variant, convenient for binaries.
    pub fn with_seed_and_tracing_sink() -> Self {
        Self::with_seed(Arc::new(TracingActionSink))
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Current flow table (post hot-reload), for the debug surface.
    pub fn flows_snapshot(&self) -> FlowSet {
        self.flows.current()
    }

    /// Classifier-only view of a message, no state touched.
    pub fn analyze_message(&self, message: &str, ctx: &CustomerContext) -> MessageAnalysis {
        self.analyzer.analyze(message, None, ctx)
    }

    pub fn clear_session(&self, conversation_id: &str) -> bool {
        self.sessions.clear(conversation_id)
    }

    /// Produce the automated reply for one inbound message.
    pub async fn respond(
        &self,
        message: &str,
        conversation_id: &str,
        ctx: &CustomerContext,
    ) -> ResponsePayload {
        self.respond_at(message, conversation_id, ctx, Utc::now()).await
    }

    /// Deterministic-clock variant used by tests and the background sweep.
    pub async fn respond_at(
        &self,
        message: &str,
        conversation_id: &str,
        ctx: &CustomerContext,
        now: DateTime<Utc>,
    ) -> ResponsePayload {
        match self.try_respond(message, conversation_id, ctx, now).await {
            Ok(payload) => payload,
            Err(err) => {
                warn!(
                    target: "engine",
                    conversation = %anon_hash(conversation_id),
                    error = ?err,
                    "response pipeline failed, serving fallback"
                );
                counter!("engine_fallback_total").increment(1);
                let payload = self.fallback_payload(message);
                self.record(conversation_id, None, &payload, now);
                payload
            }
        }
    }

    async fn try_respond(
        &self,
        message: &str,
        conversation_id: &str,
        ctx: &CustomerContext,
        now: DateTime<Utc>,
    ) -> anyhow::Result<ResponsePayload> {
        let prior = self.sessions.snapshot(conversation_id);
        let analysis = self.analyzer.analyze(message, prior.as_ref(), ctx);

        // Flows win over everything else.
        let flow_set = self.flows.current();
        if let Some(flow) = flows::match_flow(&flow_set, message, &analysis) {
            for action in &flow.actions {
                let actx = ActionContext {
                    conversation_id,
                    flow: &flow.name,
                };
                // Side effects are best-effort; the reply is already decided.
                if let Err(err) = self.actions.dispatch(actx, *action).await {
                    warn!(
                        target: "actions",
                        flow = %flow.name,
                        action = action.as_str(),
                        error = ?err,
                        "flow action failed"
                    );
                }
            }

            let mut payload =
                ResponsePayload::new(flow.response.clone(), flow.confidence, ResponseSource::AutomatedFlow)
                    .with_intent(analysis.intent.intent.label());
            if flow.escalate || analysis.intent.intent == Intent::Escalation {
                payload = payload.escalate();
            }
            self.record(conversation_id, Some(&analysis), &payload, now);
            return Ok(payload);
        }

        // Quiet conversation: answer with the nudge instead.
        if let Some(session) = prior.as_ref() {
            if self.proactive.should_engage(session, now)
                && self.sessions.mark_proactive(conversation_id)
            {
                let payload = proactive::reengagement_payload();
                self.record(conversation_id, Some(&analysis), &payload, now);
                return Ok(payload);
            }
        }

        let generated = respond::generate(&analysis, ctx);
        let enhanced = respond::enhance(generated, &analysis, ctx);
        self.record(conversation_id, Some(&analysis), &enhanced, now);
        Ok(enhanced)
    }

    /// Scheduled-tick complement to the pull-based proactive check: nudge
    /// every idle, never-engaged session. Returns the nudges for the host to
    /// deliver; session message counts are untouched (no inbound turn).
    pub async fn proactive_sweep(&self, now: DateTime<Utc>) -> Vec<(String, ResponsePayload)> {
        let ids = self
            .sessions
            .idle_candidates(self.proactive.idle_after(), now);

        let mut nudges = Vec::with_capacity(ids.len());
        for id in ids {
            if self.sessions.mark_proactive(&id) {
                tracing::info!(
                    target: "proactive",
                    conversation = %anon_hash(&id),
                    "idle conversation nudged"
                );
                counter!("engine_proactive_nudges_total").increment(1);
                nudges.push((id, proactive::reengagement_payload()));
            }
        }
        nudges
    }

    /// Best-effort degraded reply; still classifies enough to decide whether
    /// a human should take over.
    fn fallback_payload(&self, message: &str) -> ResponsePayload {
        let analysis = self.analyzer.analyze(message, None, &CustomerContext::default());
        let mut payload = ResponsePayload::new(
            FALLBACK_MESSAGE,
            FALLBACK_CONFIDENCE,
            ResponseSource::IntelligentFallback,
        )
        .with_intent(analysis.intent.intent.label());

        if analysis.intent.intent == Intent::Escalation
            || analysis.sentiment.sentiment == Sentiment::Negative
        {
            payload = payload.escalate();
        }
        payload
    }

    fn record(
        &self,
        conversation_id: &str,
        analysis: Option<&MessageAnalysis>,
        payload: &ResponsePayload,
        now: DateTime<Utc>,
    ) {
        let turn = TurnRecord {
            intent: analysis.map(|a| a.intent.intent).unwrap_or(Intent::General),
            topics: analysis
                .map(|a| a.topics.iter().map(|t| t.topic.clone()).collect())
                .unwrap_or_default(),
            trace: ResponseTrace {
                confidence: payload.confidence,
                source: payload.source,
                at: now,
            },
        };
        self.sessions.record_turn(conversation_id, turn, now);
        counter!("engine_responses_total", "source" => payload.source.as_str()).increment(1);
    }
}
