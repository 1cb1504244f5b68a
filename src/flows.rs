//! Scripted conversation flows (hot-reloaded from `config/flows.toml`).
//!
//! A flow pairs trigger predicates with a canned response and optional
//! side-effect actions. Within one predicate, every present condition must
//! hold (AND); a flow fires when ANY of its predicates holds (OR); the first
//! matching flow in file order wins and short-circuits response generation.
//!
//! The file is reloaded on mtime change at each `current()` call. With no
//! file present the built-in seed applies, so the engine runs config-less.

use serde::Deserialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::RwLock,
    time::SystemTime,
};

use crate::analyze::{Intent, MessageAnalysis, Sentiment, UrgencyLevel};

fn default_flow_confidence() -> f32 {
    0.9
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct FlowSet {
    #[serde(default)]
    pub flows: Vec<Flow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Flow {
    pub name: String,
    #[serde(default)]
    pub triggers: Vec<Trigger>,
    pub response: String,
    #[serde(default = "default_flow_confidence")]
    pub confidence: f32,
    #[serde(default)]
    pub actions: Vec<FlowAction>,
    #[serde(default)]
    pub escalate: bool,
}

/// One AND-combined predicate. Absent conditions are not checked.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Trigger {
    pub intent: Option<Intent>,
    pub sentiment: Option<Sentiment>,
    pub urgency: Option<UrgencyLevel>,
    /// Case/whitespace-insensitive substring match against the message.
    #[serde(default)]
    pub keywords_any: Vec<String>,
}

/// Side effects a flow can request. Replayed through the `ActionSink` port;
/// the engine itself never performs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowAction {
    TagConversation,
    SetPriority,
    NotifyAgent,
    CreateTicket,
    SendEmail,
    ScheduleFollowup,
}

impl FlowAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowAction::TagConversation => "tag_conversation",
            FlowAction::SetPriority => "set_priority",
            FlowAction::NotifyAgent => "notify_agent",
            FlowAction::CreateTicket => "create_ticket",
            FlowAction::SendEmail => "send_email",
            FlowAction::ScheduleFollowup => "schedule_followup",
        }
    }
}

impl FlowSet {
    /// Built-in flows used when no config file exists.
    pub fn default_seed() -> Self {
        Self {
            flows: vec![
                Flow {
                    name: "greeting_welcome".into(),
                    triggers: vec![Trigger {
                        intent: Some(Intent::Greeting),
                        ..Trigger::default()
                    }],
                    response: "Hello! Welcome to our support chat. How can I help you today?"
                        .into(),
                    confidence: default_flow_confidence(),
                    actions: vec![FlowAction::TagConversation],
                    escalate: false,
                },
                Flow {
                    name: "frustrated_customer".into(),
                    triggers: vec![Trigger {
                        sentiment: Some(Sentiment::Negative),
                        urgency: Some(UrgencyLevel::High),
                        ..Trigger::default()
                    }],
                    response: "I'm really sorry about the trouble you're having. I've flagged \
                               this conversation for one of our senior agents so we can sort \
                               it out quickly."
                        .into(),
                    confidence: default_flow_confidence(),
                    actions: vec![FlowAction::NotifyAgent, FlowAction::SetPriority],
                    escalate: false,
                },
                Flow {
                    name: "human_handoff".into(),
                    triggers: vec![Trigger {
                        intent: Some(Intent::Escalation),
                        ..Trigger::default()
                    }],
                    response: "I understand you'd like to speak with a human agent. Let me \
                               connect you with a member of our support team — they'll pick \
                               up this conversation shortly."
                        .into(),
                    confidence: default_flow_confidence(),
                    actions: vec![FlowAction::NotifyAgent, FlowAction::CreateTicket],
                    escalate: true,
                },
                Flow {
                    name: "order_status".into(),
                    triggers: vec![Trigger {
                        intent: Some(Intent::OrderInquiry),
                        keywords_any: vec!["where".into(), "status".into(), "track".into()],
                        ..Trigger::default()
                    }],
                    response: "Let me check the status of your order. One moment while I pull \
                               up the latest tracking information."
                        .into(),
                    confidence: default_flow_confidence(),
                    actions: vec![FlowAction::TagConversation],
                    escalate: false,
                },
            ],
        }
    }
}

/// First flow whose predicate list contains a fully-satisfied predicate.
pub fn match_flow<'a>(
    set: &'a FlowSet,
    message: &str,
    analysis: &MessageAnalysis,
) -> Option<&'a Flow> {
    let text = normalize(message);
    set.flows
        .iter()
        .find(|flow| flow.triggers.iter().any(|t| trigger_matches(t, &text, analysis)))
}

fn trigger_matches(t: &Trigger, text: &str, analysis: &MessageAnalysis) -> bool {
    if let Some(intent) = t.intent {
        if analysis.intent.intent != intent {
            return false;
        }
    }
    if let Some(sentiment) = t.sentiment {
        if analysis.sentiment.sentiment != sentiment {
            return false;
        }
    }
    if let Some(urgency) = t.urgency {
        if analysis.urgency.level != urgency {
            return false;
        }
    }
    if !t.keywords_any.is_empty() && !t.keywords_any.iter().any(|p| contains(text, p)) {
        return false;
    }
    true
}

/* ----------------------------
Hot reload wrapper
---------------------------- */

pub const DEFAULT_FLOWS_CONFIG_PATH: &str = "config/flows.toml";
pub const ENV_FLOWS_CONFIG_PATH: &str = "FLOWS_CONFIG_PATH";

#[derive(Debug)]
pub struct HotReloadFlows {
    path: PathBuf,
    inner: RwLock<State>,
}

#[derive(Debug)]
struct State {
    set: FlowSet,
    last_modified: Option<SystemTime>,
}

impl HotReloadFlows {
    /// Create with a path; `None` resolves `FLOWS_CONFIG_PATH` or the default.
    pub fn new(path: Option<&Path>) -> Self {
        let path = path.map(Path::to_path_buf).unwrap_or_else(|| {
            std::env::var(ENV_FLOWS_CONFIG_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_FLOWS_CONFIG_PATH))
        });
        Self {
            path,
            inner: RwLock::new(State {
                set: FlowSet::default_seed(),
                last_modified: None,
            }),
        }
    }

    /// Get the latest flow set, reloading if the config file changed.
    pub fn current(&self) -> FlowSet {
        let (needs_reload, _new_mtime) = match fs::metadata(&self.path).and_then(|m| m.modified()) {
            Ok(mtime) => {
                let guard = self.inner.read().expect("flows lock poisoned");
                let changed = guard.last_modified != Some(mtime);
                (changed, Some(mtime))
            }
            // No file: keep whatever we have (the seed, or the last good load).
            Err(_) => (false, None),
        };

        if !needs_reload {
            return self.inner.read().expect("flows lock poisoned").set.clone();
        }

        let mut guard = self.inner.write().expect("flows lock poisoned");
        if let Ok(meta) = fs::metadata(&self.path) {
            if let Ok(mtime) = meta.modified() {
                if guard.last_modified != Some(mtime) {
                    match load_flows_file(&self.path) {
                        Ok(set) => {
                            guard.set = set;
                            guard.last_modified = Some(mtime);
                        }
                        Err(err) => {
                            // Keep serving the previous table on a bad edit.
                            tracing::warn!(target: "flows", error = %err, path = %self.path.display(), "flow config reload failed");
                        }
                    }
                }
            }
        }
        guard.set.clone()
    }
}

/// Load flows directly (no caching). Public for tests/tools.
pub fn load_flows_file(path: &Path) -> io::Result<FlowSet> {
    let raw = fs::read_to_string(path)?;
    let set: FlowSet =
        toml::from_str(&raw).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(set)
}

// --- internals (match the rules DSL text handling) ---

fn contains(text: &str, pat: &str) -> bool {
    let p = normalize(pat);
    if p.is_empty() {
        return true;
    }
    text.contains(p.as_str())
}

fn normalize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_space = false;
    for ch in input.chars() {
        let lc = ch.to_ascii_lowercase();
        if lc.is_whitespace() {
            if !last_space {
                out.push(' ');
                last_space = true;
            }
        } else {
            out.push(lc);
            last_space = false;
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::Analyzer;
    use crate::response::CustomerContext;

    fn analysis_of(msg: &str) -> MessageAnalysis {
        Analyzer::with_seed().analyze(msg, None, &CustomerContext::default())
    }

    #[test]
    fn greeting_matches_the_greeting_flow() {
        let set = FlowSet::default_seed();
        let a = analysis_of("Hello");
        let flow = match_flow(&set, "Hello", &a).expect("greeting flow");
        assert_eq!(flow.name, "greeting_welcome");
        assert!(!flow.escalate);
    }

    #[test]
    fn escalation_matches_the_handoff_flow() {
        let set = FlowSet::default_seed();
        let msg = "let me speak to a human";
        let a = analysis_of(msg);
        let flow = match_flow(&set, msg, &a).expect("handoff flow");
        assert_eq!(flow.name, "human_handoff");
        assert!(flow.escalate);
        assert!(flow.actions.contains(&FlowAction::NotifyAgent));
    }

    #[test]
    fn plain_question_matches_nothing() {
        let set = FlowSet::default_seed();
        let msg = "What is your return policy?";
        let a = analysis_of(msg);
        assert!(match_flow(&set, msg, &a).is_none());
    }

    #[test]
    fn conditions_within_a_trigger_are_anded() {
        // Negative sentiment alone must not fire the frustrated_customer flow;
        // it also requires high urgency.
        let set = FlowSet::default_seed();
        let msg = "I'm disappointed with the quality";
        let a = analysis_of(msg);
        assert_eq!(a.sentiment.sentiment, Sentiment::Negative);
        assert!(match_flow(&set, msg, &a).is_none());
    }

    #[test]
    fn first_matching_flow_wins() {
        let mut set = FlowSet::default_seed();
        // Prepend a catch-all-greetings flow; it must shadow greeting_welcome.
        set.flows.insert(
            0,
            Flow {
                name: "vip_greeting".into(),
                triggers: vec![Trigger {
                    intent: Some(Intent::Greeting),
                    ..Trigger::default()
                }],
                response: "Welcome back!".into(),
                confidence: 0.9,
                actions: vec![],
                escalate: false,
            },
        );
        let a = analysis_of("Hello");
        assert_eq!(match_flow(&set, "Hello", &a).unwrap().name, "vip_greeting");
    }

    #[test]
    fn keyword_predicates_are_case_and_whitespace_insensitive() {
        let set = FlowSet {
            flows: vec![Flow {
                name: "promo".into(),
                triggers: vec![Trigger {
                    keywords_any: vec!["discount  code".into()],
                    ..Trigger::default()
                }],
                response: "Here is your code.".into(),
                confidence: 0.9,
                actions: vec![],
                escalate: false,
            }],
        };
        let msg = "do you have a DISCOUNT\tcode?";
        let a = analysis_of(msg);
        assert!(match_flow(&set, msg, &a).is_some());
    }

    #[test]
    fn toml_flow_table_parses() {
        let raw = r#"
            [[flows]]
            name = "greeting_welcome"
            response = "Hi there!"
            actions = ["tag_conversation"]

            [[flows.triggers]]
            intent = "greeting"

            [[flows]]
            name = "refund_rage"
            response = "Let me get this sorted."
            escalate = true
            actions = ["notify_agent", "create_ticket"]

            [[flows.triggers]]
            sentiment = "negative"
            keywords_any = ["refund"]
        "#;
        let set: FlowSet = toml::from_str(raw).unwrap();
        assert_eq!(set.flows.len(), 2);
        assert_eq!(set.flows[1].triggers[0].sentiment, Some(Sentiment::Negative));
        assert!((set.flows[0].confidence - 0.9).abs() < f32::EPSILON);
    }
}
