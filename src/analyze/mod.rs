// src/analyze/mod.rs
//! Analysis pipeline entry: runs every classifier over an inbound message and
//! assembles the per-message `MessageAnalysis` record the rest of the engine
//! consumes. All scorers are pure; only the sentiment analyzer memoizes.

pub mod complexity;
pub mod entities;
pub mod intent;
pub mod language;
pub mod sentiment;
pub mod topics;
pub mod urgency;

use serde::{Deserialize, Serialize};

use crate::response::CustomerContext;
use crate::session::Session;

// Re-export convenient types.
pub use complexity::{ComplexityLevel, ComplexityMetrics, ComplexityResult};
pub use entities::Entities;
pub use intent::{Intent, IntentClassifier, IntentConfig, IntentResult};
pub use language::LanguageGuess;
pub use sentiment::{Sentiment, SentimentAnalyzer, SentimentResult, SentimentScores};
pub use topics::TopicScore;
pub use urgency::{UrgencyLevel, UrgencyResult};

/// Coarse position of the conversation, derived from how many messages the
/// session has seen (a caller-provided override wins).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStage {
    Opening,
    Engaged,
    Extended,
}

impl ConversationStage {
    pub fn from_message_count(count: u64) -> Self {
        match count {
            0..=1 => ConversationStage::Opening,
            2..=5 => ConversationStage::Engaged,
            _ => ConversationStage::Extended,
        }
    }
}

/// Everything the engine knows about a single inbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageAnalysis {
    pub intent: IntentResult,
    pub sentiment: SentimentResult,
    #[serde(default, skip_serializing_if = "Entities::is_empty")]
    pub entities: Entities,
    pub urgency: UrgencyResult,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<TopicScore>,
    pub language: LanguageGuess,
    pub complexity: ComplexityResult,
    pub stage: ConversationStage,
    /// Carried over from the session, when one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_intent: Option<Intent>,
    pub conversation_length: u64,
    pub escalation_attempts: u32,
}

/// Stateless facade over the individual scorers. Construct once, share.
#[derive(Debug)]
pub struct Analyzer {
    intents: IntentClassifier,
    sentiment: SentimentAnalyzer,
}

impl Analyzer {
    pub fn new(intents: IntentClassifier, sentiment: SentimentAnalyzer) -> Self {
        Self { intents, sentiment }
    }

    pub fn with_seed() -> Self {
        Self::new(IntentClassifier::with_seed(), SentimentAnalyzer::default())
    }

    pub fn analyze(
        &self,
        message: &str,
        prior: Option<&Session>,
        ctx: &CustomerContext,
    ) -> MessageAnalysis {
        let conversation_length = prior.map(|s| s.message_count).unwrap_or(0);
        let stage = ctx
            .stage
            .unwrap_or_else(|| ConversationStage::from_message_count(conversation_length));

        MessageAnalysis {
            intent: self.intents.classify(message),
            sentiment: self.sentiment.analyze(message),
            entities: entities::extract(message),
            urgency: urgency::assess(message),
            topics: topics::extract(message),
            language: language::detect(message),
            complexity: complexity::assess(message),
            stage,
            previous_intent: prior.and_then(|s| s.last_intent),
            conversation_length,
            escalation_attempts: prior.map(|s| s.escalation_attempts).unwrap_or(0),
        }
    }
}
