//! response.rs — Response payload structures shared by the engine and the API.
//!
//! The payload is the only thing callers see: the reply text, a confidence in
//! <0.0, 1.0>, a source tag saying which stage produced it, and optional
//! escalation/personalization markers added by the enhancer. Nothing here is
//! persisted by this crate; the host stores messages through its own storage.

use serde::{Deserialize, Serialize};

/// Which stage of the pipeline produced the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    ContextualAi,
    AutomatedFlow,
    ProactiveEngagement,
    IntelligentFallback,
}

impl ResponseSource {
    /// Stable label for logs and metric tags.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseSource::ContextualAi => "contextual_ai",
            ResponseSource::AutomatedFlow => "automated_flow",
            ResponseSource::ProactiveEngagement => "proactive_engagement",
            ResponseSource::IntelligentFallback => "intelligent_fallback",
        }
    }
}

/// Complete automated reply, including explainability markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsePayload {
    pub response: String,
    /// Certainty of the reply in <0.0, 1.0>.
    pub confidence: f32,
    pub source: ResponseSource,
    /// Intent label the reply was keyed on, when one was classified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    /// Set when the conversation should be handed to a human agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_escalate: Option<bool>,
    /// Up to 3 short follow-up suggestions attached by the enhancer.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

impl ResponsePayload {
    pub fn new(response: impl Into<String>, confidence: f32, source: ResponseSource) -> Self {
        Self {
            response: response.into(),
            confidence: clamp01(confidence),
            source,
            intent: None,
            should_escalate: None,
            suggestions: Vec::new(),
            tone: None,
            priority: None,
        }
    }

    /// Attach the classified intent label (builder style).
    pub fn with_intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = Some(intent.into());
        self
    }

    /// Mark the reply as requiring a human hand-off.
    pub fn escalate(mut self) -> Self {
        self.should_escalate = Some(true);
        self
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self.suggestions.truncate(3);
        self
    }
}

/// Typed caller context replacing the duck-typed context object of the
/// original console. All fields optional; unknown fields are rejected by serde.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomerContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    /// Explicit override of the derived conversation stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<crate::analyze::ConversationStage>,
}

pub(crate) fn clamp01(x: f32) -> f32 {
    if x < 0.0 {
        0.0
    } else if x > 1.0 {
        1.0
    } else {
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_payload_shape_matches_contract() {
        let p = ResponsePayload::new("Hello! How can I help you today?", 0.9, ResponseSource::AutomatedFlow)
            .with_intent("greeting")
            .with_suggestions(vec![
                "Track my order".to_string(),
                "Talk to an agent".to_string(),
            ]);

        let v = serde_json::to_value(&p).unwrap();

        assert_eq!(v["source"], serde_json::json!("automated_flow"));
        assert_eq!(v["intent"], serde_json::json!("greeting"));

        let conf = v["confidence"].as_f64().unwrap();
        assert!((conf - 0.9).abs() < 1e-6, "confidence ~= 0.9, got {}", conf);

        // Optional markers are absent until set.
        assert!(v.get("should_escalate").is_none());
        assert!(v.get("priority").is_none());
        assert_eq!(v["suggestions"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn suggestions_are_capped_at_three() {
        let p = ResponsePayload::new("x", 0.5, ResponseSource::ContextualAi).with_suggestions(vec![
            "a".into(),
            "b".into(),
            "c".into(),
            "d".into(),
        ]);
        assert_eq!(p.suggestions.len(), 3);
    }

    #[test]
    fn confidence_is_clamped() {
        let p = ResponsePayload::new("x", 1.7, ResponseSource::ContextualAi);
        assert!((p.confidence - 1.0).abs() < f32::EPSILON);
    }
}
