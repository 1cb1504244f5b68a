// src/respond/enhancer.rs
//! Non-destructive response enhancement.
//!
//! Applied in order: empathy prefix for clearly negative sentiment, urgency
//! acknowledgment (with a priority marker), customer-name splice after a
//! leading greeting word, and up to 3 follow-up suggestions per intent.

use rand::seq::IndexedRandom;

use crate::analyze::{Intent, MessageAnalysis, Sentiment, UrgencyLevel};
use crate::response::{CustomerContext, ResponsePayload};

/// Empathy prefixes; one is chosen at random per reply.
pub const EMPATHY_PHRASES: &[&str] = &[
    "I completely understand your frustration. ",
    "I'm really sorry you're dealing with this. ",
    "I sincerely apologize for the trouble. ",
    "I know how frustrating this must be. ",
];

pub const URGENCY_ACK: &str = "I understand this is urgent, so let's get right to it. ";

/// Negative sentiment must be at least this certain before we lead with empathy.
const EMPATHY_CONFIDENCE_GATE: f32 = 0.7;

pub fn enhance(
    mut payload: ResponsePayload,
    analysis: &MessageAnalysis,
    ctx: &CustomerContext,
) -> ResponsePayload {
    if analysis.sentiment.sentiment == Sentiment::Negative
        && analysis.sentiment.confidence > EMPATHY_CONFIDENCE_GATE
    {
        let phrase = EMPATHY_PHRASES
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(EMPATHY_PHRASES[0]);
        payload.response = format!("{phrase}{}", payload.response);
        payload.tone = Some("empathetic".to_string());
    }

    if analysis.urgency.level == UrgencyLevel::High {
        payload.response = format!("{URGENCY_ACK}{}", payload.response);
        payload.priority = Some("high".to_string());
    }

    if let Some(name) = ctx.customer_name.as_deref() {
        payload.response = splice_name(payload.response, name);
    }

    payload.with_suggestions(
        suggestions_for(analysis.intent.intent)
            .iter()
            .map(|s| s.to_string())
            .collect(),
    )
}

/// Insert the name after a leading "Hello"/"Hi" unless it is already present.
fn splice_name(response: String, name: &str) -> String {
    if response.contains(name) {
        return response;
    }
    for greeting in ["Hello", "Hi"] {
        if let Some(rest) = response.strip_prefix(greeting) {
            return format!("{greeting} {name}{rest}");
        }
    }
    response
}

fn suggestions_for(intent: Intent) -> &'static [&'static str] {
    match intent {
        Intent::Greeting => &["Track an order", "Billing questions", "Talk to an agent"],
        Intent::Question => &[
            "Browse the help center",
            "Ask another question",
            "Talk to an agent",
        ],
        Intent::Complaint => &["Request a refund", "Share order details", "Talk to an agent"],
        Intent::Request => &["Check request status", "Add more details", "Talk to an agent"],
        Intent::Escalation => &["Stay in chat", "Request a callback", "Email support instead"],
        Intent::Support => &["Reset my password", "Track an order", "Billing questions"],
        Intent::OrderInquiry => &[
            "Track my order",
            "Change delivery address",
            "Cancel my order",
        ],
        Intent::TechnicalIssue => &["Clear cache and retry", "Report a bug", "Talk to an agent"],
        Intent::General => &["Order help", "Technical support", "Talk to an agent"],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::Analyzer;
    use crate::respond::generator::generate;
    use crate::response::ResponseSource;

    fn enhanced(msg: &str, ctx: &CustomerContext) -> ResponsePayload {
        let analysis = Analyzer::with_seed().analyze(msg, None, ctx);
        let base = generate(&analysis, ctx);
        enhance(base, &analysis, ctx)
    }

    #[test]
    fn negative_sentiment_gets_an_empathy_prefix() {
        let p = enhanced("I'm furious, this is broken!!!", &CustomerContext::default());
        assert!(
            EMPATHY_PHRASES.iter().any(|ph| p.response.starts_with(ph)),
            "no empathy prefix in: {}",
            p.response
        );
        assert_eq!(p.tone.as_deref(), Some("empathetic"));
    }

    #[test]
    fn mildly_negative_text_skips_empathy() {
        // A single lexicon hit keeps confidence at the 0.7 gate, not above it.
        let p = enhanced("the box arrived broken today", &CustomerContext::default());
        assert!(p.tone.is_none(), "tone set for: {}", p.response);
    }

    #[test]
    fn high_urgency_sets_priority_and_acknowledges() {
        let p = enhanced("URGENT: SITE IS DOWN RIGHT NOW", &CustomerContext::default());
        assert_eq!(p.priority.as_deref(), Some("high"));
        assert!(p.response.starts_with(URGENCY_ACK), "{}", p.response);
    }

    #[test]
    fn name_is_spliced_into_a_leading_greeting() {
        let ctx = CustomerContext {
            customer_name: Some("Maria".into()),
            ..CustomerContext::default()
        };
        let analysis = Analyzer::with_seed().analyze("Hello", None, &CustomerContext::default());
        let base = ResponsePayload::new(
            "Hello! Welcome to our support chat.",
            0.9,
            ResponseSource::ContextualAi,
        );
        let p = enhance(base, &analysis, &ctx);
        assert!(p.response.starts_with("Hello Maria!"), "{}", p.response);
    }

    #[test]
    fn name_is_not_duplicated() {
        let ctx = CustomerContext {
            customer_name: Some("Maria".into()),
            ..CustomerContext::default()
        };
        let analysis = Analyzer::with_seed().analyze("Hello", None, &ctx);
        let base = ResponsePayload::new(
            "Hello Maria! Welcome back.",
            0.9,
            ResponseSource::ContextualAi,
        );
        let p = enhance(base, &analysis, &ctx);
        assert_eq!(p.response.matches("Maria").count(), 1);
    }

    #[test]
    fn suggestions_are_attached_and_capped() {
        let p = enhanced("Where is my order ORD123456?", &CustomerContext::default());
        assert!(!p.suggestions.is_empty());
        assert!(p.suggestions.len() <= 3);
        assert!(p.suggestions.iter().any(|s| s.contains("order")));
    }
}
