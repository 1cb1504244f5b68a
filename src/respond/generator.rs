// src/respond/generator.rs
//! Contextual reply templates, one branch per intent, with light
//! interpolation (customer name, extracted order number, primary topic).
//! Confidence is a fixed constant per branch.

use crate::analyze::{topics, Intent, MessageAnalysis};
use crate::response::{CustomerContext, ResponsePayload, ResponseSource};

pub fn generate(analysis: &MessageAnalysis, ctx: &CustomerContext) -> ResponsePayload {
    let intent = analysis.intent.intent;

    let (text, confidence) = match intent {
        Intent::Greeting => {
            let name = ctx
                .customer_name
                .as_deref()
                .map(|n| format!(" {n}"))
                .unwrap_or_default();
            (
                format!("Hello{name}! Welcome to our support chat. How can I help you today?"),
                0.9,
            )
        }
        Intent::Question => match topics::primary(&analysis.topics) {
            Some(topic) => (
                format!("Great question about {topic}! Let me find the right information for you."),
                0.8,
            ),
            None => (
                "Good question! Let me see what I can find for you.".to_string(),
                0.8,
            ),
        },
        Intent::Complaint => (
            "I'm sorry to hear things haven't gone smoothly. Let's get this fixed — could you \
             share a few more details so I can help?"
                .to_string(),
            0.85,
        ),
        Intent::Escalation => (
            "I understand you'd like to speak with a human agent. I'm connecting you with our \
             support team right now."
                .to_string(),
            0.95,
        ),
        Intent::OrderInquiry => match analysis.entities.primary_order_number() {
            Some(num) => (
                format!(
                    "Thanks — I can see you're asking about order {num}. Let me pull up its \
                     latest status for you."
                ),
                0.9,
            ),
            None => (
                "I can help with your order. Could you share your order number so I can look \
                 it up?"
                    .to_string(),
                0.9,
            ),
        },
        Intent::TechnicalIssue => (
            "Sorry about the technical trouble. Let's try a couple of quick checks — could you \
             tell me what you see when the problem happens?"
                .to_string(),
            0.85,
        ),
        Intent::Support => (
            "I'm here to help! Tell me a bit more about what you're trying to do and we'll \
             take it from there."
                .to_string(),
            0.8,
        ),
        Intent::Request => (
            "Got it — I'll take care of that request. Give me just a moment.".to_string(),
            0.75,
        ),
        Intent::General => (
            "Thanks for your message! Could you tell me a little more so I can point you in \
             the right direction?"
                .to_string(),
            0.6,
        ),
    };

    let payload =
        ResponsePayload::new(text, confidence, ResponseSource::ContextualAi).with_intent(intent.label());

    if intent == Intent::Escalation {
        payload.escalate()
    } else {
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::Analyzer;

    fn analysis_of(msg: &str) -> MessageAnalysis {
        Analyzer::with_seed().analyze(msg, None, &CustomerContext::default())
    }

    #[test]
    fn order_number_is_interpolated() {
        let a = analysis_of("My order number is ORD123456, any update?");
        let p = generate(&a, &CustomerContext::default());
        assert!(p.response.contains("ORD123456"), "{}", p.response);
        assert_eq!(p.intent.as_deref(), Some("order_inquiry"));
    }

    #[test]
    fn missing_order_number_asks_for_it() {
        let a = analysis_of("I have a problem with my order delivery");
        let p = generate(&a, &CustomerContext::default());
        assert!(p.response.contains("order number"), "{}", p.response);
    }

    #[test]
    fn escalation_branch_sets_the_flag() {
        let a = analysis_of("let me speak to a human");
        let p = generate(&a, &CustomerContext::default());
        assert_eq!(p.should_escalate, Some(true));
        assert!((p.confidence - 0.95).abs() < f32::EPSILON);
    }

    #[test]
    fn greeting_uses_the_customer_name() {
        let a = analysis_of("Hello");
        let ctx = CustomerContext {
            customer_name: Some("Maria".into()),
            ..CustomerContext::default()
        };
        let p = generate(&a, &ctx);
        assert!(p.response.starts_with("Hello Maria!"), "{}", p.response);
    }

    #[test]
    fn unclassified_message_gets_the_default_template() {
        let a = analysis_of("zzz qqq xyzzy");
        let p = generate(&a, &CustomerContext::default());
        assert!((p.confidence - 0.6).abs() < f32::EPSILON);
        assert_eq!(p.intent.as_deref(), Some("general"));
    }
}
