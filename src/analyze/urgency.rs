// src/analyze/urgency.rs
//! Urgency scoring: keyword indicators plus two secondary signals
//! (repeated `!`, shouting in all-caps). 0 indicators → low, 1 → medium,
//! 2 or more → high.

use serde::{Deserialize, Serialize};

const URGENCY_KEYWORDS: &[&str] = &[
    "urgent",
    "asap",
    "immediately",
    "right now",
    "right away",
    "emergency",
    "critical",
    "as soon as possible",
    "hurry",
    "time sensitive",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyLevel {
    Low,
    Medium,
    High,
}

impl UrgencyLevel {
    pub fn label(&self) -> &'static str {
        match self {
            UrgencyLevel::Low => "low",
            UrgencyLevel::Medium => "medium",
            UrgencyLevel::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrgencyResult {
    pub level: UrgencyLevel,
    /// Human-readable indicator labels that fired.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indicators: Vec<String>,
}

pub fn assess(message: &str) -> UrgencyResult {
    let text = message.to_lowercase();
    let mut indicators: Vec<String> = URGENCY_KEYWORDS
        .iter()
        .filter(|kw| text.contains(**kw))
        .map(|kw| kw.to_string())
        .collect();

    if message.chars().filter(|&c| c == '!').count() >= 2 {
        indicators.push("multiple_exclamations".to_string());
    }

    if is_shouting(message) {
        indicators.push("all_caps".to_string());
    }

    let level = match indicators.len() {
        0 => UrgencyLevel::Low,
        1 => UrgencyLevel::Medium,
        _ => UrgencyLevel::High,
    };

    UrgencyResult { level, indicators }
}

/// All-caps counts only for messages longer than 10 chars that actually
/// contain letters.
fn is_shouting(message: &str) -> bool {
    message.chars().count() > 10
        && message.chars().any(|c| c.is_alphabetic())
        && !message.chars().any(|c| c.is_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calm_text_is_low() {
        let r = assess("could you check my invoice when you get a chance");
        assert_eq!(r.level, UrgencyLevel::Low);
        assert!(r.indicators.is_empty());
    }

    #[test]
    fn repeated_exclamations_raise_to_medium() {
        let r = assess("I'm furious, this is broken!!!");
        assert!(r.level >= UrgencyLevel::Medium);
        assert!(r.indicators.iter().any(|i| i == "multiple_exclamations"));
    }

    #[test]
    fn keyword_plus_shouting_is_high() {
        let r = assess("URGENT: SITE IS DOWN");
        assert_eq!(r.level, UrgencyLevel::High);
        assert_eq!(r.indicators.len(), 2);
    }

    #[test]
    fn short_all_caps_does_not_count() {
        let r = assess("HELP");
        assert_eq!(r.level, UrgencyLevel::Low);
    }
}
