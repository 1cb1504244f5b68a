// src/analyze/intent.rs
//! Intent classification: keyword/regex scoring over a fixed intent set.
//!
//! Each intent accumulates `keyword_weight` per case-insensitive substring hit
//! and `pattern_weight` per regex hit, capped at the intent's `max_confidence`.
//! The highest-scoring intent wins; ties go to the first intent in declaration
//! order. Anything at or below the floor falls back to `general`.
//!
//! The whole weight table is data (`IntentConfig`): an embedded default seed,
//! optionally overridden by a JSON file so weights can be tuned without a
//! rebuild.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Classified purpose of a user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    Question,
    Complaint,
    Request,
    Escalation,
    Support,
    OrderInquiry,
    TechnicalIssue,
    /// Fallback label when nothing scores above the floor.
    General,
}

impl Intent {
    pub fn label(&self) -> &'static str {
        match self {
            Intent::Greeting => "greeting",
            Intent::Question => "question",
            Intent::Complaint => "complaint",
            Intent::Request => "request",
            Intent::Escalation => "escalation",
            Intent::Support => "support",
            Intent::OrderInquiry => "order_inquiry",
            Intent::TechnicalIssue => "technical_issue",
            Intent::General => "general",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of intent classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentResult {
    pub intent: Intent,
    pub confidence: f32,
    /// Keywords and patterns that contributed to the winning score.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched: Vec<String>,
}

/* ----------------------------
Config schema (from JSON)
---------------------------- */

fn default_keyword_weight() -> f32 {
    0.1
}
fn default_pattern_weight() -> f32 {
    0.3
}
fn default_floor() -> f32 {
    0.3
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntentConfig {
    /// Score added per matched keyword (substring, case-insensitive).
    #[serde(default = "default_keyword_weight")]
    pub keyword_weight: f32,
    /// Score added per matched regex pattern.
    #[serde(default = "default_pattern_weight")]
    pub pattern_weight: f32,
    /// Scores must exceed this to beat the `general` fallback.
    #[serde(default = "default_floor")]
    pub default_floor: f32,
    #[serde(default)]
    pub intents: Vec<IntentRule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntentRule {
    pub intent: Intent,
    /// Lower-case substrings.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Regex sources (compatible with the `regex` crate, use `(?i)` as needed).
    #[serde(default)]
    pub patterns: Vec<String>,
    pub max_confidence: f32,
}

impl IntentConfig {
    /// Load from a JSON file, falling back to the built-in seed on any error.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match std::fs::read_to_string(path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|_| Self::default_seed()),
            Err(_) => Self::default_seed(),
        }
    }

    /// Built-in weight table. The enumeration order here is the tie-break
    /// order and must stay stable.
    pub fn default_seed() -> Self {
        fn rule(intent: Intent, max: f32, keywords: &[&str], patterns: &[&str]) -> IntentRule {
            IntentRule {
                intent,
                keywords: keywords.iter().map(|s| s.to_string()).collect(),
                patterns: patterns.iter().map(|s| s.to_string()).collect(),
                max_confidence: max,
            }
        }

        Self {
            keyword_weight: default_keyword_weight(),
            pattern_weight: default_pattern_weight(),
            default_floor: default_floor(),
            intents: vec![
                rule(
                    Intent::Greeting,
                    0.95,
                    &[
                        "hello",
                        "good morning",
                        "good afternoon",
                        "good evening",
                        "greetings",
                        "howdy",
                    ],
                    &[
                        r"(?i)^\s*(hello|hi|hey|howdy|greetings)\b",
                        r"(?i)^\s*good\s+(morning|afternoon|evening)\b",
                        r"(?i)\b(hello|hi|hey|greetings)\b",
                        r"(?i)^\s*(hello|hi|hey|howdy|greetings)[\s!.,?]*$",
                    ],
                ),
                rule(
                    Intent::Question,
                    0.85,
                    &[
                        "how do",
                        "what is",
                        "what are",
                        "when will",
                        "where is",
                        "can i",
                        "could you",
                        "do you",
                        "is there",
                        "why",
                    ],
                    &[
                        r"\?",
                        r"(?i)^\s*(what|how|why|when|where|who|which)\b",
                        r"(?i)\b(can|could|would|do|does)\s+(you|i|we|it|there)\b",
                    ],
                ),
                rule(
                    Intent::Complaint,
                    0.9,
                    &[
                        "disappointed",
                        "frustrated",
                        "angry",
                        "furious",
                        "terrible",
                        "awful",
                        "horrible",
                        "unacceptable",
                        "worst",
                        "not working",
                        "damaged",
                        "defective",
                        "poor quality",
                        "broken",
                    ],
                    &[
                        r"(?i)\b(terrible|awful|horrible|unacceptable|worst|furious|disgusted|outraged)\b",
                        r"(?i)\b(broken|damaged|defective|faulty|useless)\b",
                        r"(?i)\b(not|never|no longer)\s+(work(s|ing)?|arriv(e|ed|ing)|happy|satisfied)\b",
                    ],
                ),
                rule(
                    Intent::Request,
                    0.85,
                    &[
                        "please",
                        "can you",
                        "could you",
                        "i need",
                        "i want",
                        "i would like",
                        "help me",
                        "send me",
                        "refund",
                        "cancel",
                        "update my",
                    ],
                    &[
                        r"(?i)\bi\s+(need|want|would\s+like)\b",
                        r"(?i)\b(please|kindly)\b",
                        r"(?i)^\s*(send|give|change|update|cancel|refund)\b",
                    ],
                ),
                rule(
                    Intent::Escalation,
                    0.95,
                    &[
                        "speak to a human",
                        "talk to a human",
                        "speak to someone",
                        "talk to someone",
                        "speak to a person",
                        "talk to a person",
                        "human agent",
                        "real person",
                        "live agent",
                        "supervisor",
                        "manager",
                        "escalate",
                    ],
                    &[
                        r"(?i)(speak|talk)\s+(to|with)\s+(a\s+|an\s+|the\s+)?(real\s+|live\s+)?(human|person|someone|agent|manager|supervisor|representative)",
                        r"(?i)\b(human|real\s+person|live\s+agent|supervisor|manager|escalate|agent|representative|person)\b",
                        r"(?i)\blet\s+me\s+(speak|talk)\b",
                        r"(?i)\bescalat(e|ed|ing|ion)\b",
                    ],
                ),
                rule(
                    Intent::Support,
                    0.8,
                    &[
                        "help",
                        "support",
                        "assistance",
                        "guidance",
                        "stuck",
                        "confused",
                        "how do i",
                    ],
                    &[
                        r"(?i)\b(help|support|assist(ance)?)\b",
                        r"(?i)\bhow\s+do\s+i\b",
                        r"(?i)\b(stuck|confused|lost)\b",
                    ],
                ),
                rule(
                    Intent::OrderInquiry,
                    0.9,
                    &[
                        "order",
                        "purchase",
                        "delivery",
                        "shipping",
                        "package",
                        "tracking",
                        "shipment",
                        "where is my",
                    ],
                    &[
                        r"(?i)\b(order|purchase|transaction)\s*(#|number|no\.?|id)",
                        r"(?i)\b(order|purchase|transaction)\s*(#|number|no\.?|id)?\s*:?\s*[A-Za-z0-9][A-Za-z0-9-]{5,}",
                        r"(?i)\bwhere\s+is\s+my\s+(order|package|delivery|shipment)\b",
                        r"(?i)\b(track(ing)?|shipped|delivery\s+status|shipping\s+status)\b",
                    ],
                ),
                rule(
                    Intent::TechnicalIssue,
                    0.9,
                    &[
                        "error",
                        "bug",
                        "crash",
                        "glitch",
                        "not loading",
                        "won't load",
                        "log in",
                        "login",
                        "password",
                        "website",
                    ],
                    &[
                        r"(?i)\b(error|bug|crash(es|ed|ing)?|glitch|exception)\b",
                        r"(?i)\b(not|won't|can't|cannot|doesn't)\s+(load(ing)?|work(ing)?|open|connect|log\s*in|sign\s*in)\b",
                        r"(?i)\b(404|500|502|503|timeout|timed\s+out)\b",
                    ],
                ),
            ],
        }
    }
}

/* ----------------------------
Compiled classifier
---------------------------- */

#[derive(Debug)]
struct CompiledIntent {
    rule: IntentRule,
    regexes: Vec<Regex>,
}

/// Pure classifier: no side effects, no clock.
#[derive(Debug)]
pub struct IntentClassifier {
    keyword_weight: f32,
    pattern_weight: f32,
    default_floor: f32,
    compiled: Vec<CompiledIntent>,
}

impl IntentClassifier {
    /// Compile all patterns up front; a bad regex in a config file is a load
    /// error, not a per-message one.
    pub fn from_config(cfg: IntentConfig) -> anyhow::Result<Self> {
        let compiled = cfg
            .intents
            .into_iter()
            .map(|rule| {
                let regexes = rule
                    .patterns
                    .iter()
                    .map(|p| {
                        Regex::new(p).map_err(|e| {
                            anyhow::anyhow!("intent `{}` regex error: {}", rule.intent, e)
                        })
                    })
                    .collect::<anyhow::Result<Vec<_>>>()?;
                Ok(CompiledIntent { rule, regexes })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Self {
            keyword_weight: cfg.keyword_weight,
            pattern_weight: cfg.pattern_weight,
            default_floor: cfg.default_floor,
            compiled,
        })
    }

    pub fn with_seed() -> Self {
        Self::from_config(IntentConfig::default_seed()).expect("seed intent config compiles")
    }

    pub fn classify(&self, message: &str) -> IntentResult {
        let text = message.to_lowercase();

        let mut best: Option<(Intent, f32)> = None;
        let mut best_matched: Vec<String> = Vec::new();

        for ci in &self.compiled {
            let mut score = 0.0f32;
            let mut matched = Vec::new();

            for kw in &ci.rule.keywords {
                if text.contains(kw.as_str()) {
                    score += self.keyword_weight;
                    matched.push(kw.clone());
                }
            }
            for re in &ci.regexes {
                if re.is_match(message) {
                    score += self.pattern_weight;
                    matched.push(format!("pattern:{}", re.as_str()));
                }
            }

            let score = score.min(ci.rule.max_confidence);

            // Strict `>` keeps the first intent on ties (stable enumeration order).
            if best.map_or(score > 0.0, |(_, s)| score > s) {
                best = Some((ci.rule.intent, score));
                best_matched = matched;
            }
        }

        match best {
            Some((intent, confidence)) if confidence > self.default_floor => IntentResult {
                intent,
                confidence,
                matched: best_matched,
            },
            _ => IntentResult {
                intent: Intent::General,
                confidence: self.default_floor,
                matched: Vec::new(),
            },
        }
    }
}
