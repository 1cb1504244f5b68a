// src/analyze/sentiment.rs
//! Word-list sentiment scoring with a bounded exact-string memo cache.
//!
//! The three lists live in `sentiment_lexicon.json` at the repo root and are
//! embedded at compile time. The category with the strictly highest count
//! wins; ties default to neutral. Confidence is `min(0.9, 0.6 + 0.1 * n)`
//! for `n` winning hits, or 0.5 when nothing matched at all.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

#[derive(Debug, Deserialize)]
struct Lexicon {
    positive: Vec<String>,
    negative: Vec<String>,
    neutral: Vec<String>,
}

static LEXICON: Lazy<Lexicon> = Lazy::new(|| {
    let raw = include_str!("../../sentiment_lexicon.json");
    serde_json::from_str::<Lexicon>(raw).expect("valid sentiment lexicon")
});

/// Message polarity label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn label(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

/// Raw per-list hit counts, kept for explainability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentScores {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub sentiment: Sentiment,
    pub confidence: f32,
    pub scores: SentimentScores,
}

#[derive(Debug, Default)]
struct CacheInner {
    map: HashMap<String, SentimentResult>,
    // Insertion order for FIFO eviction once `capacity` is reached.
    order: VecDeque<String>,
}

/// Analyzer with a capacity-bounded memo cache keyed by the lower-cased
/// trimmed message. Exact-string memoization, not semantic.
#[derive(Debug)]
pub struct SentimentAnalyzer {
    cache: Mutex<CacheInner>,
    capacity: usize,
}

pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

impl Default for SentimentAnalyzer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl SentimentAnalyzer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cache: Mutex::new(CacheInner::default()),
            capacity: capacity.max(1),
        }
    }

    pub fn analyze(&self, message: &str) -> SentimentResult {
        let key = message.trim().to_lowercase();

        {
            let cache = self.cache.lock().expect("sentiment cache mutex poisoned");
            if let Some(hit) = cache.map.get(&key) {
                return hit.clone();
            }
        }

        let result = score(&key);

        let mut cache = self.cache.lock().expect("sentiment cache mutex poisoned");
        if !cache.map.contains_key(&key) {
            if cache.map.len() >= self.capacity {
                if let Some(oldest) = cache.order.pop_front() {
                    cache.map.remove(&oldest);
                }
            }
            cache.order.push_back(key.clone());
            cache.map.insert(key, result.clone());
        }
        result
    }

    /// Number of memoized entries (diagnostics).
    pub fn cache_len(&self) -> usize {
        self.cache.lock().expect("sentiment cache mutex poisoned").map.len()
    }
}

/// Each lexicon entry contributes at most one hit per message.
fn count_hits(text: &str, list: &[String]) -> usize {
    list.iter().filter(|w| text.contains(w.as_str())).count()
}

fn score(key: &str) -> SentimentResult {
    let scores = SentimentScores {
        positive: count_hits(key, &LEXICON.positive),
        negative: count_hits(key, &LEXICON.negative),
        neutral: count_hits(key, &LEXICON.neutral),
    };

    let max = scores.positive.max(scores.negative).max(scores.neutral);

    let sentiment = if max == 0 {
        Sentiment::Neutral
    } else if scores.positive == max && scores.negative < max && scores.neutral < max {
        Sentiment::Positive
    } else if scores.negative == max && scores.positive < max && scores.neutral < max {
        Sentiment::Negative
    } else {
        // Any tie at the top defaults to neutral.
        Sentiment::Neutral
    };

    let confidence = if max == 0 {
        0.5
    } else {
        (0.6 + 0.1 * max as f32).min(0.9)
    };

    SentimentResult {
        sentiment,
        confidence,
        scores,
    }
}
