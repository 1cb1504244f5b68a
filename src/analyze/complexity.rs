// src/analyze/complexity.rs
//! Message complexity: word/sentence counts, average sentence length, and the
//! share of long words, mapped onto simple|medium|complex.

use serde::{Deserialize, Serialize};

const COMPLEX_WORD_COUNT: usize = 40;
const COMPLEX_AVG_WORDS: f32 = 18.0;
const COMPLEX_LONG_RATIO: f32 = 0.35;
const SIMPLE_WORD_COUNT: usize = 10;
const SIMPLE_LONG_RATIO: f32 = 0.2;

/// Words longer than this count as "long".
const LONG_WORD_CHARS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityLevel {
    Simple,
    Medium,
    Complex,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComplexityMetrics {
    pub word_count: usize,
    pub sentence_count: usize,
    pub avg_words_per_sentence: f32,
    pub long_word_ratio: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityResult {
    pub level: ComplexityLevel,
    pub metrics: ComplexityMetrics,
}

pub fn assess(message: &str) -> ComplexityResult {
    let words: Vec<&str> = message.split_whitespace().collect();
    let word_count = words.len();

    let sentence_count = message
        .split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count()
        .max(1);

    let avg_words_per_sentence = word_count as f32 / sentence_count as f32;

    let long_words = words
        .iter()
        .filter(|w| w.chars().filter(|c| c.is_alphanumeric()).count() > LONG_WORD_CHARS)
        .count();
    let long_word_ratio = if word_count > 0 {
        long_words as f32 / word_count as f32
    } else {
        0.0
    };

    let level = if word_count > COMPLEX_WORD_COUNT
        || avg_words_per_sentence > COMPLEX_AVG_WORDS
        || long_word_ratio > COMPLEX_LONG_RATIO
    {
        ComplexityLevel::Complex
    } else if word_count <= SIMPLE_WORD_COUNT && long_word_ratio < SIMPLE_LONG_RATIO {
        ComplexityLevel::Simple
    } else {
        ComplexityLevel::Medium
    };

    ComplexityResult {
        level,
        metrics: ComplexityMetrics {
            word_count,
            sentence_count,
            avg_words_per_sentence,
            long_word_ratio,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_message_is_simple() {
        let r = assess("Hello");
        assert_eq!(r.level, ComplexityLevel::Simple);
        assert_eq!(r.metrics.word_count, 1);
        assert_eq!(r.metrics.sentence_count, 1);
    }

    #[test]
    fn long_rambling_message_is_complex() {
        let msg = "I have been trying to reconfigure the subscription preferences associated with my account for several days now and despite following every troubleshooting recommendation in the documentation the configuration interface repeatedly discards my changes without any explanation whatsoever";
        let r = assess(msg);
        assert_eq!(r.level, ComplexityLevel::Complex);
        assert!(r.metrics.avg_words_per_sentence > COMPLEX_AVG_WORDS);
    }

    #[test]
    fn mid_length_message_is_medium() {
        let r = assess("My package arrived late. The box was dented. I would like to know what my options are here.");
        assert_eq!(r.level, ComplexityLevel::Medium);
        assert_eq!(r.metrics.sentence_count, 3);
    }

    #[test]
    fn empty_input_does_not_divide_by_zero() {
        let r = assess("");
        assert_eq!(r.metrics.word_count, 0);
        assert_eq!(r.metrics.sentence_count, 1);
        assert_eq!(r.level, ComplexityLevel::Simple);
    }
}
