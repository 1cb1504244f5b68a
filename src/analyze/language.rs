// src/analyze/language.rs
//! Language guess from small word fingerprints (english/spanish/french).
//! Highest overlap ratio wins; with no evidence the guess stays english at
//! 0.5 confidence. Token-exact matching, not substrings.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const FINGERPRINTS: &[(&str, &[&str])] = &[
    (
        "english",
        &["the", "is", "are", "and", "you", "please", "have", "with", "this", "what"],
    ),
    (
        "spanish",
        &["el", "la", "es", "por", "que", "gracias", "hola", "necesito", "pedido", "ayuda"],
    ),
    (
        "french",
        &["le", "la", "est", "bonjour", "merci", "je", "vous", "avec", "besoin", "commande"],
    ),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageGuess {
    pub language: String,
    pub confidence: f32,
}

fn tokenize(s: &str) -> HashSet<String> {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

pub fn detect(message: &str) -> LanguageGuess {
    let tokens = tokenize(message);

    let mut best: Option<(&str, f32)> = None;
    for (lang, fingerprint) in FINGERPRINTS {
        let hits = fingerprint.iter().filter(|w| tokens.contains(**w)).count();
        let ratio = hits as f32 / fingerprint.len() as f32;
        if best.map_or(ratio > 0.0, |(_, r)| ratio > r) {
            best = Some((lang, ratio));
        }
    }

    match best {
        Some((lang, ratio)) => LanguageGuess {
            language: lang.to_string(),
            confidence: (0.5 + ratio).min(0.9),
        },
        None => LanguageGuess {
            language: "english".to_string(),
            confidence: 0.5,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_message() {
        let g = detect("what is the status of this order, please");
        assert_eq!(g.language, "english");
        assert!(g.confidence > 0.5);
    }

    #[test]
    fn spanish_message() {
        let g = detect("hola, necesito ayuda por favor con el pedido");
        assert_eq!(g.language, "spanish");
    }

    #[test]
    fn french_message() {
        let g = detect("bonjour, je vous contacte avec une question sur ma commande");
        assert_eq!(g.language, "french");
    }

    #[test]
    fn gibberish_defaults_to_english_at_floor() {
        let g = detect("qwerty zxcvb 123");
        assert_eq!(g.language, "english");
        assert!((g.confidence - 0.5).abs() < f32::EPSILON);
    }
}
