// src/analyze/entities.rs
//! Regex entity extraction: emails, phone numbers, order numbers, URLs, and
//! money amounts. Each field is present only when at least one match exists.
//!
//! Order numbers require an anchor word (`order`/`purchase`/`transaction`,
//! optionally followed by `#`/`number`/`no`/`id` and an `is`/`was` connector)
//! before a digit-bearing token of length >= 6; a bare `123456` is never an
//! order number.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("email regex")
});

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\+?\d{1,3}[\s.-]?\(?\d{2,4}\)?[\s.-]?\d{3}[\s.-]?\d{3,4}").expect("phone regex")
});

static ORDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:order|purchase|transaction)(?:\s*(?:#|number|no\.?|id))?(?:\s+(?:is|was))?\s*:?\s*#?\s*([A-Za-z0-9][A-Za-z0-9-]{5,})\b",
    )
    .expect("order number regex")
});

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\b(?:https?://|www\.)[^\s<>"']+"#).expect("url regex")
});

static AMOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[$€£]\s?\d+(?:[.,]\d{1,2})?|\b\d+(?:[.,]\d{1,2})?\s?(?:usd|eur|gbp|dollars?|euros?)\b")
        .expect("amount regex")
});

/// Structured tokens pulled out of free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emails: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phones: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_numbers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urls: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amounts: Option<Vec<String>>,
}

impl Entities {
    pub fn is_empty(&self) -> bool {
        self.emails.is_none()
            && self.phones.is_none()
            && self.order_numbers.is_none()
            && self.urls.is_none()
            && self.amounts.is_none()
    }

    /// First extracted order number, used by the response generator.
    pub fn primary_order_number(&self) -> Option<&str> {
        self.order_numbers
            .as_deref()
            .and_then(|v| v.first())
            .map(String::as_str)
    }
}

fn find_all(re: &Regex, text: &str) -> Option<Vec<String>> {
    let mut out: Vec<String> = re.find_iter(text).map(|m| m.as_str().to_string()).collect();
    out.sort();
    out.dedup();
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Captured order tokens must carry at least one digit; that keeps ordinary
/// words following the anchor ("order delivery") out of the results. The
/// regex crate has no lookahead, so the digit check lives here.
fn find_order_numbers(text: &str) -> Option<Vec<String>> {
    let mut out: Vec<String> = ORDER_RE
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|t| t.chars().any(|c| c.is_ascii_digit()))
        .collect();
    out.sort();
    out.dedup();
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Pure extraction; any string input is valid.
pub fn extract(message: &str) -> Entities {
    Entities {
        emails: find_all(&EMAIL_RE, message),
        phones: find_all(&PHONE_RE, message),
        order_numbers: find_order_numbers(message),
        urls: find_all(&URL_RE, message),
        amounts: find_all(&AMOUNT_RE, message),
    }
}
