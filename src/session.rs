//! session.rs — per-conversation state, kept in an injected in-memory store.
//!
//! The store is an explicit object handed to the engine, not a module-level
//! singleton: tests get isolation and the process gets an eviction policy.
//! Eviction is two-fold: sessions idle beyond a TTL are dropped on the sweep
//! tick, and the map is capped, evicting the least-recently-active session
//! when a new conversation would exceed it.
//!
//! Concurrency: a single mutex around the map. Callers that want per-turn
//! ordering for one conversation must serialize their own calls; interleaved
//! updates are last-write-wins, never corruption.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::analyze::Intent;
use crate::response::ResponseSource;

/// One bot reply, as remembered by the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseTrace {
    pub confidence: f32,
    pub source: ResponseSource,
    pub at: DateTime<Utc>,
}

/// Accumulated state for one conversation id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    /// Only ever increases.
    pub message_count: u64,
    pub started_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    /// Intents in arrival order (bounded alongside the traces).
    pub intents: Vec<Intent>,
    /// De-duplicated topics, insertion order preserved.
    pub topics: Vec<String>,
    pub last_intent: Option<Intent>,
    pub escalation_attempts: u32,
    /// Set at most once per session lifetime; clearing the session resets it.
    pub proactive_engaged: bool,
    pub ai_responses: Vec<ResponseTrace>,
}

impl Session {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            message_count: 0,
            started_at: now,
            last_activity: now,
            intents: Vec::new(),
            topics: Vec::new(),
            last_intent: None,
            escalation_attempts: 0,
            proactive_engaged: false,
            ai_responses: Vec::new(),
        }
    }
}

/// What a completed turn contributes to the session.
#[derive(Debug, Clone)]
pub struct TurnRecord {
    pub intent: Intent,
    pub topics: Vec<String>,
    pub trace: ResponseTrace,
}

#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub max_sessions: usize,
    pub idle_ttl: Duration,
    /// Cap on remembered intents/response traces per session.
    pub trace_cap: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: 10_000,
            idle_ttl: Duration::hours(24),
            trace_cap: 200,
        }
    }
}

/// Thread-safe map from conversation id to session.
#[derive(Debug)]
pub struct SessionStore {
    inner: Mutex<HashMap<String, Session>>,
    cfg: SessionConfig,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl SessionStore {
    pub fn new(cfg: SessionConfig) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            cfg: SessionConfig {
                max_sessions: cfg.max_sessions.max(1),
                trace_cap: cfg.trace_cap.max(1),
                ..cfg
            },
        }
    }

    /// Point-in-time copy of a session, if one exists.
    pub fn snapshot(&self, conversation_id: &str) -> Option<Session> {
        self.lock().get(conversation_id).cloned()
    }

    /// Apply one completed turn: bumps the message count, appends the intent
    /// and trace, merges topics and refreshes activity. Creates the session
    /// on first contact.
    pub fn record_turn(&self, conversation_id: &str, turn: TurnRecord, now: DateTime<Utc>) {
        let mut map = self.lock();

        if !map.contains_key(conversation_id) && map.len() >= self.cfg.max_sessions {
            evict_least_recent(&mut map);
        }

        let session = map
            .entry(conversation_id.to_string())
            .or_insert_with(|| Session::new(now));

        session.message_count += 1;
        session.last_activity = now;
        session.last_intent = Some(turn.intent);
        if turn.intent == Intent::Escalation {
            session.escalation_attempts += 1;
        }

        session.intents.push(turn.intent);
        if session.intents.len() > self.cfg.trace_cap {
            let excess = session.intents.len() - self.cfg.trace_cap;
            session.intents.drain(0..excess);
        }

        for topic in turn.topics {
            if !session.topics.iter().any(|t| *t == topic) {
                session.topics.push(topic);
            }
        }

        session.ai_responses.push(turn.trace);
        if session.ai_responses.len() > self.cfg.trace_cap {
            let excess = session.ai_responses.len() - self.cfg.trace_cap;
            session.ai_responses.drain(0..excess);
        }
    }

    /// Flip the proactive flag; returns false when it was already set.
    pub fn mark_proactive(&self, conversation_id: &str) -> bool {
        let mut map = self.lock();
        match map.get_mut(conversation_id) {
            Some(s) if !s.proactive_engaged => {
                s.proactive_engaged = true;
                true
            }
            _ => false,
        }
    }

    pub fn clear(&self, conversation_id: &str) -> bool {
        self.lock().remove(conversation_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop sessions idle beyond the TTL. Returns how many were removed.
    pub fn evict_idle(&self, now: DateTime<Utc>) -> usize {
        let mut map = self.lock();
        let before = map.len();
        map.retain(|_, s| now - s.last_activity <= self.cfg.idle_ttl);
        before - map.len()
    }

    /// Conversation ids idle for longer than `threshold` that were never
    /// proactively engaged: the sweep's work list.
    pub fn idle_candidates(&self, threshold: Duration, now: DateTime<Utc>) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|(_, s)| !s.proactive_engaged && now - s.last_activity > threshold)
            .map(|(id, _)| id.clone())
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Session>> {
        self.inner.lock().expect("session store mutex poisoned")
    }
}

fn evict_least_recent(map: &mut HashMap<String, Session>) {
    if let Some(oldest) = map
        .iter()
        .min_by_key(|(_, s)| s.last_activity)
        .map(|(id, _)| id.clone())
    {
        map.remove(&oldest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(intent: Intent, source: ResponseSource, at: DateTime<Utc>) -> TurnRecord {
        TurnRecord {
            intent,
            topics: vec!["orders".to_string()],
            trace: ResponseTrace {
                confidence: 0.8,
                source,
                at,
            },
        }
    }

    #[test]
    fn two_turns_increase_count_by_two_and_append_two_traces() {
        let store = SessionStore::default();
        let t0 = Utc::now();

        store.record_turn("c1", turn(Intent::Question, ResponseSource::ContextualAi, t0), t0);
        store.record_turn("c1", turn(Intent::Question, ResponseSource::ContextualAi, t0), t0);

        let s = store.snapshot("c1").unwrap();
        assert_eq!(s.message_count, 2);
        assert_eq!(s.ai_responses.len(), 2);
        assert_eq!(s.last_intent, Some(Intent::Question));
    }

    #[test]
    fn topics_are_deduplicated() {
        let store = SessionStore::default();
        let t0 = Utc::now();
        store.record_turn("c1", turn(Intent::Question, ResponseSource::ContextualAi, t0), t0);
        store.record_turn("c1", turn(Intent::Question, ResponseSource::ContextualAi, t0), t0);
        assert_eq!(store.snapshot("c1").unwrap().topics, vec!["orders"]);
    }

    #[test]
    fn escalation_turns_bump_the_counter() {
        let store = SessionStore::default();
        let t0 = Utc::now();
        store.record_turn("c1", turn(Intent::Escalation, ResponseSource::AutomatedFlow, t0), t0);
        store.record_turn("c1", turn(Intent::Question, ResponseSource::ContextualAi, t0), t0);
        assert_eq!(store.snapshot("c1").unwrap().escalation_attempts, 1);
    }

    #[test]
    fn proactive_flag_fires_once() {
        let store = SessionStore::default();
        let t0 = Utc::now();
        store.record_turn("c1", turn(Intent::Question, ResponseSource::ContextualAi, t0), t0);

        assert!(store.mark_proactive("c1"));
        assert!(!store.mark_proactive("c1"));
        assert!(store.snapshot("c1").unwrap().proactive_engaged);
    }

    #[test]
    fn clear_removes_the_session() {
        let store = SessionStore::default();
        let t0 = Utc::now();
        store.record_turn("c1", turn(Intent::Question, ResponseSource::ContextualAi, t0), t0);
        assert!(store.clear("c1"));
        assert!(store.snapshot("c1").is_none());
        assert!(!store.clear("c1"));
    }

    #[test]
    fn idle_sessions_are_evicted_by_ttl() {
        let store = SessionStore::new(SessionConfig {
            idle_ttl: Duration::minutes(30),
            ..SessionConfig::default()
        });
        let t0 = Utc::now();
        store.record_turn("old", turn(Intent::Question, ResponseSource::ContextualAi, t0), t0);
        store.record_turn(
            "fresh",
            turn(Intent::Question, ResponseSource::ContextualAi, t0),
            t0 + Duration::minutes(45),
        );

        let removed = store.evict_idle(t0 + Duration::minutes(50));
        assert_eq!(removed, 1);
        assert!(store.snapshot("old").is_none());
        assert!(store.snapshot("fresh").is_some());
    }

    #[test]
    fn capacity_evicts_least_recently_active() {
        let store = SessionStore::new(SessionConfig {
            max_sessions: 2,
            ..SessionConfig::default()
        });
        let t0 = Utc::now();
        store.record_turn("a", turn(Intent::Question, ResponseSource::ContextualAi, t0), t0);
        store.record_turn(
            "b",
            turn(Intent::Question, ResponseSource::ContextualAi, t0),
            t0 + Duration::seconds(1),
        );
        store.record_turn(
            "c",
            turn(Intent::Question, ResponseSource::ContextualAi, t0),
            t0 + Duration::seconds(2),
        );

        assert_eq!(store.len(), 2);
        assert!(store.snapshot("a").is_none(), "oldest should be evicted");
    }

    #[test]
    fn idle_candidates_skip_engaged_sessions() {
        let store = SessionStore::default();
        let t0 = Utc::now();
        store.record_turn("quiet", turn(Intent::Question, ResponseSource::ContextualAi, t0), t0);
        store.record_turn("nudged", turn(Intent::Question, ResponseSource::ContextualAi, t0), t0);
        store.mark_proactive("nudged");

        let later = t0 + Duration::minutes(10);
        let ids = store.idle_candidates(Duration::minutes(5), later);
        assert_eq!(ids, vec!["quiet".to_string()]);
    }
}
