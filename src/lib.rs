// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod actions;
pub mod api;
pub mod engine;
pub mod flows;
pub mod metrics;
pub mod proactive;
pub mod respond;
pub mod response;
pub mod session;

// Message analysis pipeline (intent, sentiment, entities, heuristics)
pub mod analyze;

// ---- Re-exports for stable public API ----
pub use crate::actions::{ActionContext, ActionSink, TracingActionSink};
pub use crate::analyze::{Analyzer, Intent, MessageAnalysis};
pub use crate::api::{create_router, AppState};
pub use crate::engine::ResponseEngine;
pub use crate::response::{CustomerContext, ResponsePayload, ResponseSource};
pub use crate::session::{Session, SessionConfig, SessionStore};
