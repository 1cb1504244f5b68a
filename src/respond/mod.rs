// src/respond/mod.rs
//! Response production: contextual templates keyed on the classified intent,
//! then a non-destructive enhancement pass (empathy, urgency, name, follow-up
//! suggestions).

pub mod enhancer;
pub mod generator;

pub use enhancer::{enhance, EMPATHY_PHRASES, URGENCY_ACK};
pub use generator::generate;
