//! Utility helpers shared across client UI modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate browser/runtime concerns and guard decisions from
//! page and component logic to improve reuse and testability.

pub mod auth;
pub mod guard;
pub mod runtime;
