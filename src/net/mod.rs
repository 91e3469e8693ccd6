//! Networking modules for the session and user endpoints.
//!
//! SYSTEM CONTEXT
//! ==============
//! `http` is the transport seam, `gateway` turns raw responses into typed
//! outcomes, `error` holds the fault taxonomy, and `types` defines the wire
//! schema.

pub mod error;
pub mod gateway;
pub mod http;
pub mod types;
