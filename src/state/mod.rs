//! Shared client-side session state.
//!
//! DESIGN
//! ======
//! `query` is the per-key entry state machine, `auth` the cache that owns
//! both entries and fetches through the gateway, `session` the read model
//! consumers render from, and `mutations` the only writers besides reads.

pub mod auth;
pub mod mutations;
pub mod query;
pub mod session;
