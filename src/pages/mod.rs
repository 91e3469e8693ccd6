//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration (form state, mutation calls,
//! post-mutation navigation). Access control is applied around pages by
//! `RestrictedRoute` / `ConditionalRoute` in `app`, never inside them.

pub mod error;
pub mod home;
pub mod landing;
pub mod login;
pub mod logout;
pub mod not_found;
pub mod settings;
pub mod signup;
