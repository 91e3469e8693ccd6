//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components render page chrome and route gating while reading the shared
//! session from Leptos context providers.

pub mod conditional_route;
pub mod loading_overlay;
pub mod navigation_bar;
pub mod restricted_route;
