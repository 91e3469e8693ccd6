//! # status-client
//!
//! Leptos + WASM front end for the service-status tracker: signup, login,
//! logout, profile settings, and navigation gated by the visitor's session.
//!
//! The session subsystem is layered leaves-first: `net` (HTTP boundary and
//! session gateway), `state` (the shared auth cache, its read model and the
//! mutation coordinators), `util::guard` (route decisions), then the Leptos
//! surface in `util::auth`, `components` and `pages`.

pub mod app;
pub mod components;
pub mod config;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

#[cfg(test)]
mod test_support;

/// Browser entry point: installs panic and log hooks, then hydrates `App`.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::hydrate_body(app::App);
}
