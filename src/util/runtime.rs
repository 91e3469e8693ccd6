//! Browser runtime seams: task spawning and wall-clock time.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session cache takes both as injected trait objects so tests can run
//! it on a `LocalPool` with a manual clock.

#[cfg(test)]
#[path = "runtime_test.rs"]
mod runtime_test;

use futures::future::LocalFutureObj;
use futures::task::{LocalSpawn, SpawnError};

/// Source of "now" in milliseconds since the Unix epoch.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Wall clock: `Date.now()` in the browser, `SystemTime` elsewhere.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        #[cfg(feature = "hydrate")]
        {
            js_sys::Date::now()
        }
        #[cfg(not(feature = "hydrate"))]
        {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map_or(0.0, |elapsed| elapsed.as_secs_f64() * 1000.0)
        }
    }
}

/// Spawns onto the Leptos task executor (the browser microtask queue under hydrate).
#[derive(Clone, Copy, Debug, Default)]
pub struct LeptosSpawner;

impl LocalSpawn for LeptosSpawner {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        leptos::task::spawn_local(future);
        Ok(())
    }
}
