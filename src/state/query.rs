//! Per-key cache entry state machine.
//!
//! DESIGN
//! ======
//! An entry is pure state: it never performs I/O. `AuthCache` asks it when a
//! fetch should start, hands it the result, and it decides whether that result
//! still applies.
//!
//! Every fetch, invalidation, reset and seed bumps `generation`. A result is
//! applied only if it carries the current generation, so a response that was
//! in flight before a newer `invalidate`/`reset` can never overwrite it.

#[cfg(test)]
#[path = "query_test.rs"]
mod query_test;

use std::cell::Cell;
use std::rc::Rc;

use futures::future::{AbortHandle, AbortRegistration};

use crate::net::error::GatewayError;

/// Coarse lifecycle phase of an entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryPhase {
    /// Never fetched, or cleared by `reset`, with nothing in flight.
    Unknown,
    /// First fetch (or first fetch after `reset`) in flight.
    Loading,
    /// A value is available; a background refresh may be running.
    Ready,
    /// The last fetch failed.
    Errored,
}

/// Read-only copy of an entry handed to consumers.
#[derive(Clone, Debug, PartialEq)]
pub struct QuerySnapshot<T> {
    pub value: Option<T>,
    pub error: Option<GatewayError>,
    pub is_fetching: bool,
    pub is_stale: bool,
    pub resolved_once: bool,
    pub last_fetched_at: Option<f64>,
}

impl<T> QuerySnapshot<T> {
    #[must_use]
    pub fn phase(&self) -> QueryPhase {
        if self.error.is_some() {
            QueryPhase::Errored
        } else if self.value.is_some() {
            QueryPhase::Ready
        } else if self.is_fetching {
            QueryPhase::Loading
        } else {
            QueryPhase::Unknown
        }
    }
}

/// Everything a spawned fetch needs to report back.
#[derive(Debug)]
pub struct FetchTicket {
    pub generation: u64,
    pub registration: AbortRegistration,
    /// Set by the fetch task once it actually starts the request.
    pub issued: Rc<Cell<bool>>,
}

#[derive(Debug)]
struct InFlight {
    generation: u64,
    abort: AbortHandle,
    issued: Rc<Cell<bool>>,
}

/// State of one cache key.
#[derive(Debug)]
pub struct QueryEntry<T> {
    value: Option<T>,
    error: Option<GatewayError>,
    stale: bool,
    generation: u64,
    in_flight: Option<InFlight>,
    last_fetched_at: Option<f64>,
    resolved_once: bool,
    subscribers: usize,
}

impl<T> Default for QueryEntry<T> {
    fn default() -> Self {
        Self {
            value: None,
            error: None,
            stale: false,
            generation: 0,
            in_flight: None,
            last_fetched_at: None,
            resolved_once: false,
            subscribers: 0,
        }
    }
}

impl<T: Clone> QueryEntry<T> {
    #[must_use]
    pub fn snapshot(&self) -> QuerySnapshot<T> {
        QuerySnapshot {
            value: self.value.clone(),
            error: self.error.clone(),
            is_fetching: self.in_flight.is_some(),
            is_stale: self.stale,
            resolved_once: self.resolved_once,
            last_fetched_at: self.last_fetched_at,
        }
    }
}

impl<T> QueryEntry<T> {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Apply a fetch result if it is still current.
    ///
    /// Returns `true` when the entry changed. Cancelled and superseded
    /// results are dropped.
    pub fn resolve(&mut self, generation: u64, result: Result<T, GatewayError>, now_ms: f64) -> bool {
        if generation != self.generation {
            return false;
        }
        if matches!(&result, Err(e) if e.is_cancelled()) {
            return false;
        }
        self.in_flight = None;
        self.stale = false;
        self.resolved_once = true;
        self.last_fetched_at = Some(now_ms);
        match result {
            Ok(value) => {
                self.value = Some(value);
                self.error = None;
            }
            Err(error) => self.error = Some(error),
        }
        true
    }

    /// Seed a value known from a mutation response and mark it for
    /// background revalidation.
    pub fn seed(&mut self, value: T) {
        self.abort_in_flight();
        self.generation += 1;
        self.value = Some(value);
        self.error = None;
        self.stale = true;
        self.resolved_once = true;
    }

    fn abort_in_flight(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.abort.abort();
        }
    }
}

/// Lifecycle operations that do not depend on the value type, so the cache
/// can drive both keys through one code path.
pub trait QueryControl {
    fn is_fetching(&self) -> bool;
    fn subscribers(&self) -> usize;
    fn add_subscriber(&mut self);
    /// Returns the remaining subscriber count.
    fn remove_subscriber(&mut self) -> usize;
    /// A read should start a fetch: nothing known yet, or explicitly stale,
    /// and no request already in flight to share.
    fn needs_fetch(&self) -> bool;
    /// Start a new fetch, superseding any in-flight one.
    fn begin(&mut self) -> FetchTicket;
    /// Mark stale while keeping the displayed value.
    ///
    /// Returns `true` if a refetch must be started. A fetch that has been
    /// scheduled but not yet issued already observes the new server state, so
    /// back-to-back invalidations collapse into it.
    fn invalidate(&mut self) -> bool;
    /// Clear back to `Unknown`. `resolved_once` survives.
    fn reset(&mut self);
    /// Abandon the in-flight fetch, e.g. when its last subscriber leaves.
    ///
    /// The entry is left stale so the next read fetches again.
    fn cancel(&mut self) -> bool;
}

impl<T> QueryControl for QueryEntry<T> {
    fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    fn subscribers(&self) -> usize {
        self.subscribers
    }

    fn add_subscriber(&mut self) {
        self.subscribers += 1;
    }

    fn remove_subscriber(&mut self) -> usize {
        self.subscribers = self.subscribers.saturating_sub(1);
        self.subscribers
    }

    fn needs_fetch(&self) -> bool {
        if self.in_flight.is_some() {
            return false;
        }
        let unknown = self.value.is_none() && self.error.is_none();
        unknown || self.stale
    }

    fn begin(&mut self) -> FetchTicket {
        self.abort_in_flight();
        self.generation += 1;
        let (abort, registration) = AbortHandle::new_pair();
        let issued = Rc::new(Cell::new(false));
        self.in_flight = Some(InFlight { generation: self.generation, abort, issued: issued.clone() });
        FetchTicket { generation: self.generation, registration, issued }
    }

    fn invalidate(&mut self) -> bool {
        self.stale = true;
        let pending_unissued = self
            .in_flight
            .as_ref()
            .is_some_and(|f| f.generation == self.generation && !f.issued.get());
        if pending_unissued {
            return false;
        }
        self.abort_in_flight();
        self.generation += 1;
        true
    }

    fn reset(&mut self) {
        self.abort_in_flight();
        self.generation += 1;
        self.value = None;
        self.error = None;
        self.stale = false;
        self.last_fetched_at = None;
    }

    fn cancel(&mut self) -> bool {
        if self.in_flight.is_none() {
            return false;
        }
        self.abort_in_flight();
        self.generation += 1;
        self.stale = true;
        true
    }
}
