//! Auth-session cache for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Route guards, the navigation bar and the settings page all read the
//! session through this cache, and login/logout/profile flows write to it
//! only through `invalidate`, `reset` and `settle_login`. It is the only
//! place that issues `/auth/status` and `/auth/user` requests.
//!
//! DESIGN
//! ======
//! `AuthCache` is an explicit, cloneable handle (`Rc` inside) rather than a
//! module-level singleton, so every test builds its own isolated instance.
//! State changes happen inside one `RefCell` borrow; subscribers are
//! notified afterwards, once per mutation step and all of them in the same
//! pass, so no consumer can observe status updated and principal not.
//!
//! TRADE-OFFS
//! ==========
//! Entries never expire on a timer. The session only changes through this
//! application's own mutations, which invalidate explicitly, so polling
//! would be wasted work.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use futures::task::{LocalSpawn, LocalSpawnExt};

use crate::net::error::GatewayError;
use crate::net::gateway::SessionGateway;
use crate::net::types::Principal;
use crate::util::runtime::Clock;

use super::query::{FetchTicket, QueryControl, QueryEntry, QuerySnapshot};
use super::session::{AuthVerdict, CacheKey, SessionState};

type Callback = Rc<dyn Fn(&AuthCache)>;

/// Shared, injectable store of the session verdict and principal.
#[derive(Clone)]
pub struct AuthCache {
    inner: Rc<CacheInner>,
}

struct CacheInner {
    gateway: SessionGateway,
    spawner: Rc<dyn LocalSpawn>,
    clock: Rc<dyn Clock>,
    entries: RefCell<Entries>,
    subscribers: RefCell<Vec<Subscriber>>,
    next_subscriber_id: Cell<u64>,
}

#[derive(Default)]
struct Entries {
    status: Option<QueryEntry<bool>>,
    principal: Option<QueryEntry<Option<Principal>>>,
}

impl Entries {
    fn get_or_create(&mut self, key: CacheKey) -> &mut dyn QueryControl {
        match key {
            CacheKey::Status => self.status.get_or_insert_with(QueryEntry::default),
            CacheKey::Principal => self.principal.get_or_insert_with(QueryEntry::default),
        }
    }

    fn get_mut(&mut self, key: CacheKey) -> Option<&mut dyn QueryControl> {
        match key {
            CacheKey::Status => self.status.as_mut().map(|e| e as &mut dyn QueryControl),
            CacheKey::Principal => self.principal.as_mut().map(|e| e as &mut dyn QueryControl),
        }
    }

    fn snapshots(&self) -> (Option<QuerySnapshot<bool>>, Option<QuerySnapshot<Option<Principal>>>) {
        (
            self.status.as_ref().map(QueryEntry::snapshot),
            self.principal.as_ref().map(QueryEntry::snapshot),
        )
    }
}

struct Subscriber {
    id: u64,
    callback: Callback,
}

enum Fetched {
    Status(Result<bool, GatewayError>),
    Principal(Result<Option<Principal>, GatewayError>),
}

/// Keeps a consumer subscribed to one cache key until dropped.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    key: CacheKey,
    cache: Weak<CacheInner>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.cache.upgrade() {
            AuthCache { inner }.unsubscribe(self.id, self.key);
        }
    }
}

impl AuthCache {
    #[must_use]
    pub fn new(gateway: SessionGateway, spawner: Rc<dyn LocalSpawn>, clock: Rc<dyn Clock>) -> Self {
        Self {
            inner: Rc::new(CacheInner {
                gateway,
                spawner,
                clock,
                entries: RefCell::new(Entries::default()),
                subscribers: RefCell::new(Vec::new()),
                next_subscriber_id: Cell::new(0),
            }),
        }
    }

    /// The gateway this cache fetches through; mutation coordinators share it.
    #[must_use]
    pub fn gateway(&self) -> &SessionGateway {
        &self.inner.gateway
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// Snapshot of the status entry, starting a fetch if it is unknown or stale.
    pub fn read_status(&self) -> QuerySnapshot<bool> {
        self.ensure(CacheKey::Status);
        self.peek_status().unwrap_or_else(|| QueryEntry::default().snapshot())
    }

    /// Snapshot of the principal entry, starting a fetch if it is unknown or stale.
    pub fn read_principal(&self) -> QuerySnapshot<Option<Principal>> {
        self.ensure(CacheKey::Principal);
        self.peek_principal().unwrap_or_else(|| QueryEntry::default().snapshot())
    }

    /// Snapshot without side effects; `None` if the entry was never created.
    #[must_use]
    pub fn peek_status(&self) -> Option<QuerySnapshot<bool>> {
        self.inner.entries.borrow().status.as_ref().map(QueryEntry::snapshot)
    }

    /// Snapshot without side effects; `None` if the entry was never created.
    #[must_use]
    pub fn peek_principal(&self) -> Option<QuerySnapshot<Option<Principal>>> {
        self.inner.entries.borrow().principal.as_ref().map(QueryEntry::snapshot)
    }

    /// The combined verdict across both keys.
    #[must_use]
    pub fn verdict(&self) -> AuthVerdict {
        let (status, principal) = self.inner.entries.borrow().snapshots();
        AuthVerdict::compose(status.as_ref(), principal.as_ref())
    }

    /// The read model for a consumer of `key`. Side-effect free.
    #[must_use]
    pub fn session(&self, key: CacheKey) -> SessionState {
        let (status, principal) = self.inner.entries.borrow().snapshots();
        SessionState::project(key, status.as_ref(), principal.as_ref())
    }

    /// Register `callback` for changes and start a fetch for `key` if needed.
    ///
    /// Callbacks run after every cache mutation step, for all subscribers,
    /// with the cache passed in so they can read the new state.
    pub fn subscribe<F>(&self, key: CacheKey, callback: F) -> Subscription
    where
        F: Fn(&AuthCache) + 'static,
    {
        let id = self.inner.next_subscriber_id.get();
        self.inner.next_subscriber_id.set(id + 1);
        self.inner.subscribers.borrow_mut().push(Subscriber { id, callback: Rc::new(callback) });
        self.inner.entries.borrow_mut().get_or_create(key).add_subscriber();
        self.ensure(key);
        Subscription { id, key, cache: Rc::downgrade(&self.inner) }
    }

    // =========================================================================
    // WRITES
    // =========================================================================

    /// Mark `key` stale, keeping its value on screen while it refreshes.
    pub fn invalidate(&self, key: CacheKey) {
        self.invalidate_keys(&[key]);
    }

    /// Invalidate status and principal in one step.
    pub fn invalidate_session(&self) {
        self.invalidate_keys(&CacheKey::ALL);
    }

    /// Clear `key` to `Unknown` and refetch immediately.
    pub fn reset(&self, key: CacheKey) {
        self.reset_keys(&[key]);
    }

    /// Reset status and principal in one step.
    pub fn reset_session(&self) {
        self.reset_keys(&CacheKey::ALL);
    }

    /// Force a new fetch for `key`, superseding any in-flight one.
    pub fn refetch(&self, key: CacheKey) {
        let ticket = self.inner.entries.borrow_mut().get_or_create(key).begin();
        log::debug!("session refetch: key={key:?}");
        self.spawn_fetch(key, ticket);
        self.notify();
    }

    /// Record a successful login: both entries take the login response now
    /// and are revalidated in the background.
    pub fn settle_login(&self, principal: Principal) {
        let tickets = {
            let mut entries = self.inner.entries.borrow_mut();
            entries.status.get_or_insert_with(QueryEntry::default).seed(true);
            entries.principal.get_or_insert_with(QueryEntry::default).seed(Some(principal));
            CacheKey::ALL
                .into_iter()
                .filter_map(|key| {
                    let entry = entries.get_or_create(key);
                    (entry.subscribers() > 0).then(|| (key, entry.begin()))
                })
                .collect::<Vec<_>>()
        };
        log::debug!("session settled from login");
        for (key, ticket) in tickets {
            self.spawn_fetch(key, ticket);
        }
        self.notify();
    }

    fn invalidate_keys(&self, keys: &[CacheKey]) {
        let tickets = {
            let mut entries = self.inner.entries.borrow_mut();
            keys.iter()
                .filter_map(|&key| {
                    let entry = entries.get_mut(key)?;
                    let refetch = entry.invalidate() && entry.subscribers() > 0;
                    refetch.then(|| (key, entry.begin()))
                })
                .collect::<Vec<_>>()
        };
        log::debug!("session invalidated: keys={keys:?} refetching={}", tickets.len());
        for (key, ticket) in tickets {
            self.spawn_fetch(key, ticket);
        }
        self.notify();
    }

    fn reset_keys(&self, keys: &[CacheKey]) {
        let tickets = {
            let mut entries = self.inner.entries.borrow_mut();
            keys.iter()
                .filter_map(|&key| {
                    let entry = entries.get_mut(key)?;
                    entry.reset();
                    Some((key, entry.begin()))
                })
                .collect::<Vec<_>>()
        };
        log::debug!("session reset: keys={keys:?}");
        for (key, ticket) in tickets {
            self.spawn_fetch(key, ticket);
        }
        self.notify();
    }

    // =========================================================================
    // FETCHING
    // =========================================================================

    fn ensure(&self, key: CacheKey) {
        let ticket = {
            let mut entries = self.inner.entries.borrow_mut();
            let entry = entries.get_or_create(key);
            entry.needs_fetch().then(|| entry.begin())
        };
        if let Some(ticket) = ticket {
            self.spawn_fetch(key, ticket);
            self.notify();
        }
    }

    fn spawn_fetch(&self, key: CacheKey, ticket: FetchTicket) {
        let FetchTicket { generation, registration, issued } = ticket;
        let gateway = self.inner.gateway.clone();
        let cache = Rc::downgrade(&self.inner);
        let task = async move {
            issued.set(true);
            let fetched = match key {
                CacheKey::Status => Fetched::Status(gateway.fetch_status(registration).await),
                CacheKey::Principal => Fetched::Principal(gateway.fetch_principal(registration).await),
            };
            if let Some(inner) = cache.upgrade() {
                AuthCache { inner }.complete(generation, fetched);
            }
        };
        if let Err(e) = self.inner.spawner.spawn_local(task) {
            log::warn!("session fetch could not be spawned: key={key:?} error={e}");
            if let Some(entry) = self.inner.entries.borrow_mut().get_mut(key) {
                entry.cancel();
            }
        }
    }

    fn complete(&self, generation: u64, fetched: Fetched) {
        let now = self.inner.clock.now_ms();
        let applied = {
            let mut entries = self.inner.entries.borrow_mut();
            match fetched {
                Fetched::Status(result) => entries
                    .status
                    .as_mut()
                    .is_some_and(|entry| entry.resolve(generation, result, now)),
                Fetched::Principal(result) => entries
                    .principal
                    .as_mut()
                    .is_some_and(|entry| entry.resolve(generation, result, now)),
            }
        };
        if applied {
            self.notify();
        } else {
            log::debug!("discarded superseded session fetch: generation={generation}");
        }
    }

    // =========================================================================
    // SUBSCRIBERS
    // =========================================================================

    fn unsubscribe(&self, id: u64, key: CacheKey) {
        self.inner.subscribers.borrow_mut().retain(|s| s.id != id);
        let cancelled = {
            let mut entries = self.inner.entries.borrow_mut();
            entries
                .get_mut(key)
                .is_some_and(|entry| entry.remove_subscriber() == 0 && entry.cancel())
        };
        if cancelled {
            log::debug!("cancelled session fetch without subscribers: key={key:?}");
            self.notify();
        }
    }

    fn notify(&self) {
        let callbacks: Vec<Callback> = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .map(|s| s.callback.clone())
            .collect();
        for callback in callbacks {
            callback(self);
        }
    }
}
