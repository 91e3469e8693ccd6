//! Read-side projections of the authentication cache.
//!
//! SYSTEM CONTEXT
//! ==============
//! Navigation, route guards and the settings page all read through
//! `SessionState`, which is derived from cache snapshots in one place so no
//! consumer re-derives "is this visitor authenticated" on its own.
//!
//! DESIGN
//! ======
//! The status and principal entries are two projections of one session. A
//! fault on either one makes the whole verdict `Errored` for every consumer,
//! rather than letting navigation show "authenticated" while the settings
//! page shows an error.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use crate::net::types::Principal;

use super::query::QuerySnapshot;

/// Which projection of the session a consumer reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// `GET /auth/status`: boolean-shaped.
    Status,
    /// `GET /auth/user`: record-shaped.
    Principal,
}

impl CacheKey {
    pub const ALL: [Self; 2] = [Self::Status, Self::Principal];
}

/// The client's belief about the visitor's session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VerdictStatus {
    #[default]
    Unknown,
    Loading,
    Authenticated,
    Unauthenticated,
    Errored,
}

/// Verdict plus principal. `principal` is only ever `Some` when
/// `status` is `Authenticated`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthVerdict {
    status: VerdictStatus,
    principal: Option<Principal>,
}

impl AuthVerdict {
    #[must_use]
    pub fn unknown() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn loading() -> Self {
        Self { status: VerdictStatus::Loading, principal: None }
    }

    #[must_use]
    pub fn authenticated(principal: Option<Principal>) -> Self {
        Self { status: VerdictStatus::Authenticated, principal }
    }

    #[must_use]
    pub fn unauthenticated() -> Self {
        Self { status: VerdictStatus::Unauthenticated, principal: None }
    }

    #[must_use]
    pub fn errored() -> Self {
        Self { status: VerdictStatus::Errored, principal: None }
    }

    /// Combine the two cache projections into one verdict.
    ///
    /// `status` is authoritative for the boolean when it has a value; the
    /// principal entry is used on its own only when status was never read.
    #[must_use]
    pub fn compose(
        status: Option<&QuerySnapshot<bool>>,
        principal: Option<&QuerySnapshot<Option<Principal>>>,
    ) -> Self {
        let errored = status.is_some_and(|s| s.error.is_some()) || principal.is_some_and(|p| p.error.is_some());
        if errored {
            return Self::errored();
        }

        let known_principal = principal.and_then(|p| p.value.clone().flatten());
        let authenticated = match (status.and_then(|s| s.value), principal.and_then(|p| p.value.as_ref())) {
            (Some(flag), _) => Some(flag),
            (None, Some(record)) => Some(record.is_some()),
            (None, None) => None,
        };

        match authenticated {
            Some(true) => Self::authenticated(known_principal),
            Some(false) => Self::unauthenticated(),
            None => {
                let fetching = status.is_some_and(|s| s.is_fetching) || principal.is_some_and(|p| p.is_fetching);
                if fetching { Self::loading() } else { Self::unknown() }
            }
        }
    }

    #[must_use]
    pub fn status(&self) -> VerdictStatus {
        self.status
    }

    #[must_use]
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.status == VerdictStatus::Authenticated
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status == VerdictStatus::Errored
    }

    /// No verdict yet: nothing known and possibly a fetch in flight.
    #[must_use]
    pub fn is_undecided(&self) -> bool {
        matches!(self.status, VerdictStatus::Unknown | VerdictStatus::Loading)
    }
}

/// Misuse of a principal-requiring view without a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("no authenticated principal is available")]
    MissingPrincipal,
}

/// What one consumer of a cache key renders from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    pub verdict: AuthVerdict,
    /// A fetch for this consumer's key is in flight.
    pub is_loading: bool,
    /// No fetch for this consumer's key has ever resolved.
    pub is_initial_loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self { verdict: AuthVerdict::unknown(), is_loading: false, is_initial_loading: true }
    }
}

impl SessionState {
    /// Project the cache for a consumer of `key`.
    #[must_use]
    pub fn project(
        key: CacheKey,
        status: Option<&QuerySnapshot<bool>>,
        principal: Option<&QuerySnapshot<Option<Principal>>>,
    ) -> Self {
        let (is_loading, resolved_once) = match key {
            CacheKey::Status => status.map_or((false, false), |s| (s.is_fetching, s.resolved_once)),
            CacheKey::Principal => principal.map_or((false, false), |p| (p.is_fetching, p.resolved_once)),
        };
        Self {
            verdict: AuthVerdict::compose(status, principal),
            is_loading,
            is_initial_loading: !resolved_once,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.verdict.is_authenticated()
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.verdict.is_error()
    }

    #[must_use]
    pub fn principal(&self) -> Option<&Principal> {
        self.verdict.principal()
    }

    /// The principal for views that are only reachable behind an
    /// authenticated-only guard.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::MissingPrincipal` when rendered without one.
    pub fn require_principal(&self) -> Result<&Principal, SessionError> {
        self.principal().ok_or(SessionError::MissingPrincipal)
    }
}
