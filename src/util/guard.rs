//! Route guard decisions.
//!
//! SYSTEM CONTEXT
//! ==============
//! `RestrictedRoute` and `ConditionalRoute` call `decide` on every session
//! change and act on the result; the decision itself is pure so every
//! redirect rule is testable without a renderer.
//!
//! DESIGN
//! ======
//! A guard waits (`Pending`) only while the very first session fetch is
//! outstanding. After that it always has an answer: a background refresh
//! keeps the last verdict, and a reset that clears the value is treated as
//! "not authenticated" rather than flashing a spinner again.
//!
//! A session fault always goes to the error route, never to the denied
//! destination, so a broken backend is not reported as "please log in".

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use crate::config::DEFAULT_ERROR_PATH;
use crate::state::session::{AuthVerdict, SessionState};

/// Who may see a guarded route.
#[derive(Clone, Copy, Debug)]
pub enum Access {
    AuthenticatedOnly,
    GuestOnly,
    Custom(fn(&AuthVerdict) -> bool),
}

impl Access {
    fn permits(self, verdict: &AuthVerdict) -> bool {
        match self {
            Self::AuthenticatedOnly => verdict.is_authenticated(),
            Self::GuestOnly => !verdict.is_authenticated(),
            Self::Custom(predicate) => predicate(verdict),
        }
    }
}

/// Outcome once the session is known.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Permitted,
    Denied,
    Errored,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardState {
    Pending,
    Resolved(Resolution),
}

/// What the guarded route should do right now.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Render the loading fallback.
    Pending,
    /// Render the guarded content.
    Render,
    /// Navigate away with history replacement.
    Redirect(String),
}

#[derive(Clone, Debug)]
pub struct RouteGuard {
    access: Access,
    denied_redirect: String,
    error_redirect: String,
}

impl RouteGuard {
    #[must_use]
    pub fn new(access: Access, denied_redirect: impl Into<String>) -> Self {
        Self { access, denied_redirect: denied_redirect.into(), error_redirect: DEFAULT_ERROR_PATH.to_owned() }
    }

    /// Routes for signed-in users; guests go to `login_path`.
    #[must_use]
    pub fn authenticated_only(login_path: impl Into<String>) -> Self {
        Self::new(Access::AuthenticatedOnly, login_path)
    }

    /// Routes for guests (login, signup); signed-in users go to `home_path`.
    #[must_use]
    pub fn guest_only(home_path: impl Into<String>) -> Self {
        Self::new(Access::GuestOnly, home_path)
    }

    #[must_use]
    pub fn with_error_redirect(mut self, error_path: impl Into<String>) -> Self {
        self.error_redirect = error_path.into();
        self
    }

    #[must_use]
    pub fn access(&self) -> Access {
        self.access
    }

    #[must_use]
    pub fn resolve(&self, session: &SessionState) -> GuardState {
        let verdict = &session.verdict;
        if verdict.is_error() {
            return GuardState::Resolved(Resolution::Errored);
        }
        if verdict.is_undecided() && session.is_initial_loading {
            return GuardState::Pending;
        }
        if self.access.permits(verdict) {
            GuardState::Resolved(Resolution::Permitted)
        } else {
            GuardState::Resolved(Resolution::Denied)
        }
    }

    #[must_use]
    pub fn decide(&self, session: &SessionState) -> GuardDecision {
        match self.resolve(session) {
            GuardState::Pending => GuardDecision::Pending,
            GuardState::Resolved(Resolution::Permitted) => GuardDecision::Render,
            GuardState::Resolved(Resolution::Denied) => GuardDecision::Redirect(self.denied_redirect.clone()),
            GuardState::Resolved(Resolution::Errored) => GuardDecision::Redirect(self.error_redirect.clone()),
        }
    }
}
