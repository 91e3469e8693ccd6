//! Login, logout, profile-update, profile-picture and signup flows.
//!
//! SYSTEM CONTEXT
//! ==============
//! Pages call these instead of the gateway so the cache writes that follow a
//! successful session change are applied in exactly one place.
//!
//! ERROR HANDLING
//! ==============
//! Rejections and gateway faults both come back as `MutationError` and leave
//! the cache untouched. Nothing is retried; the page shows the message and the
//! user resubmits.

#[cfg(test)]
#[path = "mutations_test.rs"]
mod mutations_test;

use crate::net::error::GatewayError;
use crate::net::gateway::{Outcome, Rejection};
use crate::net::types::{Credentials, NewAccount, NewFile, Principal, ProfileChanges, ValidationErrors};

use super::auth::AuthCache;

/// Why a mutation did not go through. `Display` is the user-facing message.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum MutationError {
    #[error("Invalid username or password.")]
    InvalidCredentials,
    #[error("Your session has expired. Please log in again.")]
    Unauthenticated,
    #[error("Please correct the highlighted fields.")]
    Validation(ValidationErrors),
    #[error("An unexpected error has occurred.")]
    Unexpected(#[from] GatewayError),
}

impl MutationError {
    /// Field-keyed errors for form rendering; `None` for other variants.
    #[must_use]
    pub fn field_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<Rejection> for MutationError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::InvalidCredentials => Self::InvalidCredentials,
            Rejection::Unauthenticated => Self::Unauthenticated,
            Rejection::Validation(errors) => Self::Validation(errors),
        }
    }
}

fn accepted<T>(outcome: Outcome<T>) -> Result<T, MutationError> {
    match outcome {
        Outcome::Accepted(value) => Ok(value),
        Outcome::Rejected(rejection) => Err(rejection.into()),
    }
}

/// Session-changing operations bound to one cache.
#[derive(Clone)]
pub struct SessionMutations {
    cache: AuthCache,
}

impl SessionMutations {
    #[must_use]
    pub fn new(cache: AuthCache) -> Self {
        Self { cache }
    }

    /// Log in and publish the new session to every subscriber.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` on `401`, `Validation` on `400`, `Unexpected` on
    /// any gateway fault.
    pub async fn login(&self, credentials: &Credentials) -> Result<Principal, MutationError> {
        let principal = accepted(self.cache.gateway().login(credentials).await?)?;
        log::info!("logged in: user_id={}", principal.id);
        self.cache.settle_login(principal.clone());
        Ok(principal)
    }

    /// Log out and clear the session everywhere.
    ///
    /// # Errors
    ///
    /// `Unexpected` on any gateway fault; the cache keeps its current state.
    pub async fn logout(&self) -> Result<(), MutationError> {
        self.cache.gateway().logout().await?;
        log::info!("logged out");
        self.cache.reset_session();
        Ok(())
    }

    /// Apply profile changes, then refresh the session in the background.
    ///
    /// # Errors
    ///
    /// `Validation` on `400`, `Unauthenticated` on `401`, `Unexpected` on any
    /// gateway fault.
    pub async fn update_profile(&self, changes: &ProfileChanges) -> Result<Principal, MutationError> {
        let principal = accepted(self.cache.gateway().update_profile(changes).await?)?;
        self.cache.invalidate_session();
        Ok(principal)
    }

    /// Upload a new profile picture, then point the profile at it.
    ///
    /// The picture URL is built from `api_base_url` the same way the server
    /// serves raw files. A rejected upload stops before the profile write.
    ///
    /// # Errors
    ///
    /// Same as [`SessionMutations::update_profile`], for either request.
    pub async fn change_profile_picture(
        &self,
        file: &NewFile,
        api_base_url: &str,
    ) -> Result<Principal, MutationError> {
        let stored = accepted(self.cache.gateway().upload_file(file).await?)?;
        log::debug!("profile picture uploaded: file_id={}", stored.id);
        let changes = ProfileChanges {
            profile_picture_url: Some(stored.raw_url(api_base_url)),
            ..ProfileChanges::default()
        };
        self.update_profile(&changes).await
    }

    /// Create an account. The visitor still has to log in afterwards.
    ///
    /// # Errors
    ///
    /// `Validation` on `400`, `Unexpected` on any gateway fault.
    pub async fn sign_up(&self, account: &NewAccount) -> Result<Principal, MutationError> {
        accepted(self.cache.gateway().sign_up(account).await?)
    }
}
