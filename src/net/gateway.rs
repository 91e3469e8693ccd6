//! Session gateway: typed wrappers over the session and user endpoints.
//!
//! SYSTEM CONTEXT
//! ==============
//! The authentication cache and the mutation coordinators are the only
//! callers. Each call resolves the raw status code exactly once into
//! `Ok(Outcome::Accepted)`, `Ok(Outcome::Rejected)` or `Err(GatewayError)`.
//!
//! ERROR HANDLING
//! ==============
//! Client-range statuses (`4xx`) are normal outcomes and log at debug: on the
//! session reads every one of them means "no session". `5xx`, transport
//! failures and schema mismatches are faults and log at warn. A fault is
//! never coerced into "not authenticated".

#[cfg(test)]
#[path = "gateway_test.rs"]
mod gateway_test;

use std::rc::Rc;

use futures::future::{AbortRegistration, Abortable};
use serde::de::DeserializeOwned;

use super::error::GatewayError;
use super::http::{HttpRequest, HttpResponse, HttpTransport};
use super::types::{Credentials, NewAccount, NewFile, Principal, ProfileChanges, StoredFile, ValidationErrors};

pub const STATUS_PATH: &str = "/auth/status";
pub const PRINCIPAL_PATH: &str = "/auth/user";
pub const LOGIN_PATH: &str = "/auth/login";
pub const LOGOUT_PATH: &str = "/auth/logout";
pub const USERS_PATH: &str = "/users";
pub const FILES_PATH: &str = "/files";

const STATUS_OK: u16 = 200;
const STATUS_BAD_REQUEST: u16 = 400;
const STATUS_UNAUTHORIZED: u16 = 401;
const STATUS_SERVER_ERROR: u16 = 500;

fn is_client_error(status: u16) -> bool {
    (STATUS_BAD_REQUEST..STATUS_SERVER_ERROR).contains(&status)
}

/// An expected negative answer from the server.
#[derive(Clone, Debug, PartialEq)]
pub enum Rejection {
    /// No session is attached to the request.
    Unauthenticated,
    /// Login was refused for the supplied username/password.
    InvalidCredentials,
    /// The request body failed server-side validation.
    Validation(ValidationErrors),
}

/// Non-fault result of a gateway call.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome<T> {
    Accepted(T),
    Rejected(Rejection),
}

/// Typed client for the session endpoints.
#[derive(Clone)]
pub struct SessionGateway {
    transport: Rc<dyn HttpTransport>,
}

impl SessionGateway {
    #[must_use]
    pub fn new(transport: Rc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// `GET /auth/status`.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Cancelled` if `signal` is aborted, or any fault
    /// described in the module docs.
    pub async fn fetch_status(&self, signal: AbortRegistration) -> Result<bool, GatewayError> {
        let response = self.send(HttpRequest::get(STATUS_PATH), Some(signal)).await?;
        interpret_status(&response)
    }

    /// `GET /auth/user`. `Ok(None)` means no session.
    ///
    /// # Errors
    ///
    /// Same as [`SessionGateway::fetch_status`].
    pub async fn fetch_principal(&self, signal: AbortRegistration) -> Result<Option<Principal>, GatewayError> {
        let response = self.send(HttpRequest::get(PRINCIPAL_PATH), Some(signal)).await?;
        interpret_principal(&response)
    }

    /// `POST /auth/login`.
    ///
    /// # Errors
    ///
    /// Returns a `GatewayError` on server, transport or schema faults.
    pub async fn login(&self, credentials: &Credentials) -> Result<Outcome<Principal>, GatewayError> {
        let body = to_body(LOGIN_PATH, credentials)?;
        let response = self.send(HttpRequest::post(LOGIN_PATH, Some(body)), None).await?;
        interpret_login(&response)
    }

    /// `POST /auth/logout`.
    ///
    /// # Errors
    ///
    /// Returns a `GatewayError` on server or transport faults.
    pub async fn logout(&self) -> Result<(), GatewayError> {
        let response = self.send(HttpRequest::post(LOGOUT_PATH, None), None).await?;
        interpret_logout(&response)
    }

    /// `PATCH /users` for the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns a `GatewayError` on server, transport or schema faults.
    pub async fn update_profile(&self, changes: &ProfileChanges) -> Result<Outcome<Principal>, GatewayError> {
        let body = to_body(USERS_PATH, changes)?;
        let response = self.send(HttpRequest::patch(USERS_PATH, body), None).await?;
        interpret_write(USERS_PATH, &response)
    }

    /// `POST /users` to create an account.
    ///
    /// # Errors
    ///
    /// Returns a `GatewayError` on server, transport or schema faults.
    pub async fn sign_up(&self, account: &NewAccount) -> Result<Outcome<Principal>, GatewayError> {
        let body = to_body(USERS_PATH, account)?;
        let response = self.send(HttpRequest::post(USERS_PATH, Some(body)), None).await?;
        interpret_write(USERS_PATH, &response)
    }

    /// `POST /files` to store an upload (a profile picture) for the
    /// authenticated user.
    ///
    /// # Errors
    ///
    /// Returns a `GatewayError` on server, transport or schema faults.
    pub async fn upload_file(&self, file: &NewFile) -> Result<Outcome<StoredFile>, GatewayError> {
        let body = to_body(FILES_PATH, file)?;
        let response = self.send(HttpRequest::post(FILES_PATH, Some(body)), None).await?;
        interpret_write(FILES_PATH, &response)
    }

    async fn send(&self, request: HttpRequest, signal: Option<AbortRegistration>) -> Result<HttpResponse, GatewayError> {
        let path = request.path;
        let pending = self.transport.send(request);
        let sent = match signal {
            Some(signal) => Abortable::new(pending, signal)
                .await
                .map_err(|_| GatewayError::Cancelled)?,
            None => pending.await,
        };
        let response = sent.inspect_err(|e| log::warn!("transport failure: path={path} error={e}"))?;
        if response.status >= STATUS_SERVER_ERROR {
            log::warn!("server error: path={path} status={}", response.status);
            return Err(GatewayError::Server { status: response.status });
        }
        Ok(response)
    }
}

fn to_body<T: serde::Serialize>(path: &'static str, value: &T) -> Result<serde_json::Value, GatewayError> {
    serde_json::to_value(value).map_err(|e| GatewayError::Schema { path, detail: e.to_string() })
}

fn parse_body<T: DeserializeOwned>(path: &'static str, response: &HttpResponse) -> Result<T, GatewayError> {
    response.json::<T>().map_err(|e| {
        log::warn!("schema mismatch: path={path} error={e}");
        GatewayError::Schema { path, detail: e.to_string() }
    })
}

fn unexpected(path: &'static str, response: &HttpResponse) -> GatewayError {
    log::warn!("unexpected status: path={path} status={}", response.status);
    GatewayError::UnexpectedStatus { status: response.status, path }
}

fn interpret_status(response: &HttpResponse) -> Result<bool, GatewayError> {
    match response.status {
        STATUS_OK if response.is_empty() => Ok(false),
        STATUS_OK => parse_body(STATUS_PATH, response),
        status if is_client_error(status) => {
            log::debug!("no session: path={STATUS_PATH} status={status}");
            Ok(false)
        }
        _ => Err(unexpected(STATUS_PATH, response)),
    }
}

fn interpret_principal(response: &HttpResponse) -> Result<Option<Principal>, GatewayError> {
    match response.status {
        STATUS_OK if response.is_empty() => Ok(None),
        STATUS_OK => parse_body(PRINCIPAL_PATH, response).map(Some),
        status if is_client_error(status) => {
            log::debug!("no session: path={PRINCIPAL_PATH} status={status}");
            Ok(None)
        }
        _ => Err(unexpected(PRINCIPAL_PATH, response)),
    }
}

fn interpret_login(response: &HttpResponse) -> Result<Outcome<Principal>, GatewayError> {
    match response.status {
        STATUS_OK => parse_body(LOGIN_PATH, response).map(Outcome::Accepted),
        STATUS_UNAUTHORIZED => {
            log::debug!("login rejected");
            Ok(Outcome::Rejected(Rejection::InvalidCredentials))
        }
        STATUS_BAD_REQUEST => parse_validation(LOGIN_PATH, response),
        _ => Err(unexpected(LOGIN_PATH, response)),
    }
}

fn interpret_logout(response: &HttpResponse) -> Result<(), GatewayError> {
    match response.status {
        STATUS_OK => Ok(()),
        // The session is already gone; the client-side reset still applies.
        STATUS_UNAUTHORIZED => {
            log::debug!("logout without session");
            Ok(())
        }
        _ => Err(unexpected(LOGOUT_PATH, response)),
    }
}

fn interpret_write<T: DeserializeOwned>(
    path: &'static str,
    response: &HttpResponse,
) -> Result<Outcome<T>, GatewayError> {
    match response.status {
        STATUS_OK => parse_body(path, response).map(Outcome::Accepted),
        STATUS_BAD_REQUEST => parse_validation(path, response),
        STATUS_UNAUTHORIZED => {
            log::debug!("write without session: path={path}");
            Ok(Outcome::Rejected(Rejection::Unauthenticated))
        }
        _ => Err(unexpected(path, response)),
    }
}

fn parse_validation<T>(path: &'static str, response: &HttpResponse) -> Result<Outcome<T>, GatewayError> {
    let errors: ValidationErrors = parse_body(path, response)?;
    log::debug!("validation rejected: path={path} fields={}", errors.0.len());
    Ok(Outcome::Rejected(Rejection::Validation(errors)))
}
