//! HTTP transport boundary.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`, always sending the
//! session cookie.
//! Server-side (SSR): the transport reports `Unavailable`; session data is
//! only meaningful in the browser.
//!
//! SYSTEM CONTEXT
//! ==============
//! `gateway` talks to this trait rather than to `gloo-net` directly so the
//! session cache can be driven by a scripted transport in tests.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::error::TransportError;

/// HTTP verbs used by the session endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
}

/// A request relative to the configured API base URL.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub path: &'static str,
    pub body: Option<serde_json::Value>,
}

impl HttpRequest {
    #[must_use]
    pub fn get(path: &'static str) -> Self {
        Self { method: Method::Get, path, body: None }
    }

    #[must_use]
    pub fn post(path: &'static str, body: Option<serde_json::Value>) -> Self {
        Self { method: Method::Post, path, body }
    }

    #[must_use]
    pub fn patch(path: &'static str, body: serde_json::Value) -> Self {
        Self { method: Method::Patch, path, body: Some(body) }
    }
}

/// Raw status and body, before any interpretation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    /// The server sends an empty body for "absent" values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }

    /// Parse the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the serde error if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// The HTTP collaborator consumed by the session gateway.
///
/// Implementations return every status code as a response; only failures to
/// obtain a response at all are errors.
#[async_trait(?Send)]
pub trait HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[cfg(any(test, feature = "hydrate"))]
fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}

/// Browser transport backed by `fetch` with credentials included.
#[derive(Clone, Debug)]
pub struct BrowserTransport {
    base_url: String,
}

impl BrowserTransport {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into() }
    }
}

#[async_trait(?Send)]
impl HttpTransport for BrowserTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        #[cfg(feature = "hydrate")]
        {
            use gloo_net::http::Request;

            let url = endpoint_url(&self.base_url, request.path);
            let builder = match request.method {
                Method::Get => Request::get(&url),
                Method::Post => Request::post(&url),
                Method::Patch => Request::patch(&url),
            }
            .credentials(web_sys::RequestCredentials::Include);

            let response = match request.body {
                Some(body) => {
                    builder
                        .json(&body)
                        .map_err(|e| TransportError::Request(e.to_string()))?
                        .send()
                        .await
                }
                None => builder.send().await,
            }
            .map_err(|e| TransportError::Network(e.to_string()))?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| TransportError::Body(e.to_string()))?;
            Ok(HttpResponse { status, body })
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (&self.base_url, request);
            Err(TransportError::Unavailable)
        }
    }
}
