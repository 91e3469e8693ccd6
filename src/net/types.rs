//! Wire DTOs for the session and user endpoints.
//!
//! DESIGN
//! ======
//! Deserializing through these types is the schema check: a body that does
//! not match is rejected at the gateway instead of being partially trusted.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The authenticated user as returned by `/auth/user`, `/auth/login` and `/users`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    /// Unique user identifier.
    pub id: i64,
    /// RFC 3339 timestamp of account creation.
    pub account_created_at: String,
    /// URL of the user's profile picture.
    pub profile_picture_url: String,
    /// Display name used to log in.
    pub username: String,
    /// Contact email address.
    pub email: String,
    /// Whether the email address has been verified.
    pub email_is_verified: bool,
    /// Whether the user must reset their password before logging in again.
    pub password_reset_is_required: bool,
    /// Whether the account has been locked.
    pub account_is_locked: bool,
    /// Whether the account has been banned.
    pub account_is_banned: bool,
}

/// Body of `POST /auth/login`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Body of `POST /users`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Body of `PATCH /users`. Absent fields are left unchanged by the server.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl ProfileChanges {
    /// True when no field would be sent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profile_picture_url.is_none()
            && self.username.is_none()
            && self.email.is_none()
            && self.password.is_none()
    }
}

/// Body of `POST /files`: raw bytes sent as a JSON array of numbers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFile {
    pub mime_type: String,
    pub name: String,
    pub data: Vec<u8>,
}

impl NewFile {
    /// An uploaded profile picture, named after its image subtype
    /// (`image/png` becomes `picture.png`).
    #[must_use]
    pub fn picture(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        let mime_type = mime_type.into();
        let extension = mime_type.strip_prefix("image/").unwrap_or(&mime_type);
        let name = format!("picture.{extension}");
        Self { mime_type, name, data }
    }
}

/// A stored file as returned by `POST /files`. The bytes are not echoed
/// back into client state.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub id: i64,
    pub user_id: i64,
    pub file_created_at: String,
    pub mime_type: String,
    pub name: String,
}

impl StoredFile {
    /// Where the raw file is served, relative to the API base URL.
    #[must_use]
    pub fn raw_url(&self, api_base_url: &str) -> String {
        format!("{}/files/{}?raw=true", api_base_url.trim_end_matches('/'), self.id)
    }
}

/// A single scalar parameter attached to a validation error.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValidationParam {
    Text(String),
    Number(f64),
    Flag(bool),
}

/// One validation failure reported for a field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrorDetails {
    /// Category of the failure (`required`, `unique`, `length`, ...).
    pub code: String,
    /// Optional server-provided context.
    #[serde(default)]
    pub message: Option<String>,
    /// Constraint parameters, e.g. `min`/`max` for `length`.
    #[serde(default)]
    pub params: BTreeMap<String, ValidationParam>,
}

/// Field-keyed validation failures from a `400` response.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(pub BTreeMap<String, Vec<ValidationErrorDetails>>);

impl ValidationErrors {
    /// First reported failure for `field`, if any.
    ///
    /// Forms show one message per field at a time.
    #[must_use]
    pub fn first(&self, field: &str) -> Option<&ValidationErrorDetails> {
        self.0.get(field).and_then(|details| details.first())
    }

    /// Names of every field with at least one failure.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(_, details)| !details.is_empty())
            .map(|(field, _)| field.as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields().next().is_none()
    }

    /// Text to show under the `field` input: the server's message when it
    /// sent one, otherwise a generic line naming the field.
    #[must_use]
    pub fn message_for(&self, field: &str) -> Option<String> {
        let detail = self.first(field)?;
        Some(detail.message.clone().unwrap_or_else(|| {
            let mut chars = field.chars();
            let label: String = chars.next().map(|c| c.to_uppercase().chain(chars).collect()).unwrap_or_default();
            format!("{label} is invalid.")
        }))
    }
}
