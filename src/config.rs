//! Client configuration baked in at build time.
//!
//! SYSTEM CONTEXT
//! ==============
//! The WASM bundle has no process environment at runtime, so values are read
//! with `option_env!` when the crate is compiled. `from_lookup` takes any
//! key lookup so parsing is tested without touching the real environment.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const API_URL_VAR: &str = "STATUS_API_URL";
pub const LOGIN_PATH_VAR: &str = "STATUS_LOGIN_PATH";
pub const HOME_PATH_VAR: &str = "STATUS_HOME_PATH";
pub const ERROR_PATH_VAR: &str = "STATUS_ERROR_PATH";

pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const DEFAULT_HOME_PATH: &str = "/";
pub const DEFAULT_ERROR_PATH: &str = "/error";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be an http(s) URL or an absolute path, got '{value}'")]
    InvalidUrl { var: &'static str, value: String },
    #[error("{var} must be an absolute route path, got '{value}'")]
    InvalidPath { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Prefix for every API request. Empty means same origin.
    pub api_base_url: String,
    /// Where authenticated-only routes send guests.
    pub login_path: String,
    /// Where guest-only routes send signed-in users.
    pub home_path: String,
    /// Where any guard sends visitors when the session could not be determined.
    pub error_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
            home_path: DEFAULT_HOME_PATH.to_owned(),
            error_path: DEFAULT_ERROR_PATH.to_owned(),
        }
    }
}

impl ClientConfig {
    /// Build from the variables present when the crate was compiled.
    ///
    /// Optional:
    /// - `STATUS_API_URL`: API origin, same origin when absent
    /// - `STATUS_LOGIN_PATH`: default `/login`
    /// - `STATUS_HOME_PATH`: default `/`
    /// - `STATUS_ERROR_PATH`: default `/error`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a value is present but malformed.
    pub fn from_build_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| {
            match var {
                API_URL_VAR => option_env!("STATUS_API_URL"),
                LOGIN_PATH_VAR => option_env!("STATUS_LOGIN_PATH"),
                HOME_PATH_VAR => option_env!("STATUS_HOME_PATH"),
                ERROR_PATH_VAR => option_env!("STATUS_ERROR_PATH"),
                _ => None,
            }
            .map(str::to_owned)
        })
    }

    /// Build from an arbitrary key lookup. Blank values count as absent.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a value is present but malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |var: &str| lookup(var).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let api_base_url = match read(API_URL_VAR) {
            Some(value) => parse_base_url(&value)?,
            None => String::new(),
        };
        Ok(Self {
            api_base_url,
            login_path: parse_path(LOGIN_PATH_VAR, read(LOGIN_PATH_VAR), DEFAULT_LOGIN_PATH)?,
            home_path: parse_path(HOME_PATH_VAR, read(HOME_PATH_VAR), DEFAULT_HOME_PATH)?,
            error_path: parse_path(ERROR_PATH_VAR, read(ERROR_PATH_VAR), DEFAULT_ERROR_PATH)?,
        })
    }
}

fn parse_base_url(value: &str) -> Result<String, ConfigError> {
    let accepted = value.starts_with("https://") || value.starts_with("http://") || value.starts_with('/');
    if !accepted {
        return Err(ConfigError::InvalidUrl { var: API_URL_VAR, value: value.to_owned() });
    }
    Ok(value.trim_end_matches('/').to_owned())
}

fn parse_path(var: &'static str, raw: Option<String>, default: &str) -> Result<String, ConfigError> {
    match raw {
        None => Ok(default.to_owned()),
        Some(path) if path.starts_with('/') && !path.starts_with("//") => Ok(path),
        Some(value) => Err(ConfigError::InvalidPath { var, value }),
    }
}
