//! Backend location and credentials.
//!
//! The hosted backend is reached through a base URL and an anonymous API key. Both are
//! mandatory: a missing or empty value stops start-up instead of silently pointing the
//! client at some default project.

use crate::errors::{Error, Result};
use std::fmt;

/// Environment variable holding the backend base URL.
pub const URL_VAR: &str = "GUIA_BACKEND_URL";
/// Environment variable holding the anonymous (public) API key.
pub const ANON_KEY_VAR: &str = "GUIA_BACKEND_ANON_KEY";

/// Connection settings for the hosted backend.
#[derive(Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Base URL without trailing slash, e.g. `https://project.example.co`
    pub url: String,
    /// Anonymous API key sent as `apikey` and as the default bearer token
    pub anon_key: String,
}

impl BackendConfig {
    /// Builds a config from explicit values, applying the same validation as [`Self::from_env`].
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Result<Self> {
        let url = url.into();
        let anon_key = anon_key.into();
        Self::from_lookup(|name| match name {
            URL_VAR => Some(url.clone()),
            ANON_KEY_VAR => Some(anon_key.clone()),
            _ => None,
        })
    }

    /// Reads `GUIA_BACKEND_URL` and `GUIA_BACKEND_ANON_KEY` from the process environment.
    ///
    /// # Errors
    /// Returns [`Error::Config`] when either variable is absent, blank, or the URL is not
    /// an `http(s)` URL.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`Self::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = required(&lookup, URL_VAR)?;
        let anon_key = required(&lookup, ANON_KEY_VAR)?;

        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(Error::Config {
                message: format!("{URL_VAR} must be an http(s) URL, got {url:?}"),
            });
        }

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key,
        })
    }

    /// Root of the table API.
    #[must_use]
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.url)
    }

    /// Root of the auth API.
    #[must_use]
    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.url)
    }
}

fn required<F>(lookup: &F, name: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name).map(|v| v.trim().to_string()) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::Config {
            message: format!("{name} is not set"),
        }),
    }
}

// Keep the key out of logs.
impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url)
            .field("anon_key", &"<redacted>")
            .finish()
    }
}
