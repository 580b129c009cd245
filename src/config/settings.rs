//! Application settings loaded from `guia.toml`.
//!
//! Every field has a default, so the file is optional and may set only the values that
//! differ. Durations are stored as plain integers to keep the TOML readable.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default location of the settings file.
pub const DEFAULT_CONFIG_PATH: &str = "guia.toml";

/// Top-level settings structure mirroring the sections of `guia.toml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Query cache and retry behaviour
    pub query: QuerySettings,
    /// Session handling
    pub auth: AuthSettings,
    /// HTTP client settings
    pub http: HttpSettings,
}

/// Query cache settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
    /// Staleness window for row queries
    pub stale_time_secs: u64,
    /// Staleness window for count queries
    pub count_stale_time_secs: u64,
    /// Retries after the first failed attempt
    pub retry: u32,
    /// First retry delay; doubles on every further attempt
    pub retry_base_delay_ms: u64,
    /// Upper bound for the retry delay
    pub retry_max_delay_ms: u64,
    /// Page size used by infinite listings
    pub page_size: u64,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            stale_time_secs: 5 * 60,
            count_stale_time_secs: 10 * 60,
            retry: 2,
            retry_base_delay_ms: 1_000,
            retry_max_delay_ms: 30_000,
            page_size: 10,
        }
    }
}

impl QuerySettings {
    #[must_use]
    pub const fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_time_secs)
    }

    #[must_use]
    pub const fn count_stale_time(&self) -> Duration {
        Duration::from_secs(self.count_stale_time_secs)
    }

    /// Delay before retry number `attempt` (0-based): `min(base * 2^attempt, max)`.
    #[must_use]
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        let delay = self.retry_base_delay_ms.saturating_mul(factor);
        Duration::from_millis(delay.min(self.retry_max_delay_ms))
    }
}

/// Session settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Upper bound for the backend sign-out call before local state is cleared anyway
    pub sign_out_timeout_ms: u64,
    /// File holding the persisted auth snapshot
    pub storage_path: PathBuf,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            sign_out_timeout_ms: 2_000,
            storage_path: PathBuf::from("guia-auth.json"),
        }
    }
}

impl AuthSettings {
    #[must_use]
    pub const fn sign_out_timeout(&self) -> Duration {
        Duration::from_millis(self.sign_out_timeout_ms)
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl HttpSettings {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Loads settings from a TOML file.
///
/// # Errors
/// Returns [`Error::Config`] when the file cannot be read or is not valid TOML.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Loading settings from {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path_ref:?}: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {path_ref:?}: {e}"),
    })
}

/// Loads `./guia.toml` when present, defaults otherwise.
pub fn load_default_config() -> Result<AppConfig> {
    if Path::new(DEFAULT_CONFIG_PATH).exists() {
        load_config(DEFAULT_CONFIG_PATH)
    } else {
        tracing::debug!("{DEFAULT_CONFIG_PATH} not found, using default settings");
        Ok(AppConfig::default())
    }
}
