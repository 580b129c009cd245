//! File-backed key-value store for client state that survives restarts.
//!
//! The whole store is one JSON object. Writes go to a sibling temp file that is then
//! renamed over the original, so a crash mid-write leaves the previous contents intact.
//! Clones share one lock around each read-modify-write, so concurrent writers never
//! drop each other's keys.

use crate::errors::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::trace;

/// Key holding the serialized auth snapshot (`user`, `profile`, `is_admin`).
pub const AUTH_STORAGE_KEY: &str = "auth-storage";
/// Key holding the backend session used to resume without signing in again.
pub const SESSION_STORAGE_KEY: &str = "auth-token";

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl FileStore {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str(&contents)? {
            Value::Object(map) => Ok(map),
            _ => Err(Error::Storage {
                message: format!("{} does not hold a JSON object", self.path.display()),
            }),
        }
    }

    fn write_all(&self, map: Map<String, Value>) -> Result<()> {
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(&Value::Object(map))?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Value stored under `key`, if any.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.read_all()?
            .remove(key)
            .map(serde_json::from_value)
            .transpose()
            .map_err(Error::from)
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let _guard = self.lock();
        let mut map = self.read_all()?;
        map.insert(key.to_string(), serde_json::to_value(value)?);
        trace!("Persisting {key} to {}", self.path.display());
        self.write_all(map)
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock();
        let mut map = self.read_all()?;
        if map.remove(key).is_some() {
            self.write_all(map)?;
        }
        Ok(())
    }
}
