//! Backend client adapter.
//!
//! Everything the application persists or authenticates goes through the [`Backend`]
//! trait. [`RestBackend`] talks to the hosted service over HTTPS; [`MemoryBackend`]
//! evaluates the same queries in process and backs the tests and the demo mode.

/// In-process backend evaluating queries over JSON rows
pub mod memory;
/// HTTPS backend speaking the hosted table and auth APIs
pub mod rest;

pub use memory::MemoryBackend;
pub use rest::RestBackend;

use crate::errors::Result;
use crate::query::{Query, Table};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Authenticated principal as reported by the auth API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Active session: bearer token plus the user it belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix timestamp (seconds) after which the access token is no longer accepted
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

impl Session {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now.timestamp())
    }
}

/// Rows returned by a select, plus the exact count when it was requested.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    pub rows: Vec<Value>,
    pub count: Option<u64>,
}

/// Hosted backend operations used by the application.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Runs a read. With `query.single` set, exactly one row must match.
    async fn select(&self, query: &Query) -> Result<Page>;

    /// Inserts one row and returns it as stored (id and timestamps filled in).
    async fn insert(&self, table: Table, row: Value) -> Result<Value>;

    /// Applies a partial update to the row with the given id.
    async fn update(&self, table: Table, id: &str, patch: Value) -> Result<()>;

    async fn delete(&self, table: Table, id: &str) -> Result<()>;

    /// Current session, refreshed when the backend supports it; `None` when signed out.
    async fn get_session(&self) -> Result<Option<Session>>;

    /// Re-installs a session persisted by a previous run.
    async fn restore_session(&self, session: Session) -> Result<()>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session>;

    async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<Session>;

    async fn sign_out(&self) -> Result<()>;
}

/// Process-wide handle shared by every component.
pub type SharedBackend = Arc<dyn Backend>;
