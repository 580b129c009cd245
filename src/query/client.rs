//! Cached, retrying access to the backend.
//!
//! Results are cached per query (table plus the serialized query) and served until
//! they are older than the staleness window or their table has been invalidated by a
//! mutation. Failed reads are retried with exponential delay before the error is logged
//! and handed back.

use super::builder::{Query, QueryOptions, Record, Select, Table};
use crate::backend::{Page, SharedBackend};
use crate::config::settings::QuerySettings;
use crate::errors::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, trace, warn};

/// What a view sees of one query: the rows, whether they are still loading, and the
/// error message of the last failed attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<T> {
    pub data: Option<T>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self::loading()
    }
}

impl<T> QueryState<T> {
    #[must_use]
    pub const fn loading() -> Self {
        Self {
            data: None,
            is_loading: true,
            error: None,
        }
    }

    #[must_use]
    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self {
                data: Some(data),
                is_loading: false,
                error: None,
            },
            Err(e) => Self {
                data: None,
                is_loading: false,
                error: Some(e.to_string()),
            },
        }
    }
}

struct CacheEntry {
    table: Table,
    page: Page,
    fetched_at: Instant,
    invalidated: bool,
}

impl CacheEntry {
    fn is_fresh(&self, stale_time: Duration) -> bool {
        !self.invalidated && self.fetched_at.elapsed() < stale_time
    }
}

/// Shared query cache in front of the backend.
pub struct QueryClient {
    backend: SharedBackend,
    settings: QuerySettings,
    cache: RwLock<HashMap<String, CacheEntry>>,
}

impl QueryClient {
    #[must_use]
    pub fn new(backend: SharedBackend, settings: QuerySettings) -> Self {
        Self {
            backend,
            settings,
            cache: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub const fn backend(&self) -> &SharedBackend {
        &self.backend
    }

    #[must_use]
    pub const fn settings(&self) -> &QuerySettings {
        &self.settings
    }

    /// Runs a query, serving it from the cache while younger than `stale_time`.
    pub async fn fetch_page(&self, query: &Query, stale_time: Duration) -> Result<Page> {
        let key = query.cache_key();
        {
            let cache = self.cache.read().await;
            if let Some(entry) = cache.get(&key).filter(|e| e.is_fresh(stale_time)) {
                trace!("Cache hit for {} query", query.table);
                return Ok(entry.page.clone());
            }
        }

        let page = self.execute(query).await?;
        self.cache.write().await.insert(
            key,
            CacheEntry {
                table: query.table,
                page: page.clone(),
                fetched_at: Instant::now(),
                invalidated: false,
            },
        );
        Ok(page)
    }

    /// Sends the query to the backend, retrying retryable failures.
    async fn execute(&self, query: &Query) -> Result<Page> {
        let mut attempt = 0;
        loop {
            debug!("Querying {} (attempt {})", query.table, attempt + 1);
            match self.backend.select(query).await {
                Ok(page) => return Ok(page),
                Err(e) if e.is_retryable() && attempt < self.settings.retry => {
                    let delay = self.settings.retry_delay(attempt);
                    warn!(
                        "Query on {} failed ({}), retrying in {:?}",
                        query.table, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!("Error fetching {}: {}", query.table, e);
                    return Err(e);
                }
            }
        }
    }

    /// Generic listing: rows matching every equality filter, in the requested order.
    pub async fn fetch<R: Record>(&self, options: &QueryOptions<R>) -> Result<Vec<R>> {
        self.fetch_select(options.to_select()).await
    }

    /// Ad hoc listing for queries the generic options cannot express.
    pub async fn fetch_select<R: Record>(&self, select: Select<R>) -> Result<Vec<R>> {
        let page = self
            .fetch_page(select.query(), self.settings.stale_time())
            .await?;
        decode_rows(page.rows)
    }

    /// Rows plus the exact count, when the select asked for one.
    pub async fn fetch_select_page<R: Record>(
        &self,
        select: Select<R>,
    ) -> Result<(Vec<R>, Option<u64>)> {
        let page = self
            .fetch_page(select.query(), self.settings.stale_time())
            .await?;
        Ok((decode_rows(page.rows)?, page.count))
    }

    /// Same as [`fetch`](Self::fetch) but always goes to the backend.
    pub async fn refetch<R: Record>(&self, options: &QueryOptions<R>) -> Result<Vec<R>> {
        let page = self
            .fetch_page(&options.to_query(), Duration::ZERO)
            .await?;
        decode_rows(page.rows)
    }

    /// View-facing wrapper around [`fetch`](Self::fetch).
    pub async fn query<R: Record>(&self, options: &QueryOptions<R>) -> QueryState<Vec<R>> {
        QueryState::from_result(self.fetch(options).await)
    }

    /// One row by id; `None` for an empty id or when no row has it.
    pub async fn fetch_by_id<R: Record>(&self, id: &str, columns: &str) -> Result<Option<R>> {
        if id.trim().is_empty() {
            return Ok(None);
        }
        let select = Select::<R>::new()
            .columns(columns)
            .eq_id(id)
            .single();
        match self
            .fetch_page(select.query(), self.settings.stale_time())
            .await
        {
            Ok(page) => Ok(decode_rows(page.rows)?.into_iter().next()),
            Err(Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Exact number of rows matching the options' filters.
    pub async fn count<R: Record>(&self, options: &QueryOptions<R>) -> Result<u64> {
        self.count_select(options.to_select()).await
    }

    pub async fn count_select<R: Record>(&self, select: Select<R>) -> Result<u64> {
        let select = select.head();
        let page = self
            .fetch_page(select.query(), self.settings.count_stale_time())
            .await?;
        Ok(page.count.unwrap_or(0))
    }

    /// Marks every cached query of `table` stale.
    pub async fn invalidate(&self, table: Table) {
        let mut cache = self.cache.write().await;
        let mut marked = 0usize;
        for entry in cache.values_mut().filter(|e| e.table == table) {
            entry.invalidated = true;
            marked += 1;
        }
        debug!("Invalidated {marked} cached {table} queries");
    }

    /// Inserts a row and invalidates its table.
    pub async fn insert<R: Record>(&self, row: &impl Serialize) -> Result<R> {
        let stored = self
            .backend
            .insert(R::TABLE, serde_json::to_value(row)?)
            .await?;
        self.invalidate(R::TABLE).await;
        Ok(serde_json::from_value(stored)?)
    }

    /// Applies a partial update and invalidates the table.
    pub async fn update<R: Record>(&self, id: &str, patch: Value) -> Result<()> {
        self.backend.update(R::TABLE, id, patch).await?;
        self.invalidate(R::TABLE).await;
        Ok(())
    }

    pub async fn delete<R: Record>(&self, id: &str) -> Result<()> {
        self.backend.delete(R::TABLE, id).await?;
        self.invalidate(R::TABLE).await;
        Ok(())
    }

    /// Revalidates `options` every `interval` and publishes each result.
    ///
    /// The task stops once every receiver is dropped.
    pub fn poll<R: Record>(
        self: &Arc<Self>,
        options: QueryOptions<R>,
        interval: Duration,
    ) -> (watch::Receiver<QueryState<Vec<R>>>, JoinHandle<()>) {
        let (tx, rx) = watch::channel(QueryState::loading());
        let client = Arc::clone(self);
        let handle = tokio::spawn(async move {
            loop {
                let state = QueryState::from_result(client.refetch(&options).await);
                if tx.send(state).is_err() {
                    break;
                }
                tokio::time::sleep(interval).await;
                if tx.is_closed() {
                    break;
                }
            }
            trace!("Polling of {} stopped", R::TABLE);
        });
        (rx, handle)
    }
}

fn decode_rows<R: Record>(rows: Vec<Value>) -> Result<Vec<R>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(Error::from))
        .collect()
}
