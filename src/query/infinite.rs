//! Infinite listings.
//!
//! Pages are appended as they are loaded and deduplicated by id, so rows shifted across
//! a page boundary by concurrent inserts show up only once.

use super::builder::{Record, Select};
use super::client::QueryClient;
use crate::errors::Result;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error};

struct Accumulated<R> {
    items: Vec<R>,
    seen: HashSet<String>,
    pages_loaded: u64,
    has_more: bool,
    is_loading: bool,
    error: Option<String>,
}

impl<R> Default for Accumulated<R> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
            pages_loaded: 0,
            has_more: true,
            is_loading: false,
            error: None,
        }
    }
}

/// Clears `is_loading` if a `load_more` future is dropped before its page arrives.
struct LoadingFlag<'a, R: Record> {
    query: &'a InfiniteQuery<R>,
    armed: bool,
}

impl<R: Record> Drop for LoadingFlag<'_, R> {
    fn drop(&mut self) {
        if self.armed {
            self.query.lock().is_loading = false;
        }
    }
}

/// Page-by-page listing over a base query.
pub struct InfiniteQuery<R: Record> {
    client: Arc<QueryClient>,
    base: Select<R>,
    page_size: u64,
    state: Mutex<Accumulated<R>>,
}

impl<R: Record> InfiniteQuery<R> {
    /// Listing with the client's configured page size.
    #[must_use]
    pub fn new(client: Arc<QueryClient>, base: Select<R>) -> Self {
        let page_size = client.settings().page_size;
        Self::with_page_size(client, base, page_size)
    }

    #[must_use]
    pub fn with_page_size(client: Arc<QueryClient>, base: Select<R>, page_size: u64) -> Self {
        Self {
            client,
            base,
            page_size: page_size.max(1),
            state: Mutex::new(Accumulated::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Accumulated<R>> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Fetches the next page.
    ///
    /// Returns `Ok(false)` without touching the backend while a page is already loading
    /// or when the listing is exhausted.
    pub async fn load_more(&self) -> Result<bool> {
        let offset = {
            let mut state = self.lock();
            if state.is_loading || !state.has_more {
                return Ok(false);
            }
            state.is_loading = true;
            state.pages_loaded * self.page_size
        };
        let mut loading = LoadingFlag {
            query: self,
            armed: true,
        };

        let select = self
            .base
            .clone()
            .range(offset, offset + self.page_size - 1)
            .with_count();
        let result = self.client.fetch_select_page(select).await;

        let mut state = self.lock();
        state.is_loading = false;
        loading.armed = false;
        let (rows, count) = match result {
            Ok(page) => page,
            Err(e) => {
                error!("Error loading page at offset {offset} of {}: {e}", R::TABLE);
                state.error = Some(e.to_string());
                return Err(e);
            }
        };

        let fetched = rows.len() as u64;
        for row in rows {
            if state.seen.insert(row.id().to_string()) {
                state.items.push(row);
            }
        }
        state.pages_loaded += 1;
        state.error = None;
        state.has_more = match count {
            Some(total) => offset + self.page_size < total,
            None => fetched == self.page_size,
        };
        debug!(
            "Loaded {} page {} ({} rows kept, more: {})",
            R::TABLE,
            state.pages_loaded,
            state.items.len(),
            state.has_more
        );
        Ok(true)
    }

    /// Drops everything loaded so far.
    pub fn reset(&self) {
        *self.lock() = Accumulated::default();
    }

    #[must_use]
    pub fn items(&self) -> Vec<R> {
        self.lock().items.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.lock().has_more
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.lock().is_loading
    }

    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::entities::{Event, EventColumn};
    use crate::query::Table;
    use crate::test_utils::{event_row, fast_settings};
    use chrono::{Duration, Utc};
    use std::time::Duration as StdDuration;

    fn seeded(count: i64) -> Arc<MemoryBackend> {
        let backend = Arc::new(MemoryBackend::new());
        let base = Utc::now();
        let rows = (0..count)
            .map(|i| event_row(&format!("e{i:02}"), true, base + Duration::hours(i)))
            .collect();
        backend.seed(Table::Events, rows);
        backend
    }

    fn listing(backend: &Arc<MemoryBackend>, page_size: u64) -> InfiniteQuery<Event> {
        let client = Arc::new(QueryClient::new(backend.clone(), fast_settings()));
        InfiniteQuery::with_page_size(
            client,
            Select::<Event>::new().order_by(EventColumn::StartDatetime, true),
            page_size,
        )
    }

    #[tokio::test]
    async fn test_loads_until_exhausted() -> Result<()> {
        let backend = seeded(25);
        let events = listing(&backend, 10);

        assert!(events.load_more().await?);
        assert!(events.load_more().await?);
        assert!(events.has_more());
        assert!(events.load_more().await?);
        assert_eq!(events.len(), 25);
        assert!(!events.has_more());

        let calls = backend.call_count("select");
        assert!(!events.load_more().await?);
        assert_eq!(backend.call_count("select"), calls);
        Ok(())
    }

    #[tokio::test]
    async fn test_exact_multiple_stops_without_extra_page() -> Result<()> {
        let backend = seeded(20);
        let events = listing(&backend, 10);
        events.load_more().await?;
        events.load_more().await?;
        assert!(!events.has_more());
        Ok(())
    }

    #[tokio::test]
    async fn test_shifted_rows_are_deduplicated() -> Result<()> {
        let backend = seeded(15);
        let events = listing(&backend, 10);
        events.load_more().await?;

        // A new earliest event pushes e09 onto the second page.
        backend.seed(
            Table::Events,
            vec![event_row("early", true, Utc::now() - Duration::days(1))],
        );
        events.reset_cache_for_test().await;
        events.load_more().await?;

        let items = events.items();
        let mut ids: Vec<&str> = items.iter().map(|e| e.id.as_str()).collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
        assert_eq!(total, 15);
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_load_more_is_single() -> Result<()> {
        let backend = seeded(25);
        backend.set_latency(StdDuration::from_millis(20));
        let events = listing(&backend, 10);

        let (a, b) = tokio::join!(events.load_more(), events.load_more());
        assert!(a? ^ b?);
        assert_eq!(events.len(), 10);
        assert_eq!(backend.call_count("select"), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_reset_starts_over() -> Result<()> {
        let backend = seeded(5);
        let events = listing(&backend, 10);
        events.load_more().await?;
        assert!(!events.has_more());

        events.reset();
        assert!(events.is_empty());
        assert!(events.has_more());
        events.load_more().await?;
        assert_eq!(events.len(), 5);
        Ok(())
    }

    #[tokio::test]
    async fn test_error_is_recorded() {
        let backend = seeded(5);
        backend.fail_next(10);
        let events = listing(&backend, 10);
        assert!(events.load_more().await.is_err());
        assert!(events.error().is_some());
        assert!(!events.is_loading());
    }

    #[tokio::test]
    async fn test_dropped_load_does_not_block_the_listing() -> Result<()> {
        let backend = seeded(5);
        backend.set_latency(StdDuration::from_millis(50));
        let events = listing(&backend, 10);

        let cut_short = tokio::time::timeout(StdDuration::from_millis(5), events.load_more()).await;
        assert!(cut_short.is_err());
        assert!(!events.is_loading());

        assert!(events.load_more().await?);
        assert_eq!(events.len(), 5);
        Ok(())
    }

    impl<R: Record> InfiniteQuery<R> {
        async fn reset_cache_for_test(&self) {
            self.client.invalidate(R::TABLE).await;
        }
    }
}
