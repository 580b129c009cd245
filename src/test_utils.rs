//! Shared test utilities for the directory client.
//!
//! This module provides helpers for building in-memory backends, query clients with
//! test-friendly settings, and event rows with sensible defaults.

use crate::{
    backend::MemoryBackend,
    config::{AuthSettings, QuerySettings},
    demo,
    query::{QueryClient, Table},
};
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use std::sync::Arc;

/// Query settings that keep retry tests fast.
///
/// # Defaults
/// * `retry`: 2 (three attempts in total)
/// * `retry_base_delay_ms`: 1
/// * everything else as in production
pub fn fast_settings() -> QuerySettings {
    QuerySettings {
        retry: 2,
        retry_base_delay_ms: 1,
        retry_max_delay_ms: 5,
        ..QuerySettings::default()
    }
}

/// Session settings persisting into `dir/auth.json`, with a 50 ms sign-out bound.
pub fn auth_settings(dir: &tempfile::TempDir) -> AuthSettings {
    AuthSettings {
        sign_out_timeout_ms: 50,
        storage_path: dir.path().join("auth.json"),
    }
}

/// Creates an event row with sensible defaults.
///
/// # Defaults
/// * `title`: "Evento {id}"
/// * `city_id`: "city-1"
/// * `is_featured`: false
pub fn event_row(id: &str, is_active: bool, start: DateTime<Utc>) -> Value {
    json!({
        "id": id,
        "title": format!("Evento {id}"),
        "start_datetime": start,
        "city_id": "city-1",
        "is_active": is_active,
        "is_featured": false,
        "created_at": start,
    })
}

/// Seeds the two cities plus three active and two inactive events.
pub fn seed_events_scenario(backend: &MemoryBackend) {
    let now = Utc::now();
    let day = chrono::Duration::days;
    backend.seed(
        Table::Cities,
        vec![
            json!({ "id": "city-1", "name": "Conselheiro Lafaiete", "state": "MG" }),
            json!({ "id": "city-2", "name": "Congonhas", "state": "MG" }),
        ],
    );
    backend.seed(
        Table::Events,
        vec![
            event_row("event-active-1", true, now + day(3)),
            event_row("event-active-2", true, now + day(1)),
            event_row("event-active-3", true, now + day(10)),
            event_row("event-inactive-1", false, now + day(2)),
            event_row("event-inactive-2", false, now - day(5)),
        ],
    );
}

/// In-memory backend loaded with the demo data set, and a fast query client on top.
pub fn demo_client() -> (Arc<MemoryBackend>, QueryClient) {
    let backend = Arc::new(MemoryBackend::new());
    demo::seed(&backend, Utc::now());
    let client = QueryClient::new(backend.clone(), fast_settings());
    (backend, client)
}

/// Routes `tracing` output through the test harness so it shows up only for failing tests.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
