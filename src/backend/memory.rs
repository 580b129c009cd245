//! In-process backend.
//!
//! Tables are vectors of JSON objects evaluated with the same semantics the hosted
//! service applies: predicates, ordering (nulls last ascending, first descending),
//! ranges, exact counts and embedded relations resolved through foreign keys. It also
//! keeps a small account registry so sign-in and sessions behave like the real thing.
//!
//! Tests can slow every call down, make the next calls fail, hang sign-out, and read
//! per-operation call counters.

use super::{AuthUser, Backend, Page, Session};
use crate::errors::{Error, Result};
use crate::query::{Predicate, Query, Table};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value, json};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, trace};

struct Account {
    user: AuthUser,
    password: String,
}

#[derive(Default)]
struct MemoryState {
    tables: HashMap<Table, Vec<Value>>,
    accounts: Vec<Account>,
    session: Option<Session>,
    next_id: u64,
    calls: HashMap<&'static str, usize>,
    pending_failures: u32,
    latency: Duration,
}

/// Backend holding every table in memory.
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
    hang_sign_out: AtomicBool,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A poisoned lock only means a test panicked mid-call; the data is still usable.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Inserts rows as-is, bypassing id and timestamp defaults.
    pub fn seed(&self, table: Table, rows: Vec<Value>) {
        self.lock().tables.entry(table).or_default().extend(rows);
    }

    /// Snapshot of a table's rows.
    #[must_use]
    pub fn rows(&self, table: Table) -> Vec<Value> {
        self.lock().tables.get(&table).cloned().unwrap_or_default()
    }

    /// Registers a sign-in account and its `users` row; returns the user id.
    pub fn add_account(&self, email: &str, password: &str, name: &str, is_admin: bool) -> String {
        let mut state = self.lock();
        let id = next_id(&mut state, "user");
        let now = Utc::now();
        state.accounts.push(Account {
            user: AuthUser {
                id: id.clone(),
                email: Some(email.to_string()),
                created_at: Some(now),
            },
            password: password.to_string(),
        });
        state.tables.entry(Table::Users).or_default().push(json!({
            "id": id,
            "name": name,
            "email": email,
            "is_admin": is_admin,
            "created_at": now,
            "updated_at": now,
        }));
        id
    }

    /// Registers an account without a `users` row, as happens before the profile
    /// trigger has run.
    pub fn add_bare_account(&self, email: &str, password: &str) -> String {
        let mut state = self.lock();
        let id = next_id(&mut state, "user");
        state.accounts.push(Account {
            user: AuthUser {
                id: id.clone(),
                email: Some(email.to_string()),
                created_at: Some(Utc::now()),
            },
            password: password.to_string(),
        });
        id
    }

    /// Makes the next `count` calls fail with a 503.
    pub fn fail_next(&self, count: u32) {
        self.lock().pending_failures = count;
    }

    /// Delays every call by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = latency;
    }

    /// Makes `sign_out` never complete.
    pub fn hang_sign_out(&self, hang: bool) {
        self.hang_sign_out.store(hang, AtomicOrdering::SeqCst);
    }

    /// Number of calls made to one operation (`select`, `get_session`, ...).
    #[must_use]
    pub fn call_count(&self, operation: &str) -> usize {
        self.lock().calls.get(operation).copied().unwrap_or(0)
    }

    /// Records the call, waits out the configured latency and consumes a pending failure.
    async fn enter(&self, operation: &'static str) -> Result<()> {
        let latency = {
            let mut state = self.lock();
            *state.calls.entry(operation).or_insert(0) += 1;
            state.latency
        };
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        let mut state = self.lock();
        if state.pending_failures > 0 {
            state.pending_failures -= 1;
            return Err(Error::Backend {
                status: 503,
                message: format!("{operation} unavailable"),
            });
        }
        Ok(())
    }
}

fn next_id(state: &mut MemoryState, prefix: &str) -> String {
    state.next_id += 1;
    format!("{prefix}-{:04}", state.next_id)
}

fn issue_session(user: &AuthUser) -> Session {
    Session {
        access_token: format!("token-{}", user.id),
        refresh_token: None,
        expires_at: None,
        user: user.clone(),
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn select(&self, query: &Query) -> Result<Page> {
        self.enter("select").await?;
        let state = self.lock();
        let page = evaluate(&state.tables, query)?;
        trace!(
            "memory select on {} returned {} rows",
            query.table,
            page.rows.len()
        );
        Ok(page)
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Value> {
        self.enter("insert").await?;
        let Value::Object(mut fields) = row else {
            return Err(Error::Validation {
                message: format!("{table} rows must be JSON objects"),
            });
        };
        let mut state = self.lock();
        if !fields
            .get("id")
            .and_then(Value::as_str)
            .is_some_and(|id| !id.is_empty())
        {
            let id = next_id(&mut state, table.name());
            fields.insert("id".to_string(), Value::String(id));
        }
        let now = json!(Utc::now());
        fields.entry("created_at").or_insert_with(|| now.clone());
        fields.entry("updated_at").or_insert(now);

        let stored = Value::Object(fields);
        state.tables.entry(table).or_default().push(stored.clone());
        debug!("memory insert into {table}");
        Ok(stored)
    }

    async fn update(&self, table: Table, id: &str, patch: Value) -> Result<()> {
        self.enter("update").await?;
        let Value::Object(patch) = patch else {
            return Err(Error::Validation {
                message: format!("{table} updates must be JSON objects"),
            });
        };
        let mut state = self.lock();
        let row = state
            .tables
            .get_mut(&table)
            .and_then(|rows| rows.iter_mut().find(|r| r["id"] == id))
            .and_then(Value::as_object_mut)
            .ok_or_else(|| Error::NotFound {
                table: table.to_string(),
                id: id.to_string(),
            })?;
        for (key, value) in patch {
            row.insert(key, value);
        }
        row.insert("updated_at".to_string(), json!(Utc::now()));
        Ok(())
    }

    async fn delete(&self, table: Table, id: &str) -> Result<()> {
        self.enter("delete").await?;
        let mut state = self.lock();
        if let Some(rows) = state.tables.get_mut(&table) {
            rows.retain(|r| r["id"] != id);
        }
        Ok(())
    }

    async fn get_session(&self) -> Result<Option<Session>> {
        self.enter("get_session").await?;
        Ok(self.lock().session.clone())
    }

    async fn restore_session(&self, session: Session) -> Result<()> {
        let mut state = self.lock();
        if state.accounts.iter().any(|a| a.user.id == session.user.id) {
            state.session = Some(session);
        }
        Ok(())
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        self.enter("sign_in").await?;
        let mut state = self.lock();
        let session = state
            .accounts
            .iter()
            .find(|a| a.user.email.as_deref() == Some(email) && a.password == password)
            .map(|a| issue_session(&a.user))
            .ok_or_else(|| Error::Backend {
                status: 400,
                message: "Invalid login credentials".to_string(),
            })?;
        state.session = Some(session.clone());
        Ok(session)
    }

    async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<Session> {
        self.enter("sign_up").await?;
        let exists = self
            .lock()
            .accounts
            .iter()
            .any(|a| a.user.email.as_deref() == Some(email));
        if exists {
            return Err(Error::Backend {
                status: 422,
                message: "User already registered".to_string(),
            });
        }
        self.add_account(email, password, name, false);
        let mut state = self.lock();
        let session = state
            .accounts
            .iter()
            .find(|a| a.user.email.as_deref() == Some(email))
            .map(|a| issue_session(&a.user))
            .ok_or_else(|| Error::Auth {
                message: "Account vanished during sign-up".to_string(),
            })?;
        state.session = Some(session.clone());
        Ok(session)
    }

    async fn sign_out(&self) -> Result<()> {
        self.enter("sign_out").await?;
        if self.hang_sign_out.load(AtomicOrdering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.lock().session = None;
        Ok(())
    }
}

/// Runs a query against the in-memory tables.
fn evaluate(tables: &HashMap<Table, Vec<Value>>, query: &Query) -> Result<Page> {
    let mut rows: Vec<&Value> = tables
        .get(&query.table)
        .map(|rows| {
            rows.iter()
                .filter(|row| query.predicates.iter().all(|p| matches(row, p)))
                .collect()
        })
        .unwrap_or_default();

    let count = query.count.then_some(rows.len() as u64);

    rows.sort_by(|a, b| {
        for order in &query.order {
            let ordering = compare_for_order(&a[&order.column], &b[&order.column], order.ascending);
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });

    let offset = usize::try_from(query.offset.unwrap_or(0)).unwrap_or(usize::MAX);
    let limit = query
        .limit
        .map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));
    let window: Vec<Value> = rows
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(|row| project(tables, row, &query.select))
        .collect();

    if query.single && window.len() != 1 {
        return Err(Error::NotFound {
            table: query.table.to_string(),
            id: format!("{:?}", query.predicates),
        });
    }

    Ok(Page {
        rows: if query.head { Vec::new() } else { window },
        count,
    })
}

fn matches(row: &Value, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::Eq { column, value } => {
            compare(&row[column], value) == Some(Ordering::Equal)
        }
        Predicate::Ilike { column, pattern } => row[column]
            .as_str()
            .is_some_and(|text| like(text, pattern)),
        Predicate::Gte { column, value } => matches!(
            compare(&row[column], value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Predicate::Lte { column, value } => matches!(
            compare(&row[column], value),
            Some(Ordering::Less | Ordering::Equal)
        ),
        Predicate::Lt { column, value } => compare(&row[column], value) == Some(Ordering::Less),
        Predicate::AnyIlike { columns, pattern } => columns
            .iter()
            .any(|c| row[c].as_str().is_some_and(|text| like(text, pattern))),
    }
}

fn as_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            // Bare dates such as "2025-11-24" compare as midnight UTC.
            chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        })
}

/// SQL-style comparison; `None` when either side is null or the types differ.
fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Null, _) | (_, Value::Null) => None,
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => match (as_timestamp(a), as_timestamp(b)) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => Some(a.cmp(b)),
        },
        (Value::Number(a), Value::String(b)) => a.as_f64()?.partial_cmp(&b.parse::<f64>().ok()?),
        (Value::String(a), Value::Number(b)) => a.parse::<f64>().ok()?.partial_cmp(&b.as_f64()?),
        (Value::Bool(a), Value::String(b)) => Some(a.to_string().as_str().cmp(b.as_str())),
        _ => None,
    }
}

fn compare_for_order(a: &Value, b: &Value, ascending: bool) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        // Nulls sort last ascending and first descending, as in PostgreSQL.
        (true, false) => {
            if ascending {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
        (false, true) => {
            if ascending {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
        (false, false) => {
            let ordering = compare(a, b).unwrap_or(Ordering::Equal);
            if ascending { ordering } else { ordering.reverse() }
        }
    }
}

/// Case-insensitive `LIKE` with `%` (any run) and `_` (one char) wildcards.
fn like(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.to_lowercase().chars().collect();
    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();

    // matched[j]: pattern[..j] matches the text consumed so far
    let mut matched = vec![false; pattern.len() + 1];
    matched[0] = true;
    for j in 1..=pattern.len() {
        matched[j] = matched[j - 1] && pattern[j - 1] == '%';
    }
    for c in text {
        let mut next = vec![false; pattern.len() + 1];
        for j in 1..=pattern.len() {
            next[j] = match pattern[j - 1] {
                '%' => next[j - 1] || matched[j],
                '_' => matched[j - 1],
                p => matched[j - 1] && p == c,
            };
        }
        matched = next;
    }
    matched[pattern.len()]
}

/// Splits a select list on top-level commas.
fn select_items(select: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for c in select.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => {
                items.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        items.push(current.trim().to_string());
    }
    items
}

/// Applies the select list to one row, expanding embedded relations.
fn project(tables: &HashMap<Table, Vec<Value>>, row: &Value, select: &str) -> Value {
    let Some(fields) = row.as_object() else {
        return row.clone();
    };
    let mut out = Map::new();
    for item in select_items(select) {
        if item == "*" {
            out.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        } else if let Some((relation, inner)) = item.strip_suffix(')').and_then(|s| s.split_once('(')) {
            let relation = relation.trim();
            let embedded = Table::from_name(relation)
                .and_then(|table| {
                    let key = &row[table.foreign_key()];
                    tables
                        .get(&table)
                        .and_then(|rows| rows.iter().find(|r| !key.is_null() && &r["id"] == key))
                })
                .map_or(Value::Null, |related| project(tables, related, inner));
            out.insert(relation.to_string(), embedded);
        } else if let Some(value) = fields.get(&item) {
            out.insert(item, value.clone());
        }
    }
    Value::Object(out)
}
