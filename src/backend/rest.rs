//! HTTPS backend for the hosted table (PostgREST) and auth (GoTrue) APIs.
//!
//! Reads are plain `GET`s with the filters encoded as query parameters; the exact row
//! count comes back in the `Content-Range` header when `Prefer: count=exact` is sent.
//! The session lives in memory here; persisting it across runs is the session
//! context's job.

use super::{AuthUser, Backend, Page, Session};
use crate::config::BackendConfig;
use crate::errors::{Error, Result};
use crate::query::{Predicate, Query, Table};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_RANGE, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Client for the hosted backend.
pub struct RestBackend {
    config: BackendConfig,
    client: reqwest::Client,
    session: RwLock<Option<Session>>,
}

impl RestBackend {
    /// Builds the client with the `apikey` header preset on every request.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the key is not a valid header value and
    /// [`Error::Http`] if the HTTP client cannot be built.
    pub fn new(config: BackendConfig, timeout: Duration) -> Result<Self> {
        Self::with_builder(config, reqwest::Client::builder().timeout(timeout))
    }

    fn with_builder(config: BackendConfig, builder: reqwest::ClientBuilder) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(&config.anon_key).map_err(|e| Error::Config {
            message: format!("Anonymous key is not a valid header value: {e}"),
        })?;
        headers.insert("apikey", api_key);

        let client = builder.default_headers(headers).build()?;

        info!("Backend client ready for {}", config.url);
        Ok(Self {
            config,
            client,
            session: RwLock::new(None),
        })
    }

    /// Bearer token for the next request: the session's when signed in, else the anon key.
    async fn bearer(&self) -> String {
        let session = self.session.read().await;
        let token = session
            .as_ref()
            .map_or(self.config.anon_key.as_str(), |s| s.access_token.as_str());
        format!("Bearer {token}")
    }

    async fn table_request(&self, method: reqwest::Method, table: Table) -> RequestBuilder {
        let url = format!("{}/{}", self.config.rest_url(), table.name());
        self.client
            .request(method, url)
            .header(AUTHORIZATION, self.bearer().await)
    }

    async fn token_request(&self, grant_type: &str, body: Value) -> Result<Session> {
        let url = format!("{}/token?grant_type={grant_type}", self.config.auth_url());
        let response = self.client.post(url).json(&body).send().await?;
        let token: TokenResponse = check(response).await?.json().await?;
        Ok(token.into_session())
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session> {
        debug!("Refreshing expired session");
        self.token_request("refresh_token", json!({ "refresh_token": refresh_token }))
            .await
    }
}

/// Encodes a query as PostgREST URL parameters.
#[must_use]
pub fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), compact_select(&query.select))];

    for predicate in &query.predicates {
        let (key, value) = match predicate {
            Predicate::Eq { column, value } => (column.clone(), format!("eq.{}", literal(value))),
            Predicate::Ilike { column, pattern } => {
                (column.clone(), format!("ilike.{}", wildcard(pattern)))
            }
            Predicate::Gte { column, value } => {
                (column.clone(), format!("gte.{}", literal(value)))
            }
            Predicate::Lte { column, value } => {
                (column.clone(), format!("lte.{}", literal(value)))
            }
            Predicate::Lt { column, value } => (column.clone(), format!("lt.{}", literal(value))),
            Predicate::AnyIlike { columns, pattern } => {
                let pattern = wildcard(pattern);
                let terms: Vec<String> = columns
                    .iter()
                    .map(|c| format!("{c}.ilike.{pattern}"))
                    .collect();
                ("or".to_string(), format!("({})", terms.join(",")))
            }
        };
        params.push((key, value));
    }

    if !query.order.is_empty() {
        let order: Vec<String> = query
            .order
            .iter()
            .map(|o| {
                let direction = if o.ascending { "asc" } else { "desc" };
                format!("{}.{direction}", o.column)
            })
            .collect();
        params.push(("order".to_string(), order.join(",")));
    }

    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    if let Some(offset) = query.offset {
        params.push(("offset".to_string(), offset.to_string()));
    }

    params
}

/// PostgREST rejects whitespace inside the select list.
fn compact_select(select: &str) -> String {
    select.chars().filter(|c| !c.is_whitespace()).collect()
}

fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// `%` is the SQL wildcard; PostgREST accepts `*` in URLs.
fn wildcard(pattern: &str) -> String {
    pattern.replace('%', "*")
}

/// Total from a `Content-Range` header such as `0-9/42` or `*/0`.
#[must_use]
pub fn parse_content_range(header: &str) -> Option<u64> {
    header
        .rsplit_once('/')
        .and_then(|(_, total)| total.trim().parse().ok())
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Turns non-2xx responses into [`Error::Backend`] with the backend's own message.
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|b| b.message.or(b.error_description).or(b.msg))
        .unwrap_or(text);
    Err(Error::Backend {
        status: status.as_u16(),
        message,
    })
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        let expires_at = self
            .expires_at
            .or_else(|| self.expires_in.map(|secs| Utc::now().timestamp() + secs));
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

#[async_trait]
impl Backend for RestBackend {
    async fn select(&self, query: &Query) -> Result<Page> {
        let params = query_params(query);
        debug!("GET {} {:?}", query.table, params);

        let mut request = self
            .table_request(reqwest::Method::GET, query.table)
            .await
            .query(&params);
        if query.count {
            request = request.header("Prefer", "count=exact");
        }
        if query.single {
            request = request.header(ACCEPT, SINGLE_OBJECT);
        }

        let response = request.send().await?;
        if query.single && response.status() == StatusCode::NOT_ACCEPTABLE {
            return Err(Error::NotFound {
                table: query.table.to_string(),
                id: format!("{:?}", query.predicates),
            });
        }
        let response = check(response).await?;

        let count = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range);

        if query.head {
            return Ok(Page {
                rows: Vec::new(),
                count,
            });
        }

        let body: Value = response.json().await?;
        let rows = match body {
            Value::Array(rows) => rows,
            Value::Null => Vec::new(),
            row => vec![row],
        };
        Ok(Page { rows, count })
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Value> {
        let response = self
            .table_request(reqwest::Method::POST, table)
            .await
            .header("Prefer", "return=representation")
            .header(ACCEPT, SINGLE_OBJECT)
            .json(&row)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn update(&self, table: Table, id: &str, patch: Value) -> Result<()> {
        let response = self
            .table_request(reqwest::Method::PATCH, table)
            .await
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&patch)
            .send()
            .await?;
        let rows: Vec<Value> = check(response).await?.json().await?;
        if rows.is_empty() {
            return Err(Error::NotFound {
                table: table.to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn delete(&self, table: Table, id: &str) -> Result<()> {
        let response = self
            .table_request(reqwest::Method::DELETE, table)
            .await
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn get_session(&self) -> Result<Option<Session>> {
        let current = self.session.read().await.clone();
        let Some(session) = current else {
            return Ok(None);
        };
        if !session.is_expired(Utc::now()) {
            return Ok(Some(session));
        }

        let refreshed = match session.refresh_token.as_deref() {
            Some(token) => self.refresh(token).await,
            None => Err(Error::Auth {
                message: "Session expired and no refresh token is available".to_string(),
            }),
        };
        match refreshed {
            Ok(fresh) => {
                *self.session.write().await = Some(fresh.clone());
                Ok(Some(fresh))
            }
            Err(e) => {
                warn!("Dropping expired session: {e}");
                *self.session.write().await = None;
                Ok(None)
            }
        }
    }

    async fn restore_session(&self, session: Session) -> Result<()> {
        *self.session.write().await = Some(session);
        Ok(())
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        let session = self
            .token_request("password", json!({ "email": email, "password": password }))
            .await?;
        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<Session> {
        let url = format!("{}/signup", self.config.auth_url());
        let body = json!({ "email": email, "password": password, "data": { "name": name } });
        let response = self.client.post(url).json(&body).send().await?;
        let token: TokenResponse = check(response).await?.json().await?;
        let session = token.into_session();
        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    async fn sign_out(&self) -> Result<()> {
        let url = format!("{}/logout", self.config.auth_url());
        let bearer = self.bearer().await;
        let result = self
            .client
            .post(url)
            .header(AUTHORIZATION, bearer)
            .send()
            .await;
        *self.session.write().await = None;
        check(result?).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::panic)]
    use super::*;
    use crate::entities::{Event, EventColumn, User, UserColumn};
    use crate::query::{QueryOptions, Select};
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    type Recorded = Arc<Mutex<Vec<String>>>;

    fn respond(status: &str, extra_headers: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n{extra_headers}\r\n{body}",
            body.len()
        )
    }

    fn content_length(head: &str) -> usize {
        head.lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse().ok())
            .unwrap_or(0)
    }

    async fn read_request(stream: &mut TcpStream) -> std::io::Result<String> {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_string();
                if buf.len() >= end + 4 + content_length(&head) {
                    break;
                }
            }
        }
        Ok(String::from_utf8_lossy(&buf).to_lowercase())
    }

    /// Local server answering one connection per canned response, in order.
    async fn canned_server(responses: Vec<String>) -> (RestBackend, Recorded) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|e| panic!("bind failed: {e}"));
        let addr = listener
            .local_addr()
            .unwrap_or_else(|e| panic!("no local address: {e}"));
        let recorded: Recorded = Arc::default();

        let log = Arc::clone(&recorded);
        tokio::spawn(async move {
            for response in responses {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let request = read_request(&mut stream).await.unwrap_or_default();
                log.lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner)
                    .push(request);
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        let config = BackendConfig::new(format!("http://{addr}"), "anon-key")
            .unwrap_or_else(|e| panic!("config rejected: {e}"));
        let backend = RestBackend::with_builder(config, reqwest::Client::builder().no_proxy())
            .unwrap_or_else(|e| panic!("client not built: {e}"));
        (backend, recorded)
    }

    fn requests(recorded: &Recorded) -> Vec<String> {
        recorded
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn expired_session() -> Session {
        Session {
            access_token: "stale".to_string(),
            refresh_token: Some("r1".to_string()),
            expires_at: Some(Utc::now().timestamp() - 60),
            user: AuthUser {
                id: "u1".to_string(),
                email: None,
                created_at: None,
            },
        }
    }

    #[tokio::test]
    async fn test_counted_select_over_http() -> Result<()> {
        let (backend, recorded) = canned_server(vec![respond(
            "200 OK",
            "Content-Range: 0-1/42\r\n",
            r#"[{"id":"a"},{"id":"b"}]"#,
        )])
        .await;

        let query = Select::<Event>::new()
            .eq(EventColumn::IsActive, true)
            .range(0, 1)
            .with_count()
            .into_query();
        let page = backend.select(&query).await?;
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.count, Some(42));

        let sent = requests(&recorded);
        assert!(sent[0].starts_with("get /rest/v1/events?"));
        assert!(sent[0].contains("is_active=eq.true"));
        assert!(sent[0].contains("prefer: count=exact"));
        assert!(sent[0].contains("apikey: anon-key"));
        assert!(sent[0].contains("authorization: bearer anon-key"));
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_single_row_is_not_found() {
        let (backend, recorded) = canned_server(vec![respond(
            "406 Not Acceptable",
            "",
            r#"{"code":"PGRST116","message":"JSON object requested, multiple (or no) rows returned"}"#,
        )])
        .await;

        let query = Select::<Event>::new().eq_id("missing").single().into_query();
        let result = backend.select(&query).await;
        assert!(matches!(result, Err(Error::NotFound { ref table, .. }) if table == "events"));
        assert!(requests(&recorded)[0].contains("accept: application/vnd.pgrst.object+json"));
    }

    #[tokio::test]
    async fn test_error_bodies_become_backend_errors() {
        let (backend, _recorded) = canned_server(vec![
            respond(
                "404 Not Found",
                "",
                r#"{"code":"42P01","message":"relation \"public.events\" does not exist"}"#,
            ),
            respond(
                "400 Bad Request",
                "",
                r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
            ),
        ])
        .await;

        let query = Select::<Event>::new().into_query();
        match backend.select(&query).await {
            Err(Error::Backend { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "relation \"public.events\" does not exist");
            }
            other => panic!("expected a backend error, got {other:?}"),
        }

        match backend.sign_in_with_password("ana@example.com", "errada").await {
            Err(Error::Backend { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid login credentials");
            }
            other => panic!("expected a backend error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_expired_session_is_refreshed() -> Result<()> {
        let (backend, recorded) = canned_server(vec![
            respond(
                "200 OK",
                "",
                r#"{"access_token":"fresh","refresh_token":"r2","expires_in":3600,"user":{"id":"u1"}}"#,
            ),
            respond("200 OK", "", "[]"),
        ])
        .await;
        backend.restore_session(expired_session()).await?;

        let session = backend.get_session().await?;
        assert_eq!(session.map(|s| s.access_token), Some("fresh".to_string()));

        backend.select(&Select::<Event>::new().into_query()).await?;

        let sent = requests(&recorded);
        assert!(sent[0].starts_with("post /auth/v1/token?grant_type=refresh_token"));
        assert!(sent[0].contains(r#""refresh_token":"r1""#));
        assert!(sent[1].contains("authorization: bearer fresh"));
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_refresh_drops_session() -> Result<()> {
        let (backend, _recorded) = canned_server(vec![respond(
            "400 Bad Request",
            "",
            r#"{"error":"invalid_grant","error_description":"Invalid Refresh Token"}"#,
        )])
        .await;
        backend.restore_session(expired_session()).await?;

        assert_eq!(backend.get_session().await?, None);
        assert_eq!(backend.bearer().await, "Bearer anon-key");
        Ok(())
    }

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_listing_params() {
        let query = QueryOptions::<Event>::new()
            .select("*, cities(name)")
            .filter(EventColumn::IsActive, true)
            .order(EventColumn::StartDatetime, true)
            .limit(50)
            .to_query();
        let params = query_params(&query);

        assert_eq!(param(&params, "select"), Some("*,cities(name)"));
        assert_eq!(param(&params, "is_active"), Some("eq.true"));
        assert_eq!(param(&params, "order"), Some("start_datetime.asc"));
        assert_eq!(param(&params, "limit"), Some("50"));
        assert_eq!(param(&params, "offset"), None);
    }

    #[test]
    fn test_search_params_use_star_wildcards() {
        let query = Select::<User>::new()
            .any_ilike(&[UserColumn::Name, UserColumn::Email], "ana")
            .eq(UserColumn::IsAdmin, false)
            .into_query();
        let params = query_params(&query);

        assert_eq!(
            param(&params, "or"),
            Some("(name.ilike.*ana*,email.ilike.*ana*)")
        );
        assert_eq!(param(&params, "is_admin"), Some("eq.false"));
    }

    #[test]
    fn test_range_params() {
        let query = Select::<Event>::new()
            .range(20, 29)
            .order_by(EventColumn::CreatedAt, false)
            .into_query();
        let params = query_params(&query);

        assert_eq!(param(&params, "offset"), Some("20"));
        assert_eq!(param(&params, "limit"), Some("10"));
        assert_eq!(param(&params, "order"), Some("created_at.desc"));
    }

    #[test]
    fn test_string_values_are_not_quoted() {
        let query = Select::<Event>::new()
            .eq(EventColumn::CityId, "city-1")
            .into_query();
        assert_eq!(param(&query_params(&query), "city_id"), Some("eq.city-1"));
    }

    #[test]
    fn test_parse_content_range() {
        assert_eq!(parse_content_range("0-9/42"), Some(42));
        assert_eq!(parse_content_range("*/0"), Some(0));
        assert_eq!(parse_content_range("0-9/*"), None);
        assert_eq!(parse_content_range("garbage"), None);
    }

    #[test]
    fn test_token_response_computes_expiry() {
        let token: TokenResponse = serde_json::from_value(json!({
            "access_token": "abc",
            "refresh_token": "def",
            "expires_in": 3600,
            "user": { "id": "u1", "email": "ana@example.com" }
        }))
        .unwrap_or_else(|e| panic!("token response should parse: {e}"));
        let before = Utc::now().timestamp();
        let session = token.into_session();

        assert_eq!(session.user.id, "u1");
        assert!(session.expires_at.unwrap_or_default() >= before + 3600);
        assert!(!session.is_expired(Utc::now()));
    }
}
