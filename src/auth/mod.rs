//! Session context.
//!
//! One [`SessionContext`] is created at start-up and handed (as an `Arc`) to the route
//! gate and to every page that needs to know who is signed in. It holds the auth user,
//! the matching `users` row and the admin flag derived from that row, and mirrors them
//! into a [`FileStore`] so the next run can render immediately.

/// JSON file store for persisted client state
pub mod storage;

pub use storage::{AUTH_STORAGE_KEY, FileStore, SESSION_STORAGE_KEY};

use crate::backend::{AuthUser, Session, SharedBackend};
use crate::config::settings::AuthSettings;
use crate::entities::User;
use crate::errors::{Error, Result};
use crate::query::Select;
use crate::routes::Navigation;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

/// Who is signed in, as persisted under [`AUTH_STORAGE_KEY`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSnapshot {
    pub user: Option<AuthUser>,
    pub profile: Option<User>,
    pub is_admin: bool,
}

impl AuthSnapshot {
    fn for_user(user: AuthUser, profile: Option<User>) -> Self {
        let is_admin = profile.as_ref().is_some_and(|p| p.is_admin);
        Self {
            user: Some(user),
            profile,
            is_admin,
        }
    }
}

/// Auth-state notifications coming from the backend.
#[derive(Clone, Debug)]
pub enum AuthEvent {
    SignedIn(Session),
    SignedOut,
}

#[derive(Default)]
struct SessionState {
    snapshot: AuthSnapshot,
    is_loading: bool,
}

type InFlight = Shared<BoxFuture<'static, AuthSnapshot>>;

pub struct SessionContext {
    backend: SharedBackend,
    store: FileStore,
    settings: AuthSettings,
    state: Mutex<SessionState>,
    in_flight: Mutex<Option<InFlight>>,
}

impl SessionContext {
    #[must_use]
    pub fn new(backend: SharedBackend, settings: AuthSettings) -> Arc<Self> {
        let store = FileStore::new(settings.storage_path.clone());
        Arc::new(Self {
            backend,
            store,
            settings,
            state: Mutex::new(SessionState::default()),
            in_flight: Mutex::new(None),
        })
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn in_flight(&self) -> MutexGuard<'_, Option<InFlight>> {
        self.in_flight
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    #[must_use]
    pub fn snapshot(&self) -> AuthSnapshot {
        self.state().snapshot.clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<AuthUser> {
        self.state().snapshot.user.clone()
    }

    #[must_use]
    pub fn profile(&self) -> Option<User> {
        self.state().snapshot.profile.clone()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.state().snapshot.is_admin
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state().snapshot.user.is_some()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state().is_loading
    }

    /// Re-hydrates the snapshot persisted by a previous run and hands the stored
    /// session back to the backend. Storage problems are logged and ignored.
    pub async fn restore(&self) {
        match self.store.get::<AuthSnapshot>(AUTH_STORAGE_KEY) {
            Ok(Some(snapshot)) => {
                debug!("Restored auth snapshot from {}", self.store.path().display());
                self.state().snapshot = snapshot;
            }
            Ok(None) => {}
            Err(e) => warn!("Ignoring unreadable auth storage: {e}"),
        }
        match self.store.get::<Session>(SESSION_STORAGE_KEY) {
            Ok(Some(session)) => {
                if let Err(e) = self.backend.restore_session(session).await {
                    warn!("Could not restore persisted session: {e}");
                }
            }
            Ok(None) => {}
            Err(e) => warn!("Ignoring unreadable session storage: {e}"),
        }
    }

    /// Re-reads the session and the matching `users` row.
    ///
    /// Overlapping calls share one in-flight check, so any number of concurrent callers
    /// cost a single backend round-trip. Failures are logged and leave the state cleared.
    pub async fn check_auth(self: &Arc<Self>) -> AuthSnapshot {
        let check = {
            let mut slot = self.in_flight();
            if let Some(check) = slot.as_ref() {
                debug!("Joining in-flight auth check");
                check.clone()
            } else {
                let this = Arc::clone(self);
                let check = async move {
                    let snapshot = this.resolve_session().await;
                    *this.in_flight() = None;
                    snapshot
                }
                .boxed()
                .shared();
                *slot = Some(check.clone());
                check
            }
        };
        check.await
    }

    async fn resolve_session(&self) -> AuthSnapshot {
        self.state().is_loading = true;
        let snapshot = match self.backend.get_session().await {
            Ok(Some(session)) => match self.load_profile(&session.user).await {
                Ok(profile) => {
                    self.persist_session(&session);
                    AuthSnapshot::for_user(session.user, profile)
                }
                Err(e) => {
                    error!("Error loading profile for {}: {e}", session.user.id);
                    AuthSnapshot::default()
                }
            },
            Ok(None) => AuthSnapshot::default(),
            Err(e) => {
                error!("Error checking auth: {e}");
                AuthSnapshot::default()
            }
        };
        self.replace(snapshot.clone());
        snapshot
    }

    /// The `users` row sharing the auth user's id; `None` until it has been created.
    async fn load_profile(&self, user: &AuthUser) -> Result<Option<User>> {
        let query = Select::<User>::new().eq_id(&user.id).into_query();
        let page = self.backend.select(&query).await?;
        page.rows
            .into_iter()
            .next()
            .map(serde_json::from_value)
            .transpose()
            .map_err(Error::from)
    }

    /// Signs in with email and password.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSnapshot> {
        self.state().is_loading = true;
        let session = match self.backend.sign_in_with_password(email, password).await {
            Ok(session) => session,
            Err(e) => {
                self.state().is_loading = false;
                warn!("Sign-in failed for {email}: {e}");
                return Err(e);
            }
        };
        let snapshot = self.establish(session).await;
        info!("Signed in as {email}");
        Ok(snapshot)
    }

    /// Creates an account and signs it in.
    pub async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<AuthSnapshot> {
        if name.trim().is_empty() {
            return Err(Error::Validation {
                message: "Nome é obrigatório".to_string(),
            });
        }
        self.state().is_loading = true;
        let session = match self.backend.sign_up(name.trim(), email, password).await {
            Ok(session) => session,
            Err(e) => {
                self.state().is_loading = false;
                warn!("Sign-up failed for {email}: {e}");
                return Err(e);
            }
        };
        let snapshot = self.establish(session).await;
        info!("Registered {email}");
        Ok(snapshot)
    }

    async fn establish(&self, session: Session) -> AuthSnapshot {
        let profile = match self.load_profile(&session.user).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!("Signed in but could not load profile: {e}");
                None
            }
        };
        self.persist_session(&session);
        let snapshot = AuthSnapshot::for_user(session.user, profile);
        self.replace(snapshot.clone());
        snapshot
    }

    /// Signs out.
    ///
    /// The backend call is bounded by the configured timeout. Local state and persisted
    /// storage are cleared whatever the backend answered, and the caller is sent home.
    pub async fn sign_out(&self) -> Navigation {
        let timeout = self.settings.sign_out_timeout();
        match tokio::time::timeout(timeout, self.backend.sign_out()).await {
            Ok(Ok(())) => info!("Signed out"),
            Ok(Err(e)) => warn!("Backend sign-out failed, clearing local session anyway: {e}"),
            Err(_) => warn!("Backend sign-out timed out after {timeout:?}, clearing local session"),
        }
        self.clear();
        Navigation::to("/")
    }

    /// Mirrors a backend auth-state notification.
    pub async fn apply_event(&self, event: AuthEvent) {
        match event {
            AuthEvent::SignedIn(session) => {
                debug!("Auth event: signed in as {}", session.user.id);
                self.establish(session).await;
            }
            AuthEvent::SignedOut => {
                debug!("Auth event: signed out");
                self.clear();
            }
        }
    }

    fn clear(&self) {
        self.replace(AuthSnapshot::default());
        if let Err(e) = self.store.remove(SESSION_STORAGE_KEY) {
            warn!("Could not clear persisted session: {e}");
        }
        if let Err(e) = self.store.remove(AUTH_STORAGE_KEY) {
            warn!("Could not clear auth storage: {e}");
        }
    }

    /// Swaps in a new snapshot and persists it.
    fn replace(&self, snapshot: AuthSnapshot) {
        let persisted = if snapshot.user.is_some() {
            self.store.set(AUTH_STORAGE_KEY, &snapshot)
        } else {
            self.store.remove(AUTH_STORAGE_KEY)
        };
        if let Err(e) = persisted {
            warn!("Could not persist auth state: {e}");
        }
        let mut state = self.state();
        state.snapshot = snapshot;
        state.is_loading = false;
    }

    fn persist_session(&self, session: &Session) {
        if let Err(e) = self.store.set(SESSION_STORAGE_KEY, session) {
            warn!("Could not persist session: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::backend::{Backend, MemoryBackend};
    use crate::test_utils::{auth_settings, init_test_tracing};
    use std::time::{Duration, Instant};

    fn context(backend: &Arc<MemoryBackend>, dir: &tempfile::TempDir) -> Arc<SessionContext> {
        SessionContext::new(backend.clone(), auth_settings(dir))
    }

    #[tokio::test]
    async fn test_check_auth_without_session_clears_state() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(MemoryBackend::new());
        let ctx = context(&backend, &dir);

        let snapshot = ctx.check_auth().await;
        assert_eq!(snapshot, AuthSnapshot::default());
        assert!(ctx.user().is_none());
        assert!(ctx.profile().is_none());
        assert!(!ctx.is_admin());
        assert!(!ctx.is_loading());
    }

    #[tokio::test]
    async fn test_check_auth_derives_admin_flag() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(MemoryBackend::new());
        backend.add_account("admin@guia.com", "pw", "Admin", true);
        backend.sign_in_with_password("admin@guia.com", "pw").await?;
        let ctx = context(&backend, &dir);

        let snapshot = ctx.check_auth().await;
        assert!(snapshot.is_admin);
        assert_eq!(snapshot.profile.unwrap().name, "Admin");
        assert!(ctx.is_authenticated());
        Ok(())
    }

    #[tokio::test]
    async fn test_session_without_users_row_is_not_admin() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(MemoryBackend::new());
        backend.add_bare_account("new@guia.com", "pw");
        backend.sign_in_with_password("new@guia.com", "pw").await?;
        let ctx = context(&backend, &dir);

        let snapshot = ctx.check_auth().await;
        assert!(snapshot.user.is_some());
        assert!(snapshot.profile.is_none());
        assert!(!snapshot.is_admin);
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_checks_share_one_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(MemoryBackend::new());
        backend.set_latency(Duration::from_millis(20));
        let ctx = context(&backend, &dir);

        let (a, b, c) = tokio::join!(ctx.check_auth(), ctx.check_auth(), ctx.check_auth());
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(backend.call_count("get_session"), 1);

        // Once settled, the next check goes to the backend again.
        ctx.check_auth().await;
        assert_eq!(backend.call_count("get_session"), 2);
    }

    #[tokio::test]
    async fn test_backend_error_clears_state() -> Result<()> {
        init_test_tracing();
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(MemoryBackend::new());
        backend.add_account("ana@guia.com", "pw", "Ana", false);
        let ctx = context(&backend, &dir);
        ctx.sign_in("ana@guia.com", "pw").await?;
        assert!(ctx.is_authenticated());

        backend.fail_next(1);
        ctx.check_auth().await;
        assert!(!ctx.is_authenticated());
        Ok(())
    }

    #[tokio::test]
    async fn test_sign_out_with_hanging_backend_times_out() -> Result<()> {
        init_test_tracing();
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(MemoryBackend::new());
        backend.add_account("ana@guia.com", "pw", "Ana", false);
        let ctx = context(&backend, &dir);
        ctx.sign_in("ana@guia.com", "pw").await?;

        backend.hang_sign_out(true);
        let started = Instant::now();
        let navigation = ctx.sign_out().await;

        assert!(started.elapsed() >= Duration::from_millis(50));
        assert_eq!(navigation, Navigation::to("/"));
        assert!(!ctx.is_authenticated());
        let store = FileStore::new(dir.path().join("auth.json"));
        assert_eq!(store.get::<AuthSnapshot>(AUTH_STORAGE_KEY)?, None);
        assert_eq!(store.get::<Session>(SESSION_STORAGE_KEY)?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_sign_in_failure_keeps_state_clear() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(MemoryBackend::new());
        backend.add_account("ana@guia.com", "pw", "Ana", false);
        let ctx = context(&backend, &dir);

        let result = ctx.sign_in("ana@guia.com", "wrong").await;
        assert!(matches!(result, Err(Error::Backend { status: 400, .. })));
        assert!(!ctx.is_authenticated());
        assert!(!ctx.is_loading());
    }

    #[tokio::test]
    async fn test_sign_up_creates_profile() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(MemoryBackend::new());
        let ctx = context(&backend, &dir);

        let snapshot = ctx.sign_up("Bia", "bia@guia.com", "pw").await?;
        assert_eq!(snapshot.profile.unwrap().name, "Bia");
        assert!(!snapshot.is_admin);

        let blank = ctx.sign_up("  ", "x@guia.com", "pw").await;
        assert!(matches!(blank, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_restore_rehydrates_persisted_snapshot() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(MemoryBackend::new());
        backend.add_account("ana@guia.com", "pw", "Ana", true);
        context(&backend, &dir).sign_in("ana@guia.com", "pw").await?;
        backend.sign_out().await?;

        let ctx = context(&backend, &dir);
        assert!(!ctx.is_authenticated());
        ctx.restore().await;
        assert!(ctx.is_admin());

        // The persisted session is handed back, so a fresh check still finds the user.
        assert!(ctx.check_auth().await.is_admin);
        Ok(())
    }

    #[tokio::test]
    async fn test_auth_events() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(MemoryBackend::new());
        backend.add_account("ana@guia.com", "pw", "Ana", false);
        let session = backend.sign_in_with_password("ana@guia.com", "pw").await?;
        let ctx = context(&backend, &dir);

        ctx.apply_event(AuthEvent::SignedIn(session)).await;
        assert!(ctx.is_authenticated());
        ctx.apply_event(AuthEvent::SignedOut).await;
        assert!(!ctx.is_authenticated());
        Ok(())
    }
}
