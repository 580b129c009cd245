//! Protected route gate.
//!
//! Entering a protected route triggers an auth check. Until it settles the gate reports
//! [`GateDecision::Checking`]; afterwards it renders for a signed-in user (admins only
//! on admin routes) or redirects: to `/login` when nobody is signed in, home when the
//! user lacks the admin role.

use super::{Access, Navigation};
use crate::auth::SessionContext;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Checking,
    Render,
    Redirect(Navigation),
}

pub struct ProtectedRoute {
    session: Arc<SessionContext>,
    require_admin: bool,
}

impl ProtectedRoute {
    #[must_use]
    pub const fn new(session: Arc<SessionContext>, require_admin: bool) -> Self {
        Self {
            session,
            require_admin,
        }
    }

    /// Gate matching a route's access level; `None` for public routes.
    #[must_use]
    pub fn for_access(session: &Arc<SessionContext>, access: Access) -> Option<Self> {
        match access {
            Access::Public => None,
            Access::Authenticated => Some(Self::new(Arc::clone(session), false)),
            Access::Admin => Some(Self::new(Arc::clone(session), true)),
        }
    }

    /// Decision from the session as it stands right now.
    #[must_use]
    pub fn decide(&self) -> GateDecision {
        if self.session.is_loading() {
            return GateDecision::Checking;
        }
        if !self.session.is_authenticated() {
            return GateDecision::Redirect(Navigation::to("/login"));
        }
        if self.require_admin && !self.session.is_admin() {
            return GateDecision::Redirect(Navigation::to("/"));
        }
        GateDecision::Render
    }

    /// Runs the auth check, then decides.
    pub async fn enter(&self) -> GateDecision {
        self.session.check_auth().await;
        let decision = self.decide();
        debug!(
            "Gate (admin: {}) decided {:?}",
            self.require_admin, decision
        );
        decision
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::backend::{Backend, MemoryBackend};
    use crate::errors::Result;
    use crate::test_utils::auth_settings;
    use std::time::Duration;

    async fn signed_in(email: &str, is_admin: bool) -> Result<(Arc<SessionContext>, tempfile::TempDir)> {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(MemoryBackend::new());
        backend.add_account(email, "pw", "Someone", is_admin);
        backend.sign_in_with_password(email, "pw").await?;
        Ok((SessionContext::new(backend, auth_settings(&dir)), dir))
    }

    #[tokio::test]
    async fn test_unauthenticated_goes_to_login() {
        let dir = tempfile::tempdir().unwrap();
        let session = SessionContext::new(Arc::new(MemoryBackend::new()), auth_settings(&dir));
        let gate = ProtectedRoute::for_access(&session, Access::Authenticated).unwrap();
        assert_eq!(
            gate.enter().await,
            GateDecision::Redirect(Navigation::to("/login"))
        );
    }

    #[tokio::test]
    async fn test_non_admin_on_admin_route_goes_home() -> Result<()> {
        let (session, _dir) = signed_in("ana@guia.com", false).await?;
        let gate = ProtectedRoute::new(Arc::clone(&session), true);
        assert_eq!(gate.enter().await, GateDecision::Redirect(Navigation::to("/")));

        let panel = ProtectedRoute::new(session, false);
        assert_eq!(panel.enter().await, GateDecision::Render);
        Ok(())
    }

    #[tokio::test]
    async fn test_admin_renders() -> Result<()> {
        let (session, _dir) = signed_in("admin@guia.com", true).await?;
        let gate = ProtectedRoute::new(session, true);
        assert_eq!(gate.enter().await, GateDecision::Render);
        Ok(())
    }

    #[tokio::test]
    async fn test_reports_checking_while_resolving() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(MemoryBackend::new());
        backend.set_latency(Duration::from_millis(30));
        let session = SessionContext::new(backend, auth_settings(&dir));
        let gate = ProtectedRoute::new(Arc::clone(&session), false);

        let check = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.check_auth().await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(gate.decide(), GateDecision::Checking);
        check.await.unwrap();
        assert_eq!(
            gate.decide(),
            GateDecision::Redirect(Navigation::to("/login"))
        );
    }

    #[test]
    fn test_public_routes_have_no_gate() {
        let dir = tempfile::tempdir().unwrap();
        let session = SessionContext::new(Arc::new(MemoryBackend::new()), auth_settings(&dir));
        assert!(ProtectedRoute::for_access(&session, Access::Public).is_none());
    }
}
