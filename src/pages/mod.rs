//! Page view-models.
//!
//! Each screen loads its data through the query client, keeps what it needs to render,
//! and renders itself as text through `Display`. [`open`] is the full navigation path:
//! resolve the URL, run the access gate, then build the page.

/// Sign-in, sign-up and the user panel
pub mod account;
/// Back-office screens
pub mod admin;
/// Public listings, detail pages and search
pub mod public;

pub use account::{LoginPage, RegisterPage, UserPanel};
pub use admin::{AdminPage, AdminTablePage, Content, DashboardPage, FormPage, SettingsPage, SuggestionsPage};
pub use public::{
    CompaniesPage, CompanyDetailPage, EventDetailPage, EventsPage, GiveawaysPage, HomePage,
    ProfilesPage, SearchPage,
};

use crate::auth::SessionContext;
use crate::core::companies::CompanyFilter;
use crate::core::events::EventFilter;
use crate::core::giveaways::GiveawayTab;
use crate::core::profiles::ProfileFilter;
use crate::errors::Result;
use crate::query::QueryClient;
use crate::routes::{GateDecision, Navigation, ProtectedRoute, Resolved, Route};
use crate::ui::Placeholder;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Date and time as shown on cards.
pub(crate) fn when(at: DateTime<Utc>) -> String {
    at.format("%d/%m/%Y %H:%M").to_string()
}

pub(crate) fn heading(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f, "\n{title}")?;
    writeln!(f, "{}", "=".repeat(title.chars().count()))
}

/// What every page needs: the shared query client and the session.
#[derive(Clone)]
pub struct PageContext {
    pub client: Arc<QueryClient>,
    pub session: Arc<SessionContext>,
}

/// A rendered screen.
pub enum Page {
    Home(HomePage),
    Events(EventsPage),
    EventDetail(EventDetailPage),
    Companies(CompaniesPage),
    CompanyDetail(CompanyDetailPage),
    Profiles(ProfilesPage),
    Giveaways(GiveawaysPage),
    Search(SearchPage),
    Login(LoginPage),
    Register(RegisterPage),
    UserPanel(UserPanel),
    Admin(AdminPage),
    /// Loading failed; the error panel replaces the page body
    Failed { path: String, panel: Placeholder },
}

impl Page {
    async fn try_load(ctx: &PageContext, route: &Route) -> Result<Self> {
        let client = &ctx.client;
        Ok(match route {
            Route::Home => Self::Home(HomePage::load(client).await?),
            Route::Events => Self::Events(EventsPage::load(client, EventFilter::default()).await?),
            Route::EventDetail(id) => Self::EventDetail(EventDetailPage::load(client, id).await?),
            Route::Companies => Self::Companies(CompaniesPage::load(client, CompanyFilter::default()).await?),
            Route::CompanyDetail(id) => Self::CompanyDetail(CompanyDetailPage::load(client, id).await?),
            Route::Influencers => Self::Profiles(ProfilesPage::influencers(client, ProfileFilter::default()).await?),
            Route::Musicians => Self::Profiles(ProfilesPage::musicians(client, "").await?),
            Route::Giveaways => Self::Giveaways(GiveawaysPage::load(client, GiveawayTab::Active).await?),
            Route::Search { query, category } => Self::Search(SearchPage::load(client, query, *category).await?),
            Route::Login => Self::Login(LoginPage::default()),
            Route::Register => Self::Register(RegisterPage::default()),
            Route::UserPanel => Self::UserPanel(UserPanel::load(client, &ctx.session).await?),
            Route::Admin(admin) => Self::Admin(AdminPage::load(client, admin).await?),
        })
    }

    /// Builds the page for `route`; load failures become an error panel.
    pub async fn load(ctx: &PageContext, route: &Route) -> Self {
        match Self::try_load(ctx, route).await {
            Ok(page) => page,
            Err(e) => {
                error!("Error loading {}: {e}", route.path());
                Self::Failed {
                    path: route.path(),
                    panel: Placeholder::error(e.to_string()),
                }
            }
        }
    }

    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home(page) => page.fmt(f),
            Self::Events(page) => page.fmt(f),
            Self::EventDetail(page) => page.fmt(f),
            Self::Companies(page) => page.fmt(f),
            Self::CompanyDetail(page) => page.fmt(f),
            Self::Profiles(page) => page.fmt(f),
            Self::Giveaways(page) => page.fmt(f),
            Self::Search(page) => page.fmt(f),
            Self::Login(page) => page.fmt(f),
            Self::Register(page) => page.fmt(f),
            Self::UserPanel(page) => page.fmt(f),
            Self::Admin(page) => page.fmt(f),
            Self::Failed { path, panel } => {
                heading(f, path)?;
                panel.fmt(f)
            }
        }
    }
}

/// Result of navigating to a path.
pub enum Visit {
    Page(Box<Page>),
    Redirect(Navigation),
}

/// Navigates to `path`: routing, access gate, then page load.
///
/// Redirects from the routing table and from the gate are followed by the caller, not
/// here, so the final destination stays visible.
pub async fn open(ctx: &PageContext, path: &str) -> Visit {
    let route = match Route::resolve(path) {
        Resolved::Page(route) => route,
        Resolved::Redirect(to) => {
            debug!("{path} redirects to {to}");
            return Visit::Redirect(to);
        }
    };

    if let Some(gate) = ProtectedRoute::for_access(&ctx.session, route.access()) {
        match gate.enter().await {
            GateDecision::Render => {}
            GateDecision::Redirect(to) => {
                info!("Access to {path} denied, redirecting to {to}");
                return Visit::Redirect(to);
            }
            GateDecision::Checking => {
                return Visit::Redirect(Navigation::to("/login"));
            }
        }
    }

    Visit::Page(Box::new(Page::load(ctx, &route).await))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use crate::demo;
    use crate::routes::AdminRoute;
    use crate::test_utils::{auth_settings, demo_client};

    fn context(dir: &tempfile::TempDir) -> (Arc<crate::backend::MemoryBackend>, PageContext) {
        let (backend, client) = demo_client();
        let session = SessionContext::new(backend.clone(), auth_settings(dir));
        (
            backend,
            PageContext {
                client: Arc::new(client),
                session,
            },
        )
    }

    fn page(visit: Visit) -> Page {
        match visit {
            Visit::Page(page) => *page,
            Visit::Redirect(to) => panic!("unexpected redirect to {to}"),
        }
    }

    #[tokio::test]
    async fn test_public_pages_render() {
        let dir = tempfile::tempdir().unwrap();
        let (_backend, ctx) = context(&dir);

        let home = page(open(&ctx, "/").await);
        assert!(matches!(home, Page::Home(_)));

        let search = page(open(&ctx, "/busca?q=festival&categoria=eventos").await);
        assert!(search.to_string().contains("Festival de Inverno"));

        let missing = page(open(&ctx, "/eventos/nao-existe").await);
        assert!(missing.to_string().contains("não encontrado"));
    }

    #[tokio::test]
    async fn test_gate_redirects() {
        let dir = tempfile::tempdir().unwrap();
        let (_backend, ctx) = context(&dir);

        let Visit::Redirect(to) = open(&ctx, "/painel").await else {
            panic!("anonymous panel visit rendered");
        };
        assert_eq!(to, Navigation::to("/login"));

        ctx.session
            .sign_in(demo::USER_EMAIL, demo::USER_PASSWORD)
            .await
            .unwrap();
        let Visit::Redirect(to) = open(&ctx, "/admin/eventos").await else {
            panic!("non-admin reached the back office");
        };
        assert_eq!(to, Navigation::to("/"));

        let panel = page(open(&ctx, "/painel").await);
        assert!(panel.to_string().contains("Maria Souza"));
    }

    #[tokio::test]
    async fn test_admin_pages_and_error_panel() {
        let dir = tempfile::tempdir().unwrap();
        let (backend, ctx) = context(&dir);
        ctx.session
            .sign_in(demo::ADMIN_EMAIL, demo::ADMIN_PASSWORD)
            .await
            .unwrap();

        let Visit::Redirect(to) = open(&ctx, "/admin").await else {
            panic!("/admin rendered");
        };
        let dashboard = page(open(&ctx, &to.path).await);
        assert!(dashboard.to_string().contains("Eventos ativos: 3"));

        backend.fail_next(3);
        let failed = Page::load(&ctx, &Route::Admin(AdminRoute::Banners)).await;
        assert!(failed.is_failed());
        assert!(failed.to_string().contains("503"));
    }
}
