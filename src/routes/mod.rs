//! URL routing.
//!
//! Paths map onto [`Route`]s; each route carries the [`Access`] level the [`gate`]
//! enforces before a page is built.

/// Access gate in front of authenticated and admin pages
pub mod gate;

pub use gate::{GateDecision, ProtectedRoute};

use reqwest::Url;
use std::fmt;

/// Where the client should go next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub path: String,
}

impl Navigation {
    #[must_use]
    pub fn to(path: &str) -> Self {
        Self {
            path: path.to_string(),
        }
    }
}

impl fmt::Display for Navigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Who may open a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Admin,
}

/// Search result tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchCategory {
    #[default]
    All,
    Events,
    Companies,
    Profiles,
}

impl SearchCategory {
    #[must_use]
    pub fn from_param(value: &str) -> Self {
        match value {
            "eventos" => Self::Events,
            "empresas" => Self::Companies,
            "perfis" => Self::Profiles,
            _ => Self::All,
        }
    }

    #[must_use]
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::All => "todos",
            Self::Events => "eventos",
            Self::Companies => "empresas",
            Self::Profiles => "perfis",
        }
    }
}

/// Back-office screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminRoute {
    Dashboard,
    Events,
    /// `None` is the "new" form
    EventForm(Option<String>),
    Companies,
    CompanyForm(Option<String>),
    Profiles,
    ProfileForm(Option<String>),
    Giveaways,
    GiveawayForm(Option<String>),
    Banners,
    Users,
    Suggestions,
    Settings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Events,
    EventDetail(String),
    Companies,
    CompanyDetail(String),
    Influencers,
    Musicians,
    Giveaways,
    Search {
        query: String,
        category: SearchCategory,
    },
    Login,
    Register,
    UserPanel,
    Admin(AdminRoute),
}

/// Result of matching a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Page(Route),
    Redirect(Navigation),
}

impl Route {
    /// Matches a path (optionally with a query string).
    ///
    /// `/admin` redirects to the dashboard and unknown paths redirect home.
    #[must_use]
    pub fn resolve(path: &str) -> Resolved {
        let Ok(url) = Url::parse("http://guia.local").and_then(|base| base.join(path)) else {
            return Resolved::Redirect(Navigation::to("/"));
        };
        let segments: Vec<&str> = url
            .path()
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        let route = match segments.as_slice() {
            [] => Self::Home,
            ["eventos"] => Self::Events,
            ["eventos", id] => Self::EventDetail((*id).to_string()),
            ["empresas"] => Self::Companies,
            ["empresas", id] => Self::CompanyDetail((*id).to_string()),
            ["influenciadores"] => Self::Influencers,
            ["musicos"] => Self::Musicians,
            ["sorteios"] => Self::Giveaways,
            ["busca"] => {
                let mut query = String::new();
                let mut category = SearchCategory::All;
                for (key, value) in url.query_pairs() {
                    match key.as_ref() {
                        "q" => value.trim().clone_into(&mut query),
                        "categoria" => category = SearchCategory::from_param(&value),
                        _ => {}
                    }
                }
                Self::Search { query, category }
            }
            ["login"] => Self::Login,
            ["cadastro"] => Self::Register,
            ["painel"] => Self::UserPanel,
            ["admin"] => return Resolved::Redirect(Navigation::to("/admin/dashboard")),
            ["admin", rest @ ..] => match admin_route(rest) {
                Some(admin) => Self::Admin(admin),
                None => return Resolved::Redirect(Navigation::to("/")),
            },
            _ => return Resolved::Redirect(Navigation::to("/")),
        };
        Resolved::Page(route)
    }

    #[must_use]
    pub const fn access(&self) -> Access {
        match self {
            Self::UserPanel => Access::Authenticated,
            Self::Admin(_) => Access::Admin,
            _ => Access::Public,
        }
    }

    /// Canonical path of the route.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Events => "/eventos".to_string(),
            Self::EventDetail(id) => format!("/eventos/{id}"),
            Self::Companies => "/empresas".to_string(),
            Self::CompanyDetail(id) => format!("/empresas/{id}"),
            Self::Influencers => "/influenciadores".to_string(),
            Self::Musicians => "/musicos".to_string(),
            Self::Giveaways => "/sorteios".to_string(),
            Self::Search { query, category } => {
                let mut url = Url::parse("http://guia.local/busca").ok();
                if let Some(url) = url.as_mut() {
                    url.query_pairs_mut()
                        .append_pair("q", query)
                        .append_pair("categoria", category.as_param());
                }
                url.map_or_else(|| "/busca".to_string(), |u| format!("/busca?{}", u.query().unwrap_or("")))
            }
            Self::Login => "/login".to_string(),
            Self::Register => "/cadastro".to_string(),
            Self::UserPanel => "/painel".to_string(),
            Self::Admin(admin) => admin_path(admin),
        }
    }
}

fn form_target(segment: &str, new_word: &str) -> Option<String> {
    if segment == new_word {
        None
    } else {
        Some(segment.to_string())
    }
}

fn admin_route(segments: &[&str]) -> Option<AdminRoute> {
    let route = match segments {
        ["dashboard"] => AdminRoute::Dashboard,
        ["eventos"] => AdminRoute::Events,
        ["eventos", target] => AdminRoute::EventForm(form_target(target, "novo")),
        ["empresas"] => AdminRoute::Companies,
        ["empresas", target] => AdminRoute::CompanyForm(form_target(target, "nova")),
        ["perfis"] => AdminRoute::Profiles,
        ["perfis", target] => AdminRoute::ProfileForm(form_target(target, "novo")),
        ["sorteios"] => AdminRoute::Giveaways,
        ["sorteios", target] => AdminRoute::GiveawayForm(form_target(target, "novo")),
        ["banners"] => AdminRoute::Banners,
        ["usuarios"] => AdminRoute::Users,
        ["sugestoes"] => AdminRoute::Suggestions,
        ["configuracoes"] => AdminRoute::Settings,
        _ => return None,
    };
    Some(route)
}

fn admin_path(route: &AdminRoute) -> String {
    let form = |base: &str, target: &Option<String>, new_word: &str| {
        format!("/admin/{base}/{}", target.as_deref().unwrap_or(new_word))
    };
    match route {
        AdminRoute::Dashboard => "/admin/dashboard".to_string(),
        AdminRoute::Events => "/admin/eventos".to_string(),
        AdminRoute::EventForm(target) => form("eventos", target, "novo"),
        AdminRoute::Companies => "/admin/empresas".to_string(),
        AdminRoute::CompanyForm(target) => form("empresas", target, "nova"),
        AdminRoute::Profiles => "/admin/perfis".to_string(),
        AdminRoute::ProfileForm(target) => form("perfis", target, "novo"),
        AdminRoute::Giveaways => "/admin/sorteios".to_string(),
        AdminRoute::GiveawayForm(target) => form("sorteios", target, "novo"),
        AdminRoute::Banners => "/admin/banners".to_string(),
        AdminRoute::Users => "/admin/usuarios".to_string(),
        AdminRoute::Suggestions => "/admin/sugestoes".to_string(),
        AdminRoute::Settings => "/admin/configuracoes".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(path: &str) -> Route {
        match Route::resolve(path) {
            Resolved::Page(route) => route,
            Resolved::Redirect(nav) => panic!("{path} redirected to {nav}"),
        }
    }

    #[test]
    fn test_public_routes() {
        assert_eq!(page("/"), Route::Home);
        assert_eq!(page("/eventos"), Route::Events);
        assert_eq!(page("/eventos/abc"), Route::EventDetail("abc".to_string()));
        assert_eq!(page("/empresas/"), Route::Companies);
        assert_eq!(page("/musicos"), Route::Musicians);
        assert_eq!(page("/painel").access(), Access::Authenticated);
        assert_eq!(page("/login").access(), Access::Public);
    }

    #[test]
    fn test_search_query_string_is_decoded() {
        assert_eq!(
            page("/busca?q=festa+junina&categoria=eventos"),
            Route::Search {
                query: "festa junina".to_string(),
                category: SearchCategory::Events,
            }
        );
        assert_eq!(
            page("/busca?q=caf%C3%A9"),
            Route::Search {
                query: "café".to_string(),
                category: SearchCategory::All,
            }
        );
    }

    #[test]
    fn test_admin_routes() {
        assert_eq!(
            Route::resolve("/admin"),
            Resolved::Redirect(Navigation::to("/admin/dashboard"))
        );
        assert_eq!(
            page("/admin/eventos/novo"),
            Route::Admin(AdminRoute::EventForm(None))
        );
        assert_eq!(
            page("/admin/empresas/nova"),
            Route::Admin(AdminRoute::CompanyForm(None))
        );
        assert_eq!(
            page("/admin/sorteios/g1"),
            Route::Admin(AdminRoute::GiveawayForm(Some("g1".to_string())))
        );
        assert_eq!(page("/admin/usuarios").access(), Access::Admin);
    }

    #[test]
    fn test_unknown_paths_redirect_home() {
        for path in ["/nada", "/admin/nada", "/eventos/a/b"] {
            assert_eq!(Route::resolve(path), Resolved::Redirect(Navigation::to("/")));
        }
    }

    #[test]
    fn test_paths_resolve_back_to_their_route() {
        let routes = [
            Route::Home,
            Route::CompanyDetail("c1".to_string()),
            Route::Search {
                query: "pão de queijo".to_string(),
                category: SearchCategory::Companies,
            },
            Route::Admin(AdminRoute::ProfileForm(None)),
            Route::Admin(AdminRoute::Settings),
        ];
        for route in routes {
            assert_eq!(page(&route.path()), route);
        }
    }
}
