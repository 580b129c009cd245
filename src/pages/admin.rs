//! Back-office screens: dashboard, entity tables, forms, suggestions and settings.

use super::{heading, when};
use crate::core::admin::{remove, toggle};
use crate::core::dashboard::{self, Dashboard};
use crate::core::forms::{
    AdminForm, BannerForm, CompanyForm, EventForm, GiveawayForm, ProfileForm, load_form,
};
use crate::core::giveaways::StatusFilter;
use crate::core::users::RoleFilter;
use crate::core::{banners, companies, events, giveaways, profiles, users};
use crate::entities::{
    Banner, BannerColumn, Company, CompanyColumn, Event, EventColumn, Giveaway, GiveawayColumn,
    Profile, ProfileColumn, User, UserColumn,
};
use crate::errors::Result;
use crate::query::QueryClient;
use crate::routes::AdminRoute;
use crate::ui::{Placeholder, Toast};
use chrono::Utc;
use std::fmt;
use tracing::instrument;

const STATUS_UPDATED: &str = "Status atualizado!";

/// Content tables sharing the toggle/delete row actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Content {
    Events,
    Companies,
    Profiles,
    Giveaways,
    Banners,
}

impl Content {
    const fn delete_messages(self) -> (&'static str, &'static str) {
        match self {
            Self::Events => ("Evento excluído com sucesso!", "Erro ao excluir evento"),
            Self::Companies => ("Empresa excluída com sucesso!", "Erro ao excluir empresa"),
            Self::Profiles => ("Perfil excluído com sucesso!", "Erro ao excluir perfil"),
            Self::Giveaways => ("Sorteio excluído com sucesso!", "Erro ao excluir sorteio"),
            Self::Banners => ("Banner excluído com sucesso!", "Erro ao excluir banner"),
        }
    }

    pub async fn delete(self, client: &QueryClient, id: &str) -> Toast {
        let (success, failure) = self.delete_messages();
        match self {
            Self::Events => remove::<Event>(client, id, success, failure).await,
            Self::Companies => remove::<Company>(client, id, success, failure).await,
            Self::Profiles => remove::<Profile>(client, id, success, failure).await,
            Self::Giveaways => remove::<Giveaway>(client, id, success, failure).await,
            Self::Banners => remove::<Banner>(client, id, success, failure).await,
        }
    }

    /// Flips the visibility flag: `is_published` for giveaways, `is_active` elsewhere.
    pub async fn toggle_active(self, client: &QueryClient, id: &str, current: bool) -> Toast {
        match self {
            Self::Events => toggle::<Event>(client, id, EventColumn::IsActive, current, STATUS_UPDATED).await,
            Self::Companies => {
                toggle::<Company>(client, id, CompanyColumn::IsActive, current, STATUS_UPDATED).await
            }
            Self::Profiles => {
                toggle::<Profile>(client, id, ProfileColumn::IsActive, current, STATUS_UPDATED).await
            }
            Self::Giveaways => {
                toggle::<Giveaway>(client, id, GiveawayColumn::IsPublished, current, STATUS_UPDATED).await
            }
            Self::Banners => toggle::<Banner>(client, id, BannerColumn::IsActive, current, STATUS_UPDATED).await,
        }
    }

    /// Flips `is_featured`; `None` for tables without the flag.
    pub async fn toggle_featured(self, client: &QueryClient, id: &str, current: bool) -> Option<Toast> {
        Some(match self {
            Self::Events => toggle::<Event>(client, id, EventColumn::IsFeatured, current, STATUS_UPDATED).await,
            Self::Companies => {
                toggle::<Company>(client, id, CompanyColumn::IsFeatured, current, STATUS_UPDATED).await
            }
            Self::Profiles => {
                toggle::<Profile>(client, id, ProfileColumn::IsFeatured, current, STATUS_UPDATED).await
            }
            Self::Giveaways | Self::Banners => return None,
        })
    }
}

/// Grants or revokes admin rights.
pub async fn toggle_admin(client: &QueryClient, id: &str, current: bool) -> Toast {
    toggle::<User>(client, id, UserColumn::IsAdmin, current, "Permissões atualizadas!").await
}

/// One table line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminRow {
    pub id: String,
    pub title: String,
    pub detail: String,
    pub active: bool,
    pub featured: bool,
}

#[derive(Debug, Clone)]
pub struct AdminTablePage {
    pub title: &'static str,
    /// Path of the "new" form, when the table has one
    pub new_path: Option<&'static str>,
    pub rows: Vec<AdminRow>,
}

impl AdminTablePage {
    #[instrument(skip(client))]
    pub async fn content(client: &QueryClient, content: Content, search: &str) -> Result<Self> {
        let now = Utc::now();
        let page = match content {
            Content::Events => Self {
                title: "Gerenciar Eventos",
                new_path: Some("/admin/eventos/novo"),
                rows: events::admin_list_events(client, search)
                    .await?
                    .into_iter()
                    .map(|e| AdminRow {
                        detail: format!(
                            "{} · {}",
                            e.location_name.as_deref().or(e.city_name()).unwrap_or("-"),
                            when(e.start_datetime)
                        ),
                        id: e.id,
                        title: e.title,
                        active: e.is_active,
                        featured: e.is_featured,
                    })
                    .collect(),
            },
            Content::Companies => Self {
                title: "Gerenciar Empresas",
                new_path: Some("/admin/empresas/nova"),
                rows: companies::admin_list_companies(client, search)
                    .await?
                    .into_iter()
                    .map(|c| AdminRow {
                        detail: format!(
                            "{} · {} visualizações",
                            c.city_name().unwrap_or("-"),
                            c.views_count
                        ),
                        id: c.id,
                        title: c.name,
                        active: c.is_active,
                        featured: c.is_featured,
                    })
                    .collect(),
            },
            Content::Profiles => Self {
                title: "Gerenciar Perfis",
                new_path: Some("/admin/perfis/novo"),
                rows: profiles::admin_list_profiles(client, search, None)
                    .await?
                    .into_iter()
                    .map(|p| AdminRow {
                        detail: format!("{} · {}", p.profile_type, p.city_name().unwrap_or("-")),
                        id: p.id,
                        title: p.name,
                        active: p.is_active,
                        featured: p.is_featured,
                    })
                    .collect(),
            },
            Content::Giveaways => Self {
                title: "Gerenciar Sorteios",
                new_path: Some("/admin/sorteios/novo"),
                rows: giveaways::admin_list_giveaways(client, search, StatusFilter::All)
                    .await?
                    .into_iter()
                    .map(|g| AdminRow {
                        detail: format!(
                            "{} a {} · {}",
                            when(g.start_datetime),
                            when(g.end_datetime),
                            g.status_at(now)
                        ),
                        id: g.id,
                        title: g.title,
                        active: g.is_published,
                        featured: false,
                    })
                    .collect(),
            },
            Content::Banners => Self {
                title: "Gerenciar Banners",
                new_path: None,
                rows: banners::admin_list_banners(client, search, None)
                    .await?
                    .into_iter()
                    .map(|b| AdminRow {
                        detail: format!(
                            "{} · {} cliques / {} impressões ({:.1}%)",
                            b.position,
                            b.clicks,
                            b.impressions,
                            b.click_through_rate()
                        ),
                        id: b.id,
                        title: b.title,
                        active: b.is_active,
                        featured: false,
                    })
                    .collect(),
            },
        };
        Ok(page)
    }

    /// "CRM de Usuários".
    pub async fn users(client: &QueryClient, search: &str, role: RoleFilter) -> Result<Self> {
        Ok(Self {
            title: "CRM de Usuários",
            new_path: None,
            rows: users::admin_list_users(client, search, role)
                .await?
                .into_iter()
                .map(|u| AdminRow {
                    detail: format!(
                        "{} · {} · cadastro {}",
                        u.email,
                        u.cities.as_ref().map_or("-", |c| c.name.as_str()),
                        u.created_at.map(when).unwrap_or_default()
                    ),
                    title: u.display_name().to_string(),
                    id: u.id,
                    active: u.is_admin,
                    featured: false,
                })
                .collect(),
        })
    }
}

impl fmt::Display for AdminTablePage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        heading(f, self.title)?;
        if let Some(path) = self.new_path {
            writeln!(f, "  [+ Novo] {path}")?;
        }
        if self.rows.is_empty() {
            return write!(f, "{}", Placeholder::empty("Nenhum registro encontrado"));
        }
        for row in &self.rows {
            writeln!(
                f,
                "  {} {}{} ({})\n      {}",
                if row.active { "●" } else { "○" },
                row.title,
                if row.featured { " ★" } else { "" },
                row.id,
                row.detail
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct DashboardPage(pub Dashboard);

impl fmt::Display for DashboardPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = &self.0.stats;
        heading(f, "Dashboard")?;
        writeln!(f, "  Usuários: {}", stats.users)?;
        writeln!(f, "  Eventos ativos: {}", stats.active_events)?;
        writeln!(f, "  Empresas ativas: {}", stats.active_companies)?;
        writeln!(f, "  Perfis ativos: {}", stats.active_profiles)?;
        writeln!(f, "  Sorteios publicados: {}", stats.published_giveaways)?;
        heading(f, "Eventos recentes")?;
        for event in &self.0.recent_events {
            writeln!(f, "  • {} ({})", event.title, when(event.start_datetime))?;
        }
        heading(f, "Usuários recentes")?;
        for user in &self.0.recent_users {
            writeln!(f, "  • {} <{}>", user.display_name(), user.email)?;
        }
        Ok(())
    }
}

/// Labelled values of a form, in display order.
trait FormFields {
    const NEW_TITLE: &'static str;
    const EDIT_TITLE: &'static str;
    fn fields(&self) -> Vec<(&'static str, String)>;
}

fn flag(value: bool) -> String {
    if value { "sim" } else { "não" }.to_string()
}

impl FormFields for EventForm {
    const NEW_TITLE: &'static str = "Novo Evento";
    const EDIT_TITLE: &'static str = "Editar Evento";
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Título *", self.title.clone()),
            ("Início *", self.start_datetime.clone()),
            ("Término", self.end_datetime.clone()),
            ("Local", self.location_name.clone()),
            ("Cidade", self.city_id.clone()),
            ("Ingressos", self.ticket_url.clone()),
            ("Online", flag(self.is_online)),
            ("Destaque", flag(self.is_featured)),
            ("Ativo", flag(self.is_active)),
        ]
    }
}

impl FormFields for CompanyForm {
    const NEW_TITLE: &'static str = "Nova Empresa";
    const EDIT_TITLE: &'static str = "Editar Empresa";
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Nome *", self.name.clone()),
            ("Descrição", self.description.clone()),
            ("Cidade", self.city_id.clone()),
            ("Categoria", self.category_id.clone()),
            ("WhatsApp", self.whatsapp.clone()),
            ("Destaque", flag(self.is_featured)),
            ("Ativa", flag(self.is_active)),
        ]
    }
}

impl FormFields for ProfileForm {
    const NEW_TITLE: &'static str = "Novo Perfil";
    const EDIT_TITLE: &'static str = "Editar Perfil";
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Tipo", self.profile_type.to_string()),
            ("Nome *", self.name.clone()),
            ("Bio", self.bio.clone()),
            ("Seguidores", self.followers_count.to_string()),
            ("Destaque", flag(self.is_featured)),
            ("Ativo", flag(self.is_active)),
        ]
    }
}

impl FormFields for GiveawayForm {
    const NEW_TITLE: &'static str = "Novo Sorteio";
    const EDIT_TITLE: &'static str = "Editar Sorteio";
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Título *", self.title.clone()),
            ("Prêmio *", self.prize.clone()),
            ("Início *", self.start_datetime.clone()),
            ("Término *", self.end_datetime.clone()),
            ("Data do sorteio", self.draw_datetime.clone()),
            ("Publicado", flag(self.is_published)),
        ]
    }
}

impl FormFields for BannerForm {
    const NEW_TITLE: &'static str = "Novo Banner";
    const EDIT_TITLE: &'static str = "Editar Banner";
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Título *", self.title.clone()),
            ("Imagem *", self.image_url.clone()),
            ("Link", self.link_url.clone()),
            ("Posição", self.position.to_string()),
            ("Ordem", self.sort_order.to_string()),
            ("Ativo", flag(self.is_active)),
        ]
    }
}

/// A create/edit form as shown to the admin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPage {
    pub title: String,
    pub fields: Vec<(&'static str, String)>,
    pub back: &'static str,
}

impl FormPage {
    async fn build<F: AdminForm + FormFields>(client: &QueryClient, id: Option<&str>) -> Result<Self> {
        let form: F = load_form(client, id).await?;
        Ok(Self {
            title: if id.is_some() { F::EDIT_TITLE } else { F::NEW_TITLE }.to_string(),
            fields: form.fields(),
            back: F::MESSAGES.list_path,
        })
    }

    pub async fn event(client: &QueryClient, id: Option<&str>) -> Result<Self> {
        Self::build::<EventForm>(client, id).await
    }

    pub async fn company(client: &QueryClient, id: Option<&str>) -> Result<Self> {
        Self::build::<CompanyForm>(client, id).await
    }

    pub async fn profile(client: &QueryClient, id: Option<&str>) -> Result<Self> {
        Self::build::<ProfileForm>(client, id).await
    }

    pub async fn giveaway(client: &QueryClient, id: Option<&str>) -> Result<Self> {
        Self::build::<GiveawayForm>(client, id).await
    }

    pub async fn banner(client: &QueryClient, id: Option<&str>) -> Result<Self> {
        Self::build::<BannerForm>(client, id).await
    }
}

impl fmt::Display for FormPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        heading(f, &self.title)?;
        for (label, value) in &self.fields {
            writeln!(f, "  {label}: [{value}]")?;
        }
        writeln!(f, "  [Salvar]  [Cancelar → {}]", self.back)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionStatus {
    Pending,
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub name: &'static str,
    pub email: &'static str,
    pub subject: &'static str,
    pub message: &'static str,
    pub status: SuggestionStatus,
    pub received: &'static str,
}

/// "Sugestões e Mensagens"; a fixed inbox until suggestions get a table.
#[derive(Debug, Clone)]
pub struct SuggestionsPage {
    pub suggestions: Vec<Suggestion>,
}

impl Default for SuggestionsPage {
    fn default() -> Self {
        Self {
            suggestions: vec![
                Suggestion {
                    name: "João Silva",
                    email: "joao@email.com",
                    subject: "Sugestão de novo recurso",
                    message: "Seria ótimo ter um sistema de avaliações para os eventos...",
                    status: SuggestionStatus::Pending,
                    received: "24/11/2024 10:30",
                },
                Suggestion {
                    name: "Maria Santos",
                    email: "maria@email.com",
                    subject: "Problema no cadastro",
                    message: "Estou tendo dificuldades para cadastrar minha empresa...",
                    status: SuggestionStatus::Pending,
                    received: "23/11/2024 15:20",
                },
                Suggestion {
                    name: "Pedro Costa",
                    email: "pedro@email.com",
                    subject: "Elogio à plataforma",
                    message: "Parabéns pelo excelente trabalho! A plataforma está incrível.",
                    status: SuggestionStatus::Resolved,
                    received: "22/11/2024 09:15",
                },
            ],
        }
    }
}

impl SuggestionsPage {
    /// `(total, pending, resolved)`
    #[must_use]
    pub fn stats(&self) -> (usize, usize, usize) {
        let pending = self
            .suggestions
            .iter()
            .filter(|s| s.status == SuggestionStatus::Pending)
            .count();
        (self.suggestions.len(), pending, self.suggestions.len() - pending)
    }
}

impl fmt::Display for SuggestionsPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (total, pending, resolved) = self.stats();
        heading(f, "Sugestões e Mensagens")?;
        writeln!(f, "  Total: {total}  Pendentes: {pending}  Resolvidas: {resolved}")?;
        for s in &self.suggestions {
            let status = match s.status {
                SuggestionStatus::Pending => "Pendente",
                SuggestionStatus::Resolved => "Resolvida",
            };
            writeln!(f, "  [{status}] {} · {} <{}> · {}", s.subject, s.name, s.email, s.received)?;
            writeln!(f, "      {}", s.message)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Integration {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub key: String,
}

/// Third-party API keys. Saving only acknowledges; nothing is persisted yet.
#[derive(Debug, Clone)]
pub struct SettingsPage {
    pub integrations: Vec<Integration>,
}

impl Default for SettingsPage {
    fn default() -> Self {
        let integration = |id, name, description| Integration {
            id,
            name,
            description,
            key: String::new(),
        };
        Self {
            integrations: vec![
                integration("openai", "OpenAI (ChatGPT)", "Assistente de IA para chat e suporte"),
                integration("gemini", "Google Gemini", "IA do Google para análises e insights"),
                integration("groq", "Groq (Whisper)", "Transcrição de áudio para texto"),
                integration("evolution", "Evolution API", "Integração com WhatsApp"),
            ],
        }
    }
}

impl SettingsPage {
    /// Returns `false` for an unknown integration id.
    pub fn set_key(&mut self, id: &str, key: &str) -> bool {
        self.integrations
            .iter_mut()
            .find(|i| i.id == id)
            .map(|i| key.trim().clone_into(&mut i.key))
            .is_some()
    }

    #[must_use]
    pub fn save(&self) -> Toast {
        Toast::success("Configurações salvas com sucesso!")
    }
}

impl fmt::Display for SettingsPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        heading(f, "Configurações")?;
        for integration in &self.integrations {
            let shown = if integration.key.is_empty() {
                "não configurada".to_string()
            } else {
                "•".repeat(integration.key.chars().count().min(12))
            };
            writeln!(f, "  {} ({}): {shown}", integration.name, integration.description)?;
        }
        Ok(())
    }
}

/// Any back-office screen.
#[derive(Debug, Clone)]
pub enum AdminPage {
    Dashboard(DashboardPage),
    Table(AdminTablePage),
    Form(FormPage),
    Suggestions(SuggestionsPage),
    Settings(SettingsPage),
}

impl AdminPage {
    pub async fn load(client: &QueryClient, route: &AdminRoute) -> Result<Self> {
        let table = |content| AdminTablePage::content(client, content, "");
        Ok(match route {
            AdminRoute::Dashboard => Self::Dashboard(DashboardPage(dashboard::load(client).await?)),
            AdminRoute::Events => Self::Table(table(Content::Events).await?),
            AdminRoute::Companies => Self::Table(table(Content::Companies).await?),
            AdminRoute::Profiles => Self::Table(table(Content::Profiles).await?),
            AdminRoute::Giveaways => Self::Table(table(Content::Giveaways).await?),
            AdminRoute::Banners => Self::Table(table(Content::Banners).await?),
            AdminRoute::Users => Self::Table(AdminTablePage::users(client, "", RoleFilter::All).await?),
            AdminRoute::EventForm(id) => Self::Form(FormPage::event(client, id.as_deref()).await?),
            AdminRoute::CompanyForm(id) => Self::Form(FormPage::company(client, id.as_deref()).await?),
            AdminRoute::ProfileForm(id) => Self::Form(FormPage::profile(client, id.as_deref()).await?),
            AdminRoute::GiveawayForm(id) => Self::Form(FormPage::giveaway(client, id.as_deref()).await?),
            AdminRoute::Suggestions => Self::Suggestions(SuggestionsPage::default()),
            AdminRoute::Settings => Self::Settings(SettingsPage::default()),
        })
    }
}

impl fmt::Display for AdminPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dashboard(page) => page.fmt(f),
            Self::Table(page) => page.fmt(f),
            Self::Form(page) => page.fmt(f),
            Self::Suggestions(page) => page.fmt(f),
            Self::Settings(page) => page.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::errors::Error;
    use crate::query::QueryOptions;
    use crate::test_utils::demo_client;

    #[tokio::test]
    async fn test_tables_list_everything() -> Result<()> {
        let (_backend, client) = demo_client();
        let events = AdminTablePage::content(&client, Content::Events, "").await?;
        assert_eq!(events.rows.len(), 5);
        assert_eq!(events.new_path, Some("/admin/eventos/novo"));

        let giveaways = AdminTablePage::content(&client, Content::Giveaways, "").await?;
        assert_eq!(giveaways.rows.iter().filter(|r| r.active).count(), 2);

        let banners = AdminTablePage::content(&client, Content::Banners, "").await?;
        assert!(banners.to_string().contains("2.5%"));

        let admins = AdminTablePage::users(&client, "", RoleFilter::Admins).await?;
        assert_eq!(admins.rows.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_row_actions() -> Result<()> {
        let (backend, client) = demo_client();

        let toast = Content::Giveaways.toggle_active(&client, "giveaway-draft", false).await;
        assert_eq!(toast, Toast::success(STATUS_UPDATED));
        let published = client
            .count(&QueryOptions::<Giveaway>::new().filter(GiveawayColumn::IsPublished, true))
            .await?;
        assert_eq!(published, 3);

        assert!(Content::Banners.toggle_featured(&client, "banner-1", false).await.is_none());

        let toast = Content::Companies.delete(&client, "company-3").await;
        assert_eq!(toast, Toast::success("Empresa excluída com sucesso!"));
        backend.fail_next(1);
        assert_eq!(
            Content::Companies.delete(&client, "company-1").await,
            Toast::error("Erro ao excluir empresa")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_toggle_admin() -> Result<()> {
        let (_backend, client) = demo_client();
        let before = AdminTablePage::users(&client, "maria", RoleFilter::All).await?;
        let maria = &before.rows[0];
        assert!(!maria.active);

        let toast = toggle_admin(&client, &maria.id, maria.active).await;
        assert_eq!(toast, Toast::success("Permissões atualizadas!"));
        let admins = AdminTablePage::users(&client, "", RoleFilter::Admins).await?;
        assert_eq!(admins.rows.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_form_pages() -> Result<()> {
        let (_backend, client) = demo_client();
        let new = FormPage::company(&client, None).await?;
        assert_eq!(new.title, "Nova Empresa");
        assert_eq!(new.back, "/admin/empresas");

        let edit = FormPage::event(&client, Some("event-active-2")).await?;
        assert_eq!(edit.title, "Editar Evento");
        assert!(edit.fields.contains(&("Título *", "Feira de Artesanato".to_string())));

        assert!(matches!(
            FormPage::giveaway(&client, Some("missing")).await,
            Err(Error::NotFound { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_static_screens() {
        let suggestions = SuggestionsPage::default();
        assert_eq!(suggestions.stats(), (3, 2, 1));

        let mut settings = SettingsPage::default();
        assert!(settings.set_key("groq", " gsk-123 "));
        assert!(!settings.set_key("unknown", "x"));
        assert_eq!(settings.integrations[2].key, "gsk-123");
        assert_eq!(settings.save(), Toast::success("Configurações salvas com sucesso!"));
        assert!(!settings.to_string().contains("gsk-123"));
    }
}
