//! Public screens: home, listings, detail pages, giveaways and search.

use super::{heading, when};
use crate::core::{banners, companies, events, giveaways, profiles, search};
use crate::core::companies::CompanyFilter;
use crate::core::events::EventFilter;
use crate::core::giveaways::GiveawayTab;
use crate::core::profiles::ProfileFilter;
use crate::core::search::SearchResults;
use crate::entities::{
    Banner, BannerPosition, Category, City, Company, Event, Giveaway, Profile, ProfileType,
};
use crate::errors::Result;
use crate::query::{InfiniteQuery, QueryClient};
use crate::routes::SearchCategory;
use crate::ui::carousel::DEFAULT_AUTOPLAY_INTERVAL;
use crate::ui::{BatchReveal, Carousel, InfiniteScroll, Placeholder};
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use tracing::instrument;

pub const HOME_EVENT_LIMIT: u64 = 10;
pub const HOME_COMPANY_LIMIT: u64 = 2;
pub const HOME_CATEGORY_LIMIT: u64 = 8;
/// Event cards visible at once in the home carousel
pub const HOME_EVENTS_PER_VIEW: usize = 3;

fn event_line(event: &Event) -> String {
    let mut line = format!("• {}  {}", when(event.start_datetime), event.title);
    let place: Vec<&str> = [event.location_name.as_deref(), event.city_name()]
        .into_iter()
        .flatten()
        .collect();
    if !place.is_empty() {
        line.push_str(&format!(" · {}", place.join(", ")));
    }
    if event.is_featured {
        line.push_str(" ★");
    }
    line
}

fn company_line(company: &Company) -> String {
    let mut line = format!("• {}", company.name);
    if let Some(category) = company.category_name() {
        line.push_str(&format!(" ({category})"));
    }
    if let Some(city) = company.city_name() {
        line.push_str(&format!(" · {city}"));
    }
    line
}

fn profile_line(profile: &Profile) -> String {
    format!(
        "• {} [{}] {} seguidores{}",
        profile.name,
        profile.profile_type,
        profile.followers_count,
        if profile.is_featured { " ★" } else { "" }
    )
}

fn list<T>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    empty: &str,
    line: impl Fn(&T) -> String,
) -> fmt::Result {
    if items.is_empty() {
        return write!(f, "{}", Placeholder::empty(empty));
    }
    for item in items {
        writeln!(f, "  {}", line(item))?;
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct HomePage {
    pub banners: Vec<Banner>,
    pub banner_carousel: Carousel,
    pub events: Vec<Event>,
    pub event_carousel: Carousel,
    pub companies: Vec<Company>,
    pub categories: Vec<Category>,
}

impl HomePage {
    #[instrument(skip(client))]
    pub async fn load(client: &QueryClient) -> Result<Self> {
        let (banners, events, companies, categories) = tokio::try_join!(
            banners::active_banners(client, BannerPosition::HomeTop),
            events::upcoming_events(client, HOME_EVENT_LIMIT),
            companies::featured_companies(client, HOME_COMPANY_LIMIT),
            companies::list_categories(client, Some(HOME_CATEGORY_LIMIT)),
        )?;
        Ok(Self {
            banner_carousel: Carousel::new(banners.len(), 1).with_autoplay(DEFAULT_AUTOPLAY_INTERVAL),
            event_carousel: Carousel::new(events.len(), HOME_EVENTS_PER_VIEW),
            banners,
            events,
            companies,
            categories,
        })
    }
}

impl fmt::Display for HomePage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        heading(f, "Guia Lafaiete")?;
        if let Some(banner) = self.banners.get(self.banner_carousel.index()) {
            writeln!(f, "  [{}] {}", banner.title, banner.image_url)?;
        }
        heading(f, "Próximos eventos")?;
        list(f, &self.events, "Nenhum evento programado", event_line)?;
        if self.event_carousel.shows_controls() {
            writeln!(f, "  ‹ {} páginas ›", self.event_carousel.dot_count())?;
        }
        heading(f, "Empresas em destaque")?;
        list(f, &self.companies, "Nenhuma empresa em destaque", company_line)?;
        heading(f, "Categorias")?;
        let names: Vec<&str> = self.categories.iter().map(|c| c.name.as_str()).collect();
        writeln!(f, "  {}", names.join(" | "))
    }
}

/// Events listing, loaded a page at a time.
pub struct EventsPage {
    pub filter: EventFilter,
    pub cities: Vec<City>,
    listing: InfiniteQuery<Event>,
    scroll: InfiniteScroll,
}

impl EventsPage {
    #[instrument(skip(client))]
    pub async fn load(client: &Arc<QueryClient>, filter: EventFilter) -> Result<Self> {
        let listing = InfiniteQuery::new(Arc::clone(client), events::listing_query(&filter, Utc::now()));
        let (cities, _) = tokio::try_join!(events::list_cities(client), listing.load_more())?;
        Ok(Self {
            filter,
            cities,
            listing,
            scroll: InfiniteScroll::default(),
        })
    }

    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.listing.items()
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.listing.has_more()
    }

    /// Scroll callback; loads the next page when the bottom is near.
    pub async fn on_scroll(&self, scroll_top: u32, viewport_height: u32, content_height: u32) -> Result<bool> {
        if self.scroll.on_scroll(
            scroll_top,
            viewport_height,
            content_height,
            self.listing.has_more(),
            self.listing.is_loading(),
        ) {
            self.listing.load_more().await
        } else {
            Ok(false)
        }
    }
}

impl fmt::Display for EventsPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        heading(f, "Eventos")?;
        list(f, &self.events(), "Nenhum evento encontrado", event_line)?;
        if self.has_more() {
            writeln!(f, "  Carregando mais...")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct EventDetailPage {
    pub event: Option<Event>,
}

impl EventDetailPage {
    pub async fn load(client: &QueryClient, id: &str) -> Result<Self> {
        Ok(Self {
            event: events::get_event(client, id).await?,
        })
    }
}

impl fmt::Display for EventDetailPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(event) = &self.event else {
            return write!(f, "{}", Placeholder::not_found("Evento", "/eventos"));
        };
        heading(f, &event.title)?;
        writeln!(f, "  Início: {}", when(event.start_datetime))?;
        if let Some(end) = event.end_datetime {
            writeln!(f, "  Término: {}", when(end))?;
        }
        if event.is_online {
            writeln!(f, "  Evento online")?;
        } else if let Some(location) = &event.location_name {
            writeln!(f, "  Local: {location}")?;
        }
        if let Some(city) = event.city_name() {
            writeln!(f, "  Cidade: {city}")?;
        }
        if let Some(description) = &event.description {
            writeln!(f, "\n  {description}")?;
        }
        if let Some(ticket) = &event.ticket_url {
            writeln!(f, "  Ingressos: {ticket}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CompaniesPage {
    pub filter: CompanyFilter,
    pub companies: Vec<Company>,
    pub categories: Vec<Category>,
    /// Cards already revealed by scrolling
    pub reveal: BatchReveal,
}

impl CompaniesPage {
    #[instrument(skip(client))]
    pub async fn load(client: &QueryClient, filter: CompanyFilter) -> Result<Self> {
        let (companies, categories) = tokio::try_join!(
            companies::list_companies(client, &filter),
            companies::list_categories(client, None),
        )?;
        Ok(Self {
            filter,
            companies,
            categories,
            reveal: BatchReveal::new(true),
        })
    }
}

impl fmt::Display for CompaniesPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        heading(f, "Empresas")?;
        list(f, &self.companies, "Nenhuma empresa encontrada", company_line)
    }
}

#[derive(Debug, Clone)]
pub struct CompanyDetailPage {
    pub company: Option<Company>,
}

impl CompanyDetailPage {
    pub async fn load(client: &QueryClient, id: &str) -> Result<Self> {
        Ok(Self {
            company: companies::get_company(client, id).await?,
        })
    }
}

impl fmt::Display for CompanyDetailPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(company) = &self.company else {
            return write!(f, "{}", Placeholder::not_found("Empresa", "/empresas"));
        };
        heading(f, &company.name)?;
        if let Some(category) = company.category_name() {
            writeln!(f, "  Categoria: {category}")?;
        }
        if let Some(description) = &company.description {
            writeln!(f, "  {description}")?;
        }
        let contacts = [
            ("Endereço", company.address.as_deref()),
            ("WhatsApp", company.whatsapp.as_deref()),
            ("Instagram", company.instagram_url.as_deref()),
            ("Site", company.website_url.as_deref()),
        ];
        for (label, value) in contacts {
            if let Some(value) = value {
                writeln!(f, "  {label}: {value}")?;
            }
        }
        Ok(())
    }
}

/// Influencers or musicians listing.
#[derive(Debug, Clone)]
pub struct ProfilesPage {
    pub title: &'static str,
    pub profiles: Vec<Profile>,
}

impl ProfilesPage {
    pub async fn influencers(client: &QueryClient, filter: ProfileFilter) -> Result<Self> {
        let filter = ProfileFilter {
            profile_type: Some(ProfileType::Influencer),
            ..filter
        };
        Ok(Self {
            title: "Influenciadores",
            profiles: profiles::list_profiles(client, &filter).await?,
        })
    }

    pub async fn musicians(client: &QueryClient, search: &str) -> Result<Self> {
        Ok(Self {
            title: "Músicos",
            profiles: profiles::list_musicians(client, search).await?,
        })
    }
}

impl fmt::Display for ProfilesPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        heading(f, self.title)?;
        list(f, &self.profiles, "Nenhum perfil encontrado", profile_line)
    }
}

#[derive(Debug, Clone)]
pub struct GiveawaysPage {
    pub tab: GiveawayTab,
    pub giveaways: Vec<Giveaway>,
    pub now: DateTime<Utc>,
}

impl GiveawaysPage {
    pub async fn load(client: &QueryClient, tab: GiveawayTab) -> Result<Self> {
        Ok(Self {
            tab,
            giveaways: giveaways::list_giveaways(client, tab, "").await?,
            now: Utc::now(),
        })
    }
}

impl fmt::Display for GiveawaysPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        heading(
            f,
            match self.tab {
                GiveawayTab::Active => "Sorteios ativos",
                GiveawayTab::Finished => "Sorteios finalizados",
            },
        )?;
        list(f, &self.giveaways, "Nenhum sorteio encontrado", |g| {
            format!(
                "• {} [{}] prêmio: {} · sorteio em {}",
                g.title,
                g.status_at(self.now),
                g.prize.as_deref().unwrap_or("-"),
                when(g.draw_datetime)
            )
        })
    }
}

#[derive(Debug, Clone)]
pub struct SearchPage {
    pub query: String,
    pub category: SearchCategory,
    pub results: SearchResults,
}

impl SearchPage {
    #[instrument(skip(client))]
    pub async fn load(client: &QueryClient, query: &str, category: SearchCategory) -> Result<Self> {
        Ok(Self {
            query: query.to_string(),
            category,
            results: search::search(client, query, category).await?,
        })
    }
}

impl fmt::Display for SearchPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.query.is_empty() {
            heading(f, "Busca")?;
        } else {
            heading(f, &format!("Resultados para \"{}\"", self.query))?;
        }
        if self.results.total() == 0 {
            return write!(f, "{}", Placeholder::empty("Nenhum resultado encontrado"));
        }
        writeln!(f, "  {} resultado(s)", self.results.total())?;
        for event in &self.results.events {
            writeln!(f, "  {}", event_line(event))?;
        }
        for company in &self.results.companies {
            writeln!(f, "  {}", company_line(company))?;
        }
        for profile in &self.results.profiles {
            writeln!(f, "  {}", profile_line(profile))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::demo_client;

    #[tokio::test]
    async fn test_home_sections() -> Result<()> {
        let (_backend, client) = demo_client();
        let home = HomePage::load(&client).await?;
        assert_eq!(home.banners.len(), 1);
        assert_eq!(home.events.len(), 3);
        assert_eq!(home.companies.len(), 2);
        assert_eq!(home.categories.len(), 3);
        assert!(!home.event_carousel.shows_controls());
        assert_eq!(home.banner_carousel.autoplay(), Some(DEFAULT_AUTOPLAY_INTERVAL));

        let text = home.to_string();
        assert!(text.contains("Feira de Artesanato"));
        assert!(text.contains("Moda"));
        Ok(())
    }

    #[tokio::test]
    async fn test_events_page_scroll_loads_next_page() -> Result<()> {
        let (backend, client) = demo_client();
        let client = Arc::new(client);
        let rows = (0..12)
            .map(|i| {
                crate::test_utils::event_row(
                    &format!("extra-{i:02}"),
                    true,
                    Utc::now() + chrono::Duration::days(30 + i),
                )
            })
            .collect();
        backend.seed(crate::query::Table::Events, rows);

        let page = EventsPage::load(&client, EventFilter::default()).await?;
        assert_eq!(page.events().len(), 10);
        assert!(page.has_more());
        assert_eq!(page.cities.len(), 2);

        assert!(!page.on_scroll(0, 800, 3_000).await?);
        assert!(page.on_scroll(2_100, 800, 3_000).await?);
        assert_eq!(page.events().len(), 15);
        assert!(!page.has_more());
        Ok(())
    }

    #[tokio::test]
    async fn test_detail_not_found_panel() -> Result<()> {
        let (_backend, client) = demo_client();
        let missing = EventDetailPage::load(&client, "nope").await?;
        assert!(missing.to_string().contains("Evento não encontrado."));

        let found = EventDetailPage::load(&client, "event-active-1").await?.to_string();
        assert!(found.contains("Praça Tiradentes"));
        assert!(found.contains("Conselheiro Lafaiete"));

        let company = CompanyDetailPage::load(&client, "company-2").await?.to_string();
        assert!(company.contains("Saúde"));
        Ok(())
    }

    #[tokio::test]
    async fn test_giveaway_status_labels() -> Result<()> {
        let (_backend, client) = demo_client();
        let active = GiveawaysPage::load(&client, GiveawayTab::Active).await?.to_string();
        assert!(active.contains("[Ativo]"));
        let finished = GiveawaysPage::load(&client, GiveawayTab::Finished).await?.to_string();
        assert!(finished.contains("[Finalizado]"));
        Ok(())
    }

    #[tokio::test]
    async fn test_search_page_empty_state() -> Result<()> {
        let (_backend, client) = demo_client();
        let page = SearchPage::load(&client, "zzz", SearchCategory::All).await?;
        assert!(page.to_string().contains("Nenhum resultado encontrado"));
        Ok(())
    }
}
