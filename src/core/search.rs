//! Cross-entity search.
//!
//! The search page loads up to [`SEARCH_FETCH_LIMIT`] active rows of each kind and
//! refines them locally with a case-insensitive substring match. Without a search term
//! the category tab decides which lists are shown.

use crate::entities::{Company, CompanyColumn, Event, EventColumn, Profile, ProfileColumn};
use crate::errors::Result;
use crate::query::{QueryClient, QueryOptions};
use crate::routes::SearchCategory;

/// Rows fetched per entity before local refinement.
pub const SEARCH_FETCH_LIMIT: u64 = 50;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    pub events: Vec<Event>,
    pub companies: Vec<Company>,
    pub profiles: Vec<Profile>,
}

impl SearchResults {
    #[must_use]
    pub fn total(&self) -> usize {
        self.events.len() + self.companies.len() + self.profiles.len()
    }
}

fn contains(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|text| text.to_lowercase().contains(needle))
}

/// Refines fetched rows against the term and tab.
#[must_use]
pub fn refine(
    events: Vec<Event>,
    companies: Vec<Company>,
    profiles: Vec<Profile>,
    term: &str,
    category: SearchCategory,
) -> SearchResults {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        let shows = |tab| category == SearchCategory::All || category == tab;
        return SearchResults {
            events: if shows(SearchCategory::Events) { events } else { Vec::new() },
            companies: if shows(SearchCategory::Companies) { companies } else { Vec::new() },
            profiles: if shows(SearchCategory::Profiles) { profiles } else { Vec::new() },
        };
    }

    SearchResults {
        events: events
            .into_iter()
            .filter(|e| {
                contains(Some(&e.title), &needle)
                    || contains(e.description.as_deref(), &needle)
                    || contains(e.location_name.as_deref(), &needle)
            })
            .collect(),
        companies: companies
            .into_iter()
            .filter(|c| contains(Some(&c.name), &needle) || contains(c.description.as_deref(), &needle))
            .collect(),
        profiles: profiles
            .into_iter()
            .filter(|p| contains(Some(&p.name), &needle) || contains(p.bio.as_deref(), &needle))
            .collect(),
    }
}

/// Fetches the candidate rows and refines them.
pub async fn search(client: &QueryClient, term: &str, category: SearchCategory) -> Result<SearchResults> {
    let event_options = QueryOptions::<Event>::new()
        .select("*, cities(name)")
        .filter(EventColumn::IsActive, true)
        .order(EventColumn::StartDatetime, true)
        .limit(SEARCH_FETCH_LIMIT);
    let company_options = QueryOptions::<Company>::new()
        .select("*, cities(name), company_categories(name)")
        .filter(CompanyColumn::IsActive, true)
        .limit(SEARCH_FETCH_LIMIT);
    let profile_options = QueryOptions::<Profile>::new()
        .select("*, cities(name)")
        .filter(ProfileColumn::IsActive, true)
        .limit(SEARCH_FETCH_LIMIT);
    let (events, companies, profiles) = tokio::try_join!(
        client.fetch(&event_options),
        client.fetch(&company_options),
        client.fetch(&profile_options),
    )?;
    Ok(refine(events, companies, profiles, term, category))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::demo_client;

    #[tokio::test]
    async fn test_term_matches_secondary_fields() -> Result<()> {
        let (_backend, client) = demo_client();

        let by_location = search(&client, "tiradentes", SearchCategory::All).await?;
        assert_eq!(by_location.events.len(), 1);
        assert_eq!(by_location.events[0].id, "event-active-1");

        let by_description = search(&client, "FAMÍLIA", SearchCategory::All).await?;
        assert_eq!(by_description.companies.len(), 1);

        let by_bio = search(&client, "viagem", SearchCategory::All).await?;
        assert_eq!(by_bio.profiles.len(), 1);
        assert_eq!(by_bio.total(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_inactive_rows_never_match() -> Result<()> {
        let (_backend, client) = demo_client();
        let results = search(&client, "cancelado", SearchCategory::All).await?;
        assert_eq!(results.total(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_term_uses_category_tab() -> Result<()> {
        let (_backend, client) = demo_client();

        let all = search(&client, "", SearchCategory::All).await?;
        assert_eq!(all.events.len(), 3);
        assert_eq!(all.companies.len(), 3);
        assert_eq!(all.profiles.len(), 3);

        let companies_only = search(&client, "  ", SearchCategory::Companies).await?;
        assert!(companies_only.events.is_empty());
        assert_eq!(companies_only.companies.len(), 3);
        assert!(companies_only.profiles.is_empty());
        Ok(())
    }
}
