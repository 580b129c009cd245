//! Event business logic - public listings, detail pages and the admin table.

use crate::entities::{City, CityColumn, Event, EventColumn};
use crate::errors::Result;
use crate::query::{QueryClient, QueryOptions, Select};
use chrono::{DateTime, Duration, Utc};

/// Columns loaded for event cards: the row plus its city name.
pub const EVENT_CARD_COLUMNS: &str = "*, cities(name)";

/// Date window offered by the events page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateFilter {
    #[default]
    All,
    /// Starting today or later
    Today,
    /// Starting within the next seven days
    Week,
}

impl DateFilter {
    #[must_use]
    pub fn from_param(value: &str) -> Self {
        match value {
            "today" | "hoje" => Self::Today,
            "week" | "semana" => Self::Week,
            _ => Self::All,
        }
    }
}

/// Filters of the public events page.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub search: String,
    pub date: DateFilter,
    pub city_id: Option<String>,
}

/// Next active events in start order, as shown on the home page.
pub async fn upcoming_events(client: &QueryClient, limit: u64) -> Result<Vec<Event>> {
    client
        .fetch(
            &QueryOptions::<Event>::new()
                .select(EVENT_CARD_COLUMNS)
                .filter(EventColumn::IsActive, true)
                .order(EventColumn::StartDatetime, true)
                .limit(limit),
        )
        .await
}

/// Builds the events page query for a given "now".
///
/// `Today` keeps events starting on the current UTC date or later; `Week` keeps events
/// starting no later than seven days from now.
#[must_use]
pub fn listing_query(filter: &EventFilter, now: DateTime<Utc>) -> Select<Event> {
    let mut select = Select::<Event>::new()
        .columns(EVENT_CARD_COLUMNS)
        .eq(EventColumn::IsActive, true)
        .order_by(EventColumn::StartDatetime, true);

    if !filter.search.trim().is_empty() {
        select = select.ilike(EventColumn::Title, &filter.search);
    }
    match filter.date {
        DateFilter::All => {}
        DateFilter::Today => {
            select = select.gte(
                EventColumn::StartDatetime,
                now.date_naive().format("%Y-%m-%d").to_string(),
            );
        }
        DateFilter::Week => {
            select = select.lte(
                EventColumn::StartDatetime,
                (now + Duration::days(7)).to_rfc3339(),
            );
        }
    }
    if let Some(city_id) = filter.city_id.as_deref().filter(|c| !c.is_empty()) {
        select = select.eq(EventColumn::CityId, city_id);
    }
    select
}

pub async fn list_events(client: &QueryClient, filter: &EventFilter) -> Result<Vec<Event>> {
    client.fetch_select(listing_query(filter, Utc::now())).await
}

/// Single event with its city, `None` when the id does not exist.
pub async fn get_event(client: &QueryClient, id: &str) -> Result<Option<Event>> {
    client.fetch_by_id(id, EVENT_CARD_COLUMNS).await
}

/// Cities for the filter dropdowns, alphabetically.
pub async fn list_cities(client: &QueryClient) -> Result<Vec<City>> {
    client
        .fetch(&QueryOptions::<City>::new().order(CityColumn::Name, true))
        .await
}

/// Admin table: every event, newest first, optionally narrowed by title.
pub async fn admin_list_events(client: &QueryClient, search: &str) -> Result<Vec<Event>> {
    let mut select = Select::<Event>::new()
        .columns(EVENT_CARD_COLUMNS)
        .order_by(EventColumn::CreatedAt, false);
    if !search.trim().is_empty() {
        select = select.ilike(EventColumn::Title, search);
    }
    client.fetch_select(select).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::query::Predicate;
    use crate::test_utils::demo_client;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_upcoming_events_are_active_and_ordered() -> Result<()> {
        let (_backend, client) = demo_client();
        let events = upcoming_events(&client, 10).await?;

        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["event-active-2", "event-active-1", "event-active-3"]);
        assert_eq!(events[0].city_name(), Some("Conselheiro Lafaiete"));
        Ok(())
    }

    #[test]
    fn test_date_filters() {
        let now = Utc.with_ymd_and_hms(2025, 11, 24, 15, 30, 0).unwrap();
        let today = listing_query(
            &EventFilter {
                date: DateFilter::Today,
                ..EventFilter::default()
            },
            now,
        );
        assert!(today.query().predicates.contains(&Predicate::Gte {
            column: "start_datetime".to_string(),
            value: "2025-11-24".into(),
        }));

        let week = listing_query(
            &EventFilter {
                date: DateFilter::Week,
                ..EventFilter::default()
            },
            now,
        );
        assert!(week.query().predicates.contains(&Predicate::Lte {
            column: "start_datetime".to_string(),
            value: "2025-12-01T15:30:00+00:00".into(),
        }));
    }

    #[tokio::test]
    async fn test_search_and_city_filter() -> Result<()> {
        let (_backend, client) = demo_client();
        let found = list_events(
            &client,
            &EventFilter {
                search: "FEIRA".to_string(),
                ..EventFilter::default()
            },
        )
        .await?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "event-active-2");

        let in_congonhas = list_events(
            &client,
            &EventFilter {
                city_id: Some("city-2".to_string()),
                ..EventFilter::default()
            },
        )
        .await?;
        assert!(in_congonhas.iter().all(|e| e.city_id.as_deref() == Some("city-2")));
        assert_eq!(in_congonhas.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_week_filter_excludes_far_events() -> Result<()> {
        let (_backend, client) = demo_client();
        let week = list_events(
            &client,
            &EventFilter {
                date: DateFilter::Week,
                ..EventFilter::default()
            },
        )
        .await?;
        assert!(week.iter().all(|e| e.id != "event-active-3"));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_event() -> Result<()> {
        let (_backend, client) = demo_client();
        assert!(get_event(&client, "event-active-1").await?.is_some());
        assert!(get_event(&client, "missing").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_admin_listing_includes_inactive() -> Result<()> {
        let (_backend, client) = demo_client();
        assert_eq!(admin_list_events(&client, "").await?.len(), 5);
        assert_eq!(admin_list_events(&client, "show").await?.len(), 1);
        Ok(())
    }
}
