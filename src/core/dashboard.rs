//! Back-office dashboard.
//!
//! Headline counts come from head-only count queries, which the query client caches
//! longer than row queries. The recent lists only load the columns the dashboard shows.

use crate::entities::{
    Company, CompanyColumn, Event, EventColumn, Giveaway, GiveawayColumn, Profile, ProfileColumn,
    User, UserColumn,
};
use crate::errors::Result;
use crate::query::{QueryClient, QueryOptions, Select};

/// Rows shown in each "recent" list.
pub const RECENT_LIMIT: u64 = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub users: u64,
    pub active_events: u64,
    pub active_companies: u64,
    pub active_profiles: u64,
    pub published_giveaways: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub recent_events: Vec<Event>,
    pub recent_users: Vec<User>,
}

pub async fn stats(client: &QueryClient) -> Result<DashboardStats> {
    let all_users = QueryOptions::<User>::new();
    let events = QueryOptions::<Event>::new().filter(EventColumn::IsActive, true);
    let companies = QueryOptions::<Company>::new().filter(CompanyColumn::IsActive, true);
    let profiles = QueryOptions::<Profile>::new().filter(ProfileColumn::IsActive, true);
    let giveaways = QueryOptions::<Giveaway>::new().filter(GiveawayColumn::IsPublished, true);
    let (users, active_events, active_companies, active_profiles, published_giveaways) = tokio::try_join!(
        client.count(&all_users),
        client.count(&events),
        client.count(&companies),
        client.count(&profiles),
        client.count(&giveaways),
    )?;
    Ok(DashboardStats {
        users,
        active_events,
        active_companies,
        active_profiles,
        published_giveaways,
    })
}

pub async fn load(client: &QueryClient) -> Result<Dashboard> {
    let (stats, recent_events, recent_users) = tokio::try_join!(
        stats(client),
        client.fetch_select(
            Select::<Event>::new()
                .columns("id, title, start_datetime, is_featured")
                .order_by(EventColumn::CreatedAt, false)
                .limit(RECENT_LIMIT),
        ),
        client.fetch_select(
            Select::<User>::new()
                .columns("id, name, email, avatar_url, created_at")
                .order_by(UserColumn::CreatedAt, false)
                .limit(RECENT_LIMIT),
        ),
    )?;
    Ok(Dashboard {
        stats,
        recent_events,
        recent_users,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::demo_client;

    #[tokio::test]
    async fn test_counts() -> Result<()> {
        let (_backend, client) = demo_client();
        let dashboard = load(&client).await?;
        assert_eq!(
            dashboard.stats,
            DashboardStats {
                users: 2,
                active_events: 3,
                active_companies: 3,
                active_profiles: 3,
                published_giveaways: 2,
            }
        );
        assert_eq!(dashboard.recent_events.len(), RECENT_LIMIT as usize);
        assert_eq!(dashboard.recent_users.len(), 2);
        Ok(())
    }
}
