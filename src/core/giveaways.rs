//! Giveaway business logic.
//!
//! The public page has two tabs: running giveaways (published, end not yet passed) and
//! finished ones (published, end passed). The admin table filters on the end date alone
//! so drafts show up under both.

use crate::entities::{Giveaway, GiveawayColumn};
use crate::errors::Result;
use crate::query::{QueryClient, Select};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GiveawayTab {
    #[default]
    Active,
    Finished,
}

impl GiveawayTab {
    #[must_use]
    pub fn from_param(value: &str) -> Self {
        match value {
            "finished" | "finalizados" => Self::Finished,
            _ => Self::Active,
        }
    }
}

/// Admin status filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Finished,
}

#[must_use]
pub fn public_query(tab: GiveawayTab, search: &str, now: DateTime<Utc>) -> Select<Giveaway> {
    let mut select = Select::<Giveaway>::new()
        .order_by(GiveawayColumn::StartDatetime, false)
        .eq(GiveawayColumn::IsPublished, true);
    if !search.trim().is_empty() {
        select = select.ilike(GiveawayColumn::Title, search);
    }
    match tab {
        GiveawayTab::Active => select.gte(GiveawayColumn::EndDatetime, now.to_rfc3339()),
        GiveawayTab::Finished => select.lt(GiveawayColumn::EndDatetime, now.to_rfc3339()),
    }
}

pub async fn list_giveaways(client: &QueryClient, tab: GiveawayTab, search: &str) -> Result<Vec<Giveaway>> {
    client.fetch_select(public_query(tab, search, Utc::now())).await
}

pub async fn admin_list_giveaways(
    client: &QueryClient,
    search: &str,
    status: StatusFilter,
) -> Result<Vec<Giveaway>> {
    let now = Utc::now().to_rfc3339();
    let mut select = Select::<Giveaway>::new().order_by(GiveawayColumn::CreatedAt, false);
    if !search.trim().is_empty() {
        select = select.ilike(GiveawayColumn::Title, search);
    }
    select = match status {
        StatusFilter::All => select,
        StatusFilter::Active => select.gte(GiveawayColumn::EndDatetime, now),
        StatusFilter::Finished => select.lt(GiveawayColumn::EndDatetime, now),
    };
    client.fetch_select(select).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::GiveawayStatus;
    use crate::test_utils::demo_client;

    #[tokio::test]
    async fn test_tabs_split_on_end_date() -> Result<()> {
        let (_backend, client) = demo_client();
        let now = Utc::now();

        let active = list_giveaways(&client, GiveawayTab::Active, "").await?;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].status_at(now), GiveawayStatus::Open);

        let finished = list_giveaways(&client, GiveawayTab::Finished, "").await?;
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].status_at(now), GiveawayStatus::Finished);
        Ok(())
    }

    #[tokio::test]
    async fn test_admin_sees_drafts() -> Result<()> {
        let (_backend, client) = demo_client();
        assert_eq!(admin_list_giveaways(&client, "", StatusFilter::All).await?.len(), 3);
        assert_eq!(
            admin_list_giveaways(&client, "", StatusFilter::Active).await?.len(),
            2
        );
        Ok(())
    }
}
