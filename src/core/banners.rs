//! Banner business logic.

use crate::entities::{Banner, BannerColumn, BannerPosition};
use crate::errors::Result;
use crate::query::{QueryClient, QueryOptions, Select};

/// Active banners of one slot, in display order.
pub async fn active_banners(client: &QueryClient, position: BannerPosition) -> Result<Vec<Banner>> {
    client
        .fetch(
            &QueryOptions::<Banner>::new()
                .filter(BannerColumn::IsActive, true)
                .filter(BannerColumn::Position, position.as_str())
                .order(BannerColumn::SortOrder, true),
        )
        .await
}

/// Admin table: every banner, newest first, narrowed by title and slot.
pub async fn admin_list_banners(
    client: &QueryClient,
    search: &str,
    position: Option<BannerPosition>,
) -> Result<Vec<Banner>> {
    let mut select = Select::<Banner>::new().order_by(BannerColumn::CreatedAt, false);
    if !search.trim().is_empty() {
        select = select.ilike(BannerColumn::Title, search);
    }
    if let Some(position) = position {
        select = select.eq(BannerColumn::Position, position.as_str());
    }
    client.fetch_select(select).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::demo_client;

    #[tokio::test]
    async fn test_only_active_banners_of_the_slot() -> Result<()> {
        let (_backend, client) = demo_client();
        let top = active_banners(&client, BannerPosition::HomeTop).await?;
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].id, "banner-1");
        Ok(())
    }

    #[tokio::test]
    async fn test_admin_position_filter() -> Result<()> {
        let (_backend, client) = demo_client();
        assert_eq!(admin_list_banners(&client, "", None).await?.len(), 3);
        assert_eq!(
            admin_list_banners(&client, "", Some(BannerPosition::HomeMiddle))
                .await?
                .len(),
            1
        );
        Ok(())
    }
}
