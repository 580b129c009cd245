//! Profile business logic - influencers and musicians.

use crate::entities::{Profile, ProfileColumn, ProfileType};
use crate::errors::Result;
use crate::query::{QueryClient, QueryOptions, Select};

/// Filters of the public profiles page.
#[derive(Debug, Clone, Default)]
pub struct ProfileFilter {
    pub search: String,
    pub city_id: Option<String>,
    /// Tab; `None` shows both kinds
    pub profile_type: Option<ProfileType>,
}

/// Active profiles by name.
pub async fn list_profiles(client: &QueryClient, filter: &ProfileFilter) -> Result<Vec<Profile>> {
    let options = QueryOptions::<Profile>::new()
        .select("*, cities(name)")
        .filter(ProfileColumn::IsActive, true)
        .filter(ProfileColumn::CityId, filter.city_id.clone())
        .filter(ProfileColumn::Type, filter.profile_type.map(ProfileType::as_str))
        .order(ProfileColumn::Name, true);

    let mut select = options.to_select();
    if !filter.search.trim().is_empty() {
        select = select.ilike(ProfileColumn::Name, &filter.search);
    }
    client.fetch_select(select).await
}

/// Active musicians, featured ones first.
pub async fn list_musicians(client: &QueryClient, search: &str) -> Result<Vec<Profile>> {
    let mut select = Select::<Profile>::new()
        .columns("*, cities(name)")
        .eq(ProfileColumn::Type, ProfileType::Musician.as_str())
        .eq(ProfileColumn::IsActive, true)
        .order_by(ProfileColumn::IsFeatured, false)
        .order_by(ProfileColumn::Name, true);
    if !search.trim().is_empty() {
        select = select.ilike(ProfileColumn::Name, search);
    }
    client.fetch_select(select).await
}

/// Admin table: every profile, newest first, narrowed by name and kind.
pub async fn admin_list_profiles(
    client: &QueryClient,
    search: &str,
    profile_type: Option<ProfileType>,
) -> Result<Vec<Profile>> {
    let mut select = Select::<Profile>::new()
        .columns("*, cities(name)")
        .order_by(ProfileColumn::CreatedAt, false);
    if !search.trim().is_empty() {
        select = select.ilike(ProfileColumn::Name, search);
    }
    if let Some(kind) = profile_type {
        select = select.eq(ProfileColumn::Type, kind.as_str());
    }
    client.fetch_select(select).await
}
