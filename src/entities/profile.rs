//! Profile entity - influencers and musicians featured on the guide.

use crate::query::{Record, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::RelationName;

/// Kind of public profile
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileType {
    Influencer,
    Musician,
}

impl ProfileType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Influencer => "influencer",
            Self::Musician => "musician",
        }
    }

    /// Label used in listings.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Influencer => "Influenciador",
            Self::Musician => "Músico",
        }
    }
}

impl fmt::Display for ProfileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Profile row
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    #[serde(default)]
    pub city_id: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    /// Discriminator, `type` on the wire
    #[serde(rename = "type")]
    pub profile_type: ProfileType,
    pub name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub instagram_url: Option<String>,
    #[serde(default)]
    pub youtube_url: Option<String>,
    #[serde(default)]
    pub spotify_url: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub followers_count: i64,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Embedded `cities(name)`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cities: Option<RelationName>,
}

columns! {
    Id => "id",
    CityId => "city_id",
    CategoryId => "category_id",
    Type => "type",
    Name => "name",
    Bio => "bio",
    InstagramUrl => "instagram_url",
    YoutubeUrl => "youtube_url",
    SpotifyUrl => "spotify_url",
    AvatarUrl => "avatar_url",
    FollowersCount => "followers_count",
    IsFeatured => "is_featured",
    IsActive => "is_active",
    CreatedAt => "created_at",
    UpdatedAt => "updated_at",
}

impl Record for Model {
    const TABLE: Table = Table::Profiles;
    type Column = Column;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Model {
    #[must_use]
    pub fn city_name(&self) -> Option<&str> {
        self.cities.as_ref().map(|c| c.name.as_str())
    }
}
