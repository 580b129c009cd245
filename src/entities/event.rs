//! Event entity - shows, fairs and other happenings listed on the guide.
//!
//! Events are created and edited through the admin form and are read-only on public
//! pages. Only active events are listed publicly.

use crate::query::{Record, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RelationName;

/// Event row
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    #[serde(default)]
    pub city_id: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_datetime: DateTime<Utc>,
    #[serde(default)]
    pub end_datetime: Option<DateTime<Utc>>,
    /// Venue name shown on cards
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub ticket_url: Option<String>,
    #[serde(default)]
    pub instagram_url: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_active: bool,
    /// Admin who created the event
    #[serde(default)]
    pub created_by: Option<String>,
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
    Title => "title",
    Description => "description",
    StartDatetime => "start_datetime",
    EndDatetime => "end_datetime",
    LocationName => "location_name",
    Address => "address",
    IsOnline => "is_online",
    CoverImageUrl => "cover_image_url",
    TicketUrl => "ticket_url",
    InstagramUrl => "instagram_url",
    IsFeatured => "is_featured",
    IsActive => "is_active",
    CreatedBy => "created_by",
    CreatedAt => "created_at",
    UpdatedAt => "updated_at",
}

impl Record for Model {
    const TABLE: Table = Table::Events;
    type Column = Column;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Model {
    /// City name when the relation was embedded.
    #[must_use]
    pub fn city_name(&self) -> Option<&str> {
        self.cities.as_ref().map(|c| c.name.as_str())
    }
}
