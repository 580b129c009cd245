//! Company entity - local businesses in the directory.
//!
//! `views_count` is maintained by the backend; the client only reads it.

use crate::query::{Record, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RelationName;

/// Company row
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    #[serde(default)]
    pub city_id: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub instagram_url: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default)]
    pub whatsapp: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub views_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Embedded `cities(name)`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cities: Option<RelationName>,
    /// Embedded `company_categories(name)`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_categories: Option<RelationName>,
}

columns! {
    Id => "id",
    CityId => "city_id",
    CategoryId => "category_id",
    Name => "name",
    Description => "description",
    LogoUrl => "logo_url",
    InstagramUrl => "instagram_url",
    WebsiteUrl => "website_url",
    Whatsapp => "whatsapp",
    Address => "address",
    IsFeatured => "is_featured",
    IsActive => "is_active",
    ViewsCount => "views_count",
    CreatedAt => "created_at",
    UpdatedAt => "updated_at",
}

impl Record for Model {
    const TABLE: Table = Table::Companies;
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

    #[must_use]
    pub fn category_name(&self) -> Option<&str> {
        self.company_categories.as_ref().map(|c| c.name.as_str())
    }
}
