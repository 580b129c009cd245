//! Banner entity - advertising slots on the home page.

use crate::query::{Record, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Slot a banner is shown in
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BannerPosition {
    #[default]
    HomeTop,
    HomeMiddle,
    HomeBottom,
}

impl BannerPosition {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HomeTop => "home_top",
            Self::HomeMiddle => "home_middle",
            Self::HomeBottom => "home_bottom",
        }
    }
}

impl fmt::Display for BannerPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Banner row
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub title: String,
    pub image_url: String,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default)]
    pub position: BannerPosition,
    #[serde(default)]
    pub sort_order: i32,
    /// Counters maintained by the backend
    #[serde(default)]
    pub impressions: i64,
    #[serde(default)]
    pub clicks: i64,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

columns! {
    Id => "id",
    Title => "title",
    ImageUrl => "image_url",
    LinkUrl => "link_url",
    Position => "position",
    SortOrder => "sort_order",
    Impressions => "impressions",
    Clicks => "clicks",
    IsActive => "is_active",
    StartDate => "start_date",
    EndDate => "end_date",
    CreatedAt => "created_at",
}

impl Record for Model {
    const TABLE: Table = Table::Banners;
    type Column = Column;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Model {
    /// Click-through rate in percent; zero before the first impression.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn click_through_rate(&self) -> f64 {
        if self.impressions <= 0 {
            return 0.0;
        }
        (self.clicks as f64 / self.impressions as f64) * 100.0
    }
}
