//! Giveaway entity - prize draws promoted on the guide.
//!
//! Public visibility depends on `is_published` and on where "now" falls relative to the
//! start, end and draw timestamps; see [`Model::status_at`].

use crate::query::{Record, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Giveaway row
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Prize description
    #[serde(default)]
    pub prize: Option<String>,
    #[serde(default)]
    pub rules: Option<String>,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
    pub draw_datetime: DateTime<Utc>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub result_published: bool,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

columns! {
    Id => "id",
    Title => "title",
    Description => "description",
    Prize => "prize",
    Rules => "rules",
    CoverImageUrl => "cover_image_url",
    StartDatetime => "start_datetime",
    EndDatetime => "end_datetime",
    DrawDatetime => "draw_datetime",
    IsPublished => "is_published",
    ResultPublished => "result_published",
    CreatedBy => "created_by",
    CreatedAt => "created_at",
    UpdatedAt => "updated_at",
}

impl Record for Model {
    const TABLE: Table = Table::Giveaways;
    type Column = Column;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Where a giveaway stands at a given instant
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GiveawayStatus {
    /// Entries not open yet
    Upcoming,
    /// Accepting entries
    Open,
    /// Entries closed, draw pending
    AwaitingDraw,
    /// Drawn and result published
    Finished,
    /// Drawn, result not published
    Closed,
}

impl GiveawayStatus {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Upcoming => "Em breve",
            Self::Open => "Ativo",
            Self::AwaitingDraw => "Aguardando sorteio",
            Self::Finished => "Finalizado",
            Self::Closed => "Encerrado",
        }
    }
}

impl fmt::Display for GiveawayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Model {
    /// Status at `now`. Start and end are inclusive bounds of the open window.
    #[must_use]
    pub fn status_at(&self, now: DateTime<Utc>) -> GiveawayStatus {
        if now < self.start_datetime {
            GiveawayStatus::Upcoming
        } else if now <= self.end_datetime {
            GiveawayStatus::Open
        } else if now < self.draw_datetime {
            GiveawayStatus::AwaitingDraw
        } else if self.result_published {
            GiveawayStatus::Finished
        } else {
            GiveawayStatus::Closed
        }
    }

    /// Published and not yet past its end.
    #[must_use]
    pub fn is_publicly_active(&self, now: DateTime<Utc>) -> bool {
        self.is_published && self.end_datetime >= now
    }
}
