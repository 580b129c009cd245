//! User notification entity - messages shown in the user panel.

use crate::query::{Record, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Notification row from `user_notifications`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub message: String,
    /// Free-form kind, `type` on the wire
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

columns! {
    Id => "id",
    UserId => "user_id",
    Title => "title",
    Message => "message",
    Type => "type",
    LinkUrl => "link_url",
    IsRead => "is_read",
    CreatedAt => "created_at",
}

impl Record for Model {
    const TABLE: Table = Table::UserNotifications;
    type Column = Column;

    fn id(&self) -> &str {
        &self.id
    }
}
