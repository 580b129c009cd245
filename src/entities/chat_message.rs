//! Chat message entity - support conversation between a user and the admins.

use crate::query::{Record, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Chat message row
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    /// Owner of the conversation
    pub user_id: String,
    pub sender_id: String,
    pub message: String,
    #[serde(default)]
    pub is_from_admin: bool,
    #[serde(default)]
    pub is_from_ai: bool,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

columns! {
    Id => "id",
    UserId => "user_id",
    SenderId => "sender_id",
    Message => "message",
    IsFromAdmin => "is_from_admin",
    IsFromAi => "is_from_ai",
    IsRead => "is_read",
    CreatedAt => "created_at",
}

impl Record for Model {
    const TABLE: Table = Table::ChatMessages;
    type Column = Column;

    fn id(&self) -> &str {
        &self.id
    }
}
