//! User entity - the application-level profile row attached to an auth principal.
//!
//! The row shares its id with the auth user. It is created the first time someone
//! authenticates, updated by admin CRM actions and never deleted by the client.

use crate::query::{Record, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RelationName;

/// User profile row
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    /// Same id as the auth user
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub email: String,
    /// Grants access to the admin back office
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub city_id: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub whatsapp: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Free-form CRM notes kept by admins
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub last_login_at: Option<DateTime<Utc>>,
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
    Name => "name",
    Email => "email",
    IsAdmin => "is_admin",
    CityId => "city_id",
    Phone => "phone",
    Whatsapp => "whatsapp",
    AvatarUrl => "avatar_url",
    Notes => "notes",
    LastLoginAt => "last_login_at",
    CreatedAt => "created_at",
    UpdatedAt => "updated_at",
}

impl Record for Model {
    const TABLE: Table = Table::Users;
    type Column = Column;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Model {
    /// Name to greet the user with; falls back to the e-mail's local part.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            self.email.split('@').next().unwrap_or(&self.email)
        } else {
            &self.name
        }
    }
}
