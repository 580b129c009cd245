//! City entity - reference data for location filters and dropdowns.

use crate::query::{Record, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// City row
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    /// Unique identifier
    pub id: String,
    /// City name (e.g., "Conselheiro Lafaiete")
    pub name: String,
    /// Two-letter state code
    #[serde(default)]
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

columns! {
    Id => "id",
    Name => "name",
    State => "state",
    CreatedAt => "created_at",
}

impl Record for Model {
    const TABLE: Table = Table::Cities;
    type Column = Column;

    fn id(&self) -> &str {
        &self.id
    }
}
