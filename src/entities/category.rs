//! Company category entity - reference data shown on the home page and in filters.

use crate::query::{Record, Table};
use serde::{Deserialize, Serialize};

/// Category row from `company_categories`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Icon identifier used by the UI
    #[serde(default)]
    pub icon: Option<String>,
}

columns! {
    Id => "id",
    Name => "name",
    Slug => "slug",
    Description => "description",
    Icon => "icon",
}

impl Record for Model {
    const TABLE: Table = Table::CompanyCategories;
    type Column = Column;

    fn id(&self) -> &str {
        &self.id
    }
}
