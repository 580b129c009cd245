//! Company business logic.
//!
//! Public listings only ever show active companies; the admin table shows all of them.
//! Company categories live here too since they only exist to classify companies.

use crate::entities::{Category, CategoryColumn, Company, CompanyColumn};
use crate::errors::Result;
use crate::query::{QueryClient, QueryOptions, Select};

/// Columns loaded for company cards.
pub const COMPANY_CARD_COLUMNS: &str = "*, cities(name), company_categories(name)";

/// Filters of the public companies page.
#[derive(Debug, Clone, Default)]
pub struct CompanyFilter {
    pub search: String,
    pub city_id: Option<String>,
    pub category_id: Option<String>,
}

/// Featured active companies for the home page.
pub async fn featured_companies(client: &QueryClient, limit: u64) -> Result<Vec<Company>> {
    client
        .fetch(
            &QueryOptions::<Company>::new()
                .select(COMPANY_CARD_COLUMNS)
                .filter(CompanyColumn::IsActive, true)
                .filter(CompanyColumn::IsFeatured, true)
                .limit(limit),
        )
        .await
}

/// Active companies by name, narrowed by name search, city and category.
pub async fn list_companies(client: &QueryClient, filter: &CompanyFilter) -> Result<Vec<Company>> {
    let options = QueryOptions::<Company>::new()
        .select(COMPANY_CARD_COLUMNS)
        .filter(CompanyColumn::IsActive, true)
        .filter(CompanyColumn::CityId, filter.city_id.clone())
        .filter(CompanyColumn::CategoryId, filter.category_id.clone())
        .order(CompanyColumn::Name, true);

    let mut select = options.to_select();
    if !filter.search.trim().is_empty() {
        select = select.ilike(CompanyColumn::Name, &filter.search);
    }
    client.fetch_select(select).await
}

pub async fn get_company(client: &QueryClient, id: &str) -> Result<Option<Company>> {
    client.fetch_by_id(id, COMPANY_CARD_COLUMNS).await
}

/// Categories for the home grid (`limit`) or the filter dropdown (`None`, by name).
pub async fn list_categories(client: &QueryClient, limit: Option<u64>) -> Result<Vec<Category>> {
    let options = match limit {
        Some(limit) => QueryOptions::<Category>::new().limit(limit),
        None => QueryOptions::<Category>::new().order(CategoryColumn::Name, true),
    };
    client.fetch(&options).await
}

/// Admin table: every company, newest first, optionally narrowed by name.
pub async fn admin_list_companies(client: &QueryClient, search: &str) -> Result<Vec<Company>> {
    let mut select = Select::<Company>::new()
        .columns("*, cities(name)")
        .order_by(CompanyColumn::CreatedAt, false);
    if !search.trim().is_empty() {
        select = select.ilike(CompanyColumn::Name, search);
    }
    client.fetch_select(select).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::demo_client;

    #[tokio::test]
    async fn test_featured_companies_are_active() -> Result<()> {
        let (_backend, client) = demo_client();
        let featured = featured_companies(&client, 2).await?;
        assert_eq!(featured.len(), 2);
        assert!(featured.iter().all(|c| c.is_active && c.is_featured));
        assert!(featured.iter().all(|c| c.category_name().is_some()));
        Ok(())
    }

    #[tokio::test]
    async fn test_listing_filters() -> Result<()> {
        let (_backend, client) = demo_client();

        let all = list_companies(&client, &CompanyFilter::default()).await?;
        let names: Vec<&str> = all.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Boutique Estilo", "Café da Praça", "Clínica Vida"]);

        let health = list_companies(
            &client,
            &CompanyFilter {
                category_id: Some("cat-2".to_string()),
                ..CompanyFilter::default()
            },
        )
        .await?;
        assert_eq!(health.len(), 1);
        assert_eq!(health[0].name, "Clínica Vida");

        let searched = list_companies(
            &client,
            &CompanyFilter {
                search: "café".to_string(),
                ..CompanyFilter::default()
            },
        )
        .await?;
        assert_eq!(searched.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_categories() -> Result<()> {
        let (_backend, client) = demo_client();
        let sorted = list_categories(&client, None).await?;
        assert_eq!(sorted.first().map(|c| c.name.as_str()), Some("Moda"));
        assert_eq!(list_categories(&client, Some(2)).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_admin_listing() -> Result<()> {
        let (_backend, client) = demo_client();
        assert_eq!(admin_list_companies(&client, "").await?.len(), 4);
        assert!(get_company(&client, "company-3").await?.is_some());
        Ok(())
    }
}
