//! Typed query construction.
//!
//! [`Query`] is the wire-neutral description every backend executes. Callers build it
//! through [`Select`], which only accepts the column enum of the record being queried, so
//! a misspelled column or a column from another table fails to compile.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

/// Backend tables consumed by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Cities,
    Users,
    Events,
    Companies,
    Profiles,
    Giveaways,
    Banners,
    CompanyCategories,
    ChatMessages,
    UserNotifications,
}

impl Table {
    pub const ALL: [Self; 10] = [
        Self::Cities,
        Self::Users,
        Self::Events,
        Self::Companies,
        Self::Profiles,
        Self::Giveaways,
        Self::Banners,
        Self::CompanyCategories,
        Self::ChatMessages,
        Self::UserNotifications,
    ];

    /// Table name as the backend knows it.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cities => "cities",
            Self::Users => "users",
            Self::Events => "events",
            Self::Companies => "companies",
            Self::Profiles => "profiles",
            Self::Giveaways => "giveaways",
            Self::Banners => "banners",
            Self::CompanyCategories => "company_categories",
            Self::ChatMessages => "chat_messages",
            Self::UserNotifications => "user_notifications",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Column other tables use to reference this one; drives embedded selects such as
    /// `*, cities(name)`.
    #[must_use]
    pub const fn foreign_key(self) -> &'static str {
        match self {
            Self::Cities => "city_id",
            Self::Users => "user_id",
            Self::Events => "event_id",
            Self::Companies => "company_id",
            Self::Profiles => "profile_id",
            Self::Giveaways => "giveaway_id",
            Self::Banners => "banner_id",
            Self::CompanyCategories => "category_id",
            Self::ChatMessages => "chat_message_id",
            Self::UserNotifications => "notification_id",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A column of one specific table.
pub trait Column: Copy + fmt::Debug + Send + Sync + 'static {
    fn name(self) -> &'static str;
}

/// A row type backed by a table.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const TABLE: Table;
    type Column: Column;

    /// Primary key of the row.
    fn id(&self) -> &str;
}

/// Row predicate. The generic listing path only produces [`Predicate::Eq`]; the other
/// operators exist for ad hoc queries (searches, date windows).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    Eq { column: String, value: Value },
    /// Case-insensitive match; `%` is the wildcard
    Ilike { column: String, pattern: String },
    Gte { column: String, value: Value },
    Lte { column: String, value: Value },
    Lt { column: String, value: Value },
    /// Row matches when any of the columns matches `pattern` case-insensitively
    AnyIlike { columns: Vec<String>, pattern: String },
}

/// One ordering term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// Fully described read against one table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    pub table: Table,
    /// Column list, PostgREST syntax (`*, cities(name)`)
    pub select: String,
    pub predicates: Vec<Predicate>,
    pub order: Vec<Order>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    /// Ask the backend for the exact number of matching rows
    pub count: bool,
    /// Only the count is wanted, no rows
    pub head: bool,
    /// Exactly one row is expected
    pub single: bool,
}

impl Query {
    #[must_use]
    pub fn new(table: Table) -> Self {
        Self {
            table,
            select: "*".to_string(),
            predicates: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: None,
            count: false,
            head: false,
            single: false,
        }
    }

    /// Stable cache key: table plus the serialized query.
    #[must_use]
    pub fn cache_key(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"))
    }
}

/// Wraps a search term as a "contains" pattern.
#[must_use]
pub fn contains_pattern(term: &str) -> String {
    format!("%{}%", term.trim())
}

/// Typed builder over [`Query`] for record `R`.
#[derive(Debug, Clone)]
pub struct Select<R: Record> {
    query: Query,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> Default for Select<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> Select<R> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            query: Query::new(R::TABLE),
            _record: PhantomData,
        }
    }

    /// Replaces the column list; embedded relations use `table(columns)`.
    #[must_use]
    pub fn columns(mut self, select: &str) -> Self {
        select.clone_into(&mut self.query.select);
        self
    }

    #[must_use]
    pub fn eq(mut self, column: R::Column, value: impl Into<Value>) -> Self {
        self.query.predicates.push(Predicate::Eq {
            column: column.name().to_string(),
            value: value.into(),
        });
        self
    }

    /// Primary-key equality; every table keys rows by `id`.
    #[must_use]
    pub fn eq_id(mut self, id: &str) -> Self {
        self.query.predicates.push(Predicate::Eq {
            column: "id".to_string(),
            value: Value::String(id.to_string()),
        });
        self
    }

    /// Case-insensitive "contains" on one column.
    #[must_use]
    pub fn ilike(mut self, column: R::Column, term: &str) -> Self {
        self.query.predicates.push(Predicate::Ilike {
            column: column.name().to_string(),
            pattern: contains_pattern(term),
        });
        self
    }

    /// Case-insensitive "contains" on any of the columns.
    #[must_use]
    pub fn any_ilike(mut self, columns: &[R::Column], term: &str) -> Self {
        self.query.predicates.push(Predicate::AnyIlike {
            columns: columns.iter().map(|c| c.name().to_string()).collect(),
            pattern: contains_pattern(term),
        });
        self
    }

    #[must_use]
    pub fn gte(mut self, column: R::Column, value: impl Into<Value>) -> Self {
        self.query.predicates.push(Predicate::Gte {
            column: column.name().to_string(),
            value: value.into(),
        });
        self
    }

    #[must_use]
    pub fn lte(mut self, column: R::Column, value: impl Into<Value>) -> Self {
        self.query.predicates.push(Predicate::Lte {
            column: column.name().to_string(),
            value: value.into(),
        });
        self
    }

    #[must_use]
    pub fn lt(mut self, column: R::Column, value: impl Into<Value>) -> Self {
        self.query.predicates.push(Predicate::Lt {
            column: column.name().to_string(),
            value: value.into(),
        });
        self
    }

    #[must_use]
    pub fn order_by(mut self, column: R::Column, ascending: bool) -> Self {
        self.query.order.push(Order {
            column: column.name().to_string(),
            ascending,
        });
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.query.limit = Some(limit);
        self
    }

    /// Inclusive row range, `from..=to`.
    #[must_use]
    pub const fn range(mut self, from: u64, to: u64) -> Self {
        self.query.offset = Some(from);
        self.query.limit = Some(to.saturating_sub(from) + 1);
        self
    }

    #[must_use]
    pub const fn with_count(mut self) -> Self {
        self.query.count = true;
        self
    }

    /// Count only; no rows come back.
    #[must_use]
    pub const fn head(mut self) -> Self {
        self.query.count = true;
        self.query.head = true;
        self
    }

    /// Exactly one row must match.
    #[must_use]
    pub const fn single(mut self) -> Self {
        self.query.single = true;
        self
    }

    #[must_use]
    pub const fn query(&self) -> &Query {
        &self.query
    }

    #[must_use]
    pub fn into_query(self) -> Query {
        self.query
    }
}

/// Declarative listing options: the generic fetch contract.
///
/// Filters are equality-only; `Value::Null` filters are skipped. An offset turns into a
/// row range of `limit` rows (10 when no limit is given).
#[derive(Debug, Clone)]
pub struct QueryOptions<R: Record> {
    pub select: Option<String>,
    pub filters: Vec<(R::Column, Value)>,
    pub order: Option<(R::Column, bool)>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl<R: Record> Default for QueryOptions<R> {
    fn default() -> Self {
        Self {
            select: None,
            filters: Vec::new(),
            order: None,
            limit: None,
            offset: None,
        }
    }
}

/// Rows fetched when an offset is given without a limit.
pub const DEFAULT_RANGE_SIZE: u64 = 10;

impl<R: Record> QueryOptions<R> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn select(mut self, select: &str) -> Self {
        self.select = Some(select.to_string());
        self
    }

    #[must_use]
    pub fn filter(mut self, column: R::Column, value: impl Into<Value>) -> Self {
        self.filters.push((column, value.into()));
        self
    }

    #[must_use]
    pub fn order(mut self, column: R::Column, ascending: bool) -> Self {
        self.order = Some((column, ascending));
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Translates the options into a typed select.
    #[must_use]
    pub fn to_select(&self) -> Select<R> {
        let mut select = Select::<R>::new();
        if let Some(columns) = &self.select {
            select = select.columns(columns);
        }
        for (column, value) in &self.filters {
            if !value.is_null() {
                select = select.eq(*column, value.clone());
            }
        }
        if let Some((column, ascending)) = self.order {
            select = select.order_by(column, ascending);
        }
        // A zero limit counts as unset.
        let limit = self.limit.filter(|l| *l > 0);
        if let Some(limit) = limit {
            select = select.limit(limit);
        }
        match self.offset {
            Some(offset) if offset > 0 => {
                let size = limit.unwrap_or(DEFAULT_RANGE_SIZE);
                select.range(offset, offset + size - 1)
            }
            _ => select,
        }
    }

    #[must_use]
    pub fn to_query(&self) -> Query {
        self.to_select().into_query()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Event, EventColumn};
    use serde_json::json;

    #[test]
    fn test_table_names_round_trip() {
        for table in Table::ALL {
            assert_eq!(Table::from_name(table.name()), Some(table));
        }
        assert_eq!(Table::from_name("restaurants"), None);
    }

    #[test]
    fn test_options_skip_null_filters() {
        let query = QueryOptions::<Event>::new()
            .filter(EventColumn::IsActive, true)
            .filter(EventColumn::CityId, Value::Null)
            .to_query();

        assert_eq!(
            query.predicates,
            vec![Predicate::Eq {
                column: "is_active".to_string(),
                value: json!(true),
            }]
        );
    }

    #[test]
    fn test_offset_without_limit_uses_default_range() {
        let query = QueryOptions::<Event>::new().offset(20).to_query();
        assert_eq!(query.offset, Some(20));
        assert_eq!(query.limit, Some(10));
    }

    #[test]
    fn test_offset_with_limit() {
        let query = QueryOptions::<Event>::new().limit(5).offset(10).to_query();
        assert_eq!(query.offset, Some(10));
        assert_eq!(query.limit, Some(5));
    }

    #[test]
    fn test_zero_offset_is_plain_limit() {
        let query = QueryOptions::<Event>::new().limit(5).offset(0).to_query();
        assert_eq!(query.offset, None);
        assert_eq!(query.limit, Some(5));
    }

    #[test]
    fn test_zero_limit_is_unset() {
        let query = QueryOptions::<Event>::new().limit(0).to_query();
        assert_eq!(query.offset, None);
        assert_eq!(query.limit, None);

        let query = QueryOptions::<Event>::new().limit(0).offset(5).to_query();
        assert_eq!(query.offset, Some(5));
        assert_eq!(query.limit, Some(10));
    }

    #[test]
    fn test_cache_key_differs_by_filter() {
        let a = QueryOptions::<Event>::new()
            .filter(EventColumn::IsActive, true)
            .to_query();
        let b = QueryOptions::<Event>::new()
            .filter(EventColumn::IsActive, false)
            .to_query();
        assert_ne!(a.cache_key(), b.cache_key());
        assert_eq!(a.cache_key(), a.clone().cache_key());
    }

    #[test]
    fn test_search_pattern_is_trimmed() {
        let query = Select::<Event>::new()
            .ilike(EventColumn::Title, "  show ")
            .into_query();
        assert_eq!(
            query.predicates,
            vec![Predicate::Ilike {
                column: "title".to_string(),
                pattern: "%show%".to_string(),
            }]
        );
    }
}
