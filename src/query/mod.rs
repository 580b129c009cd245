//! Data-fetch layer.
//!
//! [`builder`] turns typed options into backend queries, [`client`] caches and retries
//! them, and [`infinite`] accumulates pages for endless listings.

/// Typed query construction
pub mod builder;
/// Stale-time cache, retries and mutations
pub mod client;
/// Page accumulator for infinite listings
pub mod infinite;

pub use builder::{
    Column, DEFAULT_RANGE_SIZE, Order, Predicate, Query, QueryOptions, Record, Select, Table,
    contains_pattern,
};
pub use client::{QueryClient, QueryState};
pub use infinite::InfiniteQuery;
