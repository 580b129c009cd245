//! Directory business logic.
//!
//! Framework-agnostic operations over the query layer: listings with their filters,
//! detail lookups, back-office mutations and form submission. Pages call these and only
//! format the results.

/// Toggle, delete and other back-office table actions shared by every entity
pub mod admin;
/// Home banners and the banner back office
pub mod banners;
/// Companies, cities and company categories
pub mod companies;
/// Back-office dashboard statistics
pub mod dashboard;
/// Event listings and detail
pub mod events;
/// Create/update forms with required-field validation
pub mod forms;
/// Giveaway tabs and back office
pub mod giveaways;
/// Influencer and musician profiles
pub mod profiles;
/// Cross-entity search refinement
pub mod search;
/// User CRM, notifications and chat
pub mod users;
