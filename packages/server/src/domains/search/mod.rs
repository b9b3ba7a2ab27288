//! Location search across geocoding, coverage matching and ranking.

pub mod activities;
pub mod locator;
pub mod models;

pub use activities::{find_resources_by_location, LocationQuery, SearchOutcome};
pub use locator::{InMemoryResourceLocator, PgResourceLocator};
