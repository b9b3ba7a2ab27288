pub mod find_resources;

pub use find_resources::{find_resources_by_location, LocationQuery, SearchOutcome};
