pub mod memory;
pub mod postgres;

pub use memory::{InMemoryCoverageAreaStore, InMemoryResourceCoverageStore};
pub use postgres::{PgCoverageAreaStore, PgResourceCoverageStore};
