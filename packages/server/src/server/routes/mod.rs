// HTTP routes
pub mod coverage_areas;
pub mod geocode;
pub mod health;
pub mod resources;
pub mod search;

pub use coverage_areas::*;
pub use geocode::*;
pub use health::*;
pub use resources::*;
pub use search::*;
