pub mod coverage_area;
pub mod resource_coverage;

pub use coverage_area::*;
pub use resource_coverage::*;
