//! Kernel module - dependency container and infrastructure traits.

pub mod deps;
pub mod test_dependencies;
pub mod traits;

pub use deps::ServerDeps;
pub use test_dependencies::TestDependencies;
pub use traits::*;
