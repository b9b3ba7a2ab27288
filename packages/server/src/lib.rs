// Coverage Area Matching - Core
//
// Resolves a location (free text or coordinates) to the service resources
// whose coverage areas contain it, ranked by specificity and distance.
//
// Domains live under domains/; infrastructure traits and the dependency
// container live under kernel/.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
