// Business domains
pub mod coverage;
pub mod geocoding;
pub mod ranking;
pub mod search;
