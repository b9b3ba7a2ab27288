//! Free-text geocoding with caching, retries, a circuit breaker and fallback.

pub mod cache;
pub mod circuit_breaker;
pub mod error;
pub mod geocoder;
pub mod models;
pub mod providers;

pub use cache::{InMemoryGeocodingCache, PgGeocodingCache};
pub use circuit_breaker::{BreakerSnapshot, CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use error::GeocodeError;
pub use geocoder::{GeocodeResult, Geocoder, GeocoderConfig, Resolution};
pub use models::{CacheStats, GeocodingCacheEntry};
