use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;

use crate::domains::geocoding::providers::census::DEFAULT_CENSUS_URL;
use crate::domains::geocoding::providers::nominatim::DEFAULT_NOMINATIM_URL;
use crate::domains::geocoding::providers::ProviderSettings;
use crate::domains::geocoding::{CircuitBreakerConfig, GeocoderConfig};

const DEFAULT_USER_AGENT: &str = concat!("coverage-server/", env!("CARGO_PKG_VERSION"));

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Absent means in-memory stores
    pub database_url: Option<String>,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub providers: ProviderSettings,
    pub geocoder: GeocoderConfig,
    pub circuit_breaker: CircuitBreakerConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let geocoder_defaults = GeocoderConfig::default();
        let breaker_defaults = CircuitBreakerConfig::default();

        Ok(Self {
            database_url: var("DATABASE_URL"),
            port: parse_or(var("PORT"), "PORT", 8080)?,
            allowed_origins: var("CORS_ALLOWED_ORIGINS")
                .map(|v| split_list(&v))
                .unwrap_or_default(),
            providers: ProviderSettings {
                names: var("GEOCODER_PROVIDERS")
                    .map(|v| split_list(&v))
                    .unwrap_or_else(|| vec!["nominatim".to_string()]),
                nominatim_url: var("NOMINATIM_URL").unwrap_or_else(|| DEFAULT_NOMINATIM_URL.to_string()),
                census_url: var("CENSUS_GEOCODER_URL").unwrap_or_else(|| DEFAULT_CENSUS_URL.to_string()),
                user_agent: var("GEOCODER_USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            },
            geocoder: GeocoderConfig {
                max_attempts: parse_or(
                    var("GEOCODER_MAX_ATTEMPTS"),
                    "GEOCODER_MAX_ATTEMPTS",
                    geocoder_defaults.max_attempts,
                )?
                .max(1),
                initial_backoff: millis_or(
                    var("GEOCODER_INITIAL_BACKOFF_MS"),
                    "GEOCODER_INITIAL_BACKOFF_MS",
                    geocoder_defaults.initial_backoff,
                )?,
                request_deadline: millis_or(
                    var("GEOCODER_REQUEST_DEADLINE_MS"),
                    "GEOCODER_REQUEST_DEADLINE_MS",
                    geocoder_defaults.request_deadline,
                )?,
                provider_timeout: millis_or(
                    var("GEOCODER_PROVIDER_TIMEOUT_MS"),
                    "GEOCODER_PROVIDER_TIMEOUT_MS",
                    geocoder_defaults.provider_timeout,
                )?,
                fallback_confidence: geocoder_defaults.fallback_confidence,
            },
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold: parse_or(
                    var("CIRCUIT_FAILURE_THRESHOLD"),
                    "CIRCUIT_FAILURE_THRESHOLD",
                    breaker_defaults.failure_threshold,
                )?
                .max(1),
                cooldown: Duration::from_secs(parse_or(
                    var("CIRCUIT_COOLDOWN_SECS"),
                    "CIRCUIT_COOLDOWN_SECS",
                    breaker_defaults.cooldown.as_secs(),
                )?),
            },
        })
    }
}

fn parse_or<T>(value: Option<String>, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number, got {:?}", name, raw)),
        None => Ok(default),
    }
}

fn millis_or(value: Option<String>, name: &str, default: Duration) -> Result<Duration> {
    let millis = parse_or(value, name, default.as_millis() as u64)?;
    Ok(Duration::from_millis(millis))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
