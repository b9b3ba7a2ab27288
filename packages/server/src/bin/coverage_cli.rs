//! CLI for geocoding, location search and coverage area maintenance
//!
//! Every command prints one JSON document on stdout. Without DATABASE_URL the
//! commands run against empty in-memory stores, which is mostly useful for
//! trying providers out.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use sqlx::PgPool;

use coverage_core::common::LatLon;
use coverage_core::config::Config;
use coverage_core::domains::coverage::activities::create_coverage_area;
use coverage_core::domains::coverage::models::{CoverageKind, GeometryInput, NewCoverageArea};
use coverage_core::domains::search::{find_resources_by_location, LocationQuery};
use coverage_core::kernel::ServerDeps;

#[derive(Parser)]
#[command(name = "coverage_cli")]
#[command(about = "Coverage area matching CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Geocode free text
    Geocode { query: String },

    /// Find resources serving a location
    Search {
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        query: Option<String>,
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
        #[arg(long)]
        radius_miles: Option<f64>,
    },

    /// Create a RADIUS coverage area
    CreateRadius {
        #[arg(long)]
        name: String,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(long)]
        miles: f64,
        #[arg(long)]
        created_by: Option<String>,
    },

    /// Delete expired geocoding cache entries
    PurgeCache,
}

#[derive(Serialize)]
struct PurgeResponse {
    removed: u64,
}

fn output<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let deps = build_deps().await?;

    match cli.command {
        Commands::Geocode { query } => output(&deps.geocoder.geocode(&query).await),
        Commands::Search {
            query,
            lat,
            lon,
            radius_miles,
        } => cmd_search(query, lat, lon, radius_miles, &deps).await,
        Commands::CreateRadius {
            name,
            lat,
            lon,
            miles,
            created_by,
        } => cmd_create_radius(name, LatLon::new(lat, lon), miles, created_by, &deps).await,
        Commands::PurgeCache => {
            let removed = deps.geocoder.purge_expired().await?;
            output(&PurgeResponse { removed })
        }
    }
}

async fn build_deps() -> Result<ServerDeps> {
    let config = Config::from_env()?;
    match &config.database_url {
        Some(url) => {
            let pool = PgPool::connect(url)
                .await
                .context("Failed to connect to database")?;
            ServerDeps::postgres(pool, &config)
        }
        None => ServerDeps::in_memory(&config),
    }
}

// ============================================================================
// Commands
// ============================================================================

async fn cmd_search(
    query: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    radius_miles: Option<f64>,
    deps: &ServerDeps,
) -> Result<()> {
    let location = match (query, lat, lon) {
        (_, Some(lat), Some(lon)) => LocationQuery::Coordinates(LatLon::new(lat, lon)),
        (Some(text), _, _) => LocationQuery::Text(text),
        _ => anyhow::bail!("Either --query or both --lat and --lon are required"),
    };

    let outcome = find_resources_by_location(location, radius_miles, deps).await?;
    output(&outcome)
}

async fn cmd_create_radius(
    name: String,
    center: LatLon,
    miles: f64,
    created_by: Option<String>,
    deps: &ServerDeps,
) -> Result<()> {
    let mut input = NewCoverageArea::builder()
        .kind(CoverageKind::Radius)
        .name(name)
        .geometry(GeometryInput::CenterRadius {
            center,
            radius_miles: miles,
        })
        .build();
    input.created_by = created_by;

    let area = create_coverage_area(input, deps).await?;
    output(area.as_ref())
}
