mod find;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use steakfinder_core::{haversine_km, km_to_miles, Coordinates};
use steakfinder_places::{PlacesClient, PlacesError};
use tracing_subscriber::{filter::ParseError, EnvFilter};

/// Level used when no configuration has been loaded.
const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Parser)]
#[command(name = "steakfinder")]
#[command(about = "Find open steakhouses and BBQ spots near a coordinate")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search all categories around a coordinate and print the nearest open places
    Find {
        /// Latitude of the search origin
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        /// Longitude of the search origin
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        /// Only show one category (steakhouse, brazilian, korean, argentine, american)
        #[arg(long)]
        category: Option<String>,
        /// Search through a deployed `/api/places` proxy instead of calling Google directly
        #[arg(long, env = "STEAKFINDER_PROXY_URL")]
        proxy_url: Option<String>,
        /// JSON file used to cache results between runs
        #[arg(long)]
        cache_path: Option<PathBuf>,
    },
    /// Resolve an address to coordinates
    Geocode {
        /// Free-text address
        address: String,
    },
    /// Great-circle distance between two coordinates
    Distance {
        #[arg(allow_negative_numbers = true)]
        lat1: f64,
        #[arg(allow_negative_numbers = true)]
        lng1: f64,
        #[arg(allow_negative_numbers = true)]
        lat2: f64,
        #[arg(allow_negative_numbers = true)]
        lng2: f64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Find {
            lat,
            lng,
            category,
            proxy_url,
            cache_path,
        }) => {
            let config = steakfinder_core::load_app_config()?;
            init_tracing(&config.log_level)?;
            find::run_find(
                &config,
                Coordinates::new(lat, lng),
                category.as_deref(),
                proxy_url.as_deref(),
                cache_path,
            )
            .await?;
        }
        Some(Commands::Geocode { address }) => {
            let config = steakfinder_core::load_app_config()?;
            init_tracing(&config.log_level)?;
            run_geocode(&config, &address).await?;
        }
        Some(Commands::Distance {
            lat1,
            lng1,
            lat2,
            lng2,
        }) => {
            init_tracing(DEFAULT_LOG_LEVEL)?;
            println!(
                "{}",
                format_distance(Coordinates::new(lat1, lng1), Coordinates::new(lat2, lng2))
            );
        }
        None => println!("steakfinder: run with --help to see available commands"),
    }

    Ok(())
}

/// Logs go to stderr so command output stays clean. `RUST_LOG` wins over
/// `fallback` when it is set and valid.
fn init_tracing(fallback: &str) -> anyhow::Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let env_filter = log_filter(rust_log.as_deref(), fallback)?;
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .init();
    Ok(())
}

fn log_filter(rust_log: Option<&str>, fallback: &str) -> Result<EnvFilter, ParseError> {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .map_or_else(|| EnvFilter::try_new(fallback), Ok)
}

/// Resolve `address` and print its coordinates.
///
/// # Errors
///
/// Returns an error if the API key is missing, the client cannot be built, or
/// the provider finds nothing.
async fn run_geocode(config: &steakfinder_core::AppConfig, address: &str) -> anyhow::Result<()> {
    let api_key = config
        .google_maps_api_key
        .clone()
        .ok_or_else(|| anyhow::anyhow!("GOOGLE_MAPS_API_KEY is required for geocoding"))?;
    let client = PlacesClient::with_base_urls(
        api_key,
        config.request_timeout_secs,
        &config.user_agent,
        &config.places_base_url,
        &config.geocode_base_url,
    )?;

    match client.geocode(address).await {
        Ok(found) => {
            println!("lat:     {}", found.lat);
            println!("lng:     {}", found.lng);
            println!("address: {}", found.formatted_address);
            Ok(())
        }
        Err(PlacesError::AddressNotFound { status }) => {
            anyhow::bail!("address not found: {address} (provider status {status})")
        }
        Err(e) => Err(e.into()),
    }
}

fn format_distance(from: Coordinates, to: Coordinates) -> String {
    let km = haversine_km(from, to);
    format!("{km:.3} km\n{:.3} mi", km_to_miles(km))
}

#[cfg(test)]
mod tests;
