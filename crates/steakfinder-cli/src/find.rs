//! `find` command: aggregate nearby restaurants and print them as a table.

use std::{path::PathBuf, sync::Arc};

use steakfinder_core::{filter_by_category, AppConfig, Coordinates, RestaurantCategory};
use steakfinder_places::{
    locate_and_search, AggregateError, Aggregator, AggregatorOptions, FileResultCache,
    FixedLocation, PlacesClient, PlacesSource, ProxyClient, SearchResults,
};

pub(crate) const NO_RESULTS: &str = "No open restaurants found nearby. Try again later.";

/// Default cache file, shared across runs on the same machine.
fn default_cache_path() -> PathBuf {
    std::env::temp_dir().join("steakfinder-cache.json")
}

/// Search around `origin` and print the ranked results.
///
/// Searches go through `proxy_url` when given, otherwise straight to Google
/// with the configured key.
///
/// # Errors
///
/// Returns an error if the category is unknown, no key or proxy is
/// available, the cache file is unusable, or the origin is out of range.
/// Individual category failures are reported on stderr, not propagated.
pub(crate) async fn run_find(
    config: &AppConfig,
    origin: Coordinates,
    category: Option<&str>,
    proxy_url: Option<&str>,
    cache_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let category = category
        .map(str::parse::<RestaurantCategory>)
        .transpose()?;

    let source: Arc<dyn PlacesSource> = if let Some(url) = proxy_url {
        Arc::new(ProxyClient::new(
            url,
            config.request_timeout_secs,
            &config.user_agent,
        )?)
    } else {
        let api_key = config.google_maps_api_key.clone().ok_or_else(|| {
            anyhow::anyhow!("GOOGLE_MAPS_API_KEY is not configured; set it or pass --proxy-url")
        })?;
        Arc::new(PlacesClient::with_base_urls(
            api_key,
            config.request_timeout_secs,
            &config.user_agent,
            &config.places_base_url,
            &config.geocode_base_url,
        )?)
    };

    let cache_path = cache_path.unwrap_or_else(default_cache_path);
    let cache = FileResultCache::open(&cache_path)?;
    tracing::debug!(path = %cache_path.display(), "using result cache");

    let aggregator = Aggregator::new(source, cache, AggregatorOptions::from_config(config));

    let results = match locate_and_search(&FixedLocation(origin), &aggregator).await {
        Ok(results) => results,
        Err(AggregateError::Location(e)) => anyhow::bail!(e.user_message()),
        Err(e) => return Err(e.into()),
    };

    for failed in &results.failed_categories {
        eprintln!("warning: {failed} search failed; results may be incomplete");
    }

    println!("{}", render_results(&results, category));
    Ok(())
}

/// Table of results, or [`NO_RESULTS`] when nothing survives the filter.
pub(crate) fn render_results(
    results: &SearchResults,
    category: Option<RestaurantCategory>,
) -> String {
    let rows = filter_by_category(&results.restaurants, category);
    if rows.is_empty() {
        return NO_RESULTS.to_string();
    }

    let mut out = format!(
        "{:<4}{:<32}{:<12}{:<8}{:<7}{:<18}DIRECTIONS",
        "#", "NAME", "DISTANCE", "RATING", "PRICE", "CATEGORY"
    );
    for (rank, record) in rows.iter().enumerate() {
        let name = if record.name.chars().count() > 30 {
            format!("{}...", record.name.chars().take(27).collect::<String>())
        } else {
            record.name.clone()
        };
        out.push('\n');
        out.push_str(&format!(
            "{:<4}{:<32}{:<12}{:<8.1}{:<7}{:<18}{}",
            rank + 1,
            name,
            results.unit.format_km(record.distance_km),
            record.rating,
            record.price_symbols(),
            record.category().label(),
            record.directions_url().unwrap_or_default(),
        ));
    }
    if results.from_cache {
        out.push_str("\n(cached)");
    }
    out
}
