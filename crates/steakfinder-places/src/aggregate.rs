//! Restaurant aggregation: one text search per category, merged and ranked.
//!
//! The five category searches run concurrently and are joined once all have
//! settled. A failing category contributes nothing; it never aborts the
//! search. Only cache failures and location failures reach the caller.

use std::collections::HashSet;
use std::time::Duration;

use futures::future::join_all;
use serde_json::Value;
use steakfinder_core::{AppConfig, Coordinates, DistanceUnit, RestaurantCategory, RestaurantRecord};

use crate::cache::{cache_key, CacheEntry, CacheError, Clock, ResultCache, SystemClock};
use crate::location::{LocationError, LocationSource};
use crate::normalize::{extract_places, normalize_place};
use crate::source::PlacesSource;
use crate::types::{TextSearchRequest, DEFAULT_SEARCH_RADIUS_METERS};

pub const DEFAULT_RESULT_LIMIT: usize = 10;
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

/// Which opening-hours states survive the open filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenPolicy {
    /// Only places reported open right now. Places without hours are dropped.
    #[default]
    OpenOnly,
    /// Open places plus places whose hours are unknown.
    OpenOrUnknown,
}

impl OpenPolicy {
    #[must_use]
    pub fn admits(self, record: &RestaurantRecord) -> bool {
        match self {
            OpenPolicy::OpenOnly => record.is_open_now == Some(true),
            OpenPolicy::OpenOrUnknown => record.is_open_now != Some(false),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AggregatorOptions {
    pub radius_meters: u32,
    pub result_limit: usize,
    pub cache_ttl: Duration,
    pub open_policy: OpenPolicy,
}

impl Default for AggregatorOptions {
    fn default() -> Self {
        Self {
            radius_meters: DEFAULT_SEARCH_RADIUS_METERS,
            result_limit: DEFAULT_RESULT_LIMIT,
            cache_ttl: DEFAULT_CACHE_TTL,
            open_policy: OpenPolicy::OpenOnly,
        }
    }
}

impl AggregatorOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            radius_meters: config.search_radius_meters,
            result_limit: config.result_limit,
            cache_ttl: Duration::from_secs(config.cache_ttl_secs),
            open_policy: if config.include_unknown_hours {
                OpenPolicy::OpenOrUnknown
            } else {
                OpenPolicy::OpenOnly
            },
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    #[error("result cache failure: {0}")]
    Cache(#[from] CacheError),

    #[error("could not determine location: {0}")]
    Location(#[from] LocationError),
}

/// Ranked restaurants for one origin.
#[derive(Debug, Clone)]
pub struct SearchResults {
    pub origin: Coordinates,
    /// Chosen once from the origin and applied to every record.
    pub unit: DistanceUnit,
    pub restaurants: Vec<RestaurantRecord>,
    pub from_cache: bool,
    /// Categories whose search failed on this run. Empty for cache hits.
    pub failed_categories: Vec<RestaurantCategory>,
}

pub struct Aggregator<S, C, K = SystemClock> {
    source: S,
    cache: C,
    clock: K,
    options: AggregatorOptions,
}

impl<S: PlacesSource, C: ResultCache> Aggregator<S, C, SystemClock> {
    pub fn new(source: S, cache: C, options: AggregatorOptions) -> Self {
        Self::with_clock(source, cache, SystemClock, options)
    }
}

impl<S: PlacesSource, C: ResultCache, K: Clock> Aggregator<S, C, K> {
    pub fn with_clock(source: S, cache: C, clock: K, options: AggregatorOptions) -> Self {
        Self {
            source,
            cache,
            clock,
            options,
        }
    }

    pub fn options(&self) -> &AggregatorOptions {
        &self.options
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Nearest open restaurants around `origin`, served from the cache when a
    /// fresh entry exists.
    ///
    /// # Errors
    ///
    /// Returns [`AggregateError::Cache`] if the cache cannot be read or
    /// written. Category search failures are not errors.
    pub async fn search(&self, origin: Coordinates) -> Result<SearchResults, AggregateError> {
        let key = cache_key(origin);
        let unit = DistanceUnit::for_location(origin);

        if let Some(entry) = self.cache.get(&key)? {
            if entry.is_fresh(self.clock.now_ms(), self.options.cache_ttl) {
                tracing::debug!(key, count = entry.data.len(), "serving restaurants from cache");
                return Ok(SearchResults {
                    origin,
                    unit,
                    restaurants: entry.data,
                    from_cache: true,
                    failed_categories: Vec::new(),
                });
            }
        }

        let (batches, failed_categories) = self.fan_out(origin).await;
        let restaurants = rank_restaurants(
            &batches,
            origin,
            self.options.result_limit,
            self.options.open_policy,
        );

        tracing::info!(
            %origin,
            count = restaurants.len(),
            failed = failed_categories.len(),
            "aggregated restaurant search"
        );

        // A run where every category failed would pin an empty list in the
        // cache for the whole TTL.
        if failed_categories.len() < RestaurantCategory::ALL.len() {
            self.cache.put(
                &key,
                CacheEntry::new(restaurants.clone(), self.clock.now_ms()),
            )?;
        }

        Ok(SearchResults {
            origin,
            unit,
            restaurants,
            from_cache: false,
            failed_categories,
        })
    }

    /// Issues every category search at once and waits for all of them.
    ///
    /// Returns the successful place batches in category order plus the
    /// categories that failed.
    async fn fan_out(&self, origin: Coordinates) -> (Vec<Vec<Value>>, Vec<RestaurantCategory>) {
        let searches = RestaurantCategory::ALL.into_iter().map(|category| {
            let request = TextSearchRequest::new(category.query(), origin)
                .with_radius(self.options.radius_meters);
            async move {
                let outcome = self
                    .source
                    .search_text(&request)
                    .await
                    .and_then(|payload| extract_places(&payload));
                (category, outcome)
            }
        });

        let mut batches = Vec::with_capacity(RestaurantCategory::ALL.len());
        let mut failed = Vec::new();

        for (category, outcome) in join_all(searches).await {
            match outcome {
                Ok(places) => batches.push(places),
                Err(error) => {
                    tracing::warn!(category = %category, %error, "category search failed; treating as no results");
                    failed.push(category);
                }
            }
        }

        (batches, failed)
    }
}

/// Normalize, dedup, open-filter, measure, sort, and truncate.
///
/// `batches` must be in category order: dedup keeps the first occurrence of
/// each id in flattened order.
#[must_use]
pub fn rank_restaurants(
    batches: &[Vec<Value>],
    origin: Coordinates,
    limit: usize,
    policy: OpenPolicy,
) -> Vec<RestaurantRecord> {
    let mut seen = HashSet::new();

    let mut restaurants: Vec<RestaurantRecord> = batches
        .iter()
        .flatten()
        .filter_map(normalize_place)
        .filter(|record| seen.insert(record.id.clone()))
        .filter(|record| policy.admits(record))
        .map(|mut record| {
            record.measure_from(origin);
            record
        })
        .collect();

    restaurants.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    restaurants.truncate(limit);
    restaurants
}

/// Ask `location` where the user is, then search there.
///
/// # Errors
///
/// Returns [`AggregateError::Location`] when no position is available, or
/// any error from [`Aggregator::search`].
pub async fn locate_and_search<L, S, C, K>(
    location: &L,
    aggregator: &Aggregator<S, C, K>,
) -> Result<SearchResults, AggregateError>
where
    L: LocationSource + ?Sized,
    S: PlacesSource,
    C: ResultCache,
    K: Clock,
{
    let origin = location.current_position().await?;
    aggregator.search(origin).await
}

#[cfg(test)]
#[path = "aggregate_test.rs"]
mod tests;
