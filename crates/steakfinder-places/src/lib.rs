pub mod aggregate;
pub mod cache;
pub mod client;
pub mod error;
pub mod location;
pub mod normalize;
pub mod proxy;
pub mod source;
pub mod types;

pub use aggregate::{
    locate_and_search, rank_restaurants, AggregateError, Aggregator, AggregatorOptions,
    OpenPolicy, SearchResults,
};
pub use cache::{
    cache_key, CacheEntry, CacheError, Clock, FileResultCache, MemoryResultCache, ResultCache,
    SystemClock,
};
pub use client::PlacesClient;
pub use error::PlacesError;
pub use location::{FixedLocation, LocationError, LocationSource};
pub use normalize::{extract_places, normalize_place};
pub use proxy::ProxyClient;
pub use source::PlacesSource;
pub use types::{GeocodedAddress, TextSearchRequest, DEFAULT_SEARCH_RADIUS_METERS, FIELD_MASK};
