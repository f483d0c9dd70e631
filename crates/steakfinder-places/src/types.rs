//! Request and response shapes for the Google Places (New) and Geocoding APIs.

use serde::{Deserialize, Serialize};
use steakfinder_core::Coordinates;

/// Radius of the location-bias circle when none is configured.
pub const DEFAULT_SEARCH_RADIUS_METERS: u32 = 5000;

/// Fields requested from `places:searchText`.
pub const FIELD_MASK: &str = "places.displayName,places.id,places.rating,places.priceLevel,\
places.formattedAddress,places.types,places.photos,places.location,\
places.currentOpeningHours,places.websiteUri";

/// One text search biased toward a circle around `origin`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSearchRequest {
    pub text_query: String,
    pub origin: Coordinates,
    pub radius_meters: u32,
}

impl TextSearchRequest {
    #[must_use]
    pub fn new(text_query: impl Into<String>, origin: Coordinates) -> Self {
        Self {
            text_query: text_query.into(),
            origin,
            radius_meters: DEFAULT_SEARCH_RADIUS_METERS,
        }
    }

    #[must_use]
    pub fn with_radius(mut self, radius_meters: u32) -> Self {
        self.radius_meters = radius_meters;
        self
    }

    /// Body for the provider's `places:searchText` endpoint.
    #[must_use]
    pub fn provider_body(&self) -> serde_json::Value {
        serde_json::json!({
            "textQuery": self.text_query,
            "locationBias": {
                "circle": {
                    "center": {
                        "latitude": self.origin.latitude,
                        "longitude": self.origin.longitude,
                    },
                    "radius": self.radius_meters,
                }
            }
        })
    }

    /// Body for this service's own `/api/places` proxy endpoint.
    #[must_use]
    pub fn proxy_body(&self) -> serde_json::Value {
        serde_json::json!({
            "textQuery": self.text_query,
            "latitude": self.origin.latitude,
            "longitude": self.origin.longitude,
        })
    }
}

/// Result of a successful address lookup, in the proxy's wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodedAddress {
    pub lat: f64,
    pub lng: f64,
    pub formatted_address: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeResult {
    #[serde(default)]
    pub formatted_address: String,
    pub geometry: GeocodeGeometry,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeGeometry {
    pub location: GeocodeLatLng,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeLatLng {
    pub lat: f64,
    pub lng: f64,
}
