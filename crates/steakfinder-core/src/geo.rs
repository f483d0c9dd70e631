//! Great-circle distance and distance-unit selection.
//!
//! Distances are computed in kilometers; the miles/kilometers choice is a
//! coarse bounding-box heuristic on the user's position, not a reverse geocode.

use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;
const MILES_PER_KM: f64 = 0.621_371;

#[derive(Debug, Clone, Copy)]
struct BoundingBox {
    min_lat: f64,
    max_lat: f64,
    min_lng: f64,
    max_lng: f64,
}

impl BoundingBox {
    fn contains(&self, coords: Coordinates) -> bool {
        (self.min_lat..=self.max_lat).contains(&coords.latitude)
            && (self.min_lng..=self.max_lng).contains(&coords.longitude)
    }
}

/// Contiguous US.
const US_BOX: BoundingBox = BoundingBox {
    min_lat: 24.396_308,
    max_lat: 49.384_358,
    min_lng: -125.0,
    max_lng: -66.934_570,
};

/// Great Britain and Northern Ireland.
const UK_BOX: BoundingBox = BoundingBox {
    min_lat: 49.959_999,
    max_lat: 60.860_000,
    min_lng: -8.18,
    max_lng: 1.76,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// True when both components are finite and within WGS84 ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

/// Haversine distance between two points in kilometers.
#[must_use]
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lng = (to.longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    // Rounding can push `a` just past 1.0 for antipodal points.
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_KM * c
}

#[must_use]
pub fn km_to_miles(km: f64) -> f64 {
    km * MILES_PER_KM
}

#[must_use]
pub fn haversine_miles(from: Coordinates, to: Coordinates) -> f64 {
    km_to_miles(haversine_km(from, to))
}

/// Whether a position falls in a region that conventionally uses miles.
#[must_use]
pub fn prefers_miles(coords: Coordinates) -> bool {
    US_BOX.contains(coords) || UK_BOX.contains(coords)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    Kilometers,
    Miles,
}

impl DistanceUnit {
    #[must_use]
    pub fn for_location(coords: Coordinates) -> Self {
        if prefers_miles(coords) {
            DistanceUnit::Miles
        } else {
            DistanceUnit::Kilometers
        }
    }

    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            DistanceUnit::Kilometers => "km",
            DistanceUnit::Miles => "mi",
        }
    }

    #[must_use]
    pub fn convert_km(self, km: f64) -> f64 {
        match self {
            DistanceUnit::Kilometers => km,
            DistanceUnit::Miles => km_to_miles(km),
        }
    }

    /// Human label such as `"1.2 mi"`. Non-finite distances render as
    /// `"unknown distance"`.
    #[must_use]
    pub fn format_km(self, km: f64) -> String {
        if !km.is_finite() {
            return "unknown distance".to_string();
        }
        format!("{:.1} {}", self.convert_km(km), self.suffix())
    }
}

impl std::fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.suffix())
    }
}
