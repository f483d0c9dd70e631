//! Canonical restaurant record and the five display categories.

use std::str::FromStr;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::geo::{haversine_km, Coordinates};

/// Characters left intact by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const DIRECTIONS_BASE_URL: &str = "https://www.google.com/maps/dir/?api=1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestaurantCategory {
    Steakhouse,
    BrazilianBbq,
    KoreanBbq,
    ArgentineGrill,
    AmericanBbq,
}

impl RestaurantCategory {
    /// Every category, in the order the searches are issued.
    pub const ALL: [RestaurantCategory; 5] = [
        RestaurantCategory::Steakhouse,
        RestaurantCategory::BrazilianBbq,
        RestaurantCategory::KoreanBbq,
        RestaurantCategory::ArgentineGrill,
        RestaurantCategory::AmericanBbq,
    ];

    /// Free-text query sent to the places provider.
    #[must_use]
    pub fn query(self) -> &'static str {
        match self {
            RestaurantCategory::Steakhouse => "steakhouse",
            RestaurantCategory::BrazilianBbq => "brazilian bbq",
            RestaurantCategory::KoreanBbq => "korean bbq",
            RestaurantCategory::ArgentineGrill => "argentine grill",
            RestaurantCategory::AmericanBbq => "american bbq",
        }
    }

    /// Short filter key, also the substring looked for in provider tags.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            RestaurantCategory::Steakhouse => "steakhouse",
            RestaurantCategory::BrazilianBbq => "brazilian",
            RestaurantCategory::KoreanBbq => "korean",
            RestaurantCategory::ArgentineGrill => "argentine",
            RestaurantCategory::AmericanBbq => "american",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            RestaurantCategory::Steakhouse => "Steakhouse",
            RestaurantCategory::BrazilianBbq => "Brazilian BBQ",
            RestaurantCategory::KoreanBbq => "Korean BBQ",
            RestaurantCategory::ArgentineGrill => "Argentine Grill",
            RestaurantCategory::AmericanBbq => "American BBQ",
        }
    }

    /// Classify provider tags into a display category.
    ///
    /// Checked in the order Brazilian, Korean, Argentine, American; anything
    /// else is a steakhouse.
    #[must_use]
    pub fn classify<S: AsRef<str>>(types: &[S]) -> Self {
        const PRECEDENCE: [RestaurantCategory; 4] = [
            RestaurantCategory::BrazilianBbq,
            RestaurantCategory::KoreanBbq,
            RestaurantCategory::ArgentineGrill,
            RestaurantCategory::AmericanBbq,
        ];

        PRECEDENCE
            .into_iter()
            .find(|category| {
                types
                    .iter()
                    .any(|t| t.as_ref().to_ascii_lowercase().contains(category.key()))
            })
            .unwrap_or(RestaurantCategory::Steakhouse)
    }
}

impl std::fmt::Display for RestaurantCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for RestaurantCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        RestaurantCategory::ALL
            .into_iter()
            .find(|c| c.key() == wanted)
            .ok_or_else(|| CoreError::UnknownCategory(s.to_string()))
    }
}

/// Identifier + name pair used to build a maps deep link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionsTarget {
    pub place_id: String,
    pub name: String,
}

impl DirectionsTarget {
    #[must_use]
    pub fn url(&self) -> String {
        format!(
            "{DIRECTIONS_BASE_URL}&destination={}&destination_place_id={}",
            utf8_percent_encode(&self.name, URI_COMPONENT),
            utf8_percent_encode(&self.place_id, URI_COMPONENT),
        )
    }
}

/// A restaurant normalized from a places-provider payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantRecord {
    /// Provider identifier; the dedup key.
    pub id: String,
    pub name: String,
    /// Zero when the provider has no rating.
    pub rating: f64,
    pub price_level: Option<u8>,
    pub address: String,
    pub category_types: Vec<String>,
    pub coordinates: Option<Coordinates>,
    /// Distance from the searching user. `INFINITY` when `coordinates` is
    /// absent; serialized as `null`.
    #[serde(with = "infinite_as_null", default = "infinite")]
    pub distance_km: f64,
    pub is_open_now: Option<bool>,
    pub website_url: Option<String>,
    pub directions: Option<DirectionsTarget>,
    #[serde(default)]
    pub photo_count: usize,
}

impl RestaurantRecord {
    #[must_use]
    pub fn category(&self) -> RestaurantCategory {
        RestaurantCategory::classify(&self.category_types)
    }

    #[must_use]
    pub fn directions_url(&self) -> Option<String> {
        self.directions.as_ref().map(DirectionsTarget::url)
    }

    /// `"$"` repeated `price_level` times; empty when unknown or free.
    #[must_use]
    pub fn price_symbols(&self) -> String {
        "$".repeat(usize::from(self.price_level.unwrap_or(0)))
    }

    /// Sets `distance_km` relative to `origin`.
    pub fn measure_from(&mut self, origin: Coordinates) {
        self.distance_km = self
            .coordinates
            .map_or(f64::INFINITY, |coords| haversine_km(origin, coords));
    }
}

/// Keep only records of `category`; `None` keeps everything.
#[must_use]
pub fn filter_by_category(
    records: &[RestaurantRecord],
    category: Option<RestaurantCategory>,
) -> Vec<RestaurantRecord> {
    records
        .iter()
        .filter(|r| category.is_none_or(|c| r.category() == c))
        .cloned()
        .collect()
}

fn infinite() -> f64 {
    f64::INFINITY
}

mod infinite_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}
