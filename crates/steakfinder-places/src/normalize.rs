//! Normalization from provider place payloads to [`RestaurantRecord`].
//!
//! Both the Places (New) shape (`id`, `displayName.text`, `location`, ...)
//! and the legacy Places shape (`place_id`, `name`, `geometry.location`, ...)
//! are accepted. Where a field has several spellings the first non-empty one
//! in a fixed order wins.

use serde_json::Value;
use steakfinder_core::{Coordinates, DirectionsTarget, RestaurantRecord};

use crate::error::PlacesError;

/// Pull the list of place objects out of a provider response.
///
/// # Errors
///
/// Returns [`PlacesError::Provider`] when the payload carries an `error`
/// member instead of results.
pub fn extract_places(payload: &Value) -> Result<Vec<Value>, PlacesError> {
    if let Some(error) = payload.get("error").filter(|e| !e.is_null()) {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| error.as_str())
            .unwrap_or("unknown error")
            .to_string();
        return Err(PlacesError::Provider(message));
    }

    let places = payload
        .get("places")
        .or_else(|| payload.get("results"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    Ok(places)
}

/// Normalize one provider place. Returns `None` when it has no usable id or name.
#[must_use]
pub fn normalize_place(place: &Value) -> Option<RestaurantRecord> {
    let id = first_non_empty_str(place, &[&["id"], &["place_id"]])?;
    let name = first_non_empty_str(place, &[&["displayName", "text"], &["name"]])?;

    let price_level = ["priceLevel", "price_level"]
        .iter()
        .find_map(|key| place.get(key).and_then(parse_price_level));

    let address = first_non_empty_str(place, &[&["formattedAddress"], &["vicinity"]])
        .unwrap_or_default();

    let category_types = place
        .get("types")
        .and_then(Value::as_array)
        .map(|types| {
            types
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let is_open_now = [
        &["currentOpeningHours", "openNow"][..],
        &["opening_hours", "open_now"][..],
    ]
    .iter()
    .find_map(|path| lookup(place, path).and_then(Value::as_bool));

    let website_url = first_non_empty_str(place, &[&["websiteUri"], &["website"]]);

    let photo_count = place
        .get("photos")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);

    Some(RestaurantRecord {
        directions: Some(DirectionsTarget {
            place_id: id.clone(),
            name: name.clone(),
        }),
        id,
        name,
        rating: place.get("rating").and_then(Value::as_f64).unwrap_or(0.0),
        price_level,
        address,
        category_types,
        coordinates: parse_coordinates(place),
        distance_km: f64::INFINITY,
        is_open_now,
        website_url,
        photo_count,
    })
}

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(key))
}

fn first_non_empty_str(value: &Value, paths: &[&[&str]]) -> Option<String> {
    paths.iter().find_map(|path| {
        lookup(value, path)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

fn parse_coordinates(place: &Value) -> Option<Coordinates> {
    let pairs = [
        (&["location"][..], "latitude", "longitude"),
        (&["geometry", "location"][..], "lat", "lng"),
    ];

    pairs.iter().find_map(|(path, lat_key, lng_key)| {
        let node = lookup(place, path)?;
        let coords = Coordinates::new(
            node.get(*lat_key).and_then(Value::as_f64)?,
            node.get(*lng_key).and_then(Value::as_f64)?,
        );
        coords.is_valid().then_some(coords)
    })
}

/// Accepts a numeric level or a `PRICE_LEVEL_*` enum string.
fn parse_price_level(value: &Value) -> Option<u8> {
    if let Some(n) = value.as_u64() {
        return u8::try_from(n).ok();
    }
    match value.as_str()? {
        "PRICE_LEVEL_FREE" => Some(0),
        "PRICE_LEVEL_INEXPENSIVE" => Some(1),
        "PRICE_LEVEL_MODERATE" => Some(2),
        "PRICE_LEVEL_EXPENSIVE" => Some(3),
        "PRICE_LEVEL_VERY_EXPENSIVE" => Some(4),
        other => other.parse::<u8>().ok(),
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
