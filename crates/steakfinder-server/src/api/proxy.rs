//! Key-holding proxies in front of Google Places text search and Geocoding.
//!
//! Error bodies use the flat `{ "error": "..." }` shape browser clients
//! parse, not the `ApiError` envelope.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use steakfinder_core::Coordinates;
use steakfinder_places::{GeocodedAddress, PlacesError, TextSearchRequest};

use super::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlacesProxyBody {
    text_query: Option<String>,
    latitude: Option<Value>,
    longitude: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct GeocodeProxyBody {
    address: Option<String>,
}

#[derive(Debug)]
pub(super) enum ProxyError {
    MissingPlacesParams,
    MissingAddress,
    KeyNotConfigured,
    GeocodeKeyNotConfigured,
    PlacesUpstream,
    AddressNotFound { status: String },
    GeocodeUpstream,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ProxyError::MissingPlacesParams => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Missing required parameters: textQuery, latitude, longitude" }),
            ),
            ProxyError::MissingAddress => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Missing required parameter: address" }),
            ),
            ProxyError::KeyNotConfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Google Maps API key not configured" }),
            ),
            ProxyError::GeocodeKeyNotConfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Google Maps API key not configured for geocoding" }),
            ),
            ProxyError::PlacesUpstream => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Failed to fetch places data" }),
            ),
            ProxyError::AddressNotFound { status } => (
                StatusCode::NOT_FOUND,
                json!({ "error": "Address not found", "details": status }),
            ),
            ProxyError::GeocodeUpstream => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Failed to geocode address" }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

pub(super) async fn search_places(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ProxyError> {
    let request = parse_places_body(&body)
        .ok_or(ProxyError::MissingPlacesParams)?
        .with_radius(state.search_radius_meters);

    let client = state.places.as_deref().ok_or_else(|| {
        tracing::error!("places proxy called without GOOGLE_MAPS_API_KEY");
        ProxyError::KeyNotConfigured
    })?;

    let payload = client.search_text_bytes(&request).await.map_err(|e| {
        tracing::error!(error = %e, query = %request.text_query, "places proxy upstream call failed");
        ProxyError::PlacesUpstream
    })?;

    Ok((
        [(header::CONTENT_TYPE, "application/json")],
        Bytes::from(payload),
    )
        .into_response())
}

pub(super) async fn geocode_address(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<GeocodedAddress>, ProxyError> {
    let address = serde_json::from_slice::<GeocodeProxyBody>(&body)
        .ok()
        .and_then(|b| b.address)
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .ok_or(ProxyError::MissingAddress)?;

    let client = state.places.as_deref().ok_or_else(|| {
        tracing::error!("geocode proxy called without GOOGLE_MAPS_API_KEY");
        ProxyError::GeocodeKeyNotConfigured
    })?;

    match client.geocode(&address).await {
        Ok(found) => Ok(Json(found)),
        Err(PlacesError::AddressNotFound { status }) => {
            tracing::info!(status = %status, "geocode found no match");
            Err(ProxyError::AddressNotFound { status })
        }
        Err(e) => {
            tracing::error!(error = %e, "geocode proxy upstream call failed");
            Err(ProxyError::GeocodeUpstream)
        }
    }
}

pub(super) async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub(super) async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
}

/// `None` when the body is not JSON or any field is missing, empty, or not a
/// finite number.
fn parse_places_body(body: &[u8]) -> Option<TextSearchRequest> {
    let raw: PlacesProxyBody = serde_json::from_slice(body).ok()?;
    let text_query = raw
        .text_query
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())?;
    let latitude = raw.latitude.as_ref().and_then(coordinate_value)?;
    let longitude = raw.longitude.as_ref().and_then(coordinate_value)?;

    Some(TextSearchRequest::new(
        text_query,
        Coordinates::new(latitude, longitude),
    ))
}

/// Accepts a JSON number or a numeric string.
fn coordinate_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}
