use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use steakfinder_core::{
    filter_by_category, Coordinates, DistanceUnit, RestaurantCategory, RestaurantRecord,
};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

const LOAD_FAILED: &str = "Failed to load restaurants. Please try again.";

/// Raw query values; parsed by hand so bad input redirects instead of
/// failing extraction.
#[derive(Debug, Deserialize)]
pub(super) struct ResultsQuery {
    lat: Option<String>,
    lng: Option<String>,
    category: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ResultsData {
    unit: DistanceUnit,
    restaurants: Vec<RestaurantView>,
    from_cache: bool,
}

/// A record plus the presentation fields a results card needs.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RestaurantView {
    #[serde(flatten)]
    record: RestaurantRecord,
    distance_label: String,
    category: &'static str,
    category_label: &'static str,
    directions_url: Option<String>,
    price_symbols: String,
}

impl RestaurantView {
    fn new(record: RestaurantRecord, unit: DistanceUnit) -> Self {
        let category = record.category();
        Self {
            distance_label: unit.format_km(record.distance_km),
            category: category.key(),
            category_label: category.label(),
            directions_url: record.directions_url(),
            price_symbols: record.price_symbols(),
            record,
        }
    }
}

pub(super) async fn show_results(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ResultsQuery>,
) -> Result<Response, ApiError> {
    let Some(origin) = parse_origin(query.lat.as_deref(), query.lng.as_deref()) else {
        return Ok(Redirect::to("/").into_response());
    };

    let category = match query.category.as_deref().map(str::trim) {
        None | Some("" | "all") => None,
        Some(raw) => Some(
            raw.parse::<RestaurantCategory>()
                .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?,
        ),
    };

    let Some(aggregator) = state.aggregator.as_deref() else {
        tracing::error!("results requested without GOOGLE_MAPS_API_KEY");
        return Err(ApiError::new(req_id.0, "internal_error", LOAD_FAILED));
    };

    let results = aggregator.search(origin).await.map_err(|e| {
        tracing::error!(error = %e, %origin, "restaurant aggregation failed");
        ApiError::new(req_id.0.clone(), "internal_error", LOAD_FAILED)
    })?;

    let restaurants = filter_by_category(&results.restaurants, category)
        .into_iter()
        .map(|record| RestaurantView::new(record, results.unit))
        .collect();

    Ok(Json(ApiResponse {
        data: ResultsData {
            unit: results.unit,
            restaurants,
            from_cache: results.from_cache,
        },
        meta: ResponseMeta::new(req_id.0),
    })
    .into_response())
}

fn parse_origin(lat: Option<&str>, lng: Option<&str>) -> Option<Coordinates> {
    let latitude = lat?.trim().parse::<f64>().ok()?;
    let longitude = lng?.trim().parse::<f64>().ok()?;
    let origin = Coordinates::new(latitude, longitude);
    origin.is_valid().then_some(origin)
}
