mod proxy;
mod results;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use steakfinder_core::AppConfig;
use steakfinder_places::{
    Aggregator, AggregatorOptions, MemoryResultCache, PlacesClient, PlacesError,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId};

/// Aggregator used by `/results`: direct upstream client, in-process cache.
pub type ServerAggregator = Aggregator<Arc<PlacesClient>, MemoryResultCache>;

#[derive(Clone)]
pub struct AppState {
    /// `None` when no API key is configured (development only).
    pub places: Option<Arc<PlacesClient>>,
    pub aggregator: Option<Arc<ServerAggregator>>,
    pub search_radius_meters: u32,
}

impl AppState {
    /// Builds the upstream client and aggregator from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError`] if the HTTP client cannot be built or a base
    /// URL is invalid.
    pub fn from_config(config: &AppConfig) -> Result<Self, PlacesError> {
        let Some(api_key) = config.google_maps_api_key.clone() else {
            tracing::warn!(
                "GOOGLE_MAPS_API_KEY not set; proxy endpoints will answer 500 in development environment"
            );
            return Ok(Self {
                places: None,
                aggregator: None,
                search_radius_meters: config.search_radius_meters,
            });
        };

        let client = Arc::new(PlacesClient::with_base_urls(
            api_key,
            config.request_timeout_secs,
            &config.user_agent,
            &config.places_base_url,
            &config.geocode_base_url,
        )?);

        let aggregator = Aggregator::new(
            Arc::clone(&client),
            MemoryResultCache::new(),
            AggregatorOptions::from_config(config),
        );

        Ok(Self {
            places: Some(client),
            aggregator: Some(Arc::new(aggregator)),
            search_radius_meters: config.search_radius_meters,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    places_api: &'static str,
}

#[derive(Debug, Serialize)]
struct IndexData {
    service: &'static str,
    version: &'static str,
    endpoints: [&'static str; 5],
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

/// `/api/places` and `/api/geocode`: fixed CORS headers on every response,
/// explicit OPTIONS and 405 handling, shared rate limit.
fn proxy_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/places",
            post(proxy::search_places)
                .options(proxy::preflight)
                .fallback(proxy::method_not_allowed),
        )
        .route(
            "/api/geocode",
            post(proxy::geocode_address)
                .options(proxy::preflight)
                .fallback(proxy::method_not_allowed),
        )
        .layer(
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_ORIGIN,
                    HeaderValue::from_static("*"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_HEADERS,
                    HeaderValue::from_static("Content-Type"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_METHODS,
                    HeaderValue::from_static("POST, OPTIONS"),
                ))
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                )),
        )
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new()
        .route("/", get(index))
        .route("/api/v1/health", get(health))
        .route("/results", get(results::show_results))
        .layer(build_cors());

    Router::new()
        .merge(public_routes)
        .merge(proxy_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn index(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    Json(ApiResponse {
        data: IndexData {
            service: "steakfinder",
            version: env!("CARGO_PKG_VERSION"),
            endpoints: [
                "POST /api/places",
                "POST /api/geocode",
                "GET /results?lat=<lat>&lng=<lng>[&category=<key>]",
                "GET /api/v1/health",
                "GET /",
            ],
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    Json(ApiResponse {
        data: HealthData {
            status: "ok",
            places_api: if state.places.is_some() {
                "configured"
            } else {
                "missing"
            },
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

#[cfg(test)]
mod tests;
