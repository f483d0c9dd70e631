use super::*;
use axum::body::{to_bytes, Body};
use axum::http::Request;
use steakfinder_core::{ApiKey, Environment};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(base_url: &str, with_key: bool) -> AppConfig {
    AppConfig {
        env: Environment::Test,
        bind_addr: "127.0.0.1:0".parse().expect("addr"),
        log_level: "info".to_string(),
        google_maps_api_key: with_key.then(|| ApiKey::parse("test-key").expect("valid key")),
        places_base_url: base_url.to_string(),
        geocode_base_url: base_url.to_string(),
        request_timeout_secs: 5,
        user_agent: "steakfinder-test".to_string(),
        search_radius_meters: 5000,
        result_limit: 10,
        cache_ttl_secs: 600,
        include_unknown_hours: false,
        rate_limit_per_minute: 120,
    }
}

fn app_for(config: &AppConfig) -> Router {
    let state = AppState::from_config(config).expect("state");
    build_app(
        state,
        RateLimitState::per_minute(config.rate_limit_per_minute),
    )
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&body).expect("json parse")
}

fn assert_proxy_cors(response: &axum::response::Response) {
    let headers = response.headers();
    assert_eq!(
        headers.get("access-control-allow-origin").map(HeaderValue::as_bytes),
        Some(&b"*"[..])
    );
    assert_eq!(
        headers.get("access-control-allow-headers").map(HeaderValue::as_bytes),
        Some(&b"Content-Type"[..])
    );
    assert_eq!(
        headers.get("access-control-allow-methods").map(HeaderValue::as_bytes),
        Some(&b"POST, OPTIONS"[..])
    );
}

fn open_steakhouse() -> serde_json::Value {
    serde_json::json!({
        "places": [{
            "id": "ChIJ-prime",
            "displayName": { "text": "House of Prime Rib" },
            "rating": 4.7,
            "priceLevel": "PRICE_LEVEL_EXPENSIVE",
            "formattedAddress": "1906 Van Ness Ave, San Francisco, CA 94109",
            "types": ["steak_house", "restaurant"],
            "location": { "latitude": 37.7935, "longitude": -122.4225 },
            "currentOpeningHours": { "openNow": true }
        }]
    })
}

#[test]
fn api_error_validation_error_maps_to_bad_request() {
    let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_reports_places_api_configuration() {
    let configured = app_for(&test_config("http://127.0.0.1:9", true))
        .oneshot(get_request("/api/v1/health"))
        .await
        .expect("response");
    assert_eq!(configured.status(), StatusCode::OK);
    assert!(configured.headers().contains_key("x-request-id"));
    let json = json_body(configured).await;
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["data"]["places_api"], "configured");
    assert!(json["meta"]["request_id"].is_string());

    let missing = app_for(&test_config("http://127.0.0.1:9", false))
        .oneshot(get_request("/api/v1/health"))
        .await
        .expect("response");
    assert_eq!(json_body(missing).await["data"]["places_api"], "missing");
}

#[tokio::test]
async fn index_lists_endpoints() {
    let response = app_for(&test_config("http://127.0.0.1:9", true))
        .oneshot(get_request("/"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["data"]["service"], "steakfinder");
    assert_eq!(json["data"]["endpoints"][0], "POST /api/places");
}

#[tokio::test]
async fn places_preflight_is_empty_200_with_cors_headers() {
    let response = app_for(&test_config("http://127.0.0.1:9", true))
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/places")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_proxy_cors(&response);
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    assert!(body.is_empty());
}

#[tokio::test]
async fn places_rejects_other_methods_with_405() {
    let response = app_for(&test_config("http://127.0.0.1:9", true))
        .oneshot(get_request("/api/places"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_proxy_cors(&response);
    assert_eq!(json_body(response).await["error"], "Method not allowed");
}

#[tokio::test]
async fn places_missing_params_is_400() {
    let response = app_for(&test_config("http://127.0.0.1:9", true))
        .oneshot(post_json("/api/places", r#"{"textQuery":"steakhouse","latitude":37.7}"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_proxy_cors(&response);
    assert_eq!(
        json_body(response).await["error"],
        "Missing required parameters: textQuery, latitude, longitude"
    );
}

#[tokio::test]
async fn places_invalid_json_is_400() {
    let response = app_for(&test_config("http://127.0.0.1:9", true))
        .oneshot(post_json("/api/places", "{not json"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn places_without_key_is_500() {
    let response = app_for(&test_config("http://127.0.0.1:9", false))
        .oneshot(post_json(
            "/api/places",
            r#"{"textQuery":"steakhouse","latitude":37.7749,"longitude":-122.4194}"#,
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_proxy_cors(&response);
    assert_eq!(
        json_body(response).await["error"],
        "Google Maps API key not configured"
    );
}

#[tokio::test]
async fn places_passes_upstream_body_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/places:searchText"))
        .and(body_partial_json(serde_json::json!({
            "textQuery": "steakhouse",
            "locationBias": {
                "circle": {
                    "center": { "latitude": 37.7749, "longitude": -122.4194 },
                    "radius": 5000
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(open_steakhouse()))
        .expect(1)
        .mount(&server)
        .await;

    let response = app_for(&test_config(&server.uri(), true))
        .oneshot(post_json(
            "/api/places",
            r#"{"textQuery":"steakhouse","latitude":"37.7749","longitude":"-122.4194"}"#,
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_proxy_cors(&response);
    assert_eq!(json_body(response).await, open_steakhouse());
}

#[tokio::test]
async fn places_returns_upstream_bytes_unchanged() {
    let upstream = r#"{"places":[{"zeta":1,"alpha":2.50}]}"#;
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/places:searchText"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(upstream, "application/json"))
        .mount(&server)
        .await;

    let response = app_for(&test_config(&server.uri(), true))
        .oneshot(post_json(
            "/api/places",
            r#"{"textQuery":"steakhouse","latitude":37.7749,"longitude":-122.4194}"#,
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_proxy_cors(&response);
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .map(HeaderValue::as_bytes),
        Some(&b"application/json"[..])
    );
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    assert_eq!(&body[..], upstream.as_bytes());
}

#[tokio::test]
async fn places_upstream_failure_is_500() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/places:searchText"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let response = app_for(&test_config(&server.uri(), true))
        .oneshot(post_json(
            "/api/places",
            r#"{"textQuery":"steakhouse","latitude":37.7749,"longitude":-122.4194}"#,
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["error"], "Failed to fetch places data");
}

#[tokio::test]
async fn geocode_returns_coordinates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "OK",
            "results": [{
                "formatted_address": "Union Square, San Francisco, CA 94108, USA",
                "geometry": { "location": { "lat": 37.788, "lng": -122.4075 } }
            }]
        })))
        .mount(&server)
        .await;

    let response = app_for(&test_config(&server.uri(), true))
        .oneshot(post_json("/api/geocode", r#"{"address":"Union Square SF"}"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_proxy_cors(&response);
    let json = json_body(response).await;
    assert_eq!(json["lat"], 37.788);
    assert_eq!(json["lng"], -122.4075);
    assert_eq!(
        json["formatted_address"],
        "Union Square, San Francisco, CA 94108, USA"
    );
}

#[tokio::test]
async fn geocode_not_found_is_404_with_details() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "ZERO_RESULTS",
            "results": []
        })))
        .mount(&server)
        .await;

    let response = app_for(&test_config(&server.uri(), true))
        .oneshot(post_json("/api/geocode", r#"{"address":"zzzz"}"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = json_body(response).await;
    assert_eq!(json["error"], "Address not found");
    assert_eq!(json["details"], "ZERO_RESULTS");
}

#[tokio::test]
async fn geocode_missing_address_is_400() {
    let response = app_for(&test_config("http://127.0.0.1:9", true))
        .oneshot(post_json("/api/geocode", r#"{"address":""}"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await["error"],
        "Missing required parameter: address"
    );
}

#[tokio::test]
async fn geocode_without_key_is_500() {
    let response = app_for(&test_config("http://127.0.0.1:9", false))
        .oneshot(post_json("/api/geocode", r#"{"address":"Union Square SF"}"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_proxy_cors(&response);
    assert_eq!(
        json_body(response).await["error"],
        "Google Maps API key not configured for geocoding"
    );
}

#[tokio::test]
async fn geocode_upstream_failure_is_500() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let response = app_for(&test_config(&server.uri(), true))
        .oneshot(post_json("/api/geocode", r#"{"address":"Union Square SF"}"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["error"], "Failed to geocode address");
}

#[tokio::test]
async fn proxy_rate_limit_returns_429_with_cors_headers() {
    let mut config = test_config("http://127.0.0.1:9", false);
    config.rate_limit_per_minute = 1;
    let app = app_for(&config);

    let first = app
        .clone()
        .oneshot(post_json("/api/geocode", "{}"))
        .await
        .expect("response");
    assert_eq!(first.status(), StatusCode::BAD_REQUEST);

    let second = app
        .oneshot(post_json("/api/geocode", "{}"))
        .await
        .expect("response");
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_proxy_cors(&second);
    assert_eq!(json_body(second).await["error"], "Rate limit exceeded");
}

#[tokio::test]
async fn results_without_coordinates_redirects_home() {
    let app = app_for(&test_config("http://127.0.0.1:9", true));

    for uri in ["/results", "/results?lat=37.7", "/results?lat=abc&lng=1"] {
        let response = app.clone().oneshot(get_request(uri)).await.expect("response");
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(
            response.headers().get("location").map(HeaderValue::as_bytes),
            Some(&b"/"[..])
        );
    }
}

#[tokio::test]
async fn results_ranks_and_caches_restaurants() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/places:searchText"))
        .respond_with(ResponseTemplate::new(200).set_body_json(open_steakhouse()))
        .expect(5)
        .mount(&server)
        .await;

    let app = app_for(&test_config(&server.uri(), true));
    let uri = "/results?lat=37.7749&lng=-122.4194";

    let first = app.clone().oneshot(get_request(uri)).await.expect("response");
    assert_eq!(first.status(), StatusCode::OK);
    let json = json_body(first).await;
    let data = &json["data"];
    assert_eq!(data["unit"], "miles");
    assert_eq!(data["fromCache"], false);

    let restaurants = data["restaurants"].as_array().expect("restaurants");
    assert_eq!(restaurants.len(), 1, "duplicate ids collapse");
    let card = &restaurants[0];
    assert_eq!(card["id"], "ChIJ-prime");
    assert_eq!(card["category"], "steakhouse");
    assert_eq!(card["priceSymbols"], "$$$");
    assert!(card["distanceLabel"]
        .as_str()
        .is_some_and(|label| label.ends_with(" mi")));
    assert!(card["directionsUrl"]
        .as_str()
        .is_some_and(|url| url.contains("destination_place_id=ChIJ-prime")));

    let second = app.oneshot(get_request(uri)).await.expect("response");
    assert_eq!(json_body(second).await["data"]["fromCache"], true);
}

#[tokio::test]
async fn results_category_filter_narrows_the_list() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/places:searchText"))
        .respond_with(ResponseTemplate::new(200).set_body_json(open_steakhouse()))
        .mount(&server)
        .await;

    let app = app_for(&test_config(&server.uri(), true));

    let korean = app
        .clone()
        .oneshot(get_request("/results?lat=37.7749&lng=-122.4194&category=korean"))
        .await
        .expect("response");
    assert_eq!(korean.status(), StatusCode::OK);
    let json = json_body(korean).await;
    assert!(json["data"]["restaurants"]
        .as_array()
        .expect("restaurants")
        .is_empty());

    let bogus = app
        .oneshot(get_request("/results?lat=37.7749&lng=-122.4194&category=sushi"))
        .await
        .expect("response");
    assert_eq!(bogus.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn results_without_key_is_500_with_retry_message() {
    let response = app_for(&test_config("http://127.0.0.1:9", false))
        .oneshot(get_request("/results?lat=37.7749&lng=-122.4194"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "internal_error");
    assert_eq!(
        json["error"]["message"],
        "Failed to load restaurants. Please try again."
    );
}
