//! HTTP client for the Google Places (New) text search and Geocoding APIs.
//!
//! Holds the server-side API key; callers never see it. Text search results
//! are available as the untouched response bytes for the proxy endpoint, or
//! parsed for aggregation.

use std::time::Duration;

use reqwest::{Client, Url};
use steakfinder_core::ApiKey;

use crate::error::PlacesError;
use crate::types::{GeocodeResponse, GeocodedAddress, TextSearchRequest, FIELD_MASK};

const DEFAULT_PLACES_BASE_URL: &str = "https://places.googleapis.com/";
const DEFAULT_GEOCODE_BASE_URL: &str = "https://maps.googleapis.com/";

/// Client for the upstream places provider.
///
/// Use [`PlacesClient::new`] for production or [`PlacesClient::with_base_urls`]
/// to point at a mock server in tests.
#[derive(Clone)]
pub struct PlacesClient {
    client: Client,
    api_key: ApiKey,
    places_base: Url,
    geocode_base: Url,
}

impl PlacesClient {
    /// Creates a client pointed at the production Google endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: ApiKey, timeout_secs: u64, user_agent: &str) -> Result<Self, PlacesError> {
        Self::with_base_urls(
            api_key,
            timeout_secs,
            user_agent,
            DEFAULT_PLACES_BASE_URL,
            DEFAULT_GEOCODE_BASE_URL,
        )
    }

    /// Creates a client with custom base URLs (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`PlacesError::InvalidBaseUrl`] if either base URL does not parse.
    pub fn with_base_urls(
        api_key: ApiKey,
        timeout_secs: u64,
        user_agent: &str,
        places_base_url: &str,
        geocode_base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            api_key,
            places_base: parse_base_url(places_base_url)?,
            geocode_base: parse_base_url(geocode_base_url)?,
        })
    }

    /// Runs a `places:searchText` query and returns the provider body bytes
    /// exactly as received.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Http`] on network failure.
    /// - [`PlacesError::UnexpectedStatus`] on a non-2xx response.
    /// - [`PlacesError::Deserialize`] if the body is not JSON.
    pub async fn search_text_bytes(
        &self,
        request: &TextSearchRequest,
    ) -> Result<Vec<u8>, PlacesError> {
        let url = self.search_text_url();
        tracing::debug!(query = %request.text_query, origin = %request.origin, "places text search");

        let response = self
            .client
            .post(url.clone())
            .header("X-Goog-FieldMask", FIELD_MASK)
            .json(&request.provider_body())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PlacesError::UnexpectedStatus {
                status: response.status().as_u16(),
                url: redact_key(&url),
            });
        }

        let body = response.bytes().await?.to_vec();
        serde_json::from_slice::<serde::de::IgnoredAny>(&body).map_err(|e| {
            PlacesError::Deserialize {
                context: format!("searchText(query={})", request.text_query),
                source: e,
            }
        })?;
        Ok(body)
    }

    /// Runs a `places:searchText` query and parses the provider body.
    ///
    /// # Errors
    ///
    /// Same as [`PlacesClient::search_text_bytes`].
    pub async fn search_text_raw(
        &self,
        request: &TextSearchRequest,
    ) -> Result<serde_json::Value, PlacesError> {
        let body = self.search_text_bytes(request).await?;
        serde_json::from_slice(&body).map_err(|e| PlacesError::Deserialize {
            context: format!("searchText(query={})", request.text_query),
            source: e,
        })
    }

    /// Resolves a free-text address to coordinates.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::AddressNotFound`] when the provider status is not `OK`
    ///   or there are no results.
    /// - [`PlacesError::Http`] / [`PlacesError::UnexpectedStatus`] on transport
    ///   failure.
    /// - [`PlacesError::Deserialize`] if the body does not match the expected shape.
    pub async fn geocode(&self, address: &str) -> Result<GeocodedAddress, PlacesError> {
        let url = self.geocode_url(address);
        let response = self.client.get(url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(PlacesError::UnexpectedStatus {
                status: response.status().as_u16(),
                url: redact_key(&url),
            });
        }

        let body = response.text().await?;
        let parsed: GeocodeResponse =
            serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
                context: "geocode".to_string(),
                source: e,
            })?;

        match parsed.results.into_iter().next() {
            Some(first) if parsed.status == "OK" => Ok(GeocodedAddress {
                lat: first.geometry.location.lat,
                lng: first.geometry.location.lng,
                formatted_address: first.formatted_address,
            }),
            _ => Err(PlacesError::AddressNotFound {
                status: parsed.status,
            }),
        }
    }

    fn search_text_url(&self) -> Url {
        let mut url = self.places_base.clone();
        url.set_path(&format!(
            "{}v1/places:searchText",
            self.places_base.path()
        ));
        url.query_pairs_mut()
            .append_pair("key", self.api_key.expose());
        url
    }

    fn geocode_url(&self, address: &str) -> Url {
        let mut url = self.geocode_base.clone();
        url.set_path(&format!(
            "{}maps/api/geocode/json",
            self.geocode_base.path()
        ));
        url.query_pairs_mut()
            .append_pair("address", address)
            .append_pair("key", self.api_key.expose());
        url
    }
}

impl std::fmt::Debug for PlacesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlacesClient")
            .field("places_base", &self.places_base.as_str())
            .field("geocode_base", &self.geocode_base.as_str())
            .finish_non_exhaustive()
    }
}

/// Normalise to exactly one trailing slash so endpoint paths append cleanly.
fn parse_base_url(raw: &str) -> Result<Url, PlacesError> {
    let normalised = format!("{}/", raw.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| PlacesError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Drop the query string so the key never lands in logs or error messages.
fn redact_key(url: &Url) -> String {
    let mut clean = url.clone();
    clean.set_query(None);
    clean.to_string()
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
