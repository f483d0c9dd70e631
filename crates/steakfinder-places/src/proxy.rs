//! Client for a deployed `/api/places` proxy.
//!
//! Lets tools search without holding the Google key themselves: the proxy
//! injects it server-side.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::error::PlacesError;
use crate::source::PlacesSource;
use crate::types::TextSearchRequest;

#[derive(Debug, Clone)]
pub struct ProxyClient {
    client: Client,
    endpoint: Url,
}

impl ProxyClient {
    /// `base_url` is the proxy's origin, e.g. `https://steakfinder.example.com`.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`PlacesError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/api/places", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalised).map_err(|e| PlacesError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, endpoint })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl PlacesSource for ProxyClient {
    async fn search_text(
        &self,
        request: &TextSearchRequest,
    ) -> Result<serde_json::Value, PlacesError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request.proxy_body())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PlacesError::UnexpectedStatus {
                status: response.status().as_u16(),
                url: self.endpoint.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
            context: format!("proxy searchText(query={})", request.text_query),
            source: e,
        })
    }
}
