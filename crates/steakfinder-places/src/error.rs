use thiserror::Error;

/// Errors from the places provider, whether reached directly or through a proxy.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The provider answered 2xx but reported an error in the body.
    #[error("places provider error: {0}")]
    Provider(String),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Geocoding returned no usable result; `status` is the provider status.
    #[error("address not found (status {status})")]
    AddressNotFound { status: String },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
