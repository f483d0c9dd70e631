use std::net::SocketAddr;

/// Value shipped in `.env.example`; treated the same as an absent key.
pub const PLACEHOLDER_API_KEY: &str = "your_api_key_here";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// A Google Maps API key that has passed the "is it actually configured" check.
///
/// Construct with [`ApiKey::parse`]; the raw value never appears in `Debug`
/// output.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` for empty, whitespace-only, or placeholder values.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == PLACEHOLDER_API_KEY {
            return None;
        }
        Some(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey([redacted])")
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// `None` only in development; other environments fail at load time.
    pub google_maps_api_key: Option<ApiKey>,
    pub places_base_url: String,
    pub geocode_base_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub search_radius_meters: u32,
    pub result_limit: usize,
    pub cache_ttl_secs: u64,
    pub include_unknown_hours: bool,
    pub rate_limit_per_minute: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field(
                "google_maps_api_key",
                &self.google_maps_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("places_base_url", &self.places_base_url)
            .field("geocode_base_url", &self.geocode_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("search_radius_meters", &self.search_radius_meters)
            .field("result_limit", &self.result_limit)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("include_unknown_hours", &self.include_unknown_hours)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .finish()
    }
}
