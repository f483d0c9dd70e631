//! The seam between the aggregator and whatever answers text searches.

use async_trait::async_trait;

use crate::client::PlacesClient;
use crate::error::PlacesError;
use crate::types::TextSearchRequest;

/// Something that can run a places text search and hand back the raw
/// provider payload.
#[async_trait]
pub trait PlacesSource: Send + Sync {
    async fn search_text(
        &self,
        request: &TextSearchRequest,
    ) -> Result<serde_json::Value, PlacesError>;
}

#[async_trait]
impl PlacesSource for PlacesClient {
    async fn search_text(
        &self,
        request: &TextSearchRequest,
    ) -> Result<serde_json::Value, PlacesError> {
        self.search_text_raw(request).await
    }
}

#[async_trait]
impl<T: PlacesSource + ?Sized> PlacesSource for std::sync::Arc<T> {
    async fn search_text(
        &self,
        request: &TextSearchRequest,
    ) -> Result<serde_json::Value, PlacesError> {
        (**self).search_text(request).await
    }
}
