//! Where the user is, as a single async capability.

use async_trait::async_trait;
use steakfinder_core::Coordinates;

/// Reasons a position could not be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location unavailable")]
    PositionUnavailable,
    #[error("location request timed out")]
    Timeout,
    #[error("unknown location error")]
    Unknown,
}

impl LocationError {
    /// Message suitable for showing to the person searching.
    #[must_use]
    pub fn user_message(self) -> String {
        let detail = match self {
            LocationError::PermissionDenied => {
                "Please enable location services and allow access to your location."
            }
            LocationError::PositionUnavailable => "Location information is unavailable.",
            LocationError::Timeout => "Location request timed out.",
            LocationError::Unknown => "An unknown error occurred.",
        };
        format!("Unable to get your location. {detail}")
    }
}

#[async_trait]
pub trait LocationSource: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

/// A position supplied up front, e.g. from CLI flags or query parameters.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationSource for FixedLocation {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        if self.0.is_valid() {
            Ok(self.0)
        } else {
            Err(LocationError::PositionUnavailable)
        }
    }
}
