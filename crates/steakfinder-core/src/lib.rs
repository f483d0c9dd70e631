pub mod app_config;
pub mod config;
pub mod error;
pub mod geo;
pub mod restaurant;

pub use app_config::{ApiKey, AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, CoreError};
pub use geo::{
    haversine_km, haversine_miles, km_to_miles, prefers_miles, Coordinates, DistanceUnit,
};
pub use restaurant::{filter_by_category, DirectionsTarget, RestaurantCategory, RestaurantRecord};
