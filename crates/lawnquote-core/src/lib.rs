pub mod app_config;
pub mod catalog;
pub mod config;
pub mod geo;
pub mod metrics;
pub mod pricing;
pub mod service_area;
pub mod types;

pub use app_config::{AppConfig, Environment};
pub use catalog::{load_catalog, Catalog, Service, Suburb, Zone, POPULAR_SUBURBS};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{
    address_text_similarity, categorize_slope, confidence_score, diagonal_meters,
    distance_meters, lat_lng_to_tile, polygon_area_sqm, sample_points_in_bbox, Geometry,
    TileCoord,
};
pub use metrics::{default_total_area, estimate_metrics, extract_suburb, DEFAULT_TOTAL_AREA_SQM};
pub use pricing::{calculate_price, PriceBreakdown, PriceRange, PriceRequest, SizeCategory};
pub use service_area::{is_in_service_area, with_region_hint, SERVICE_AREA_LOCALITIES};
pub use types::{
    AccessDifficulty, AddressCandidate, AddressComponents, Coordinates, DogSize, Frequency,
    Gradient, PropertyMetrics, ProviderKind, ResolvedAddress, SlopeCategory,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read catalog file {path}: {source}")]
    CatalogFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog file: {0}")]
    CatalogFileParse(#[from] serde_yaml::Error),

    #[error("catalog validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("coordinates out of range: lat={lat}, lng={lng}")]
    InvalidCoordinates { lat: f64, lng: f64 },

    #[error("invalid {kind}: '{value}'")]
    InvalidValue { kind: &'static str, value: String },

    #[error("lawn area {lawn_area_sqm} m² exceeds total area {total_area_sqm} m²")]
    LawnExceedsTotal {
        lawn_area_sqm: u32,
        total_area_sqm: u32,
    },
}
