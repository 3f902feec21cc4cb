//! External data sources for property analysis and the pipeline that
//! combines them.

pub mod addy;
pub mod analysis;
pub mod elevation;
pub mod error;
pub mod google;
mod http;
pub mod linz;
pub mod provider;
pub mod resolver;
pub mod terrain;
pub mod types;
pub mod validator;

pub use addy::AddyClient;
pub use analysis::{
    AnalysisRequest, PropertyAnalysis, PropertyAnalyzer, PropertyValidation, QuoteReadiness,
    SourceStatus, READY_CONFIDENCE,
};
pub use elevation::{ElevationClient, DEFAULT_DATASET};
pub use error::{AnalysisError, ProviderError};
pub use google::GooglePlacesClient;
pub use http::ClientSettings;
pub use linz::LinzClient;
pub use provider::{AddressProvider, BoxFuture};
pub use resolver::{AddressQuery, AddressResolver, MAX_SUGGESTIONS, MIN_SUGGEST_QUERY_CHARS};
pub use terrain::{fetch_terrain, terrain_from_samples};
pub use types::{
    AreaSource, ElevationStats, Parcel, RegistryAddress, SlopeStats, Terrain, ValidationResult,
};
pub use validator::{cross_validate, score_candidates};
