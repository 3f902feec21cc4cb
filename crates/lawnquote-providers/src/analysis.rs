//! The property-analysis pipeline: resolve, then validate and fetch the
//! parcel concurrently, then terrain, then metrics.

use std::sync::Arc;

use lawnquote_core::geo::round_half_up;
use lawnquote_core::{
    default_total_area, estimate_metrics, extract_suburb, lat_lng_to_tile, AddressComponents,
    AppConfig, Coordinates, Geometry, PropertyMetrics, ProviderKind,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::addy::AddyClient;
use crate::elevation::ElevationClient;
use crate::error::{AnalysisError, ProviderError};
use crate::google::GooglePlacesClient;
use crate::http::ClientSettings;
use crate::linz::LinzClient;
use crate::provider::AddressProvider;
use crate::resolver::{AddressQuery, AddressResolver};
use crate::terrain::fetch_terrain;
use crate::types::{AreaSource, ElevationStats, Parcel, SlopeStats, Terrain, ValidationResult};
use crate::validator::cross_validate;

const SQFT_PER_SQM: f64 = 10.764;
const IMAGERY_ZOOM: u8 = 19;
const IMAGERY_ATTRIBUTION: &str = "Sourced from Toitū Te Whenua Land Information New Zealand";
const LAWN_AREA_NOTE: &str = "Estimate only - to be confirmed on-site";

/// Registry candidates scored during a full analysis.
const ANALYSIS_CANDIDATES: usize = 5;
/// Registry candidates scored by a standalone validation request.
const VALIDATION_CANDIDATES: usize = 10;

/// Validation confidence at which a quote can be estimated without a site check.
pub const READY_CONFIDENCE: u8 = 80;

const PARCEL_CONFIDENCE: f64 = 0.9;
const NO_PARCEL_CONFIDENCE: f64 = 0.6;

/// One analysis request. At least one of `address` and `handle` is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub address: Option<String>,
    pub handle: Option<String>,
    /// Provider that issued `handle`; Addy when omitted.
    pub provider: Option<ProviderKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressSummary {
    pub input: Option<String>,
    pub resolved: String,
    pub source: ProviderKind,
    pub components: Option<AddressComponents>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AreaMeasure {
    pub sqm: u32,
    pub sqft: u32,
}

impl AreaMeasure {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn from_sqm(sqm: u32) -> Self {
        Self {
            sqm,
            sqft: round_half_up(f64::from(sqm) * SQFT_PER_SQM) as u32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LawnAreaEstimate {
    pub sqm: u32,
    pub sqft: u32,
    pub note: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySummary {
    pub total_area: AreaMeasure,
    pub total_area_source: AreaSource,
    pub parcel_id: Option<String>,
    pub boundary: Option<Geometry>,
    pub estimated_lawn_area: LawnAreaEstimate,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TerrainSummary {
    pub elevation: Option<ElevationStats>,
    pub slope: Option<SlopeStats>,
}

impl From<Option<Terrain>> for TerrainSummary {
    fn from(terrain: Option<Terrain>) -> Self {
        Self {
            elevation: terrain.map(|t| t.elevation),
            slope: terrain.map(|t| t.slope),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Imagery {
    pub aerial_tile_url: Option<String>,
    pub zoom: u8,
    pub attribution: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteReadiness {
    ReadyForEstimate,
    NeedsVerification,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteStatus {
    pub status: QuoteReadiness,
    pub confidence: u8,
    pub message: &'static str,
}

impl QuoteStatus {
    fn from_confidence(confidence: u8) -> Self {
        if confidence >= READY_CONFIDENCE {
            Self {
                status: QuoteReadiness::ReadyForEstimate,
                confidence,
                message: "Address verified. Lawn area to be confirmed on-site.",
            }
        } else {
            Self {
                status: QuoteReadiness::NeedsVerification,
                confidence,
                message: "Address could not be fully verified. Operator will confirm location.",
            }
        }
    }
}

/// Everything the quote UI renders for one address.
///
/// The flattened metrics and `suburb`/`confidence` keep the flat shape older
/// clients read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyAnalysis {
    pub status: &'static str,
    pub address: AddressSummary,
    pub coordinates: Coordinates,
    pub validation: ValidationResult,
    pub property: PropertySummary,
    pub terrain: TerrainSummary,
    pub imagery: Imagery,
    pub quote: QuoteStatus,
    pub suburb: String,
    #[serde(flatten)]
    pub metrics: PropertyMetrics,
    /// 0–1; lower when the section size had to be guessed.
    pub confidence: f64,
}

/// Parcel details returned by a standalone validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParcelSummary {
    pub id: String,
    pub area: u32,
    pub area_source: AreaSource,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyValidation {
    pub validation: ValidationResult,
    pub parcel: Option<ParcelSummary>,
}

/// Which external sources are configured, for health reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceStatus {
    pub addy: bool,
    pub google: bool,
    pub linz: bool,
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_sqm(area: f64) -> u32 {
    round_half_up(area).max(0.0) as u32
}

pub struct PropertyAnalyzer {
    resolver: AddressResolver,
    linz: Option<LinzClient>,
    elevation: ElevationClient,
    seed: Option<u64>,
}

impl PropertyAnalyzer {
    #[must_use]
    pub fn new(
        resolver: AddressResolver,
        linz: Option<LinzClient>,
        elevation: ElevationClient,
    ) -> Self {
        Self {
            resolver,
            linz,
            elevation,
            seed: None,
        }
    }

    /// Build clients for every provider with a configured key. Addy is
    /// consulted before Google.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if an HTTP client cannot be constructed.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ProviderError> {
        let settings = ClientSettings::from_app_config(config);

        let mut providers: Vec<Arc<dyn AddressProvider>> = Vec::new();
        if let Some(key) = &config.addy_api_key {
            providers.push(Arc::new(AddyClient::new(key, &settings)?));
        }
        if let Some(key) = &config.google_api_key {
            providers.push(Arc::new(GooglePlacesClient::new(key, &settings)?));
        }
        if providers.is_empty() {
            tracing::warn!("no address provider configured; analysis will not resolve addresses");
        }

        let linz = config
            .linz_api_key
            .as_deref()
            .map(|key| LinzClient::new(key, &settings))
            .transpose()?;
        if linz.is_none() {
            tracing::warn!("LINZ_API_KEY not set; validation, parcels and imagery disabled");
        }

        let elevation = ElevationClient::new(&config.elevation_dataset, &settings)?;
        let resolver = AddressResolver::new(providers, &config.region_hint);

        Ok(Self::new(resolver, linz, elevation))
    }

    /// Fix the random source used for hedge estimates.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn resolver(&self) -> &AddressResolver {
        &self.resolver
    }

    #[must_use]
    pub fn sources(&self) -> SourceStatus {
        let configured = self.resolver.configured();
        SourceStatus {
            addy: configured.contains(&ProviderKind::Addy),
            google: configured.contains(&ProviderKind::Google),
            linz: self.linz.is_some(),
        }
    }

    fn rng(&self) -> StdRng {
        self.seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64)
    }

    async fn validate_at(
        &self,
        point: Coordinates,
        address_text: Option<&str>,
        candidates: usize,
    ) -> ValidationResult {
        match &self.linz {
            Some(linz) => cross_validate(linz, point, address_text, candidates).await,
            None => ValidationResult::unmatched(),
        }
    }

    async fn parcel_at(&self, point: Coordinates) -> Option<Parcel> {
        let linz = self.linz.as_ref()?;
        match linz.parcel_at(point).await {
            Ok(parcel) => {
                if parcel.is_none() {
                    tracing::debug!(lat = point.lat, lng = point.lng, "no parcel at point");
                }
                parcel
            }
            Err(e) => {
                tracing::warn!(provider = "linz", error = %e, "parcel lookup failed");
                None
            }
        }
    }

    /// Full analysis for one address.
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::InvalidInput`] when neither an address nor a handle
    ///   is given.
    /// - [`AnalysisError::AddressNotResolved`] when no provider can locate it.
    ///
    /// Every later lookup degrades to defaults instead of failing.
    pub async fn analyze(
        &self,
        request: &AnalysisRequest,
    ) -> Result<PropertyAnalysis, AnalysisError> {
        let input = request
            .address
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let handle = request
            .handle
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let resolved = match (handle, input) {
            (None, None) => {
                return Err(AnalysisError::InvalidInput(
                    "an address or addressId is required".to_string(),
                ));
            }
            (Some(handle), text) => {
                let provider = request.provider.unwrap_or(ProviderKind::Addy);
                match self.resolver.details(provider, handle).await {
                    Ok(resolved) => resolved,
                    Err(e) => match text {
                        Some(text) => {
                            tracing::debug!(error = %e, "handle did not resolve, trying text");
                            self.resolver.resolve(AddressQuery::Text(text)).await?
                        }
                        None => return Err(e),
                    },
                }
            }
            (None, Some(text)) => self.resolver.resolve(AddressQuery::Text(text)).await?,
        };

        let point = resolved.coordinates;
        let (validation, parcel) = tokio::join!(
            self.validate_at(point, Some(resolved.full_address.as_str()), ANALYSIS_CANDIDATES),
            self.parcel_at(point),
        );

        let terrain = match &parcel {
            Some(p) => fetch_terrain(&self.elevation, &p.boundary).await,
            None => None,
        };

        let suburb = extract_suburb(&resolved.full_address, resolved.components.as_ref());
        let parcel_area = parcel.as_ref().and_then(Parcel::usable_area);
        let (total_area_sqm, total_area_source) = match parcel_area {
            Some(area) => (
                whole_sqm(area),
                parcel.as_ref().map_or(AreaSource::Geometry, |p| p.area_source),
            ),
            None => (default_total_area(&suburb), AreaSource::Estimated),
        };

        let metrics = {
            let mut rng = self.rng();
            estimate_metrics(
                total_area_sqm,
                &suburb,
                terrain.map(|t| t.slope.category),
                &mut rng,
            )
        };

        let tile = lat_lng_to_tile(point.lat, point.lng, IMAGERY_ZOOM);
        let imagery = Imagery {
            aerial_tile_url: self.linz.as_ref().map(|l| l.aerial_tile_url(tile)),
            zoom: IMAGERY_ZOOM,
            attribution: IMAGERY_ATTRIBUTION,
        };

        let lawn = AreaMeasure::from_sqm(metrics.lawn_area_sqm);
        let has_parcel = parcel.is_some();
        let (parcel_id, boundary) = match parcel {
            Some(p) => (Some(p.id).filter(|id| !id.is_empty()), Some(p.boundary)),
            None => (None, None),
        };

        tracing::info!(
            source = %resolved.source,
            suburb = %suburb,
            total_area_sqm,
            confidence = validation.confidence,
            has_parcel,
            has_terrain = terrain.is_some(),
            "property analyzed"
        );

        Ok(PropertyAnalysis {
            status: "success",
            quote: QuoteStatus::from_confidence(validation.confidence),
            address: AddressSummary {
                input: input.map(str::to_string),
                resolved: resolved.full_address,
                source: resolved.source,
                components: resolved.components,
            },
            coordinates: point,
            validation,
            property: PropertySummary {
                total_area: AreaMeasure::from_sqm(total_area_sqm),
                total_area_source,
                parcel_id,
                boundary,
                estimated_lawn_area: LawnAreaEstimate {
                    sqm: lawn.sqm,
                    sqft: lawn.sqft,
                    note: LAWN_AREA_NOTE,
                },
            },
            terrain: TerrainSummary::from(terrain),
            imagery,
            suburb,
            metrics,
            confidence: if parcel_area.is_some() {
                PARCEL_CONFIDENCE
            } else {
                NO_PARCEL_CONFIDENCE
            },
        })
    }

    /// Registry cross-check and parcel lookup for a point the caller already has.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidInput`] for coordinates outside WGS84
    /// ranges.
    pub async fn validate_property(
        &self,
        lat: f64,
        lng: f64,
        address: Option<&str>,
    ) -> Result<PropertyValidation, AnalysisError> {
        let point =
            Coordinates::new(lat, lng).map_err(|e| AnalysisError::InvalidInput(e.to_string()))?;

        let (validation, parcel) = tokio::join!(
            self.validate_at(point, address, VALIDATION_CANDIDATES),
            self.parcel_at(point),
        );

        Ok(PropertyValidation {
            validation,
            parcel: parcel.map(|p| ParcelSummary {
                id: p.id,
                area: whole_sqm(p.area_sqm),
                area_source: p.area_source,
                geometry: p.boundary,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_status_threshold() {
        assert_eq!(
            QuoteStatus::from_confidence(80).status,
            QuoteReadiness::ReadyForEstimate
        );
        assert_eq!(
            QuoteStatus::from_confidence(79).status,
            QuoteReadiness::NeedsVerification
        );
        let json = serde_json::to_value(QuoteStatus::from_confidence(0)).unwrap();
        assert_eq!(json["status"], "needs_verification");
    }

    #[test]
    fn area_measure_converts_to_square_feet() {
        let area = AreaMeasure::from_sqm(600);
        assert_eq!(area.sqft, 6_458);
    }

    #[test]
    fn terrain_summary_from_none_is_nulls() {
        let json = serde_json::to_value(TerrainSummary::from(None)).unwrap();
        assert!(json["elevation"].is_null());
        assert!(json["slope"].is_null());
    }
}
