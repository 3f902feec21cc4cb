use lawnquote_core::{Coordinates, Geometry, SlopeCategory};
use serde::{Deserialize, Serialize};

/// An address point from the authoritative registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryAddress {
    pub full_address: String,
    pub coordinates: Coordinates,
}

/// Where a reported section area came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaSource {
    /// The registry's own calculated-area attribute.
    Registry,
    /// Shoelace area of the parcel boundary.
    Geometry,
    /// Suburb default; no parcel area available.
    Estimated,
}

/// A land parcel containing the queried point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parcel {
    pub id: String,
    /// Zero when neither the registry nor the boundary yields an area.
    pub area_sqm: f64,
    pub area_source: AreaSource,
    pub boundary: Geometry,
}

impl Parcel {
    /// Area if it is usable for pricing.
    #[must_use]
    pub fn usable_area(&self) -> Option<f64> {
        (self.area_sqm.is_finite() && self.area_sqm > 0.0).then_some(self.area_sqm)
    }
}

/// Elevation range over the sampled points, metres, one decimal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevationStats {
    pub min: f64,
    pub max: f64,
    pub range: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlopeStats {
    /// Percent grade, one decimal.
    pub percent: f64,
    pub category: SlopeCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Terrain {
    pub elevation: ElevationStats,
    pub slope: SlopeStats,
}

/// Outcome of cross-checking a resolved point against the address registry.
///
/// Advisory only: it adjusts reported confidence and never blocks a quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub matched: bool,
    pub matched_address: Option<String>,
    /// Whole metres to the nearest registry address.
    pub distance_meters: Option<u32>,
    /// 0–100.
    pub confidence: u8,
}

impl ValidationResult {
    #[must_use]
    pub fn unmatched() -> Self {
        Self {
            matched: false,
            matched_address: None,
            distance_meters: None,
            confidence: 0,
        }
    }
}
