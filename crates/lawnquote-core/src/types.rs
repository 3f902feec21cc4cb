//! Domain types shared by the analysis pipeline, the pricing engine and the
//! quote store.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Builds a coordinate pair, rejecting values outside WGS84 ranges.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCoordinates`] when `lat` is outside
    /// `[-90, 90]`, `lng` is outside `[-180, 180]`, or either is not finite.
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoreError> {
        let coords = Self { lat, lng };
        if coords.is_valid() {
            Ok(coords)
        } else {
            Err(CoreError::InvalidCoordinates { lat, lng })
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Structured address parts as returned by an address provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressComponents {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suburb: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
}

/// The address search backends the resolver knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Addy,
    Google,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Addy => write!(f, "addy"),
            ProviderKind::Google => write!(f, "google"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "addy" => Ok(Self::Addy),
            "google" => Ok(Self::Google),
            _ => Err(CoreError::InvalidValue {
                kind: "address provider",
                value: s.to_string(),
            }),
        }
    }
}

/// A search hit. Produced by a search call and consumed once by a details call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressCandidate {
    pub source: ProviderKind,
    /// Opaque provider handle (`addressId` for Addy, `placeId` for Google).
    pub handle: String,
    pub address: String,
    pub components: Option<AddressComponents>,
    /// Provider-assigned confidence in `[0, 1]`.
    pub confidence: f64,
}

/// The outcome of a successful details lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAddress {
    pub source: ProviderKind,
    pub coordinates: Coordinates,
    pub full_address: String,
    pub components: Option<AddressComponents>,
}

/// Five-bucket slope classification derived from elevation samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlopeCategory {
    Flat,
    #[serde(rename = "Gentle slope")]
    GentleSlope,
    #[serde(rename = "Moderate slope")]
    ModerateSlope,
    Steep,
    #[serde(rename = "Very steep")]
    VerySteep,
}

impl SlopeCategory {
    /// Collapses onto the four pricing buckets; `VerySteep` prices as `Steep`.
    #[must_use]
    pub fn to_gradient(self) -> Gradient {
        match self {
            SlopeCategory::Flat => Gradient::Flat,
            SlopeCategory::GentleSlope => Gradient::GentleSlope,
            SlopeCategory::ModerateSlope => Gradient::ModerateSlope,
            SlopeCategory::Steep | SlopeCategory::VerySteep => Gradient::Steep,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SlopeCategory::Flat => "Flat",
            SlopeCategory::GentleSlope => "Gentle slope",
            SlopeCategory::ModerateSlope => "Moderate slope",
            SlopeCategory::Steep => "Steep",
            SlopeCategory::VerySteep => "Very steep",
        }
    }
}

impl std::fmt::Display for SlopeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Four-bucket gradient used by pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gradient {
    Flat,
    #[serde(rename = "Gentle slope")]
    GentleSlope,
    #[serde(rename = "Moderate slope")]
    ModerateSlope,
    Steep,
}

impl Gradient {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Gradient::Flat => "Flat",
            Gradient::GentleSlope => "Gentle slope",
            Gradient::ModerateSlope => "Moderate slope",
            Gradient::Steep => "Steep",
        }
    }
}

impl std::fmt::Display for Gradient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Gradient {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], " ").as_str() {
            "flat" => Ok(Self::Flat),
            "gentle" | "gentle slope" => Ok(Self::GentleSlope),
            "moderate" | "moderate slope" => Ok(Self::ModerateSlope),
            "steep" | "very steep" => Ok(Self::Steep),
            _ => Err(CoreError::InvalidValue {
                kind: "gradient",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessDifficulty {
    Easy,
    Standard,
    Tricky,
}

impl std::fmt::Display for AccessDifficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessDifficulty::Easy => write!(f, "Easy"),
            AccessDifficulty::Standard => write!(f, "Standard"),
            AccessDifficulty::Tricky => write!(f, "Tricky"),
        }
    }
}

impl FromStr for AccessDifficulty {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "standard" => Ok(Self::Standard),
            "tricky" => Ok(Self::Tricky),
            _ => Err(CoreError::InvalidValue {
                kind: "access difficulty",
                value: s.to_string(),
            }),
        }
    }
}

/// Recurring visit cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Fortnightly,
    Monthly,
}

impl Frequency {
    /// Fraction of the subtotal taken off for this cadence.
    #[must_use]
    pub fn discount_rate(self) -> f64 {
        match self {
            Frequency::Weekly => 0.15,
            Frequency::Fortnightly => 0.10,
            Frequency::Monthly => 0.0,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Frequency::Weekly => "Weekly",
            Frequency::Fortnightly => "Fortnightly",
            Frequency::Monthly => "Monthly",
        }
    }

    /// Marketing copy for the discount; empty when there is none.
    #[must_use]
    pub fn discount_label(self) -> &'static str {
        match self {
            Frequency::Weekly => "15% off",
            Frequency::Fortnightly => "10% off",
            Frequency::Monthly => "",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Weekly => "weekly",
            Frequency::Fortnightly => "fortnightly",
            Frequency::Monthly => "monthly",
        }
    }
}

impl FromStr for Frequency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "fortnightly" => Ok(Self::Fortnightly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(CoreError::InvalidValue {
                kind: "frequency",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DogSize {
    Small,
    Medium,
    Large,
}

impl DogSize {
    /// Flat per-visit price of the dog cleanup add-on.
    #[must_use]
    pub fn cleanup_price(self) -> f64 {
        match self {
            DogSize::Small => 10.0,
            DogSize::Medium => 15.0,
            DogSize::Large => 20.0,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DogSize::Small => "small",
            DogSize::Medium => "medium",
            DogSize::Large => "large",
        }
    }
}

impl FromStr for DogSize {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            _ => Err(CoreError::InvalidValue {
                kind: "dog size",
                value: s.to_string(),
            }),
        }
    }
}

/// Pricing input derived from parcel geometry and suburb heuristics.
///
/// Created fresh per quote request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyMetrics {
    pub total_area_sqm: u32,
    pub lawn_area_sqm: u32,
    pub gradient: Gradient,
    pub estimated_edging_m: u32,
    pub access_difficulty: AccessDifficulty,
    pub hedge_length_m: u32,
}

impl PropertyMetrics {
    /// Checks `lawn_area_sqm <= total_area_sqm` for metrics that arrive from
    /// outside the estimator (e.g. a booking submission).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::LawnExceedsTotal`] when the invariant is broken.
    pub fn check_invariants(&self) -> Result<(), CoreError> {
        if self.lawn_area_sqm > self.total_area_sqm {
            return Err(CoreError::LawnExceedsTotal {
                lawn_area_sqm: self.lawn_area_sqm,
                total_area_sqm: self.total_area_sqm,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_reject_out_of_range() {
        assert!(Coordinates::new(-45.87, 170.5).is_ok());
        assert!(Coordinates::new(91.0, 0.0).is_err());
        assert!(Coordinates::new(0.0, -180.5).is_err());
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn very_steep_collapses_to_steep() {
        assert_eq!(SlopeCategory::VerySteep.to_gradient(), Gradient::Steep);
        assert_eq!(SlopeCategory::Steep.to_gradient(), Gradient::Steep);
        assert_eq!(SlopeCategory::Flat.to_gradient(), Gradient::Flat);
    }

    #[test]
    fn gradient_serializes_with_display_labels() {
        let json = serde_json::to_string(&Gradient::ModerateSlope).unwrap();
        assert_eq!(json, "\"Moderate slope\"");
        let parsed: Gradient = serde_json::from_str("\"Gentle slope\"").unwrap();
        assert_eq!(parsed, Gradient::GentleSlope);
    }

    #[test]
    fn gradient_from_str_accepts_short_forms() {
        assert_eq!("moderate".parse::<Gradient>().unwrap(), Gradient::ModerateSlope);
        assert_eq!(
            "Gentle-Slope".parse::<Gradient>().unwrap(),
            Gradient::GentleSlope
        );
        assert!("cliff".parse::<Gradient>().is_err());
    }

    #[test]
    fn frequency_labels_and_discounts() {
        assert_eq!(Frequency::Weekly.label(), "Weekly");
        assert_eq!(Frequency::Fortnightly.discount_label(), "10% off");
        assert_eq!(Frequency::Monthly.discount_label(), "");
        assert!((Frequency::Weekly.discount_rate() - 0.15).abs() < f64::EPSILON);
    }

    #[test]
    fn property_metrics_use_legacy_field_names() {
        let metrics = PropertyMetrics {
            total_area_sqm: 550,
            lawn_area_sqm: 275,
            gradient: Gradient::ModerateSlope,
            estimated_edging_m: 91,
            access_difficulty: AccessDifficulty::Easy,
            hedge_length_m: 0,
        };
        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json["totalAreaSqm"], 550);
        assert_eq!(json["lawnAreaSqm"], 275);
        assert_eq!(json["estimatedEdgingM"], 91);
        assert_eq!(json["accessDifficulty"], "Easy");
        assert_eq!(json["hedgeLengthM"], 0);
    }

    #[test]
    fn property_metrics_reject_lawn_larger_than_total() {
        let metrics = PropertyMetrics {
            total_area_sqm: 100,
            lawn_area_sqm: 150,
            gradient: Gradient::Flat,
            estimated_edging_m: 10,
            access_difficulty: AccessDifficulty::Easy,
            hedge_length_m: 0,
        };
        assert!(matches!(
            metrics.check_invariants(),
            Err(CoreError::LawnExceedsTotal { .. })
        ));
    }
}
